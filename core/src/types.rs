use smallvec::SmallVec;

/// Single grid axis, used for row/column counts and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Grid position or size as `(row, col)`.
pub type Coord2 = (Coord, Coord);

/// Up to eight in-bounds neighbours, kept inline.
pub type Neighbors = SmallVec<[Coord2; 8]>;

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    (a as CellCount).saturating_mul(b as CellCount)
}

/// Whether `other` lies in the 3×3 block centred on `center`.
pub const fn within_one(center: Coord2, other: Coord2) -> bool {
    center.0.abs_diff(other.0) <= 1 && center.1.abs_diff(other.1) <= 1
}

/// In-bounds cells of the 3×3 block around `center`, excluding `center`, row-major.
pub fn neighbors(center: Coord2, size: Coord2) -> Neighbors {
    let (row, col) = center;
    let last_row = size.0.saturating_sub(1).min(row.saturating_add(1));
    let last_col = size.1.saturating_sub(1).min(col.saturating_add(1));

    let mut out = Neighbors::new();
    for r in row.saturating_sub(1)..=last_row {
        for c in col.saturating_sub(1)..=last_col {
            if (r, c) != center {
                out.push((r, c));
            }
        }
    }
    out
}

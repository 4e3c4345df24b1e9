#![no_std]

extern crate alloc;

pub use board::*;
pub use cell::*;
pub use config::*;
pub use error::*;
pub use highscore::*;
pub use session::*;
pub use types::*;

mod board;
mod cell;
mod config;
mod error;
mod highscore;
mod session;
mod types;

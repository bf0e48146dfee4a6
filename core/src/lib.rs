pub use board::*;
pub use cell::*;
pub use codec::*;
pub use difficulty::*;
pub use error::*;
pub use generator::*;
pub use types::*;
pub use validator::*;

mod board;
mod cell;
mod codec;
mod difficulty;
mod error;
mod generator;
mod types;
mod validator;

#[cfg(test)]
mod test_utils;

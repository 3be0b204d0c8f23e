//! Tag extraction through universal-ctags.

mod error;
mod runner;

pub use error::CtagsError;
pub use runner::{CtagsRunner, parse_ctags_output};

//! Optional out-of-process helper spoken to over newline-delimited JSON.

mod channel;
mod discovery;
mod error;
mod methods;
mod process;
mod protocol;

pub use channel::HelperChannel;
pub use discovery::{WORKSPACE_HELPER_PATH, find_helper_binary};
pub use error::HelperError;
pub use methods::HelperNode;
pub use process::{HelperProcess, HelperState};
pub use protocol::{HelperRequest, ResponseError, decode_response};

pub mod cli;
pub mod config;
pub mod error;
pub mod global;
pub mod pipeline;
pub mod session;
pub mod source;
pub mod timing;
pub mod transcode;

pub use error::{Error, Result};

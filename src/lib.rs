// Re-export internal modules for integration tests and external crate use.
pub mod branch;
pub mod commands;
pub mod credentials;
pub mod error;
pub mod git;
pub mod logging;
pub mod prompt;
pub mod providers;
pub mod resolver;
pub mod store;

pub use error::{Error, Result};

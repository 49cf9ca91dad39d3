pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::SiteConfig;

pub use adapters::{DirSource, FileStore, HttpSink, HttpSource, LogSink, MemoryStore};
pub use crate::core::{chatbot::Responder, notify::Notifier, site::Site};
pub use utils::error::{Result, SiteError};

// Adapters layer: concrete implementations of the domain ports.

pub mod source;
pub mod store;
pub mod submit;

pub use source::{DirSource, HttpSource};
pub use store::{FileStore, MemoryStore};
pub use submit::{HttpSink, LogSink};

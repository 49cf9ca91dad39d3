pub mod chatbot;
pub mod content;
pub mod counters;
pub mod effects;
pub mod forms;
pub mod navigation;
pub mod notify;
pub mod page;
pub mod preferences;
pub mod render;
pub mod site;

pub use crate::domain::model::{FormRecord, Language, NewsItem, Program, Severity, Theme};
pub use crate::domain::ports::{ContentSource, KeyValueStore, SubmissionSink};
pub use crate::utils::error::Result;

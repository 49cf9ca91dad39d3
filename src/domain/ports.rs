use crate::domain::model::FormRecord;
use crate::utils::error::Result;
use async_trait::async_trait;

/// String-keyed persistent store with the semantics of browser local storage:
/// whole values are read and overwritten, never patched.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Read-only provider of the static JSON files (collections, locales).
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_json(&self, path: &str) -> Result<serde_json::Value>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// Remote destination for accepted applications. Callers never await the
/// outcome on the user's path.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn submit(&self, record: &FormRecord) -> Result<()>;
}

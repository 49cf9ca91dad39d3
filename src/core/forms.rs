use crate::core::notify::Notifier;
use crate::domain::model::{
    FormRecord, RecordStatus, APPLICATIONS_KEY, CONSULTATIONS_KEY, RESERVED_FIELDS,
    SUBSCRIBERS_KEY,
};
use crate::domain::ports::{KeyValueStore, SubmissionSink};
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::{first_missing_field, is_valid_email};
use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinSet;

pub const APPLICATION_REQUIRED: [&str; 3] = ["fullName", "phone", "program"];
pub const NEWSLETTER_EMAIL_FIELD: &str = "email";

pub const INQUIRY_ACCEPTED: &str =
    "Сіздің сұрауыңыз қабылданды! Біз сізбен жақын арада хабарласамыз.";
pub const APPLICATION_INCOMPLETE: &str = "Барлық міндетті өрістерді толтырыңыз";
pub const APPLICATION_ACCEPTED: &str = "Өтінішіңіз қабылданды! Біз сізбен жақын арада хабарласамыз.";
pub const EMAIL_INVALID: &str = "Электрондық поштаны дұрыс енгізіңіз";
pub const SUBSCRIBED: &str = "Жазылу сәтті аяқталды!";
pub const SAVE_FAILED: &str = "Деректерді сақтау сәтсіз аяқталды";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Inquiry,
    Application,
    Newsletter,
}

/// Entered values of one on-page form.
#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    kind: FormKind,
    fields: BTreeMap<String, String>,
}

impl Form {
    pub fn new(kind: FormKind) -> Self {
        Self {
            kind,
            fields: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.set(name, value);
        self
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.fields.insert(name.to_string(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn reset(&mut self) {
        self.fields.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.fields.values().all(|v| v.is_empty())
    }
}

/// Reads the JSON list stored under `key`; a missing key is an empty list.
pub fn load_list<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Vec<T>> {
    match store.get(key)? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(Vec::new()),
    }
}

/// Load, append, save. Not atomic: two writers interleaving between the
/// load and the save lose one update, so this is only sound while a single
/// control flow owns the store. Returns the new list length.
pub fn append_record<T>(store: &dyn KeyValueStore, key: &str, item: T) -> Result<usize>
where
    T: Serialize + DeserializeOwned,
{
    let mut list: Vec<T> = load_list(store, key)?;
    list.push(item);
    store.set(key, &serde_json::to_string(&list)?)?;
    Ok(list.len())
}

/// [`append_record`] that skips items already present. Returns whether the
/// item was added.
pub fn append_unique<T>(store: &dyn KeyValueStore, key: &str, item: T) -> Result<bool>
where
    T: Serialize + DeserializeOwned + PartialEq,
{
    let mut list: Vec<T> = load_list(store, key)?;
    if list.contains(&item) {
        return Ok(false);
    }
    list.push(item);
    store.set(key, &serde_json::to_string(&list)?)?;
    Ok(true)
}

/// Base-36 millisecond timestamp followed by a base-36 random suffix.
pub fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let random = uuid::Uuid::new_v4().as_u128() as u64;
    format!("{}{}", to_base36(millis), to_base36(random))
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// UTC timestamp with millisecond precision, e.g. `2026-10-18T09:30:00.123Z`.
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn build_record(form: &Form, id: Option<String>) -> FormRecord {
    let fields = form
        .values()
        .iter()
        .filter(|(name, _)| !RESERVED_FIELDS.contains(&name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    FormRecord {
        fields,
        id,
        date: iso_timestamp(),
        status: RecordStatus::New,
    }
}

/// Validates, persists and acknowledges the three site forms.
///
/// Forwarded applications run as tracked tasks: the user never waits for
/// them, but [`flush`](Self::flush) lets the owner finish them before exit.
/// Dropping the pipeline aborts forwards still in flight.
pub struct FormPipeline<S: KeyValueStore> {
    store: S,
    notifier: Notifier,
    sink: Arc<dyn SubmissionSink>,
    forwards: Mutex<JoinSet<()>>,
}

impl<S: KeyValueStore> FormPipeline<S> {
    pub fn new(store: S, notifier: Notifier, sink: Arc<dyn SubmissionSink>) -> Self {
        Self {
            store,
            notifier,
            sink,
            forwards: Mutex::new(JoinSet::new()),
        }
    }

    /// Consultation request. No required fields.
    pub fn submit_inquiry(&self, form: &mut Form) -> Result<FormRecord> {
        let record = build_record(form, None);
        let total = self.persist(CONSULTATIONS_KEY, record.clone())?;
        tracing::info!("📝 Consultation request saved ({} total)", total);

        self.notifier.success(INQUIRY_ACCEPTED);
        form.reset();
        Ok(record)
    }

    /// Admission application. Needs full name, phone and program; the saved
    /// record is also handed to the submission sink without waiting.
    pub fn submit_application(&self, form: &mut Form) -> Result<FormRecord> {
        if let Some(missing) = first_missing_field(form.values(), &APPLICATION_REQUIRED) {
            tracing::debug!("Application rejected, '{}' is empty", missing);
            self.notifier.error(APPLICATION_INCOMPLETE);
            return Err(SiteError::ValidationError {
                message: APPLICATION_INCOMPLETE.to_string(),
            });
        }

        let record = build_record(form, Some(generate_id()));
        let total = self.persist(APPLICATIONS_KEY, record.clone())?;
        tracing::info!(
            "🎓 Application {} saved ({} total)",
            record.id.as_deref().unwrap_or_default(),
            total
        );

        self.notifier.success(APPLICATION_ACCEPTED);
        form.reset();
        self.forward(record.clone());
        Ok(record)
    }

    /// Newsletter subscription. Returns `false` when the address was already
    /// on the list; the user sees the same confirmation either way.
    pub fn subscribe(&self, form: &mut Form) -> Result<bool> {
        let email = form.get(NEWSLETTER_EMAIL_FIELD).unwrap_or_default().to_string();
        if !is_valid_email(&email) {
            self.notifier.error(EMAIL_INVALID);
            return Err(SiteError::ValidationError {
                message: EMAIL_INVALID.to_string(),
            });
        }

        let added = append_unique(&self.store, SUBSCRIBERS_KEY, email.clone()).map_err(|e| {
            tracing::error!("❌ Saving subscriber failed: {}", e);
            self.notifier.error(SAVE_FAILED);
            e
        })?;
        if added {
            tracing::info!("📬 New subscriber {}", email);
        } else {
            tracing::debug!("{} already subscribed", email);
        }

        self.notifier.success(SUBSCRIBED);
        form.reset();
        Ok(added)
    }

    pub fn consultations(&self) -> Result<Vec<FormRecord>> {
        load_list(&self.store, CONSULTATIONS_KEY)
    }

    pub fn applications(&self) -> Result<Vec<FormRecord>> {
        load_list(&self.store, APPLICATIONS_KEY)
    }

    pub fn subscribers(&self) -> Result<Vec<String>> {
        load_list(&self.store, SUBSCRIBERS_KEY)
    }

    fn persist(&self, key: &str, record: FormRecord) -> Result<usize> {
        append_record(&self.store, key, record).map_err(|e| {
            tracing::error!("❌ Saving to '{}' failed: {}", key, e);
            self.notifier.error(SAVE_FAILED);
            e
        })
    }

    fn forward(&self, record: FormRecord) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No runtime available, application {:?} not forwarded", record.id);
            return;
        };

        let sink = Arc::clone(&self.sink);
        let mut forwards = self.lock_forwards();
        // reap finished forwards so the set only holds work in flight
        while forwards.try_join_next().is_some() {}
        forwards.spawn_on(
            async move {
                match sink.submit(&record).await {
                    Ok(()) => tracing::debug!("Application {:?} forwarded", record.id),
                    Err(e) => {
                        tracing::warn!("⚠️ Forwarding application {:?} failed: {}", record.id, e)
                    }
                }
            },
            &handle,
        );
    }

    /// Waits for every forwarded application still in flight. Returns how
    /// many were waited on.
    pub async fn flush(&self) -> usize {
        let mut pending = std::mem::take(&mut *self.lock_forwards());
        let mut finished = 0;
        while let Some(joined) = pending.join_next().await {
            if let Err(e) = joined {
                tracing::warn!("⚠️ Forwarding task ended abnormally: {}", e);
            }
            finished += 1;
        }
        finished
    }

    fn lock_forwards(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.forwards.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{LogSink, MemoryStore};
    use crate::domain::model::Severity;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Store whose writes always fail, like a full browser quota.
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set(&self, key: &str, _value: &str) -> Result<()> {
            Err(SiteError::StorageError {
                message: format!("quota exceeded writing '{}'", key),
            })
        }
    }

    /// Sink that takes a while and counts what it received.
    #[derive(Default)]
    struct SlowSink {
        received: AtomicUsize,
    }

    #[async_trait]
    impl SubmissionSink for SlowSink {
        async fn submit(&self, _record: &FormRecord) -> Result<()> {
            tokio::time::sleep(Duration::from_millis(500)).await;
            self.received.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn pipeline() -> (FormPipeline<MemoryStore>, MemoryStore, Notifier) {
        let store = MemoryStore::new();
        let notifier = Notifier::default();
        let pipeline = FormPipeline::new(store.clone(), notifier.clone(), Arc::new(LogSink));
        (pipeline, store, notifier)
    }

    fn application() -> Form {
        Form::new(FormKind::Application)
            .with("fullName", "Aruzhan Sadykova")
            .with("phone", "+7 (777) 123-45-67")
            .with("program", "3")
    }

    #[test]
    fn base36_encoding() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn generated_ids_differ() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn timestamp_is_iso8601_utc() {
        let ts = iso_timestamp();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn missing_list_reads_empty() {
        let store = MemoryStore::new();
        let list: Vec<String> = load_list(&store, SUBSCRIBERS_KEY).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn append_preserves_existing_entries() {
        let store = MemoryStore::new();
        assert_eq!(append_record(&store, "k", "a".to_string()).unwrap(), 1);
        assert_eq!(append_record(&store, "k", "b".to_string()).unwrap(), 2);
        let list: Vec<String> = load_list(&store, "k").unwrap();
        assert_eq!(list, vec!["a", "b"]);
    }

    #[test]
    fn inquiry_saved_without_validation() {
        let (pipeline, _, notifier) = pipeline();
        let mut form = Form::new(FormKind::Inquiry).with("name", "Bolat");

        let record = pipeline.submit_inquiry(&mut form).unwrap();

        assert_eq!(record.field("name"), Some("Bolat"));
        assert_eq!(record.id, None);
        assert_eq!(record.status, RecordStatus::New);
        assert_eq!(pipeline.consultations().unwrap().len(), 1);
        assert!(form.values().is_empty());
        assert_eq!(notifier.current().unwrap().severity, Severity::Success);
    }

    #[test]
    fn application_with_empty_field_is_rejected() {
        for field in APPLICATION_REQUIRED {
            let (pipeline, _, notifier) = pipeline();
            let mut form = application().with(field, "");

            let err = pipeline.submit_application(&mut form).unwrap_err();

            assert!(err.is_validation());
            assert!(pipeline.applications().unwrap().is_empty());
            let toast = notifier.current().unwrap();
            assert_eq!(toast.severity, Severity::Error);
            assert_eq!(toast.message, APPLICATION_INCOMPLETE);
            // entered values survive a rejected submit
            assert_eq!(form.get(field), Some(""));
            assert_eq!(form.values().len(), 3);
        }
    }

    #[test]
    fn valid_application_is_appended_with_metadata() {
        let (pipeline, _, _) = pipeline();
        let first = pipeline.submit_application(&mut application()).unwrap();
        let mut form = application().with("fullName", "Dias").with("status", "approved");
        let second = pipeline.submit_application(&mut form).unwrap();

        let saved = pipeline.applications().unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0], first);
        assert_eq!(saved[1].field("fullName"), Some("Dias"));
        assert_eq!(saved[1].status, RecordStatus::New);
        assert!(saved[1].field("status").is_none());
        assert!(second.id.is_some());
        assert_ne!(first.id, second.id);
        assert!(chrono::DateTime::parse_from_rfc3339(&second.date).is_ok());
        assert!(form.values().is_empty());
    }

    #[test]
    fn bad_email_is_not_subscribed() {
        let (pipeline, _, notifier) = pipeline();
        let mut form = Form::new(FormKind::Newsletter).with("email", "not-an-email");

        assert!(pipeline.subscribe(&mut form).is_err());
        assert!(pipeline.subscribers().unwrap().is_empty());
        assert_eq!(notifier.current().unwrap().message, EMAIL_INVALID);
        assert_eq!(form.get("email"), Some("not-an-email"));
    }

    #[test]
    fn duplicate_email_is_stored_once() {
        let (pipeline, _, notifier) = pipeline();
        let mut form = Form::new(FormKind::Newsletter).with("email", "user@example.com");
        assert!(pipeline.subscribe(&mut form).unwrap());

        let mut again = Form::new(FormKind::Newsletter).with("email", "user@example.com");
        assert!(!pipeline.subscribe(&mut again).unwrap());

        assert_eq!(pipeline.subscribers().unwrap(), vec!["user@example.com"]);
        assert_eq!(notifier.current().unwrap().message, SUBSCRIBED);
    }

    #[test]
    fn failed_save_shows_error_and_keeps_form() {
        let notifier = Notifier::default();
        let pipeline = FormPipeline::new(ReadOnlyStore, notifier.clone(), Arc::new(LogSink));
        let mut form = application();

        let err = pipeline.submit_application(&mut form).unwrap_err();

        assert!(matches!(err, SiteError::StorageError { .. }));
        let toast = notifier.current().unwrap();
        assert_eq!(toast.severity, Severity::Error);
        assert_eq!(toast.message, SAVE_FAILED);
        assert_eq!(form, application());
    }

    #[test]
    fn failed_subscriber_save_shows_error() {
        let notifier = Notifier::default();
        let pipeline = FormPipeline::new(ReadOnlyStore, notifier.clone(), Arc::new(LogSink));
        let mut form = Form::new(FormKind::Newsletter).with("email", "user@example.com");

        assert!(pipeline.subscribe(&mut form).is_err());
        assert_eq!(notifier.current().unwrap().message, SAVE_FAILED);
        assert_eq!(form.get("email"), Some("user@example.com"));
    }

    #[tokio::test(start_paused = true)]
    async fn flush_waits_for_forwarded_applications() {
        let sink = Arc::new(SlowSink::default());
        let pipeline = FormPipeline::new(MemoryStore::new(), Notifier::default(), sink.clone());

        pipeline.submit_application(&mut application()).unwrap();
        pipeline.submit_application(&mut application()).unwrap();
        assert_eq!(sink.received.load(Ordering::SeqCst), 0);

        assert_eq!(pipeline.flush().await, 2);
        assert_eq!(sink.received.load(Ordering::SeqCst), 2);
        assert_eq!(pipeline.flush().await, 0);
    }
}

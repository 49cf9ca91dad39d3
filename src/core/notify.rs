use crate::core::render::Escaped;
use crate::domain::model::Severity;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastTiming {
    /// How long a toast stays fully visible.
    pub display: Duration,
    /// Length of the fade-out before removal.
    pub fade: Duration,
}

impl Default for ToastTiming {
    fn default() -> Self {
        Self {
            display: Duration::from_millis(4000),
            fade: Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    Visible,
    FadingOut,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub phase: ToastPhase,
}

impl Toast {
    pub fn render(&self) -> String {
        format!(
            r#"<div class="notification notification-{sev}" style="background: {color};"><div class="notification-content"><i class="fas fa-{icon}"></i><span>{msg}</span></div></div>"#,
            sev = self.severity.as_str(),
            color = self.severity.color(),
            icon = self.severity.icon(),
            msg = Escaped(&self.message),
        )
    }
}

#[derive(Debug, Default)]
struct Slot {
    current: Option<Toast>,
    next_id: u64,
}

/// Single-slot toast emitter. Showing a toast replaces whatever is on screen;
/// there is no queue.
///
/// Inside a tokio runtime each toast schedules its own dismissal, and that
/// timer only ever touches the toast it was started for.
#[derive(Debug, Clone)]
pub struct Notifier {
    slot: Arc<Mutex<Slot>>,
    timing: ToastTiming,
}

impl Notifier {
    pub fn new(timing: ToastTiming) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            timing,
        }
    }

    pub fn notify(&self, message: impl Into<String>, severity: Severity) -> u64 {
        let message = message.into();

        match severity {
            Severity::Error | Severity::Warning => {
                tracing::warn!("🔔 [{}] {}", severity.as_str(), message)
            }
            Severity::Info | Severity::Success => {
                tracing::info!("🔔 [{}] {}", severity.as_str(), message)
            }
        }

        let id = {
            let mut slot = self.lock();
            slot.next_id += 1;
            let id = slot.next_id;
            if let Some(previous) = slot.current.take() {
                tracing::debug!("Removing notification #{} before showing #{}", previous.id, id);
            }
            slot.current = Some(Toast {
                id,
                message,
                severity,
                phase: ToastPhase::Visible,
            });
            id
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let notifier = self.clone();
                handle.spawn(async move { notifier.dismiss_later(id).await });
            }
            Err(_) => tracing::debug!("No runtime, notification #{} stays until replaced", id),
        }

        id
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.notify(message, Severity::Info)
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.notify(message, Severity::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.notify(message, Severity::Error)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.notify(message, Severity::Warning)
    }

    /// The toast on screen, if any.
    pub fn current(&self) -> Option<Toast> {
        self.lock().current.clone()
    }

    pub fn is_visible(&self) -> bool {
        self.lock().current.is_some()
    }

    pub fn clear(&self) {
        self.lock().current = None;
    }

    pub fn timing(&self) -> ToastTiming {
        self.timing
    }

    async fn dismiss_later(&self, id: u64) {
        tokio::time::sleep(self.timing.display).await;
        {
            let mut slot = self.lock();
            match slot.current.as_mut() {
                Some(toast) if toast.id == id => toast.phase = ToastPhase::FadingOut,
                _ => return,
            }
        }

        tokio::time::sleep(self.timing.fade).await;
        let mut slot = self.lock();
        if slot.current.as_ref().is_some_and(|toast| toast.id == id) {
            slot.current = None;
            tracing::debug!("Notification #{} dismissed", id);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(ToastTiming::default())
    }
}

//! Status line and toast queue for the list view.

use super::SubscriptionListView;
use std::time::{Duration, Instant};
use subtrack_core::preferences::PreferenceStore;

pub const STATUS_TTL: Duration = Duration::from_secs(5);
pub const TOAST_TTL: Duration = Duration::from_secs(4);
pub const TOAST_LIMIT: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub expires_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastMessage {
    pub text: String,
    pub expires_at: Instant,
}

impl<S: PreferenceStore> SubscriptionListView<S> {
    /// Current status line, if it has not expired.
    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status.as_ref().map(|status| status.text.as_str())
    }

    pub fn toasts(&self) -> impl Iterator<Item = &ToastMessage> {
        self.toasts.iter()
    }

    /// Replace the status line. A message that differs from the live one is
    /// also queued as a toast; repeating the live message only extends it.
    pub(super) fn set_status(&mut self, text: impl Into<String>) {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return;
        }
        let expires_at = Instant::now() + STATUS_TTL;
        if let Some(status) = self.status.as_mut().filter(|status| status.text == text) {
            status.expires_at = expires_at;
            return;
        }
        self.push_toast(&text);
        self.status = Some(StatusMessage { text, expires_at });
    }

    /// Queue a toast, moving an already queued copy to the back instead of
    /// stacking duplicates.
    fn push_toast(&mut self, text: &str) {
        self.toasts.retain(|toast| toast.text != text);
        if self.toasts.len() == TOAST_LIMIT {
            self.toasts.pop_front();
        }
        self.toasts.push_back(ToastMessage {
            text: text.to_string(),
            expires_at: Instant::now() + TOAST_TTL,
        });
    }

    /// Drop the status line and toasts that expired before `now`.
    pub fn expire_feedback(&mut self, now: Instant) {
        if self
            .status
            .as_ref()
            .is_some_and(|status| status.expires_at <= now)
        {
            self.status = None;
        }
        self.toasts.retain(|toast| toast.expires_at > now);
    }
}

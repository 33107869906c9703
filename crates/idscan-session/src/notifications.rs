//! Transient operator notifications.
//!
//! Each [`NotificationKind`] is an independent slot with its own timer.
//! Kinds coexist freely; showing a kind that is already visible overwrites
//! its message and restarts its timer. A per-slot generation keeps an older
//! timer from clearing a newer message.

use idscan_core::NotificationConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Kind of a transient notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    /// Upload succeeded
    Success,
    /// Upload failed
    Error,
    /// Backend's validation message for a failed upload
    ValidationError,
    /// Record deleted
    DeletionConfirmed,
}

impl NotificationKind {
    /// Every kind, in display order.
    pub const ALL: [NotificationKind; 4] = [
        Self::Success,
        Self::Error,
        Self::ValidationError,
        Self::DeletionConfirmed,
    ];

    /// Stable lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::ValidationError => "validationError",
            Self::DeletionConfirmed => "deletionConfirmed",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            "validationerror" | "validation" => Ok(Self::ValidationError),
            "deletionconfirmed" | "deletion" => Ok(Self::DeletionConfirmed),
            other => Err(format!("unknown notification kind '{other}'")),
        }
    }
}

/// Configured lifetime of each notification kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationLifetimes {
    /// Upload succeeded
    pub success: Duration,
    /// Upload failed
    pub error: Duration,
    /// Backend validation message
    pub validation_error: Duration,
    /// Record deleted
    pub deletion_confirmed: Duration,
}

impl NotificationLifetimes {
    /// Lifetime for `kind`.
    #[must_use]
    pub fn for_kind(&self, kind: NotificationKind) -> Duration {
        match kind {
            NotificationKind::Success => self.success,
            NotificationKind::Error => self.error,
            NotificationKind::ValidationError => self.validation_error,
            NotificationKind::DeletionConfirmed => self.deletion_confirmed,
        }
    }
}

impl Default for NotificationLifetimes {
    fn default() -> Self {
        Self::from(&NotificationConfig::default())
    }
}

impl From<&NotificationConfig> for NotificationLifetimes {
    fn from(config: &NotificationConfig) -> Self {
        Self {
            success: config.success(),
            error: config.error(),
            validation_error: config.validation_error(),
            deletion_confirmed: config.deletion(),
        }
    }
}

/// A visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Kind (and slot) of the notification
    pub kind: NotificationKind,
    /// Text shown to the operator
    pub message: String,
    /// When the notification clears itself
    pub expires_at: Instant,
}

#[derive(Debug, Default)]
struct Slots {
    active: BTreeMap<NotificationKind, (u64, Notification)>,
    next_generation: u64,
}

/// Shared handle to the notification slots. Clones share state.
#[derive(Clone, Debug)]
pub struct NotificationCenter {
    slots: Arc<Mutex<Slots>>,
    lifetimes: NotificationLifetimes,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(NotificationLifetimes::default())
    }
}

impl NotificationCenter {
    /// Create a notification center with the given lifetimes.
    #[must_use]
    pub fn new(lifetimes: NotificationLifetimes) -> Self {
        Self {
            slots: Arc::new(Mutex::new(Slots::default())),
            lifetimes,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Configured lifetimes.
    #[must_use]
    pub fn lifetimes(&self) -> NotificationLifetimes {
        self.lifetimes
    }

    /// Show `message` in the `kind` slot and start its expiry timer.
    ///
    /// The timer runs on the current Tokio runtime. Outside a runtime the
    /// notification stays until dismissed.
    pub fn show(&self, kind: NotificationKind, message: impl Into<String>) {
        let lifetime = self.lifetimes.for_kind(kind);
        let expires_at = Instant::now() + lifetime;
        let notification = Notification {
            kind,
            message: message.into(),
            expires_at,
        };

        let generation = {
            let mut slots = self.lock();
            slots.next_generation += 1;
            let generation = slots.next_generation;
            debug!(%kind, message = %notification.message, "showing notification");
            slots.active.insert(kind, (generation, notification));
            generation
        };

        match Handle::try_current() {
            Ok(handle) => {
                let slots = Arc::clone(&self.slots);
                handle.spawn(async move {
                    tokio::time::sleep_until(expires_at).await;
                    let mut slots = slots.lock().unwrap_or_else(PoisonError::into_inner);
                    if slots.active.get(&kind).is_some_and(|(g, _)| *g == generation) {
                        slots.active.remove(&kind);
                        debug!(%kind, "notification expired");
                    }
                });
            }
            Err(_) => warn!(%kind, "no async runtime, notification will not expire"),
        }
    }

    /// Clear the `kind` slot immediately. Returns whether it was visible.
    pub fn dismiss(&self, kind: NotificationKind) -> bool {
        self.lock().active.remove(&kind).is_some()
    }

    /// The notification currently in the `kind` slot.
    #[must_use]
    pub fn current(&self, kind: NotificationKind) -> Option<Notification> {
        self.lock().active.get(&kind).map(|(_, n)| n.clone())
    }

    /// Whether the `kind` slot is occupied.
    #[must_use]
    pub fn is_visible(&self, kind: NotificationKind) -> bool {
        self.lock().active.contains_key(&kind)
    }

    /// Every visible notification, ordered by kind.
    #[must_use]
    pub fn active(&self) -> Vec<Notification> {
        self.lock().active.values().map(|(_, n)| n.clone()).collect()
    }
}

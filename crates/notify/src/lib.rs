//! Lager notify: transient notifications with time-to-live expiry.
//!
//! `NotificationQueue` is the plain FIFO container: enqueue on mutation
//! outcomes, dismiss by id, sweep expired entries. `spawn_notifier` wraps it
//! in the usual command-loop shape: an mpsc of commands, a ticker that
//! sweeps deadlines, and an `ArcSwap` snapshot for readers. Expiry after a
//! manual dismiss is a no-op by construction; there is no per-toast timer
//! to leak when the loop is torn down.

#![forbid(unsafe_code)]

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

/// Reference TTL: toasts live for five seconds unless dismissed.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

/// How often the notifier loop checks deadlines.
const SWEEP_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub created: Instant,
    pub deadline: Instant,
}

/// FIFO queue of live notifications. Display order (newest-first or not)
/// is a presentation decision; the queue only keeps creation order.
pub struct NotificationQueue {
    entries: Vec<Notification>,
    ttl: Duration,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(default_ttl())
    }
}

impl NotificationQueue {
    pub fn new(ttl: Duration) -> Self {
        Self { entries: Vec::new(), ttl }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    /// Append with a fresh id and the creation timestamp `now`.
    pub fn enqueue(
        &mut self,
        severity: Severity,
        title: impl Into<String>,
        message: impl Into<String>,
        now: Instant,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.entries.push(Notification {
            id,
            severity,
            title: title.into(),
            message: message.into(),
            created: now,
            deadline: now + self.ttl,
        });
        metrics::gauge!("notifications_live", self.entries.len() as f64);
        id
    }

    /// Remove one entry by id; unknown ids are a no-op.
    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|n| n.id != id);
        let removed = self.entries.len() != before;
        if !removed {
            debug!(%id, "dismiss: unknown id, ignored");
        }
        metrics::gauge!("notifications_live", self.entries.len() as f64);
        removed
    }

    /// Drop entries whose deadline has passed. Returns how many expired.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|n| n.deadline > now);
        let expired = before - self.entries.len();
        if expired > 0 {
            debug!(expired, remaining = self.entries.len(), "notify: swept expired");
        }
        metrics::gauge!("notifications_live", self.entries.len() as f64);
        expired
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        metrics::gauge!("notifications_live", 0.0);
    }
}

/// TTL from LAGER_TOAST_TTL_MS, defaulting to five seconds.
pub fn default_ttl() -> Duration {
    std::env::var("LAGER_TOAST_TTL_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_TTL)
}

#[derive(Debug)]
pub enum NotifyCmd {
    Push { severity: Severity, title: String, message: String },
    Dismiss(Uuid),
    Clear,
}

/// Handle for producers and readers of the spawned notifier loop.
#[derive(Clone)]
pub struct NotifierHandle {
    tx: mpsc::Sender<NotifyCmd>,
    snap: Arc<ArcSwap<Vec<Notification>>>,
}

impl NotifierHandle {
    pub fn notify(&self, severity: Severity, title: impl Into<String>, message: impl Into<String>) {
        let _ = self.tx.try_send(NotifyCmd::Push {
            severity,
            title: title.into(),
            message: message.into(),
        });
    }

    pub fn dismiss(&self, id: Uuid) {
        let _ = self.tx.try_send(NotifyCmd::Dismiss(id));
    }

    pub fn current(&self) -> Arc<Vec<Notification>> {
        self.snap.load_full()
    }
}

/// Spawn the notifier loop: applies commands, sweeps deadlines on a ticker,
/// and swaps a fresh snapshot after every visible change. Dropping all
/// handles tears the loop down; nothing fires afterwards.
pub fn spawn_notifier(ttl: Duration, cap: usize) -> NotifierHandle {
    let (tx, mut rx) = mpsc::channel::<NotifyCmd>(cap);
    let snap = Arc::new(ArcSwap::from_pointee(Vec::<Notification>::new()));
    let snap_clone = Arc::clone(&snap);

    tokio::spawn(async move {
        let mut queue = NotificationQueue::new(ttl);
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            tokio::select! {
                maybe = rx.recv() => {
                    match maybe {
                        Some(NotifyCmd::Push { severity, title, message }) => {
                            queue.enqueue(severity, title, message, Instant::now());
                            snap_clone.store(Arc::new(queue.iter().cloned().collect()));
                        }
                        Some(NotifyCmd::Dismiss(id)) => {
                            queue.dismiss(id);
                            snap_clone.store(Arc::new(queue.iter().cloned().collect()));
                        }
                        Some(NotifyCmd::Clear) => {
                            queue.clear();
                            snap_clone.store(Arc::new(Vec::new()));
                        }
                        None => break,
                    }
                }
                _ = ticker.tick() => {
                    if queue.sweep(Instant::now()) > 0 {
                        snap_clone.store(Arc::new(queue.iter().cloned().collect()));
                    }
                }
            }
        }
        info!("notifier loop stopped");
    });

    NotifierHandle { tx, snap }
}

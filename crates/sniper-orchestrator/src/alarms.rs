//! Named one-shot alarms.
//!
//! Each alarm kind has at most one pending instance. Setting an alarm clears
//! the previous one of the same kind. A fired alarm is delivered to the
//! orchestrator as a [`Command::Alarm`] carrying a sequence number, so a
//! firing that raced with a later `set` or `clear` is recognized as stale.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::handle::Command;

/// The two alarm kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlarmKind {
    /// Starts a scheduled (sniper) run.
    Schedule,
    /// Ends a pause.
    Resume,
}

impl AlarmKind {
    pub fn name(&self) -> &'static str {
        match self {
            AlarmKind::Schedule => "schedule",
            AlarmKind::Resume => "resume",
        }
    }
}

impl fmt::Display for AlarmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

struct PendingAlarm {
    seq: u64,
    at: DateTime<Utc>,
    handle: JoinHandle<()>,
}

/// Pending alarms, owned by the orchestrator.
pub struct Alarms {
    tx: UnboundedSender<Command>,
    pending: HashMap<AlarmKind, PendingAlarm>,
    next_seq: u64,
}

impl Alarms {
    pub fn new(tx: UnboundedSender<Command>) -> Self {
        Self {
            tx,
            pending: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Arm `kind` to fire after `delay`, replacing any pending alarm of that kind.
    pub fn set(&mut self, kind: AlarmKind, at: DateTime<Utc>, delay: Duration) {
        self.clear(kind);

        self.next_seq += 1;
        let seq = self.next_seq;
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Command::Alarm { kind, seq });
        });

        debug!(alarm = %kind, %at, "Alarm armed");
        self.pending.insert(kind, PendingAlarm { seq, at, handle });
    }

    /// Disarm `kind`. No-op if nothing is pending.
    pub fn clear(&mut self, kind: AlarmKind) {
        if let Some(alarm) = self.pending.remove(&kind) {
            alarm.handle.abort();
            debug!(alarm = %kind, "Alarm cleared");
        }
    }

    pub fn clear_all(&mut self) {
        self.clear(AlarmKind::Schedule);
        self.clear(AlarmKind::Resume);
    }

    /// Accept a firing. Returns `false` for a stale or unknown firing.
    pub fn fired(&mut self, kind: AlarmKind, seq: u64) -> bool {
        match self.pending.get(&kind) {
            Some(alarm) if alarm.seq == seq => {
                self.pending.remove(&kind);
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self, kind: AlarmKind) -> bool {
        self.pending.contains_key(&kind)
    }

    /// When the pending alarm of `kind` is due.
    pub fn deadline(&self, kind: AlarmKind) -> Option<DateTime<Utc>> {
        self.pending.get(&kind).map(|a| a.at)
    }
}

impl Drop for Alarms {
    fn drop(&mut self) {
        for alarm in self.pending.values() {
            alarm.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn test_alarm_fires_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut alarms = Alarms::new(tx);
        alarms.set(AlarmKind::Resume, Utc::now(), Duration::from_secs(60));
        assert!(alarms.is_pending(AlarmKind::Resume));

        let Some(Command::Alarm { kind, seq }) = rx.recv().await else {
            panic!("expected alarm");
        };
        assert_eq!(kind, AlarmKind::Resume);
        assert!(alarms.fired(kind, seq));
        assert!(!alarms.is_pending(AlarmKind::Resume));
        assert!(!alarms.fired(kind, seq));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_replaces_pending_alarm() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut alarms = Alarms::new(tx);
        alarms.set(AlarmKind::Schedule, Utc::now(), Duration::from_secs(10));
        alarms.set(AlarmKind::Schedule, Utc::now(), Duration::from_secs(20));

        let Some(Command::Alarm { kind, seq }) = rx.recv().await else {
            panic!("expected alarm");
        };
        assert!(alarms.fired(kind, seq));
        assert_eq!(seq, 2);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleared_alarm_never_fires() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut alarms = Alarms::new(tx);
        alarms.set(AlarmKind::Resume, Utc::now(), Duration::from_secs(5));
        alarms.clear_all();
        assert!(alarms.deadline(AlarmKind::Resume).is_none());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_firing_is_rejected() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut alarms = Alarms::new(tx);
        alarms.set(AlarmKind::Resume, Utc::now(), Duration::from_secs(5));
        alarms.set(AlarmKind::Resume, Utc::now(), Duration::from_secs(5));
        assert!(!alarms.fired(AlarmKind::Resume, 1));
        assert!(alarms.fired(AlarmKind::Resume, 2));
    }
}

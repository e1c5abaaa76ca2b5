//! Temporary zoom controller
//!
//! Two independent trigger sources magnify the preview while they are
//! active: a pointer click (held for a fixed time, then reverted by a
//! single-shot timer) and a held key (reverted on release). The view stays
//! zoomed while *any* trigger is active, so releasing a key never cuts a
//! pending click short and vice versa.

use crate::timeline::CursorPosition;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Keys that hold a temporary zoom while pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKey {
    Z,
    Space,
}

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ZoomPhase {
    Idle,
    TemporarilyZoomed,
}

/// What the preview should render
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomView {
    pub phase: ZoomPhase,
    pub focus: CursorPosition,
}

#[derive(Debug, Default)]
struct ActiveTriggers {
    keys: BTreeSet<TriggerKey>,
    /// Generation of the click currently holding the zoom
    click: Option<u64>,
    focus: CursorPosition,
}

impl ActiveTriggers {
    fn phase(&self) -> ZoomPhase {
        if self.keys.is_empty() && self.click.is_none() {
            ZoomPhase::Idle
        } else {
            ZoomPhase::TemporarilyZoomed
        }
    }

    fn view(&self) -> ZoomView {
        ZoomView {
            phase: self.phase(),
            focus: self.focus,
        }
    }
}

struct Shared {
    triggers: Mutex<ActiveTriggers>,
    view_tx: watch::Sender<ZoomView>,
}

impl Shared {
    fn publish(&self, triggers: &ActiveTriggers) {
        self.view_tx.send_if_modified(|view| {
            let next = triggers.view();
            if *view == next {
                false
            } else {
                *view = next;
                true
            }
        });
    }
}

/// Cancelable single-shot task that releases one click trigger
pub struct RevertTimer {
    generation: u64,
    deadline: Instant,
    handle: JoinHandle<()>,
}

impl RevertTimer {
    fn schedule(shared: Arc<Shared>, generation: u64, hold: Duration) -> Self {
        let deadline = Instant::now() + hold;
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let mut triggers = shared.triggers.lock();
            // A newer click may have re-armed the zoom in the meantime
            if triggers.click == Some(generation) {
                triggers.click = None;
                tracing::debug!("Click zoom {} expired", generation);
                shared.publish(&triggers);
            }
        });

        Self {
            generation,
            deadline,
            handle,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for RevertTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Tracks active temporary-zoom triggers and the pending click revert
pub struct TemporaryZoom {
    shared: Arc<Shared>,
    revert: Option<RevertTimer>,
    generation: u64,
    level: f64,
    hold: Duration,
}

impl TemporaryZoom {
    pub fn new(level: f64, hold: Duration) -> Self {
        let (view_tx, _) = watch::channel(ActiveTriggers::default().view());
        Self {
            shared: Arc::new(Shared {
                triggers: Mutex::new(ActiveTriggers::default()),
                view_tx,
            }),
            revert: None,
            generation: 0,
            level: level.max(1.0),
            hold,
        }
    }

    /// Multiplier applied while zoomed
    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn hold(&self) -> Duration {
        self.hold
    }

    /// Pointer trigger: zoom on `at` and (re)arm the revert timer.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn click(&mut self, at: CursorPosition) {
        self.generation += 1;
        let generation = self.generation;

        {
            let mut triggers = self.shared.triggers.lock();
            triggers.click = Some(generation);
            triggers.focus = at;
            self.shared.publish(&triggers);
        }

        // Only one revert may be pending; the previous one is aborted
        if let Some(previous) = self.revert.take() {
            previous.cancel();
        }
        self.revert = Some(RevertTimer::schedule(
            Arc::clone(&self.shared),
            generation,
            self.hold,
        ));
    }

    /// Key trigger pressed. Returns false for auto-repeat of a held key.
    pub fn key_down(&mut self, key: TriggerKey, at: CursorPosition) -> bool {
        let mut triggers = self.shared.triggers.lock();
        let was_idle = triggers.phase() == ZoomPhase::Idle;
        let inserted = triggers.keys.insert(key);
        if inserted && was_idle {
            triggers.focus = at;
        }
        self.shared.publish(&triggers);
        inserted
    }

    /// Key trigger released. Returns false if the key was not held.
    pub fn key_up(&mut self, key: TriggerKey) -> bool {
        let mut triggers = self.shared.triggers.lock();
        let removed = triggers.keys.remove(&key);
        self.shared.publish(&triggers);
        removed
    }

    /// Drop every trigger and any pending revert
    pub fn clear(&mut self) {
        if let Some(timer) = self.revert.take() {
            timer.cancel();
        }
        let mut triggers = self.shared.triggers.lock();
        triggers.keys.clear();
        triggers.click = None;
        self.shared.publish(&triggers);
    }

    pub fn phase(&self) -> ZoomPhase {
        self.shared.triggers.lock().phase()
    }

    pub fn is_active(&self) -> bool {
        self.phase() == ZoomPhase::TemporarilyZoomed
    }

    pub fn view(&self) -> ZoomView {
        self.shared.triggers.lock().view()
    }

    /// The pending revert, if a click is still holding the zoom
    pub fn pending_revert(&self) -> Option<&RevertTimer> {
        self.revert.as_ref().filter(|timer| !timer.is_finished())
    }

    /// Watch phase/focus changes, including timer-driven reverts
    pub fn subscribe(&self) -> watch::Receiver<ZoomView> {
        self.shared.view_tx.subscribe()
    }
}

impl Default for TemporaryZoom {
    fn default() -> Self {
        Self::new(2.0, Duration::from_millis(1000))
    }
}

//! Frame observer registration.
//!
//! The pipeline supports a single observer at a time, registered explicitly
//! and held through a non-owning reference. The returned subscription handle
//! unregisters on drop, so an observer can never outlive its registration.

use std::sync::{Arc, Mutex, Weak};

use pixelpick_common::error::{PixelpickError, PixelpickResult};
use pixelpick_platform_core::Bitmap;

/// One decoded frame as handed to the observer.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    /// Per-stream production counter.
    pub sequence: u64,
    /// Nanoseconds since the stream's capture clock epoch.
    pub timestamp_ns: u64,
    pub bitmap: Bitmap,
}

/// Receives decoded frames. Invoked on the UI dispatcher, one call per
/// successfully decoded frame, in production order.
pub trait FrameObserver: Send + Sync {
    fn frame_ready(&self, frame: CapturedFrame);
}

struct Registered {
    token: u64,
    observer: Weak<dyn FrameObserver>,
}

/// Single-slot registry holding a weak observer reference.
pub struct ObserverRegistry {
    slot: Mutex<Option<Registered>>,
    next_token: Mutex<u64>,
}

impl ObserverRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            slot: Mutex::new(None),
            next_token: Mutex::new(0),
        })
    }

    /// Register an observer. Fails while another live observer holds the
    /// slot; a slot whose observer was dropped is reclaimed.
    pub fn subscribe(
        registry: &Arc<Self>,
        observer: Arc<dyn FrameObserver>,
    ) -> PixelpickResult<FrameSubscription> {
        let mut slot = registry.slot.lock().unwrap();
        if let Some(existing) = slot.as_ref() {
            if existing.observer.strong_count() > 0 {
                return Err(PixelpickError::ObserverAlreadyRegistered);
            }
        }

        let token = {
            let mut next = registry.next_token.lock().unwrap();
            *next += 1;
            *next
        };
        *slot = Some(Registered {
            token,
            observer: Arc::downgrade(&observer),
        });

        Ok(FrameSubscription {
            registry: Arc::downgrade(registry),
            token,
        })
    }

    /// Remove a registration by token. Returns whether anything was removed.
    pub(crate) fn unsubscribe(&self, token: u64) -> bool {
        let mut slot = self.slot.lock().unwrap();
        match slot.as_ref() {
            Some(registered) if registered.token == token => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    /// Deliver a frame to the registered observer, if it is still alive.
    /// Returns whether an observer was invoked.
    pub(crate) fn notify(&self, frame: CapturedFrame) -> bool {
        let observer = {
            let mut slot = self.slot.lock().unwrap();
            match slot.as_ref().and_then(|r| r.observer.upgrade()) {
                Some(observer) => Some(observer),
                None => {
                    // Reclaim a dead registration.
                    if slot.is_some() {
                        *slot = None;
                    }
                    None
                }
            }
        };

        match observer {
            Some(observer) => {
                observer.frame_ready(frame);
                true
            }
            None => false,
        }
    }
}

/// Handle returned by [`ObserverRegistry::subscribe`]; dropping it
/// unregisters the observer.
#[derive(Debug)]
pub struct FrameSubscription {
    registry: Weak<ObserverRegistry>,
    token: u64,
}

impl FrameSubscription {
    /// Unregister now instead of at drop time.
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for FrameSubscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.unsubscribe(self.token);
        }
    }
}

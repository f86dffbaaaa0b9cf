//! Background timer servicing.
//!
//! The engine's debounce timers only fire when something calls
//! [`Engine::tick`]. Event loops that already have a timer facility should
//! call it themselves; everyone else can spawn a [`TimerDriver`].

use crate::cloner::StateCloner;
use crate::engine::Engine;
use crate::host::HostStore;
use crossbeam_channel::{bounded, select, tick, Sender};
use std::sync::Weak;
use std::thread::JoinHandle;
use std::time::Duration;

/// Something with timers to expire.
pub(crate) trait TimerTarget: Send + Sync {
    /// Fire due timers. `None` once the target is gone for good.
    fn fire_due(&self) -> Option<bool>;
}

/// A thread that ticks an engine at a fixed interval.
///
/// Stops when dropped, when [`TimerDriver::stop`] is called, or when the
/// engine is destroyed or dropped.
pub struct TimerDriver {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TimerDriver {
    pub fn spawn<H, C>(engine: &Engine<H, C>, interval: Duration) -> Self
    where
        H: HostStore,
        H::State: Clone + PartialEq,
        C: StateCloner<H::State> + 'static,
    {
        Self::spawn_for(engine.timer_target(), interval)
    }

    fn spawn_for(target: Weak<dyn TimerTarget>, interval: Duration) -> Self {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let ticker = tick(interval);

        let handle = std::thread::spawn(move || loop {
            select! {
                recv(stop_rx) -> _ => break,
                recv(ticker) -> _ => {
                    let Some(target) = target.upgrade() else { break };
                    if target.fire_due().is_none() {
                        break;
                    }
                }
            }
        });

        Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Whether the driver thread is still running.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the thread and wait for it.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Disconnecting the channel wakes the select.
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

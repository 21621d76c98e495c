//! Dedicated OS-thread hotkey listener using `rdev::listen`.
//!
//! `rdev::listen` has no graceful shutdown API.  Dropping the
//! [`HotkeyListener`] sets a stop flag so the callback ignores further
//! events, but the OS thread itself stays blocked in the rdev event loop
//! until the process exits.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::channel::CoordinatorHandle;

/// Handle to a running hotkey listener thread.  Drop it to stop forwarding.
pub struct HotkeyListener {
    stop: Arc<AtomicBool>,
    /// Never joined: `rdev::listen` does not return.
    _thread: std::thread::JoinHandle<()>,
}

impl HotkeyListener {
    /// Spawn the listener thread.  Each press of `key` sends one trigger
    /// pulse through `coordinator`.
    ///
    /// The coordinator inbox is unbounded, so sending never blocks the OS
    /// event callback.
    pub fn start(key: rdev::Key, coordinator: CoordinatorHandle) -> std::io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let thread = std::thread::Builder::new()
            .name("hotkey-listener".into())
            .spawn(move || {
                let result = rdev::listen(move |event| {
                    if stop_flag.load(Ordering::Relaxed) || !is_trigger(&event.event_type, key) {
                        return;
                    }
                    if coordinator.trigger_pulse().is_err() {
                        log::debug!("hotkey: coordinator gone, pulse dropped");
                    }
                });

                if let Err(e) = result {
                    log::error!("hotkey: rdev::listen exited with error: {:?}", e);
                }
            })?;

        log::info!("hotkey: listening for {:?}", key);
        Ok(Self {
            stop,
            _thread: thread,
        })
    }
}

impl Drop for HotkeyListener {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

/// A press (including OS auto-repeat) of `key`.
fn is_trigger(event: &rdev::EventType, key: rdev::Key) -> bool {
    matches!(event, rdev::EventType::KeyPress(k) if *k == key)
}

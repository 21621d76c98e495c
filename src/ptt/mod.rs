//! Push-to-talk window: trigger pulses in, paired synthetic key events out.
//!
//! * [`PttWindow`]: the per-page Idle/Active state machine.
//! * [`WindowTimer`]: the cancellable timer it arms.
//! * [`KeySink`]: where the synthetic key-down / key-up events go.

pub mod sink;
pub mod timer;
pub mod window;

pub use sink::{DispatchError, KeyDirection, KeySink};
pub use timer::WindowTimer;
pub use window::{PttWindow, WindowState};

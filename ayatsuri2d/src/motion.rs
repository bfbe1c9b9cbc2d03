pub mod blink;
pub mod breath;

pub use blink::{BlinkPhase, BlinkTiming, EyeBlink};
pub use breath::{Breath, BreathChannel};

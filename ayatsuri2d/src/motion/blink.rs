use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkPhase {
	Idle,
	Closing,
	Closed,
	Opening,
}

#[derive(Debug, Clone, Copy)]
pub struct BlinkTiming {
	/// Mean seconds between blinks. The actual interval is redrawn each
	/// cycle, uniform over `[0.5, 1.5] × mean`.
	pub mean_interval: f32,
	pub closing: f32,
	pub closed: f32,
	pub opening: f32,
}

impl Default for BlinkTiming {
	fn default() -> Self {
		Self {
			mean_interval: 4.0,
			closing: 0.1,
			closed: 0.05,
			opening: 0.15,
		}
	}
}

/// Periodic eye blink state machine.
pub struct EyeBlink {
	timing: BlinkTiming,
	phase: BlinkPhase,
	elapsed: f32,
	next_blink: f32,
	rng: SmallRng,
}

impl EyeBlink {
	pub fn new(timing: BlinkTiming) -> Self {
		Self::with_rng(timing, SmallRng::from_os_rng())
	}

	pub fn with_rng(timing: BlinkTiming, mut rng: SmallRng) -> Self {
		let next_blink = draw_interval(&mut rng, timing.mean_interval);
		Self {
			timing,
			phase: BlinkPhase::Idle,
			elapsed: 0.0,
			next_blink,
			rng,
		}
	}

	pub fn phase(&self) -> BlinkPhase {
		self.phase
	}

	/// Advance by `dt` seconds and return eye openness in `[0, 1]`, 1 = open.
	pub fn advance(&mut self, dt: f32) -> f32 {
		self.elapsed += dt;

		match self.phase {
			BlinkPhase::Idle => {
				if self.elapsed >= self.next_blink {
					self.phase = BlinkPhase::Closing;
					self.elapsed = 0.0;
				}
				1.0
			}
			BlinkPhase::Closing => {
				if self.elapsed >= self.timing.closing {
					self.phase = BlinkPhase::Closed;
					self.elapsed = 0.0;
					0.0
				} else {
					1.0 - self.elapsed / self.timing.closing
				}
			}
			BlinkPhase::Closed => {
				if self.elapsed >= self.timing.closed {
					self.phase = BlinkPhase::Opening;
					self.elapsed = 0.0;
				}
				0.0
			}
			BlinkPhase::Opening => {
				if self.elapsed >= self.timing.opening {
					self.phase = BlinkPhase::Idle;
					self.elapsed = 0.0;
					self.next_blink = draw_interval(&mut self.rng, self.timing.mean_interval);
					1.0
				} else {
					self.elapsed / self.timing.opening
				}
			}
		}
	}
}

fn draw_interval(rng: &mut SmallRng, mean: f32) -> f32 {
	rng.random_range(0.5 * mean..1.5 * mean)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn blink() -> EyeBlink {
		EyeBlink::with_rng(BlinkTiming::default(), SmallRng::seed_from_u64(42))
	}

	#[test]
	fn openness_stays_in_unit_interval() {
		let mut blink = blink();
		for _ in 0..100_000 {
			let open = blink.advance(1.0 / 60.0);
			assert!((0.0..=1.0).contains(&open));
		}
	}

	#[test]
	fn cycles_through_all_phases() {
		let mut blink = blink();
		let mut seen = vec![blink.phase()];
		for _ in 0..10_000 {
			blink.advance(1.0 / 60.0);
			if *seen.last().unwrap() != blink.phase() {
				seen.push(blink.phase());
			}
		}
		let cycle = [
			BlinkPhase::Idle,
			BlinkPhase::Closing,
			BlinkPhase::Closed,
			BlinkPhase::Opening,
		];
		assert!(seen.len() >= 5);
		for (i, phase) in seen.iter().enumerate() {
			assert_eq!(*phase, cycle[i % 4]);
		}
	}

	#[test]
	fn closed_time_fraction_tracks_timing() {
		let timing = BlinkTiming::default();
		let mut blink = blink();

		let dt = 1.0 / 60.0;
		let ticks = (4000.0 / dt) as usize;
		let mut closed = 0_usize;
		for _ in 0..ticks {
			blink.advance(dt);
			if blink.phase() == BlinkPhase::Closed {
				closed += 1;
			}
		}

		let fraction = closed as f32 / ticks as f32;
		let expected = timing.closed / timing.mean_interval;
		assert!(
			(fraction - expected).abs() < expected * 0.5,
			"closed fraction {fraction}, expected about {expected}"
		);
	}
}

use std::f32::consts::TAU;

/// One sinusoidal breathing channel, blended additively into its parameter.
#[derive(Debug, Clone)]
pub struct BreathChannel {
	pub param: String,
	pub offset: f32,
	pub peak: f32,
	pub cycle: f32,
	pub weight: f32,
}

impl BreathChannel {
	pub fn new(param: &str, offset: f32, peak: f32, cycle: f32, weight: f32) -> Self {
		Self {
			param: param.to_owned(),
			offset,
			peak,
			cycle,
			weight,
		}
	}

	/// Unweighted channel value at time `t`.
	pub fn value(&self, t: f32) -> f32 {
		self.offset + self.peak * (TAU * t / self.cycle).sin()
	}
}

/// Multi-channel breathing generator.
pub struct Breath {
	channels: Vec<BreathChannel>,
	t: f32,
}

impl Breath {
	pub fn new(channels: Vec<BreathChannel>) -> Self {
		Self { channels, t: 0.0 }
	}

	/// The stock channel set: slow drift on the head and body axes plus the
	/// dedicated breath parameter.
	pub fn default_channels() -> Vec<BreathChannel> {
		vec![
			BreathChannel::new("ParamAngleX", 0.0, 15.0, 6.5345, 0.5),
			BreathChannel::new("ParamAngleY", 0.0, 8.0, 3.5345, 0.5),
			BreathChannel::new("ParamAngleZ", 0.0, 10.0, 5.5345, 0.5),
			BreathChannel::new("ParamBodyAngleX", 0.0, 4.0, 15.5345, 0.5),
			BreathChannel::new("ParamBreath", 0.5, 0.5, 3.2345, 0.5),
		]
	}

	pub fn channels(&self) -> &[BreathChannel] {
		&self.channels
	}

	pub fn retain(&mut self, keep: impl FnMut(&BreathChannel) -> bool) {
		self.channels.retain(keep);
	}

	/// Advance by `dt` and yield `(param, weighted additive offset)` pairs.
	pub fn advance(&mut self, dt: f32) -> impl Iterator<Item = (&str, f32)> + '_ {
		self.t += dt;
		let t = self.t;
		self.channels
			.iter()
			.map(move |c| (c.param.as_str(), c.value(t) * c.weight))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn channel_is_periodic() {
		let channel = BreathChannel::new("ParamBreath", 0.5, 0.5, 3.2345, 0.5);
		for i in 0..20 {
			let t = i as f32 * 0.37;
			assert!((channel.value(t) - channel.value(t + channel.cycle)).abs() < 1e-4);
		}
	}

	#[test]
	fn channel_stays_within_peak_around_offset() {
		let channel = BreathChannel::new("ParamBreath", 0.5, 0.5, 3.2345, 0.5);
		for i in 0..1000 {
			let v = channel.value(i as f32 * 0.01);
			assert!(v >= channel.offset - channel.peak - 1e-6);
			assert!(v <= channel.offset + channel.peak + 1e-6);
		}
	}

	#[test]
	fn advance_weights_every_channel() {
		let mut breath = Breath::new(vec![
			BreathChannel::new("A", 1.0, 0.0, 1.0, 0.5),
			BreathChannel::new("B", 2.0, 0.0, 1.0, 1.0),
		]);
		let out: Vec<_> = breath.advance(0.1).map(|(p, v)| (p.to_owned(), v)).collect();
		assert_eq!(out, vec![("A".to_owned(), 0.5), ("B".to_owned(), 2.0)]);
	}
}

use std::f32::consts::TAU;

use tracing::debug;

use crate::formats::physics::PhysicsSettings;
use crate::params::ParamSet;
use crate::rig::Rig;

/// Secondary-motion pass run after primary animation. Implementations consume
/// the current parameter snapshot and yield `(name, value)` pairs that the
/// caller sets on its parameter store.
pub trait PhysicsEvaluator {
	fn step(&mut self, params: &ParamSet, dt: f32) -> Vec<(String, f32)>;
}

/// Maximum single integration step, seconds. Larger frame deltas are split.
const MAX_STEP: f32 = 0.01;

#[derive(Debug, Clone, Copy, Default)]
struct SpringState {
	pos: f32,
	vel: f32,
}

struct SpringLink {
	input: String,
	input_weight: f32,
	output: String,
	output_scale: f32,
	/// Normalized stiffness, `(2π·frequency)²`.
	k: f32,
	/// Damping coefficient, critical at a damping setting of 1.
	c: f32,
	state: SpringState,
}

/// Scalar spring-damper per decoded physics link. Inputs are read normalized
/// to `[-1, 1]`; outputs settle toward `input × weight × scale`.
pub struct SpringPhysics {
	links: Vec<SpringLink>,
}

impl SpringPhysics {
	/// Builds evaluators for every link whose input and output parameters the
	/// rig actually has; others are skipped, not fatal.
	pub fn new(settings: &PhysicsSettings, rig: &Rig) -> Self {
		let mut links = Vec::with_capacity(settings.links.len());
		for link in &settings.links {
			if rig.param(&link.input).is_none() || rig.param(&link.output).is_none() {
				debug!(id = %link.id, "rig lacks a physics channel, link skipped");
				continue;
			}
			let ksqrt = TAU * link.frequency;
			links.push(SpringLink {
				input: link.input.clone(),
				input_weight: link.input_weight,
				output: link.output.clone(),
				output_scale: link.output_scale,
				k: ksqrt * ksqrt,
				c: link.damping * 2.0 * ksqrt,
				state: SpringState::default(),
			});
		}
		Self { links }
	}

	pub fn link_count(&self) -> usize {
		self.links.len()
	}
}

impl PhysicsEvaluator for SpringPhysics {
	fn step(&mut self, params: &ParamSet, dt: f32) -> Vec<(String, f32)> {
		let mut out = Vec::with_capacity(self.links.len());

		for link in &mut self.links {
			let target = match params.normalized(&link.input) {
				Some(v) => v * link.input_weight,
				None => continue,
			};

			let mut remaining = dt;
			while remaining > 0.0 {
				let h = remaining.min(MAX_STEP);
				link.state = rk4(link.state, target, link.k, link.c, h);
				remaining -= h;
			}

			out.push((link.output.clone(), link.state.pos * link.output_scale));
		}

		out
	}
}

fn derive(state: SpringState, target: f32, k: f32, c: f32) -> SpringState {
	SpringState {
		pos: state.vel,
		vel: k * (target - state.pos) - c * state.vel,
	}
}

fn rk4(state: SpringState, target: f32, k: f32, c: f32, h: f32) -> SpringState {
	let k1 = derive(state, target, k, c);
	let k2 = derive(euler(state, k1, h / 2.0), target, k, c);
	let k3 = derive(euler(state, k2, h / 2.0), target, k, c);
	let k4 = derive(euler(state, k3, h), target, k, c);

	let next = SpringState {
		pos: state.pos + h * (k1.pos + 2.0 * k2.pos + 2.0 * k3.pos + k4.pos) / 6.0,
		vel: state.vel + h * (k1.vel + 2.0 * k2.vel + 2.0 * k3.vel + k4.vel) / 6.0,
	};

	// Simulation failed, revert
	if next.pos.is_finite() && next.vel.is_finite() {
		next
	} else {
		state
	}
}

fn euler(state: SpringState, derivative: SpringState, h: f32) -> SpringState {
	SpringState {
		pos: state.pos + h * derivative.pos,
		vel: state.vel + h * derivative.vel,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::formats::moc::testdata::standard_moc;
	use crate::formats::moc::parse_moc;
	use crate::formats::physics::{PhysicsLink, PhysicsSettings};

	fn settings(input: &str, output: &str) -> PhysicsSettings {
		PhysicsSettings {
			links: vec![PhysicsLink {
				id: "TestLink".to_owned(),
				input: input.to_owned(),
				input_weight: 1.0,
				output: output.to_owned(),
				output_scale: 10.0,
				frequency: 1.5,
				damping: 1.0,
			}],
		}
	}

	#[test]
	fn spring_settles_on_scaled_input() {
		let rig = parse_moc(standard_moc().as_slice()).unwrap();
		let mut params = ParamSet::new(&rig);
		let mut physics = SpringPhysics::new(&settings("ParamAngleX", "ParamBodyAngleX"), &rig);
		assert_eq!(physics.link_count(), 1);

		// input held at the maximum, normalized 1.0
		params.set("ParamAngleX", 30.0).unwrap();
		let mut last = Vec::new();
		for _ in 0..300 {
			last = physics.step(&params, 1.0 / 60.0);
		}

		assert_eq!(last.len(), 1);
		assert_eq!(last[0].0, "ParamBodyAngleX");
		assert!((last[0].1 - 10.0).abs() < 0.1, "settled at {}", last[0].1);
	}

	#[test]
	fn spring_rests_at_neutral_input() {
		let rig = parse_moc(standard_moc().as_slice()).unwrap();
		let params = ParamSet::new(&rig);
		let mut physics = SpringPhysics::new(&settings("ParamAngleX", "ParamBodyAngleX"), &rig);

		for _ in 0..60 {
			let out = physics.step(&params, 1.0 / 60.0);
			assert!(out[0].1.abs() < 1e-3);
		}
	}

	#[test]
	fn links_to_missing_channels_are_skipped() {
		let rig = parse_moc(standard_moc().as_slice()).unwrap();
		let physics = SpringPhysics::new(&settings("ParamAngleX", "ParamHairFront"), &rig);
		assert_eq!(physics.link_count(), 0);
	}
}

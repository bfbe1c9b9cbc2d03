use std::f32::consts::TAU;

use glam::Vec2;
use tracing::debug;

use crate::motion::{BlinkTiming, Breath, BreathChannel, EyeBlink};
use crate::params::ParamSet;
use crate::rig::Rig;

pub const PARAM_ANGLE_X: &str = "ParamAngleX";
pub const PARAM_ANGLE_Y: &str = "ParamAngleY";
pub const PARAM_ANGLE_Z: &str = "ParamAngleZ";
pub const PARAM_BODY_ANGLE_X: &str = "ParamBodyAngleX";
pub const PARAM_BODY_ANGLE_Z: &str = "ParamBodyAngleZ";
pub const PARAM_EYE_BALL_X: &str = "ParamEyeBallX";
pub const PARAM_EYE_BALL_Y: &str = "ParamEyeBallY";
pub const PARAM_EYE_L_OPEN: &str = "ParamEyeLOpen";
pub const PARAM_EYE_R_OPEN: &str = "ParamEyeROpen";

/// Upper bound on the frame delta fed into animation and physics, seconds.
/// Keeps motion bounded across frame stalls.
pub const MAX_FRAME_DT: f32 = 0.033;

const HEAD_PARAMS: [&str; 3] = [PARAM_ANGLE_X, PARAM_ANGLE_Y, PARAM_ANGLE_Z];
const BODY_PARAMS: [&str; 2] = [PARAM_BODY_ANGLE_X, PARAM_BODY_ANGLE_Z];

/// One idle sway sinusoid.
#[derive(Debug, Clone, Copy)]
pub struct SwayAxis {
	pub amplitude: f32,
	pub frequency: f32,
	pub phase: f32,
}

#[derive(Debug, Clone)]
pub struct AnimatorConfig {
	pub head_gain: f32,
	pub body_gain: f32,
	pub eye_gain: f32,
	/// Per-tick exponential smoothing weights. Deliberately frame-rate
	/// dependent to match the behavior of the system this runtime replaces;
	/// changing them to a dt-based formula changes how every model feels.
	pub head_smoothing: f32,
	pub body_smoothing: f32,
	pub sway: [SwayAxis; 3],
	pub blink: BlinkTiming,
	pub breath: Vec<BreathChannel>,
}

impl Default for AnimatorConfig {
	fn default() -> Self {
		Self {
			head_gain: 30.0,
			body_gain: 10.0,
			eye_gain: 0.6,
			head_smoothing: 0.7,
			body_smoothing: 0.5,
			sway: [
				SwayAxis {
					amplitude: 1.5,
					frequency: 0.11,
					phase: 0.0,
				},
				SwayAxis {
					amplitude: 1.2,
					frequency: 0.17,
					phase: 1.3,
				},
				SwayAxis {
					amplitude: 2.0,
					frequency: 0.07,
					phase: 2.6,
				},
			],
			blink: BlinkTiming::default(),
			breath: Breath::default_channels(),
		}
	}
}

/// Per-frame composition of idle sway, pointer-driven offsets and generator
/// outputs into final parameter values.
pub struct Animator {
	cfg: AnimatorConfig,
	t: f32,
	head: [f32; 3],
	body: [f32; 2],
	has_head: [bool; 3],
	has_body: [bool; 2],
	has_eye_x: bool,
	has_eye_y: bool,
	blink: Option<EyeBlink>,
	breath: Breath,
}

impl Animator {
	/// Looks up every channel it drives on the rig; a missing channel skips
	/// that procedural feature, never the whole model.
	pub fn new(rig: &Rig, cfg: AnimatorConfig) -> Self {
		let has_head = HEAD_PARAMS.map(|name| rig.param(name).is_some());
		let has_body = BODY_PARAMS.map(|name| rig.param(name).is_some());
		for (name, has) in HEAD_PARAMS.iter().chain(&BODY_PARAMS).zip(has_head.iter().chain(&has_body)) {
			if !has {
				debug!(param = %name, "rig lacks a turn channel, tracking disabled for it");
			}
		}

		let has_eye_x = rig.param(PARAM_EYE_BALL_X).is_some();
		let has_eye_y = rig.param(PARAM_EYE_BALL_Y).is_some();

		let blink = if rig.param(PARAM_EYE_L_OPEN).is_some() && rig.param(PARAM_EYE_R_OPEN).is_some() {
			Some(EyeBlink::new(cfg.blink))
		} else {
			debug!("rig lacks eye openness channels, blink disabled");
			None
		};

		let mut breath = Breath::new(cfg.breath.clone());
		breath.retain(|c| {
			let keep = rig.param(&c.param).is_some();
			if !keep {
				debug!(param = %c.param, "rig lacks a breath channel, dropped");
			}
			keep
		});

		Self {
			cfg,
			t: 0.0,
			head: [0.0; 3],
			body: [0.0; 2],
			has_head,
			has_body,
			has_eye_x,
			has_eye_y,
			blink,
			breath,
		}
	}

	/// One animation tick. Returns the clamped dt for downstream passes.
	pub fn tick(&mut self, params: &mut ParamSet, pointer: Vec2, dt: f32) -> f32 {
		let dt = dt.clamp(0.0, MAX_FRAME_DT);
		self.t += dt;

		params.reset();

		// idle sway, present even with the pointer at rest
		let sway = self
			.cfg
			.sway
			.map(|axis| axis.amplitude * (TAU * axis.frequency * self.t + axis.phase).sin());

		let head_target = [
			sway[0] + pointer.x * self.cfg.head_gain,
			sway[1] + pointer.y * self.cfg.head_gain,
			sway[2],
		];
		for i in 0..3 {
			if self.has_head[i] {
				self.head[i] += (head_target[i] - self.head[i]) * self.cfg.head_smoothing;
				let _ = params.set(HEAD_PARAMS[i], self.head[i]);
			}
		}

		let body_target = [
			pointer.x * self.cfg.body_gain,
			pointer.x * -(self.cfg.body_gain * 0.6),
		];
		for i in 0..2 {
			if self.has_body[i] {
				self.body[i] += (body_target[i] - self.body[i]) * self.cfg.body_smoothing;
				let _ = params.set(BODY_PARAMS[i], self.body[i]);
			}
		}

		// gaze follows the pointer directly, no smoothing
		if self.has_eye_x {
			let _ = params.set(PARAM_EYE_BALL_X, pointer.x * self.cfg.eye_gain);
		}
		if self.has_eye_y {
			let _ = params.set(PARAM_EYE_BALL_Y, -pointer.y * self.cfg.eye_gain);
		}

		if let Some(blink) = &mut self.blink {
			let open = blink.advance(dt);
			let _ = params.set(PARAM_EYE_L_OPEN, open);
			let _ = params.set(PARAM_EYE_R_OPEN, open);
		}

		for (name, offset) in self.breath.advance(dt) {
			let _ = params.add(name, offset);
		}

		dt
	}
}

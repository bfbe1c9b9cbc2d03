use glam::{vec2, Vec2};

/// Latest normalized pointer sample, `[-1, 1]²`. Last write wins; no queuing
/// of intermediate positions.
#[derive(Debug, Clone, Default)]
pub struct PointerState {
	pos: Vec2,
}

impl PointerState {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set(&mut self, x: f32, y: f32) {
		self.pos = vec2(x, y).clamp(Vec2::splat(-1.0), Vec2::ONE);
	}

	/// Back to neutral, the pointer-leave position.
	pub fn clear(&mut self) {
		self.pos = Vec2::ZERO;
	}

	pub fn pos(&self) -> Vec2 {
		self.pos
	}
}

/// Uniform pointer interface implemented by every model variant.
pub trait PointerTarget {
	/// `(0, 0)` is neutral; hosts call it on pointer leave.
	fn set_pointer(&mut self, x: f32, y: f32);
}

use glam::{Mat4, Vec2};

/// Camera for framing the avatar inside a viewport. Origin at the viewport
/// center, y up, rig units.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
	pub position: Vec2,
	pub rotation: f32,
	pub scale: Vec2,
}

impl Default for Camera {
	fn default() -> Self {
		Self {
			position: Vec2::ZERO,
			rotation: 0.0,
			scale: Vec2::ONE,
		}
	}
}

impl Camera {
	/// Resulting matrix for the camera and a viewport in pixels.
	pub fn matrix(&self, viewport: Vec2) -> Mat4 {
		let half = viewport / self.scale / 2.0;

		Mat4::orthographic_rh(-half.x, half.x, -half.y, half.y, -1.0, 1.0)
			* Mat4::from_rotation_z(self.rotation)
			* Mat4::from_translation(self.position.extend(0.0))
	}
}

use glam::UVec2;

use crate::rig::{Rig, RigBuffers};
use crate::texture::ShallowTexture;

/// Backend interface for drawing a deformed rig. The same
/// bring-your-own-backend split as the rest of the crate family: the core
/// dispatches, the backend owns the GPU objects.
pub trait RigRenderer {
	type Error: std::error::Error + Send + Sync + 'static;

	/// One-time setup for a freshly decoded model: upload every texture in
	/// manifest order (mip-mapped, clamp-to-edge, premultiplied-alpha
	/// storage) and create the mesh buffers. A failure here fails the whole
	/// load.
	fn prepare(&mut self, rig: &Rig, textures: &[ShallowTexture]) -> Result<(), Self::Error>;

	/// Submit one frame. Implementations re-assert viewport and blend state
	/// every call; the wider GPU context is not theirs to own.
	fn draw_frame(&mut self, viewport: UVec2, buffers: &RigBuffers);
}

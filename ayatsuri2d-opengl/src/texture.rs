use glow::HasContext;

use ayatsuri2d::texture::ShallowTexture;

#[derive(thiserror::Error, Debug)]
#[error("Could not create texture: {0}")]
pub struct TextureError(String);

pub struct Texture {
	tex: glow::Texture,
	width: u32,
	height: u32,
}

impl Texture {
	pub fn from_shallow_texture(gl: &glow::Context, shalltex: &ShallowTexture) -> Result<Self, TextureError> {
		Self::from_raw_pixels(gl, shalltex.pixels(), shalltex.width(), shalltex.height())
	}

	/// Uploads RGBA8 pixels (premultiplied alpha) with mip-mapping and
	/// clamp-to-edge wrapping.
	pub fn from_raw_pixels(gl: &glow::Context, pixels: &[u8], width: u32, height: u32) -> Result<Self, TextureError> {
		let tex = unsafe { gl.create_texture().map_err(TextureError)? };
		unsafe {
			gl.bind_texture(glow::TEXTURE_2D, Some(tex));
			gl.tex_parameter_i32(
				glow::TEXTURE_2D,
				glow::TEXTURE_MIN_FILTER,
				glow::LINEAR_MIPMAP_LINEAR as i32,
			);
			gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
			gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
			gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
			gl.tex_image_2d(
				glow::TEXTURE_2D,
				0,
				glow::RGBA8 as i32,
				width as i32,
				height as i32,
				0,
				glow::RGBA,
				glow::UNSIGNED_BYTE,
				Some(pixels),
			);
			gl.generate_mipmap(glow::TEXTURE_2D);
			gl.bind_texture(glow::TEXTURE_2D, None);
		}

		Ok(Texture { tex, width, height })
	}

	pub fn bind(&self, gl: &glow::Context) {
		self.bind_on(gl, 0);
	}

	pub fn bind_on(&self, gl: &glow::Context, slot: u32) {
		unsafe {
			gl.active_texture(glow::TEXTURE0 + slot);
			gl.bind_texture(glow::TEXTURE_2D, Some(self.tex));
		}
	}

	pub fn delete(&self, gl: &glow::Context) {
		unsafe { gl.delete_texture(self.tex) };
	}

	pub fn width(&self) -> u32 {
		self.width
	}

	pub fn height(&self) -> u32 {
		self.height
	}
}

mod shader;
mod shaders;
pub mod texture;

use glam::{UVec2, Vec2};
use glow::HasContext;
use tracing::debug;

use ayatsuri2d::math::camera::Camera;
use ayatsuri2d::render::RigRenderer;
use ayatsuri2d::rig::{Rig, RigBuffers};
use ayatsuri2d::texture::ShallowTexture;

use self::shader::ShaderCompileError;
use self::texture::Texture;

#[derive(Debug, thiserror::Error)]
#[error("Could not initialize OpenGL renderer: {0}")]
pub enum OpenglRendererError {
	ShaderCompile(#[from] ShaderCompileError),
	Texture(#[from] texture::TextureError),
	Opengl(String),
}

struct MeshVao {
	vao: glow::VertexArray,
	vert_buffer: glow::Buffer,
	uv_buffer: glow::Buffer,
	index_buffer: glow::Buffer,
}

/// OpenGL renderer binding: uploads textures once at prepare, then submits
/// the deformed mesh every frame.
pub struct OpenglRenderer {
	gl: glow::Context,
	pub camera: Camera,
	program: glow::Program,
	u_mvp: Option<glow::UniformLocation>,
	mesh: Option<MeshVao>,
	textures: Vec<Texture>,
}

impl OpenglRenderer {
	pub fn new(gl: glow::Context) -> Result<Self, OpenglRendererError> {
		let program = shader::compile(&gl, shaders::MESH_VERT, shaders::MESH_FRAG)?;
		let u_mvp = unsafe { gl.get_uniform_location(program, "u_mvp") };
		unsafe {
			gl.use_program(Some(program));
			let u_albedo = gl.get_uniform_location(program, "u_albedo");
			gl.uniform_1_i32(u_albedo.as_ref(), 0);
			gl.use_program(None);
		}

		Ok(Self {
			gl,
			camera: Camera::default(),
			program,
			u_mvp,
			mesh: None,
			textures: Vec::new(),
		})
	}

	/// Clears the color buffer to transparent black.
	pub fn clear(&self) {
		unsafe {
			self.gl.clear_color(0.0, 0.0, 0.0, 0.0);
			self.gl.clear(glow::COLOR_BUFFER_BIT);
		}
	}

	fn upload_mesh(&mut self, buffers: &RigBuffers) -> Result<(), OpenglRendererError> {
		let gl = &self.gl;
		unsafe {
			let vao = gl.create_vertex_array().map_err(OpenglRendererError::Opengl)?;
			gl.bind_vertex_array(Some(vao));

			let vert_buffer = upload_array(gl, &buffers.verts, glow::ARRAY_BUFFER, glow::DYNAMIC_DRAW)?;
			gl.vertex_attrib_pointer_f32(0, 2, glow::FLOAT, false, 0, 0);
			gl.enable_vertex_attrib_array(0);

			let uv_buffer = upload_array(gl, &buffers.uvs, glow::ARRAY_BUFFER, glow::STATIC_DRAW)?;
			gl.vertex_attrib_pointer_f32(1, 2, glow::FLOAT, false, 0, 0);
			gl.enable_vertex_attrib_array(1);

			let index_buffer = upload_array(gl, &buffers.indices, glow::ELEMENT_ARRAY_BUFFER, glow::STATIC_DRAW)?;

			gl.bind_vertex_array(None);

			self.mesh = Some(MeshVao {
				vao,
				vert_buffer,
				uv_buffer,
				index_buffer,
			});
		}
		Ok(())
	}
}

impl RigRenderer for OpenglRenderer {
	type Error = OpenglRendererError;

	fn prepare(&mut self, rig: &Rig, textures: &[ShallowTexture]) -> Result<(), OpenglRendererError> {
		debug_assert!(self.mesh.is_none(), "prepare is a one-time setup");

		for shalltex in textures {
			self.textures.push(Texture::from_shallow_texture(&self.gl, shalltex)?);
		}

		self.upload_mesh(&rig.build_buffers())?;
		debug!(textures = textures.len(), "renderer prepared");
		Ok(())
	}

	fn draw_frame(&mut self, viewport: UVec2, buffers: &RigBuffers) {
		let mesh = match &self.mesh {
			Some(mesh) => mesh,
			None => return,
		};

		let gl = &self.gl;
		unsafe {
			// re-assert dependent state every frame; the wider GL context is
			// shared with the host
			gl.viewport(0, 0, viewport.x as i32, viewport.y as i32);
			gl.enable(glow::BLEND);
			gl.blend_func(glow::ONE, glow::ONE_MINUS_SRC_ALPHA);
			gl.disable(glow::DEPTH_TEST);

			gl.use_program(Some(self.program));
			let mvp = self.camera.matrix(viewport.as_vec2());
			gl.uniform_matrix_4_f32_slice(self.u_mvp.as_ref(), false, &mvp.to_cols_array());

			gl.bind_vertex_array(Some(mesh.vao));
			gl.bind_buffer(glow::ARRAY_BUFFER, Some(mesh.vert_buffer));
			gl.buffer_sub_data_u8_slice(glow::ARRAY_BUFFER, 0, vec2_bytes(&buffers.verts));

			for slice in &buffers.slices {
				if let Some(texture) = self.textures.get(slice.texture) {
					texture.bind(gl);
				}
				gl.draw_elements(
					glow::TRIANGLES,
					slice.index_len as i32,
					glow::UNSIGNED_SHORT,
					(slice.index_offset * std::mem::size_of::<u16>()) as i32,
				);
			}

			gl.bind_vertex_array(None);
		}
	}
}

impl Drop for OpenglRenderer {
	fn drop(&mut self) {
		let gl = &self.gl;
		unsafe {
			for texture in &self.textures {
				texture.delete(gl);
			}
			if let Some(mesh) = &self.mesh {
				gl.delete_buffer(mesh.vert_buffer);
				gl.delete_buffer(mesh.uv_buffer);
				gl.delete_buffer(mesh.index_buffer);
				gl.delete_vertex_array(mesh.vao);
			}
			gl.delete_program(self.program);
		}
	}
}

/// Create and BIND an OpenGL buffer and upload data.
///
/// # Safety
///
/// `target` and `usage` must be valid OpenGL constants.
unsafe fn upload_array<T>(
	gl: &glow::Context,
	array: &[T],
	target: u32,
	usage: u32,
) -> Result<glow::Buffer, OpenglRendererError> {
	let bytes: &[u8] = core::slice::from_raw_parts(array.as_ptr() as *const u8, std::mem::size_of_val(array));
	let buffer = gl.create_buffer().map_err(OpenglRendererError::Opengl)?;
	gl.bind_buffer(target, Some(buffer));
	gl.buffer_data_u8_slice(target, bytes, usage);

	Ok(buffer)
}

fn vec2_bytes(verts: &[Vec2]) -> &[u8] {
	// Safety: Vec2 is two packed f32s; read-only reinterpretation
	unsafe { core::slice::from_raw_parts(verts.as_ptr() as *const u8, std::mem::size_of_val(verts)) }
}

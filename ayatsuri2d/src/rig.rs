use glam::Vec2;

use crate::params::ParamSet;

/// A named scalar animation channel. Values are always clamped to `[min, max]`.
#[derive(Debug, Clone)]
pub struct Param {
	pub name: String,
	pub min: f32,
	pub max: f32,
	pub default: f32,
}

/// Per-vertex deformation driven by one parameter: offsets at the parameter
/// minimum and maximum, linearly interpolated by the normalized value and
/// summed additively with every other binding on the mesh.
#[derive(Debug, Clone)]
pub struct Binding {
	pub param: usize,
	pub beg: Vec<Vec2>,
	pub end: Vec<Vec2>,
}

#[derive(Debug, Clone)]
pub struct Mesh {
	pub texture: usize,
	pub vertices: Vec<Vec2>,
	pub uvs: Vec<Vec2>,
	pub indices: Vec<u16>,
	pub bindings: Vec<Binding>,
}

/// Draw range of one mesh inside the concatenated buffers.
#[derive(Debug, Clone, Copy)]
pub struct MeshSlice {
	pub vert_offset: usize,
	pub vert_len: usize,
	pub index_offset: usize,
	pub index_len: usize,
	pub texture: usize,
}

/// Compact per-model buffers for interfacing with the GPU.
/// `uvs`, `indices` and `slices` are static; `verts` is rewritten by [Rig::deform].
pub struct RigBuffers {
	pub verts: Vec<Vec2>,
	pub uvs: Vec<Vec2>,
	pub indices: Vec<u16>,
	pub slices: Vec<MeshSlice>,
}

#[derive(Debug, thiserror::Error)]
#[error("deformation produced a non-finite vertex in mesh {mesh}")]
pub struct DeformError {
	pub mesh: usize,
}

/// The deformable mesh graph decoded from the binary rig buffer.
pub struct Rig {
	params: Vec<Param>,
	meshes: Vec<Mesh>,
}

impl Rig {
	pub(crate) fn new(params: Vec<Param>, meshes: Vec<Mesh>) -> Self {
		Self { params, meshes }
	}

	pub fn params(&self) -> &[Param] {
		&self.params
	}

	pub fn meshes(&self) -> &[Mesh] {
		&self.meshes
	}

	pub fn param(&self, name: &str) -> Option<&Param> {
		self.params.iter().find(|p| p.name == name)
	}

	/// Concatenates all meshes into one vertex/index buffer pair, indices
	/// rebased onto the shared buffer.
	pub fn build_buffers(&self) -> RigBuffers {
		let mut verts = Vec::new();
		let mut uvs = Vec::new();
		let mut indices = Vec::new();
		let mut slices = Vec::with_capacity(self.meshes.len());

		for mesh in &self.meshes {
			let vert_offset = verts.len();
			let index_offset = indices.len();
			debug_assert!(vert_offset + mesh.vertices.len() <= u16::MAX as usize);

			verts.extend_from_slice(&mesh.vertices);
			uvs.extend_from_slice(&mesh.uvs);
			indices.extend(mesh.indices.iter().map(|index| index + vert_offset as u16));

			slices.push(MeshSlice {
				vert_offset,
				vert_len: mesh.vertices.len(),
				index_offset,
				index_len: mesh.indices.len(),
				texture: mesh.texture,
			});
		}

		RigBuffers {
			verts,
			uvs,
			indices,
			slices,
		}
	}

	/// Recomputes the deformed vertices for the current parameter values.
	///
	/// On a non-finite result the affected mesh is reverted to its base pose
	/// and the frame is reported failed; the caller skips it and retries next
	/// tick.
	pub fn deform(&self, params: &ParamSet, buffers: &mut RigBuffers) -> Result<(), DeformError> {
		for (m, (mesh, slice)) in self.meshes.iter().zip(&buffers.slices).enumerate() {
			let out = &mut buffers.verts[slice.vert_offset..slice.vert_offset + slice.vert_len];
			out.copy_from_slice(&mesh.vertices);

			for binding in &mesh.bindings {
				let param = &self.params[binding.param];
				let value = params.get(&param.name).unwrap_or(param.default);
				let t = (value - param.min) / (param.max - param.min);

				for ((vert, &beg), &end) in out.iter_mut().zip(&binding.beg).zip(&binding.end) {
					*vert += beg.lerp(end, t);
				}
			}

			if out.iter().any(|v| !v.is_finite()) {
				out.copy_from_slice(&mesh.vertices);
				return Err(DeformError { mesh: m });
			}
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use glam::vec2;

	use super::*;

	fn test_rig() -> Rig {
		let params = vec![Param {
			name: "Bend".to_owned(),
			min: 0.0,
			max: 1.0,
			default: 0.0,
		}];
		let meshes = vec![Mesh {
			texture: 0,
			vertices: vec![vec2(0.0, 0.0), vec2(1.0, 0.0), vec2(0.0, 1.0)],
			uvs: vec![vec2(0.0, 0.0), vec2(1.0, 0.0), vec2(0.0, 1.0)],
			indices: vec![0, 1, 2],
			bindings: vec![Binding {
				param: 0,
				beg: vec![Vec2::ZERO; 3],
				end: vec![vec2(1.0, 0.0); 3],
			}],
		}];
		Rig::new(params, meshes)
	}

	#[test]
	fn buffers_concatenate_and_rebase_indices() {
		let rig = test_rig();
		let buffers = rig.build_buffers();
		assert_eq!(buffers.verts.len(), 3);
		assert_eq!(buffers.indices, vec![0, 1, 2]);
		assert_eq!(buffers.slices.len(), 1);
		assert_eq!(buffers.slices[0].index_len, 3);
	}

	#[test]
	fn deform_interpolates_binding_endpoints() {
		let rig = test_rig();
		let mut buffers = rig.build_buffers();
		let mut params = ParamSet::new(&rig);

		// at the default value the minimum endpoint applies
		rig.deform(&params, &mut buffers).unwrap();
		assert_eq!(buffers.verts[0], vec2(0.0, 0.0));

		params.set("Bend", 1.0).unwrap();
		rig.deform(&params, &mut buffers).unwrap();
		assert_eq!(buffers.verts[0], vec2(1.0, 0.0));
		assert_eq!(buffers.verts[1], vec2(2.0, 0.0));

		params.set("Bend", 0.5).unwrap();
		rig.deform(&params, &mut buffers).unwrap();
		assert_eq!(buffers.verts[0], vec2(0.5, 0.0));
	}

	#[test]
	fn deform_reverts_non_finite_results() {
		let mut rig = test_rig();
		rig.meshes[0].bindings[0].end = vec![vec2(f32::NAN, 0.0); 3];
		let mut buffers = rig.build_buffers();
		let mut params = ParamSet::new(&rig);
		params.set("Bend", 1.0).unwrap();

		assert!(rig.deform(&params, &mut buffers).is_err());
		assert_eq!(buffers.verts[0], vec2(0.0, 0.0));
	}
}

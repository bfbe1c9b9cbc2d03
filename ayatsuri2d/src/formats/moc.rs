use std::io::{self, Read};
use std::string::FromUtf8Error;

use glam::{vec2, Vec2};

use crate::rig::{Binding, Mesh, Param, Rig};

use super::{read_be_f32, read_be_u16, read_be_u32, read_n, read_u8, read_vec};

#[derive(Debug, thiserror::Error)]
#[error("Could not parse rig buffer\n  - {0}")]
pub enum ParseMocError {
	#[error("magic bytes do not match, the buffer is not a rig buffer")]
	IncorrectMagic,
	#[error("unsupported rig version {0}")]
	UnsupportedVersion(u8),
	#[error("there is no parameter section")]
	NoParamSect,
	#[error("there is no mesh section")]
	NoMeshSect,
	#[error("parameter {0:?} has an empty value range")]
	EmptyParamRange(String),
	#[error("mesh {mesh}: vertex index {index} out of range")]
	IndexOutOfRange { mesh: usize, index: u16 },
	#[error("mesh {mesh}: binding references unknown parameter {param}")]
	BadBindingParam { mesh: usize, param: u32 },
	#[error("mesh {mesh}: texture index {texture} out of range")]
	BadTextureIndex { mesh: usize, texture: usize },
	Io(#[from] io::Error),
	FromUtf8(#[from] FromUtf8Error),
}

const MAGIC: &[u8] = b"MOC3";
/// Parameter section header
const PARAM_SECT: &[u8] = b"PRM_SECT";
/// Mesh section header
const MESH_SECT: &[u8] = b"MSH_SECT";

/// Decodes a binary rig buffer into a [Rig].
///
/// The layout is fixed by the authoring toolchain: magic + version byte,
/// a parameter section, then a mesh section. Lengths are big-endian,
/// names length-prefixed UTF-8, floats IEEE-754 bit patterns.
pub fn parse_moc<R: Read>(mut data: R) -> Result<Rig, ParseMocError> {
	let magic = read_n::<_, 4>(&mut data)?;
	if magic != MAGIC {
		return Err(ParseMocError::IncorrectMagic);
	}
	let version = read_u8(&mut data)?;
	if version != 3 {
		return Err(ParseMocError::UnsupportedVersion(version));
	}

	let sect = read_n::<_, 8>(&mut data).map_err(|_| ParseMocError::NoParamSect)?;
	if sect != PARAM_SECT {
		return Err(ParseMocError::NoParamSect);
	}
	let param_count = read_be_u32(&mut data)? as usize;
	let mut params = Vec::with_capacity(param_count);
	for _ in 0..param_count {
		let name = read_string(&mut data)?;
		let min = read_be_f32(&mut data)?;
		let max = read_be_f32(&mut data)?;
		let default = read_be_f32(&mut data)?;
		if !(min < max) {
			return Err(ParseMocError::EmptyParamRange(name));
		}
		params.push(Param {
			name,
			min,
			max,
			default: default.clamp(min, max),
		});
	}

	let sect = read_n::<_, 8>(&mut data).map_err(|_| ParseMocError::NoMeshSect)?;
	if sect != MESH_SECT {
		return Err(ParseMocError::NoMeshSect);
	}
	let mesh_count = read_be_u32(&mut data)? as usize;
	let mut meshes = Vec::with_capacity(mesh_count);
	for m in 0..mesh_count {
		let texture = read_be_u32(&mut data)? as usize;
		let vert_count = read_be_u32(&mut data)? as usize;
		let vertices = read_vec2s(&mut data, vert_count)?;
		let uvs = read_vec2s(&mut data, vert_count)?;

		let index_count = read_be_u32(&mut data)? as usize;
		let mut indices = Vec::with_capacity(index_count);
		for _ in 0..index_count {
			let index = read_be_u16(&mut data)?;
			if index as usize >= vert_count {
				return Err(ParseMocError::IndexOutOfRange { mesh: m, index });
			}
			indices.push(index);
		}

		let binding_count = read_be_u32(&mut data)? as usize;
		let mut bindings = Vec::with_capacity(binding_count);
		for _ in 0..binding_count {
			let param = read_be_u32(&mut data)?;
			if param as usize >= params.len() {
				return Err(ParseMocError::BadBindingParam { mesh: m, param });
			}
			// offsets at the parameter minimum and maximum, per vertex
			let beg = read_vec2s(&mut data, vert_count)?;
			let end = read_vec2s(&mut data, vert_count)?;
			bindings.push(Binding {
				param: param as usize,
				beg,
				end,
			});
		}

		meshes.push(Mesh {
			texture,
			vertices,
			uvs,
			indices,
			bindings,
		});
	}

	Ok(Rig::new(params, meshes))
}

fn read_string<R: Read>(data: &mut R) -> Result<String, ParseMocError> {
	let len = read_be_u32(data)? as usize;
	Ok(String::from_utf8(read_vec(data, len)?)?)
}

fn read_vec2s<R: Read>(data: &mut R, n: usize) -> io::Result<Vec<Vec2>> {
	let mut out = Vec::with_capacity(n);
	for _ in 0..n {
		let x = read_be_f32(data)?;
		let y = read_be_f32(data)?;
		out.push(vec2(x, y));
	}
	Ok(out)
}


#[cfg(test)]
mod tests {
	use super::testdata::{standard_moc, MocWriter};
	use super::*;

	#[test]
	fn parses_standard_rig() {
		let rig = parse_moc(standard_moc().as_slice()).unwrap();
		assert_eq!(rig.params().len(), 10);
		assert_eq!(rig.meshes().len(), 1);
		assert_eq!(rig.meshes()[0].vertices.len(), 3);
		assert_eq!(rig.meshes()[0].bindings.len(), 1);
		assert_eq!(rig.param("ParamEyeLOpen").unwrap().default, 1.0);
	}

	#[test]
	fn rejects_incorrect_magic() {
		let mut data = standard_moc();
		data[0] = b'X';
		assert!(matches!(
			parse_moc(data.as_slice()),
			Err(ParseMocError::IncorrectMagic)
		));
	}

	#[test]
	fn rejects_unsupported_version() {
		let mut data = standard_moc();
		data[4] = 7;
		assert!(matches!(
			parse_moc(data.as_slice()),
			Err(ParseMocError::UnsupportedVersion(7))
		));
	}

	#[test]
	fn rejects_truncated_buffer() {
		let data = standard_moc();
		assert!(matches!(
			parse_moc(&data[..data.len() / 2]),
			Err(ParseMocError::Io(_))
		));
	}

	#[test]
	fn rejects_missing_param_section() {
		let w = MocWriter::new();
		assert!(matches!(
			parse_moc(w.finish().as_slice()),
			Err(ParseMocError::NoParamSect)
		));
	}

	#[test]
	fn rejects_empty_param_range() {
		let mut w = MocWriter::new();
		w.sect(b"PRM_SECT").u32(1).str("ParamAngleX").f32(1.0).f32(1.0).f32(1.0);
		assert!(matches!(
			parse_moc(w.finish().as_slice()),
			Err(ParseMocError::EmptyParamRange(_))
		));
	}

	#[test]
	fn rejects_out_of_range_vertex_index() {
		let mut w = MocWriter::new();
		w.sect(b"PRM_SECT").u32(0);
		w.sect(b"MSH_SECT").u32(1);
		w.u32(0).u32(1).f32(0.0).f32(0.0).f32(0.0).f32(0.0);
		w.u32(3).u16(0).u16(1).u16(2);
		assert!(matches!(
			parse_moc(w.finish().as_slice()),
			Err(ParseMocError::IndexOutOfRange { mesh: 0, index: 1 })
		));
	}

	#[test]
	fn rejects_binding_to_unknown_param() {
		let mut w = MocWriter::new();
		w.sect(b"PRM_SECT").u32(0);
		w.sect(b"MSH_SECT").u32(1);
		w.u32(0).u32(1).f32(0.0).f32(0.0).f32(0.0).f32(0.0);
		w.u32(1).u16(0);
		w.u32(1).u32(5).f32(0.0).f32(0.0).f32(0.0).f32(0.0);
		assert!(matches!(
			parse_moc(w.finish().as_slice()),
			Err(ParseMocError::BadBindingParam { mesh: 0, param: 5 })
		));
	}
}

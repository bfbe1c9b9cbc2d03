use std::str::Utf8Error;

use super::json::{JsonError, JsonObject, SerialExtend};

/// Parsed model manifest. All paths are relative to the manifest location.
#[derive(Debug, Clone)]
pub struct ModelManifest {
	pub moc: String,
	pub textures: Vec<String>,
	pub physics: Option<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("Could not parse model manifest\n  - {0}")]
pub enum ParseManifestError {
	#[error("manifest root is not a JSON object")]
	RootIsNotObject,
	#[error("manifest lists no textures")]
	NoTextures,
	Utf8(#[from] Utf8Error),
	JsonParse(#[from] json::Error),
	Json(#[from] JsonError),
}

pub fn parse_manifest(data: &[u8]) -> Result<ModelManifest, ParseManifestError> {
	let payload = std::str::from_utf8(data)?;
	let payload = json::parse(payload)?;
	let root = payload.as_object().ok_or(ParseManifestError::RootIsNotObject)?;

	let root = JsonObject(root);
	let refs = root.get_object("FileReferences")?;
	let moc = refs.get_str("Moc")?.to_owned();

	let mut textures = Vec::new();
	for tex in refs.get_list("Textures")? {
		match tex.as_str() {
			Some(path) => textures.push(path.to_owned()),
			None => return Err(JsonError::ValueIsNotString("Textures".to_owned()).into()),
		}
	}
	if textures.is_empty() {
		return Err(ParseManifestError::NoTextures);
	}

	let physics = refs.get_optional_str("Physics")?.map(str::to_owned);

	Ok(ModelManifest { moc, textures, physics })
}

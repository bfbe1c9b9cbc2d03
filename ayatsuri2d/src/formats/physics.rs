use std::str::Utf8Error;

use super::json::{JsonError, JsonObject, SerialExtend};

/// Settings for one secondary-motion link: a spring-damper driven by a
/// weighted input parameter, writing its state into an output parameter.
#[derive(Debug, Clone)]
pub struct PhysicsLink {
	pub id: String,
	pub input: String,
	pub input_weight: f32,
	pub output: String,
	pub output_scale: f32,
	pub frequency: f32,
	pub damping: f32,
}

#[derive(Debug, Clone)]
pub struct PhysicsSettings {
	pub links: Vec<PhysicsLink>,
}

#[derive(Debug, thiserror::Error)]
#[error("Could not parse physics buffer\n  - {0}")]
pub enum ParsePhysicsError {
	#[error("physics root is not a JSON object")]
	RootIsNotObject,
	#[error("unsupported physics version {0}")]
	UnsupportedVersion(u32),
	#[error("physics setting {0:?} has no input")]
	NoInput(String),
	#[error("physics setting {0:?} has no output")]
	NoOutput(String),
	Utf8(#[from] Utf8Error),
	JsonParse(#[from] json::Error),
	Json(#[from] JsonError),
}

pub fn parse_physics(data: &[u8]) -> Result<PhysicsSettings, ParsePhysicsError> {
	let payload = std::str::from_utf8(data)?;
	let payload = json::parse(payload)?;
	let root = payload.as_object().ok_or(ParsePhysicsError::RootIsNotObject)?;
	let root = JsonObject(root);

	let version = root.get_u32("Version")?;
	if version != 3 {
		return Err(ParsePhysicsError::UnsupportedVersion(version));
	}

	let mut links = Vec::new();
	for setting in root.get_list("PhysicsSettings")? {
		let setting = JsonObject(
			setting
				.as_object()
				.ok_or_else(|| JsonError::ValueIsNotObject("PhysicsSettings".to_owned()))?,
		);
		let id = setting.get_str("Id")?.to_owned();

		let input = setting
			.get_list("Input")?
			.first()
			.and_then(|v| v.as_object())
			.ok_or_else(|| ParsePhysicsError::NoInput(id.clone()))?;
		let input = JsonObject(input);

		let output = setting
			.get_list("Output")?
			.first()
			.and_then(|v| v.as_object())
			.ok_or_else(|| ParsePhysicsError::NoOutput(id.clone()))?;
		let output = JsonObject(output);

		let spring = setting.get_object("Spring")?;

		links.push(PhysicsLink {
			input: input.get_str("Source")?.to_owned(),
			input_weight: input.get_f32("Weight")?,
			output: output.get_str("Destination")?.to_owned(),
			output_scale: output.get_f32("Scale")?,
			frequency: spring.get_f32("Frequency")?,
			damping: spring.get_f32("Damping")?,
			id,
		});
	}

	Ok(PhysicsSettings { links })
}

use std::collections::HashMap;

use crate::rig::Rig;

struct Slot {
	value: f32,
	default: f32,
	min: f32,
	max: f32,
}

/// Current value of every rig parameter. Many writers layer within one tick
/// (blender, procedural generators, physics); values never leave `[min, max]`.
pub struct ParamSet {
	slots: HashMap<String, Slot>,
}

/// Possible errors setting a param.
#[derive(Debug, thiserror::Error)]
pub enum SetParamError {
	#[error("No parameter named {0}")]
	NoParameterNamed(String),
}

impl ParamSet {
	pub fn new(rig: &Rig) -> Self {
		Self {
			slots: rig
				.params()
				.iter()
				.map(|p| {
					(
						p.name.clone(),
						Slot {
							value: p.default,
							default: p.default,
							min: p.min,
							max: p.max,
						},
					)
				})
				.collect(),
		}
	}

	pub fn len(&self) -> usize {
		self.slots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	pub fn has(&self, name: &str) -> bool {
		self.slots.contains_key(name)
	}

	pub fn get(&self, name: &str) -> Option<f32> {
		self.slots.get(name).map(|s| s.value)
	}

	/// Current value mapped onto `[-1, 1]` across the parameter range.
	pub fn normalized(&self, name: &str) -> Option<f32> {
		self.slots
			.get(name)
			.map(|s| (s.value - s.min) / (s.max - s.min) * 2.0 - 1.0)
	}

	pub fn set(&mut self, name: &str, value: f32) -> Result<(), SetParamError> {
		match self.slots.get_mut(name) {
			Some(slot) => {
				slot.value = value.clamp(slot.min, slot.max);
				Ok(())
			}
			None => Err(SetParamError::NoParameterNamed(name.to_owned())),
		}
	}

	pub fn add(&mut self, name: &str, delta: f32) -> Result<(), SetParamError> {
		match self.slots.get_mut(name) {
			Some(slot) => {
				slot.value = (slot.value + delta).clamp(slot.min, slot.max);
				Ok(())
			}
			None => Err(SetParamError::NoParameterNamed(name.to_owned())),
		}
	}

	/// Reset all params to their default value. Called at the top of every
	/// tick so additive writers layer per-tick instead of compounding.
	pub fn reset(&mut self) {
		for slot in self.slots.values_mut() {
			slot.value = slot.default;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::formats::moc::testdata::standard_moc;
	use crate::formats::moc::parse_moc;

	fn params() -> ParamSet {
		ParamSet::new(&parse_moc(standard_moc().as_slice()).unwrap())
	}

	#[test]
	fn writes_clamp_to_range() {
		let mut params = params();
		params.set("ParamAngleX", 500.0).unwrap();
		assert_eq!(params.get("ParamAngleX"), Some(30.0));
		params.set("ParamAngleX", -500.0).unwrap();
		assert_eq!(params.get("ParamAngleX"), Some(-30.0));
	}

	#[test]
	fn adds_layer_and_clamp() {
		let mut params = params();
		params.add("ParamBreath", 0.4).unwrap();
		params.add("ParamBreath", 0.4).unwrap();
		params.add("ParamBreath", 0.4).unwrap();
		assert_eq!(params.get("ParamBreath"), Some(1.0));
	}

	#[test]
	fn reset_restores_defaults() {
		let mut params = params();
		params.set("ParamEyeLOpen", 0.0).unwrap();
		params.reset();
		assert_eq!(params.get("ParamEyeLOpen"), Some(1.0));
	}

	#[test]
	fn unknown_name_is_reported() {
		let mut params = params();
		assert!(matches!(
			params.set("ParamTailWag", 1.0),
			Err(SetParamError::NoParameterNamed(_))
		));
	}

	#[test]
	fn normalized_maps_range_to_unit_interval() {
		let mut params = params();
		params.set("ParamAngleX", 30.0).unwrap();
		assert_eq!(params.normalized("ParamAngleX"), Some(1.0));
		params.set("ParamAngleX", 0.0).unwrap();
		assert_eq!(params.normalized("ParamAngleX"), Some(0.0));
	}
}

use std::thread;

use image::ImageError;

/// Decoded RGBA8 texture, pixels stored premultiplied-alpha.
#[derive(Debug)]
pub struct ShallowTexture {
	pixels: Vec<u8>,
	width: u32,
	height: u32,
}

impl ShallowTexture {
	pub fn pixels(&self) -> &[u8] {
		&self.pixels
	}

	pub fn width(&self) -> u32 {
		self.width
	}

	pub fn height(&self) -> u32 {
		self.height
	}
}

#[derive(Debug, thiserror::Error)]
#[error("Could not decode texture {index}")]
pub struct TextureDecodeError {
	pub index: usize,
	#[source]
	pub source: ImageError,
}

fn decode_texture(data: &[u8]) -> Result<ShallowTexture, ImageError> {
	let mut image = image::load_from_memory(data)?.into_rgba8();
	for px in image.chunks_exact_mut(4) {
		let a = px[3] as u32;
		px[0] = (px[0] as u32 * a / 255) as u8;
		px[1] = (px[1] as u32 * a / 255) as u8;
		px[2] = (px[2] as u32 * a / 255) as u8;
	}

	Ok(ShallowTexture {
		width: image.width(),
		height: image.height(),
		pixels: image.into_raw(),
	})
}

/// Decodes all texture blobs, in manifest order, spreading the work over the
/// available cores minus one. Unlike a best-effort cache fill, a single
/// failure fails the lot.
pub fn decode_textures(blobs: &[Vec<u8>]) -> Result<Vec<ShallowTexture>, TextureDecodeError> {
	if blobs.is_empty() {
		return Ok(Vec::new());
	}

	let mut num_threads = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
	if num_threads > 1 {
		num_threads -= 1;
	}
	num_threads = num_threads.min(blobs.len());

	let mut decoded = thread::scope(|s| {
		let workers: Vec<_> = (0..num_threads)
			.map(|w| {
				s.spawn(move || -> Result<Vec<(usize, ShallowTexture)>, TextureDecodeError> {
					let mut out = Vec::new();
					for (index, blob) in blobs.iter().enumerate().skip(w).step_by(num_threads) {
						let texture =
							decode_texture(blob).map_err(|source| TextureDecodeError { index, source })?;
						out.push((index, texture));
					}
					Ok(out)
				})
			})
			.collect();

		let mut decoded = Vec::with_capacity(blobs.len());
		for worker in workers {
			decoded.extend(worker.join().unwrap()?);
		}
		Ok(decoded)
	})?;

	decoded.sort_by_key(|&(i, _)| i);
	Ok(decoded.into_iter().map(|(_, tex)| tex).collect())
}

/// A 2×2 half-transparent PNG for tests across the crate.
#[cfg(test)]
pub(crate) fn test_png() -> Vec<u8> {
	use image::{ImageOutputFormat, Rgba, RgbaImage};

	let image = RgbaImage::from_pixel(2, 2, Rgba([200, 100, 0, 128]));
	let mut bytes = Vec::new();
	image::DynamicImage::ImageRgba8(image)
		.write_to(&mut std::io::Cursor::new(&mut bytes), ImageOutputFormat::Png)
		.unwrap();
	bytes
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decodes_and_premultiplies() {
		let textures = decode_textures(&[test_png()]).unwrap();
		assert_eq!(textures.len(), 1);
		let tex = &textures[0];
		assert_eq!((tex.width(), tex.height()), (2, 2));
		// 200 × 128 / 255 ≈ 100
		assert_eq!(tex.pixels()[0], 100);
		assert_eq!(tex.pixels()[3], 128);
	}

	#[test]
	fn preserves_manifest_order() {
		let blobs: Vec<_> = (0..8).map(|_| test_png()).collect();
		let textures = decode_textures(&blobs).unwrap();
		assert_eq!(textures.len(), 8);
	}

	#[test]
	fn corrupt_blob_fails_the_lot() {
		let blobs = vec![test_png(), b"not an image".to_vec()];
		let err = decode_textures(&blobs).unwrap_err();
		assert_eq!(err.index, 1);
	}
}

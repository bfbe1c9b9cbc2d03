use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use tracing::info;

use crate::formats::manifest::{parse_manifest, ParseManifestError};
use crate::formats::moc::{parse_moc, ParseMocError};
use crate::formats::physics::{parse_physics, ParsePhysicsError, PhysicsSettings};
use crate::rig::Rig;
use crate::runtime::Runtime;
use crate::texture::{decode_textures, ShallowTexture, TextureDecodeError};

/// Cooperative cancellation flag, shared with the transport.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
	pub fn cancel(&self) {
		self.0.store(true, Ordering::SeqCst);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::SeqCst)
	}
}

#[derive(Debug, thiserror::Error)]
#[error("Could not fetch {path}: {reason}")]
pub struct TransportError {
	pub path: String,
	pub reason: String,
}

/// Asset transport collaborator. Implementations should honor the
/// cancellation token; failures surface to the caller unchanged, no retry.
pub trait Transport {
	fn fetch(&self, path: &str, cancel: &CancelToken) -> Result<Vec<u8>, TransportError>;
}

/// Reads assets from the local filesystem.
pub struct FsTransport;

impl Transport for FsTransport {
	fn fetch(&self, path: &str, cancel: &CancelToken) -> Result<Vec<u8>, TransportError> {
		if cancel.is_cancelled() {
			return Err(TransportError {
				path: path.to_owned(),
				reason: "cancelled".to_owned(),
			});
		}
		fs::read(path).map_err(|e| TransportError {
			path: path.to_owned(),
			reason: e.to_string(),
		})
	}
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
	#[error(transparent)]
	Transport(#[from] TransportError),
	#[error(transparent)]
	Manifest(#[from] ParseManifestError),
	#[error(transparent)]
	CorruptModel(#[from] ParseMocError),
	#[error(transparent)]
	CorruptPhysics(#[from] ParsePhysicsError),
	#[error(transparent)]
	Texture(#[from] TextureDecodeError),
	#[error("Could not prepare renderer: {0}")]
	Renderer(String),
	#[error("load cancelled")]
	Cancelled,
	#[error("load interrupted before completion")]
	Interrupted,
}

/// Everything decoded from one manifest, ready for renderer upload.
pub struct ModelAssets {
	pub rig: Rig,
	pub textures: Vec<ShallowTexture>,
	pub physics: Option<PhysicsSettings>,
}

/// Handle on an in-flight load. Dropping it discards whatever the worker
/// still delivers.
pub struct LoadTask {
	rx: Receiver<Result<ModelAssets, LoadError>>,
	cancel: CancelToken,
}

impl LoadTask {
	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// Non-blocking; `None` while the worker is still running.
	pub fn poll(&self) -> Option<Result<ModelAssets, LoadError>> {
		match self.rx.try_recv() {
			Ok(result) => Some(result),
			Err(TryRecvError::Empty) => None,
			Err(TryRecvError::Disconnected) => Some(Err(LoadError::Interrupted)),
		}
	}
}

/// Kicks off an asynchronous model load on a worker thread. The frame loop
/// never blocks on it; poll the returned task once per tick.
pub fn load<T>(runtime: &Runtime, transport: T, manifest_path: &str) -> LoadTask
where
	T: Transport + Send + 'static,
{
	let cancel = CancelToken::default();
	let (tx, rx) = mpsc::channel();

	let token = cancel.clone();
	let path = manifest_path.to_owned();
	let runtime = runtime.clone();
	thread::Builder::new()
		.name("model loader".to_owned())
		.spawn(move || {
			// pin the runtime for the worker's whole life
			let _runtime = runtime;
			// the receiver may be long gone after a dispose; that is fine
			let _ = tx.send(run_load(&transport, &path, &token));
		})
		.unwrap();

	LoadTask { rx, cancel }
}

fn run_load<T: Transport>(
	transport: &T,
	manifest_path: &str,
	cancel: &CancelToken,
) -> Result<ModelAssets, LoadError> {
	let manifest = parse_manifest(&transport.fetch(manifest_path, cancel)?)?;

	let moc = transport.fetch(&resolve(manifest_path, &manifest.moc), cancel)?;
	let rig = parse_moc(moc.as_slice())?;

	// physics is optional; its absence is not an error, its corruption is
	let physics = match &manifest.physics {
		Some(path) => Some(parse_physics(&transport.fetch(
			&resolve(manifest_path, path),
			cancel,
		)?)?),
		None => None,
	};

	let mut blobs = Vec::with_capacity(manifest.textures.len());
	for path in &manifest.textures {
		blobs.push(transport.fetch(&resolve(manifest_path, path), cancel)?);
	}
	if cancel.is_cancelled() {
		return Err(LoadError::Cancelled);
	}
	let textures = decode_textures(&blobs)?;
	debug_assert_eq!(textures.len(), manifest.textures.len());

	for (m, mesh) in rig.meshes().iter().enumerate() {
		if mesh.texture >= textures.len() {
			return Err(ParseMocError::BadTextureIndex {
				mesh: m,
				texture: mesh.texture,
			}
			.into());
		}
	}

	info!(
		params = rig.params().len(),
		textures = textures.len(),
		physics = physics.is_some(),
		"model assets decoded"
	);

	Ok(ModelAssets {
		rig,
		textures,
		physics,
	})
}

/// Resolves a manifest-relative path against the manifest location.
fn resolve(manifest_path: &str, relative: &str) -> String {
	match manifest_path.rfind('/') {
		Some(i) => format!("{}/{}", &manifest_path[..i], relative),
		None => relative.to_owned(),
	}
}

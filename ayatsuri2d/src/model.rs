use glam::{UVec2, Vec2};
use tracing::{info, warn};

use crate::animator::{Animator, AnimatorConfig};
use crate::loader::{self, LoadError, LoadTask, ModelAssets, Transport};
use crate::params::ParamSet;
use crate::physics::{PhysicsEvaluator, SpringPhysics};
use crate::render::RigRenderer;
use crate::rig::{Rig, RigBuffers};
use crate::runtime::Runtime;
use crate::tracking::{PointerState, PointerTarget};

/// Externally observable lifecycle state. Advanced only by [Avatar::tick] and
/// [Avatar::dispose]; there is no hidden self-scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarState {
	Uninitialized,
	Loading,
	Ready,
	Failed,
	Disposed,
}

enum Phase<R: RigRenderer> {
	Uninitialized { renderer: R },
	Loading { renderer: R, task: LoadTask },
	Ready(Box<Live<R>>),
	Failed(LoadError),
	Disposed,
}

/// A fully initialized model: everything a frame touches.
struct Live<R> {
	rig: Rig,
	buffers: RigBuffers,
	params: ParamSet,
	animator: Animator,
	physics: Option<SpringPhysics>,
	renderer: R,
	textures_bound: usize,
}

impl<R> Live<R> {
	fn update(&mut self, pointer: Vec2, dt: f32) {
		let dt = self.animator.tick(&mut self.params, pointer, dt);

		// physics runs last and overrides its output channels
		if let Some(physics) = &mut self.physics {
			for (name, value) in physics.step(&self.params, dt) {
				let _ = self.params.set(&name, value);
			}
		}

		if let Err(e) = self.rig.deform(&self.params, &mut self.buffers) {
			warn!("{e}, frame skipped");
		}
	}
}

/// An animated avatar: one rig, one renderer, one externally driven tick.
///
/// Never drawn unless fully initialized; GPU resources are released exactly
/// once when disposed (or dropped).
pub struct Avatar<R: RigRenderer> {
	phase: Phase<R>,
	pointer: PointerState,
	config: AnimatorConfig,
	_runtime: Runtime,
}

impl<R: RigRenderer> Avatar<R> {
	pub fn new(runtime: &Runtime, renderer: R) -> Self {
		Self {
			phase: Phase::Uninitialized { renderer },
			pointer: PointerState::new(),
			config: AnimatorConfig::default(),
			_runtime: runtime.clone(),
		}
	}

	pub fn with_config(mut self, config: AnimatorConfig) -> Self {
		self.config = config;
		self
	}

	pub fn state(&self) -> AvatarState {
		match self.phase {
			Phase::Uninitialized { .. } => AvatarState::Uninitialized,
			Phase::Loading { .. } => AvatarState::Loading,
			Phase::Ready(_) => AvatarState::Ready,
			Phase::Failed(_) => AvatarState::Failed,
			Phase::Disposed => AvatarState::Disposed,
		}
	}

	/// Starts the asynchronous load. Only meaningful once, from
	/// Uninitialized; anything else is a host bug and is ignored.
	pub fn begin_load<T>(&mut self, transport: T, manifest_path: &str)
	where
		T: Transport + Send + 'static,
	{
		match std::mem::replace(&mut self.phase, Phase::Disposed) {
			Phase::Uninitialized { renderer } => {
				let task = loader::load(&self._runtime, transport, manifest_path);
				self.phase = Phase::Loading { renderer, task };
			}
			other => {
				warn!("begin_load on an avatar that is already past Uninitialized, ignored");
				self.phase = other;
			}
		}
	}

	/// One frame of animation: advances the load state machine without
	/// blocking, then updates and deforms when Ready. Never raises; per-frame
	/// problems stay in the log.
	pub fn tick(&mut self, dt: f32) {
		self.poll();
		if let Phase::Ready(live) = &mut self.phase {
			live.update(self.pointer.pos(), dt);
		}
	}

	/// Submits the current deformed mesh. Skips silently unless Ready, so
	/// hosts may call it from the first frame on.
	pub fn draw(&mut self, viewport: UVec2) {
		if let Phase::Ready(live) = &mut self.phase {
			live.renderer.draw_frame(viewport, &live.buffers);
		}
	}

	/// Tears the avatar down in any state. An in-flight load is cancelled
	/// and its late result discarded; the renderer (and with it every GPU
	/// resource) is dropped exactly once.
	pub fn dispose(&mut self) {
		if let Phase::Loading { task, .. } = &self.phase {
			task.cancel();
		}
		if !matches!(self.phase, Phase::Disposed) {
			self.phase = Phase::Disposed;
			info!("avatar disposed");
		}
	}

	pub fn textures_bound(&self) -> Option<usize> {
		match &self.phase {
			Phase::Ready(live) => Some(live.textures_bound),
			_ => None,
		}
	}

	pub fn has_physics(&self) -> bool {
		matches!(&self.phase, Phase::Ready(live) if live.physics.is_some())
	}

	/// Current parameter values, Ready only.
	pub fn params(&self) -> Option<&ParamSet> {
		match &self.phase {
			Phase::Ready(live) => Some(&live.params),
			_ => None,
		}
	}

	pub fn load_error(&self) -> Option<&LoadError> {
		match &self.phase {
			Phase::Failed(e) => Some(e),
			_ => None,
		}
	}

	/// The renderer handle, for host-side drawing around the avatar (clear,
	/// camera). Gone once Failed or Disposed.
	pub fn renderer_mut(&mut self) -> Option<&mut R> {
		match &mut self.phase {
			Phase::Uninitialized { renderer } | Phase::Loading { renderer, .. } => Some(renderer),
			Phase::Ready(live) => Some(&mut live.renderer),
			Phase::Failed(_) | Phase::Disposed => None,
		}
	}

	fn poll(&mut self) {
		let result = match &self.phase {
			Phase::Loading { task, .. } => match task.poll() {
				Some(result) => result,
				None => return,
			},
			_ => return,
		};

		let renderer = match std::mem::replace(&mut self.phase, Phase::Disposed) {
			Phase::Loading { renderer, .. } => renderer,
			_ => unreachable!("checked above"),
		};

		self.phase = match result {
			Ok(assets) => Self::finish_load(renderer, assets, self.config.clone()),
			Err(e) => {
				warn!("model load failed: {e}");
				Phase::Failed(e)
			}
		};
	}

	/// The Ready transition: renderer upload plus generator wiring. Runs on
	/// the driving thread because the GPU context lives there.
	fn finish_load(mut renderer: R, assets: ModelAssets, config: AnimatorConfig) -> Phase<R> {
		if let Err(e) = renderer.prepare(&assets.rig, &assets.textures) {
			warn!("renderer rejected model: {e}");
			return Phase::Failed(LoadError::Renderer(e.to_string()));
		}

		let rig = assets.rig;
		let buffers = rig.build_buffers();
		let params = ParamSet::new(&rig);
		let animator = Animator::new(&rig, config);
		let physics = assets.physics.map(|settings| SpringPhysics::new(&settings, &rig));

		info!(
			params = params.len(),
			textures = assets.textures.len(),
			physics = physics.is_some(),
			"model ready"
		);

		Phase::Ready(Box::new(Live {
			rig,
			buffers,
			params,
			animator,
			physics,
			renderer,
			textures_bound: assets.textures.len(),
		}))
	}
}

impl<R: RigRenderer> PointerTarget for Avatar<R> {
	fn set_pointer(&mut self, x: f32, y: f32) {
		self.pointer.set(x, y);
	}
}

#[cfg(test)]
mod tests {
	use std::convert::Infallible;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Arc;
	use std::time::Duration;

	use glam::uvec2;

	use super::*;
	use crate::animator::{PARAM_EYE_BALL_X, PARAM_EYE_BALL_Y};
	use crate::loader::testutil::{bundle, bundle_with_physics, StallingTransport, MANIFEST_PATH};
	use crate::texture::ShallowTexture;

	/// Counts calls instead of talking to a GPU.
	#[derive(Default)]
	struct NullRenderer {
		prepared: Arc<AtomicUsize>,
		draws: Arc<AtomicUsize>,
	}

	impl RigRenderer for NullRenderer {
		type Error = Infallible;

		fn prepare(&mut self, _rig: &Rig, _textures: &[ShallowTexture]) -> Result<(), Infallible> {
			self.prepared.fetch_add(1, Ordering::SeqCst);
			Ok(())
		}

		fn draw_frame(&mut self, _viewport: UVec2, _buffers: &RigBuffers) {
			self.draws.fetch_add(1, Ordering::SeqCst);
		}
	}

	fn wait_past_loading<R: RigRenderer>(avatar: &mut Avatar<R>) {
		for _ in 0..2000 {
			avatar.tick(1.0 / 60.0);
			if avatar.state() != AvatarState::Loading {
				return;
			}
			std::thread::sleep(Duration::from_millis(1));
		}
		panic!("load did not settle in time");
	}

	#[test]
	fn full_lifecycle_reaches_ready_and_draws() {
		let runtime = Runtime::start();
		let renderer = NullRenderer::default();
		let (prepared, draws) = (renderer.prepared.clone(), renderer.draws.clone());
		let mut avatar = Avatar::new(&runtime, renderer);
		assert_eq!(avatar.state(), AvatarState::Uninitialized);

		// not loaded yet: both are no-ops
		avatar.tick(1.0 / 60.0);
		avatar.draw(uvec2(640, 480));
		assert_eq!(draws.load(Ordering::SeqCst), 0);

		avatar.begin_load(bundle(), MANIFEST_PATH);
		assert_eq!(avatar.state(), AvatarState::Loading);

		wait_past_loading(&mut avatar);
		assert_eq!(avatar.state(), AvatarState::Ready);
		assert_eq!(prepared.load(Ordering::SeqCst), 1);
		assert_eq!(avatar.textures_bound(), Some(2));
		assert!(!avatar.has_physics());
		assert!(avatar.params().unwrap().len() > 0);

		avatar.draw(uvec2(640, 480));
		assert_eq!(draws.load(Ordering::SeqCst), 1);

		avatar.dispose();
		assert_eq!(avatar.state(), AvatarState::Disposed);

		// post-dispose calls stay no-ops
		avatar.tick(1.0 / 60.0);
		avatar.draw(uvec2(640, 480));
		assert_eq!(draws.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn physics_bundle_reports_has_physics() {
		let runtime = Runtime::start();
		let mut avatar = Avatar::new(&runtime, NullRenderer::default());
		avatar.begin_load(bundle_with_physics(), MANIFEST_PATH);
		wait_past_loading(&mut avatar);

		assert_eq!(avatar.state(), AvatarState::Ready);
		assert!(avatar.has_physics());
		assert_eq!(avatar.textures_bound(), Some(1));
	}

	#[test]
	fn corrupt_rig_fails_without_touching_the_gpu() {
		let runtime = Runtime::start();
		let mut files = bundle();
		files.0.insert("assets/avatar.moc3".to_owned(), b"garbage".to_vec());

		let renderer = NullRenderer::default();
		let (prepared, draws) = (renderer.prepared.clone(), renderer.draws.clone());
		let mut avatar = Avatar::new(&runtime, renderer);
		avatar.begin_load(files, MANIFEST_PATH);
		wait_past_loading(&mut avatar);

		assert_eq!(avatar.state(), AvatarState::Failed);
		assert!(matches!(avatar.load_error(), Some(LoadError::CorruptModel(_))));
		assert_eq!(avatar.textures_bound(), None);
		// the GPU side was never touched, and never will be
		avatar.draw(uvec2(640, 480));
		assert_eq!(prepared.load(Ordering::SeqCst), 0);
		assert_eq!(draws.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn dispose_during_load_discards_the_result() {
		let runtime = Runtime::start();
		let mut avatar = Avatar::new(&runtime, NullRenderer::default());
		avatar.begin_load(StallingTransport, MANIFEST_PATH);
		assert_eq!(avatar.state(), AvatarState::Loading);

		avatar.dispose();
		assert_eq!(avatar.state(), AvatarState::Disposed);

		// the cancelled worker's late error has nowhere to go; ticks stay quiet
		std::thread::sleep(Duration::from_millis(20));
		avatar.tick(1.0 / 60.0);
		assert_eq!(avatar.state(), AvatarState::Disposed);
	}

	#[test]
	fn gaze_follows_pointer_and_leave_resets_it() {
		let runtime = Runtime::start();
		let mut avatar = Avatar::new(&runtime, NullRenderer::default());
		avatar.begin_load(bundle(), MANIFEST_PATH);
		wait_past_loading(&mut avatar);

		avatar.set_pointer(1.0, -1.0);
		avatar.tick(1.0 / 60.0);
		let params = avatar.params().unwrap();
		assert_eq!(params.get(PARAM_EYE_BALL_X), Some(0.6));
		assert_eq!(params.get(PARAM_EYE_BALL_Y), Some(0.6));

		// pointer leave: the collaborator sends the neutral sample
		avatar.set_pointer(0.0, 0.0);
		avatar.tick(1.0 / 60.0);
		let params = avatar.params().unwrap();
		assert_eq!(params.get(PARAM_EYE_BALL_X), Some(0.0));
		assert_eq!(params.get(PARAM_EYE_BALL_Y), Some(0.0));
	}

	#[test]
	fn second_begin_load_is_ignored() {
		let runtime = Runtime::start();
		let mut avatar = Avatar::new(&runtime, NullRenderer::default());
		avatar.begin_load(bundle(), MANIFEST_PATH);
		wait_past_loading(&mut avatar);
		assert_eq!(avatar.state(), AvatarState::Ready);

		avatar.begin_load(bundle(), MANIFEST_PATH);
		assert_eq!(avatar.state(), AvatarState::Ready);
	}
}

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::info;

static ACTIVE: AtomicUsize = AtomicUsize::new(0);

/// Explicit initialization token for the animation runtime. The loader
/// requires one, which pins the runtime for as long as loads and models hold
/// a clone; full shutdown happens when the last handle drops.
#[derive(Clone)]
pub struct Runtime {
	_guard: Arc<Guard>,
}

struct Guard;

impl Runtime {
	pub fn start() -> Self {
		if ACTIVE.fetch_add(1, Ordering::SeqCst) == 0 {
			info!("animation runtime started");
		}
		Self {
			_guard: Arc::new(Guard),
		}
	}

	/// Number of started runtimes still alive.
	pub fn active() -> usize {
		ACTIVE.load(Ordering::SeqCst)
	}
}

impl Drop for Guard {
	fn drop(&mut self) {
		if ACTIVE.fetch_sub(1, Ordering::SeqCst) == 1 {
			info!("animation runtime shut down");
		}
	}
}

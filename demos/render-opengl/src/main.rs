use std::error::Error;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use glam::{uvec2, Vec2};
use glutin::surface::GlSurface;
use tracing::info;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::ControlFlow;
use winit::keyboard::{KeyCode, PhysicalKey};

use ayatsuri2d::loader::FsTransport;
use ayatsuri2d::model::{Avatar, AvatarState};
use ayatsuri2d::runtime::Runtime;
use ayatsuri2d::tracking::PointerTarget;
use ayatsuri2d_opengl::OpenglRenderer;

use opengl::{launch_opengl_window, App};

mod opengl;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
	#[arg(help = "Path to the model manifest (.model3.json)")]
	manifest: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
	let cli = Cli::parse();

	tracing_subscriber::registry()
		.with(fmt::layer())
		.with(LevelFilter::INFO)
		.init();

	info!("Setting up windowing and OpenGL");
	let App {
		gl,
		gl_ctx,
		gl_surface,
		gl_display,
		events,
		window,
	} = launch_opengl_window()?;

	let mut renderer = OpenglRenderer::new(gl)?;
	renderer.camera.scale = Vec2::splat(0.15);

	let runtime = Runtime::start();
	let mut avatar = Avatar::new(&runtime, renderer);
	avatar.begin_load(FsTransport, &cli.manifest.to_string_lossy());
	info!("Loading model in the background");

	let mut viewport = {
		let size = window.inner_size();
		uvec2(size.width, size.height)
	};
	let mut was_loading = true;
	let mut last_frame = Instant::now();

	events.run(move |event, elwt| {
		// They need to be present
		let _gl_display = &gl_display;
		elwt.set_control_flow(ControlFlow::Wait);

		match event {
			Event::WindowEvent {
				event: WindowEvent::RedrawRequested,
				..
			} => {
				let now = Instant::now();
				let dt = (now - last_frame).as_secs_f32();
				last_frame = now;

				avatar.tick(dt);
				if was_loading && avatar.state() == AvatarState::Ready {
					info!("Model ready");
					was_loading = false;
				}

				// host owns the clear; the avatar only submits its mesh
				if let Some(renderer) = avatar.renderer_mut() {
					renderer.clear();
				}
				avatar.draw(viewport);

				gl_surface.swap_buffers(&gl_ctx).unwrap();
				window.request_redraw();
			}
			Event::WindowEvent { ref event, .. } => match event {
				WindowEvent::CursorMoved { position, .. } => {
					let size = window.inner_size();
					let x = (position.x as f32 / size.width as f32) * 2.0 - 1.0;
					let y = (1.0 - position.y as f32 / size.height as f32) * 2.0 - 1.0;
					avatar.set_pointer(x, y);
				}
				WindowEvent::CursorLeft { .. } => {
					avatar.set_pointer(0.0, 0.0);
				}
				WindowEvent::Resized(physical_size) => {
					viewport = uvec2(physical_size.width, physical_size.height);
					gl_surface.resize(
						&gl_ctx,
						NonZeroU32::new(physical_size.width.max(1)).unwrap(),
						NonZeroU32::new(physical_size.height.max(1)).unwrap(),
					);
					window.request_redraw();
				}
				WindowEvent::CloseRequested
				| WindowEvent::KeyboardInput {
					event:
						KeyEvent {
							state: ElementState::Pressed,
							physical_key: PhysicalKey::Code(KeyCode::Escape),
							..
						},
					..
				} => {
					avatar.dispose();
					elwt.exit();
				}
				_ => (),
			},
			Event::AboutToWait => {
				window.request_redraw();
			}
			_ => (),
		}
	})?;
	Ok(())
}

use crate::config::DemoConfig;
use crate::error::{DemoError, Result};
use crate::renderer::{RenderOutput, Renderer};
use crate::scene::{animation_time, Scene};
use crate::stats::FrameStats;
use rand::rngs::ThreadRng;
use std::{sync::Arc, time::Instant};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum KeyAction {
    Exit,
    Step,
    Ignore,
}

/// Every press, auto-repeat included, steps the field; Escape quits.
fn key_action(key: PhysicalKey, state: ElementState) -> KeyAction {
    match (key, state) {
        (_, ElementState::Released) => KeyAction::Ignore,
        (PhysicalKey::Code(KeyCode::Escape), ElementState::Pressed) => KeyAction::Exit,
        (_, ElementState::Pressed) => KeyAction::Step,
    }
}

struct AppState {
    window: Arc<Window>,
    scene: Scene,
    renderer: Renderer,
}

pub struct App {
    config: DemoConfig,
    state: Option<AppState>,
    rng: ThreadRng,
    start: Instant,
    stats: FrameStats,
    error: Option<DemoError>,
}

impl App {
    pub fn new(config: DemoConfig) -> Self {
        let now = Instant::now();
        Self {
            config,
            state: None,
            rng: rand::thread_rng(),
            start: now,
            stats: FrameStats::new(now),
            error: None,
        }
    }

    /// The error that stopped the event loop, if any.
    pub fn take_error(&mut self) -> Option<DemoError> {
        self.error.take()
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<AppState> {
        let app_init_timestamp = Instant::now();
        let (width, height) = self.config.window_size;
        let attributes = Window::default_attributes()
            .with_title("noisy sphere")
            .with_inner_size(PhysicalSize::new(width, height))
            .with_transparent(self.config.params().transparent);
        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();
        let scene = Scene::new(&self.config, size.width, size.height, &mut self.rng);
        let renderer = pollster::block_on(Renderer::new(
            RenderOutput::Window(window.clone()),
            &scene,
        ))?;
        log::info!("app initialized in {:?}", app_init_timestamp.elapsed());
        Ok(AppState {
            window,
            scene,
            renderer,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: DemoError) {
        log::error!("{error}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn time(&self) -> f32 {
        animation_time(self.start.elapsed())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(state) => {
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let time = self.time();
        let Some(state) = self.state.as_mut() else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                state.renderer.resize(size.width, size.height);
                state.scene.resize(size.width, size.height);
                state.window.request_redraw();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key,
                        state: key_state,
                        ..
                    },
                ..
            } => match key_action(physical_key, key_state) {
                KeyAction::Exit => event_loop.exit(),
                KeyAction::Step => state.scene.keydown(physical_key, time, &mut self.rng),
                KeyAction::Ignore => {}
            },
            WindowEvent::RedrawRequested => {
                state.scene.animate(time, &mut self.rng);
                state.renderer.prepare(&state.scene);
                if let Err(e) = state.renderer.draw() {
                    self.fail(event_loop, e);
                    return;
                }
                if self.config.debug {
                    if let Some(fps) = self.stats.end_frame(Instant::now()) {
                        log::info!("{fps:.1} fps");
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }
}

/// Opens the window and runs the animation until it is closed.
pub fn run(config: DemoConfig) -> Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presses_step_the_field() {
        let key = PhysicalKey::Code(KeyCode::KeyA);
        assert_eq!(key_action(key, ElementState::Pressed), KeyAction::Step);
        // a held key keeps producing presses
        for _ in 0..3 {
            assert_eq!(key_action(key, ElementState::Pressed), KeyAction::Step);
        }
        assert_eq!(key_action(key, ElementState::Released), KeyAction::Ignore);
    }

    #[test]
    fn escape_exits() {
        let key = PhysicalKey::Code(KeyCode::Escape);
        assert_eq!(key_action(key, ElementState::Pressed), KeyAction::Exit);
        assert_eq!(key_action(key, ElementState::Released), KeyAction::Ignore);
    }
}

//! Host-agnostic viewer state
//!
//! [`Viewer`] owns the scene and everything that drives it: the navigation
//! rig, the pointer controller and the model load in flight. The winit app
//! feeds it window events and calls [`Viewer::tick`] once per frame; tests
//! drive it directly with synthetic events and a manual clock.

use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use winit::{
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::{
    config::{ImportConfig, ViewerConfig},
    gfx::{
        camera::{CameraController, NavigationRig},
        loader::{LoadEvent, LoadHandle, ModelLoader},
        scene::{painter, Scene},
    },
};

/// Where the room model load stands
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Idle,
    Loading(f32),
    Loaded(String),
    Failed(String),
}

/// HUD text produced by one tick
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub position: String,
    pub rotation: String,
}

/// Measures the time between consecutive frames.
///
/// The first tick after creation or [`FrameClock::reset`] reports zero.
#[derive(Debug, Default)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Seconds since the previous tick
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let elapsed = self
            .last
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last = Some(now);
        elapsed.as_secs_f32()
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

pub struct Viewer {
    pub scene: Scene,
    pub rig: NavigationRig,
    pub pointer: CameraController,
    import: ImportConfig,
    asset_path: PathBuf,
    loader: Option<LoadHandle>,
    status: LoadStatus,
}

impl Viewer {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            scene: Scene::new(config),
            rig: NavigationRig::new(&config.navigation, &config.camera),
            pointer: CameraController::new(config.navigation.drag_sensitivity),
            import: config.import,
            asset_path: config.asset_path.clone(),
            loader: None,
            status: LoadStatus::Idle,
        }
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    /// Starts loading the configured asset in the background
    pub fn start_loading(&mut self) {
        log::info!("Loading {}", self.asset_path.display());
        self.loader = Some(ModelLoader::load(&self.asset_path));
        self.status = LoadStatus::Loading(0.0);
    }

    /// Applies every load event that has arrived since the last call
    pub fn poll_loader(&mut self) {
        let Some(handle) = self.loader.as_mut() else {
            return;
        };
        let mut events = Vec::new();
        while let Some(event) = handle.poll_event() {
            events.push(event);
        }
        if handle.is_finished() {
            log::debug!("Load of {} finished", handle.path().display());
            self.loader = None;
        }
        for event in events {
            self.handle_load_event(event);
        }
    }

    /// Applies one load outcome to the scene.
    ///
    /// A loaded model is recentered, rescaled, painted and added to the room
    /// group. Failures only change the status.
    pub fn handle_load_event(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Progress(fraction) => {
                log::debug!("Loading: {:.0}%", fraction * 100.0);
                self.status = LoadStatus::Loading(fraction);
            }
            LoadEvent::Loaded(mut model) => {
                model.normalize(&self.import);
                painter::paint_model(&mut model);
                log::info!(
                    "Loaded '{}': {} meshes, {} vertices, scale {}",
                    model.name,
                    model.meshes.len(),
                    model.vertex_count(),
                    model.scale
                );
                self.status = LoadStatus::Loaded(model.name.clone());
                self.scene.room.add(model);
            }
            LoadEvent::Failed(error) => {
                log::error!("Error loading model: {}", error);
                self.status = LoadStatus::Failed(error.to_string());
            }
        }
    }

    pub fn key_down(&mut self, key: KeyCode) -> bool {
        self.rig.key_down(key)
    }

    pub fn key_up(&mut self, key: KeyCode) -> bool {
        self.rig.key_up(key)
    }

    /// Routes keyboard and pointer input.
    ///
    /// Returns true when the event changed viewer state.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state,
                        ..
                    },
                ..
            } => match state {
                ElementState::Pressed => self.key_down(*key_code),
                ElementState::Released => self.key_up(*key_code),
            },
            // Releasing keys while unfocused never reaches us
            WindowEvent::Focused(false) => {
                self.rig.flags.clear();
                true
            }
            _ => self
                .pointer
                .process_events(event, &mut self.scene.room, &mut self.scene.controls),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        self.scene.resize(width, height)
    }

    /// Sends the camera home
    pub fn reset(&mut self) {
        log::debug!("Resetting camera");
        self.rig.reset(&mut self.scene.camera, &mut self.scene.controls);
        self.scene.update();
    }

    /// Advances the viewer by `dt` seconds
    pub fn tick(&mut self, dt: f32) -> FrameReport {
        self.poll_loader();
        self.rig
            .update(dt, &mut self.scene.camera, &mut self.scene.controls);
        self.scene.update();
        self.report()
    }

    pub fn report(&self) -> FrameReport {
        let position = self.scene.camera.position;
        FrameReport {
            position: format!("x:{:.2} y:{:.2} z:{:.2}", position.x, position.y, position.z),
            rotation: format!("rotY:{:.2}", self.rig.yaw()),
        }
    }
}

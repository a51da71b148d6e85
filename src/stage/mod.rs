//! Stage Module
//!
//! [`Stage`] binds the animation scheduler, the orbit camera and the load
//! pipeline together behind a single inbound API and an outbound event
//! stream.
//!
//! # Architecture
//!
//! - **State**: all shared data lives in one `StageState` behind an
//!   `Arc<parking_lot::Mutex<_>>`. The load worker only writes it while
//!   holding the lock; the frame loop only reads and advances it while holding
//!   the lock.
//! - **Loading**: [`LoadPipeline`] runs one background thread per request and
//!   interrupts/joins the previous run before starting a new one.
//! - **Events**: every notification is published as a [`StageEvent`] on a
//!   `flume` channel; sends never block.
//!
//! # Example
//!
//! ```rust,ignore
//! use stage::{Stage, StageSettings, PlayOptions};
//!
//! let stage = Stage::new(StageSettings::default(), my_loader);
//! stage.set_root_source("models/truck.glb")?;
//!
//! loop {
//!     if let Some(frame) = stage.advance(clock.now()) {
//!         renderer.draw(frame.view, frame.root);
//!     }
//!     for event in stage.events().try_iter() {
//!         ui.notify(event);
//!     }
//! }
//! ```

mod events;
mod metrics;
mod state;

pub use events::{LoadStatus, StageEvent};
pub use metrics::{Decoration, RootTransform, StageMetrics};
pub use state::FrameOutput;

use state::StageState;

use std::sync::Arc;

use glam::DMat4;
use parking_lot::Mutex;

use crate::animation::PlayOptions;
use crate::assets::{LoadPipeline, SceneSource};
use crate::camera::{CameraEvent, FlyPath, FlyPathDesc, HomePose, OrbitPose};
use crate::errors::Result;
use crate::settings::StageSettings;

/// The choreography facade driven by a viewer's frame loop.
///
/// # Lifecycle
///
/// 1. Create with [`Stage::new`]
/// 2. Request content with [`Stage::set_root_source`]
/// 3. Call [`Stage::advance`] once per frame
/// 4. Drain [`Stage::events`]
///
/// Dropping the stage interrupts and joins any load in flight.
pub struct Stage {
    state: Arc<Mutex<StageState>>,
    pipeline: Mutex<LoadPipeline>,
    events: flume::Receiver<StageEvent>,
    fly_descs: Mutex<Vec<FlyPathDesc>>,
}

impl Stage {
    /// Creates a stage that loads content through `source`.
    pub fn new(settings: StageSettings, source: impl SceneSource + 'static) -> Self {
        Self::with_source(settings, Arc::new(source))
    }

    pub fn with_source(settings: StageSettings, source: Arc<dyn SceneSource>) -> Self {
        let (sender, receiver) = flume::unbounded();
        Self {
            state: Arc::new(Mutex::new(StageState::new(settings, sender))),
            pipeline: Mutex::new(LoadPipeline::new(source)),
            events: receiver,
            fly_descs: Mutex::new(Vec::new()),
        }
    }

    /// Outbound notifications.
    #[must_use]
    pub fn events(&self) -> &flume::Receiver<StageEvent> {
        &self.events
    }

    /// Takes every pending notification.
    #[must_use]
    pub fn drain_events(&self) -> Vec<StageEvent> {
        self.events.try_iter().collect()
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Requests new content. Requesting the current source again is ignored;
    /// use [`reload`](Self::reload) to force a new run.
    pub fn set_root_source(&self, uri: &str) -> Result<()> {
        {
            let mut state = self.state.lock();
            if state.source_uri.as_deref() == Some(uri) {
                log::debug!("Source '{uri}' already requested");
                return Ok(());
            }
            state.source_uri = Some(uri.to_string());
        }
        self.start_load(uri)
    }

    /// Loads the current source again. Does nothing without a source.
    pub fn reload(&self) -> Result<()> {
        let uri = self.state.lock().source_uri.clone();
        match uri {
            Some(uri) => self.start_load(&uri),
            None => Ok(()),
        }
    }

    fn start_load(&self, uri: &str) -> Result<()> {
        let mut pipeline = self.pipeline.lock();

        // The previous run must be gone before the status flips to Loading.
        pipeline.cancel();
        self.state.lock().set_status(LoadStatus::Loading);

        let shared = Arc::clone(&self.state);
        let owned_uri = uri.to_string();
        let requested = pipeline.request(uri, move |result, token| {
            let mut state = shared.lock();
            if token.is_cancelled() {
                return;
            }
            state.apply_load(&owned_uri, result);
        });

        if let Err(e) = &requested {
            log::error!("Could not start loading '{uri}': {e}");
            self.state
                .lock()
                .set_status(LoadStatus::Failed(format!("Failed to load model: {e}")));
        }
        requested
    }

    /// Blocks until the load in flight has been merged or dropped.
    pub fn wait_for_load(&self) {
        self.pipeline.lock().wait();
    }

    #[must_use]
    pub fn load_status(&self) -> LoadStatus {
        self.state.lock().status.clone()
    }

    #[must_use]
    pub fn source_uri(&self) -> Option<String> {
        self.state.lock().source_uri.clone()
    }

    // ========================================================================
    // Animation
    // ========================================================================

    /// Fails when the content exposes no animation manager or the index is
    /// out of range.
    pub fn play(&self, index: usize, options: PlayOptions) -> bool {
        let mut state = self.state.lock();
        let Some(manager) = state.animations.as_mut() else {
            log::warn!("play: no animation manager");
            return false;
        };
        if !manager.play(index, options) {
            return false;
        }
        state.set_running(index, true);
        true
    }

    pub fn play_by_name(&self, name: &str, options: PlayOptions) -> bool {
        match self.clip_index(name) {
            Some(index) => self.play(index, options),
            None => {
                log::warn!("play: no clip named '{name}'");
                false
            }
        }
    }

    pub fn stop(&self, index: usize, reset: bool) -> bool {
        let mut state = self.state.lock();
        let Some(manager) = state.animations.as_mut() else {
            log::warn!("stop: no animation manager");
            return false;
        };
        if !manager.stop(index, reset) {
            return false;
        }
        state.set_running(index, false);
        true
    }

    pub fn stop_by_name(&self, name: &str, reset: bool) -> bool {
        match self.clip_index(name) {
            Some(index) => self.stop(index, reset),
            None => {
                log::warn!("stop: no clip named '{name}'");
                false
            }
        }
    }

    pub fn stop_all(&self, reset: bool) -> bool {
        let mut state = self.state.lock();
        let Some(manager) = state.animations.as_mut() else {
            return false;
        };
        manager.stop_all(reset);
        let was_running: Vec<usize> = state
            .clip_running
            .iter()
            .enumerate()
            .filter_map(|(index, running)| running.then_some(index))
            .collect();
        for index in was_running {
            state.set_running(index, false);
        }
        true
    }

    #[must_use]
    pub fn animation_list(&self) -> Vec<String> {
        self.state.lock().clip_names.clone()
    }

    #[must_use]
    pub fn clip_running(&self, index: usize) -> bool {
        self.state.lock().clip_running.get(index).copied().unwrap_or(false)
    }

    fn clip_index(&self, name: &str) -> Option<usize> {
        self.state.lock().clip_names.iter().position(|n| n == name)
    }

    // ========================================================================
    // Camera
    // ========================================================================

    pub fn play_fly(&self, index: usize) -> bool {
        let mut state = self.state.lock();
        if !state.camera.play_fly(index) {
            return false;
        }
        state.emit(StageEvent::FlyIndexChanged(Some(index)));
        true
    }

    pub fn play_fly_by_name(&self, name: &str) -> bool {
        let index = self.fly_descs.lock().iter().position(|desc| desc.name == name);
        match index {
            Some(index) => self.play_fly(index),
            None => {
                log::warn!("play_fly: no fly path named '{name}'");
                false
            }
        }
    }

    pub fn stop_fly(&self) -> bool {
        let mut state = self.state.lock();
        if !state.camera.stop_fly() {
            return false;
        }
        state.emit(StageEvent::FlyIndexChanged(None));
        true
    }

    #[must_use]
    pub fn fly_index(&self) -> Option<usize> {
        self.state.lock().camera.fly_index()
    }

    /// Feeds a gesture to the camera. Returns `true` if the pose changed.
    pub fn handle_camera(&self, event: CameraEvent) -> bool {
        self.state.lock().camera.handle(event)
    }

    pub fn home(&self) {
        self.state.lock().camera.home();
    }

    #[must_use]
    pub fn camera_pose(&self) -> OrbitPose {
        self.state.lock().camera.pose()
    }

    /// Configures the home pose and moves the camera there.
    pub fn set_home_pose(&self, home: HomePose) {
        let mut state = self.state.lock();
        if state.home_pose == Some(home) {
            return;
        }
        state.home_pose = Some(home);
        state.camera.set_home(home);
        state.camera.home();
        state.emit(StageEvent::HomePoseChanged(home));
    }

    /// Replaces the fly path list. Any active fly is stopped.
    pub fn set_fly_paths(&self, descs: Vec<FlyPathDesc>) {
        let mut current = self.fly_descs.lock();
        if *current == descs {
            return;
        }
        let paths: Vec<FlyPath> = descs.iter().map(FlyPath::from).collect();
        log::debug!("Installing {} fly paths", paths.len());
        *current = descs;

        let mut state = self.state.lock();
        let was_flying = state.camera.fly_index().is_some();
        state.camera.set_fly_paths(paths);
        if was_flying {
            state.emit(StageEvent::FlyIndexChanged(None));
        }
    }

    // ========================================================================
    // Scene setup
    // ========================================================================

    pub fn set_root_transform(&self, transform: RootTransform) {
        let mut state = self.state.lock();
        if state.root_transform == transform {
            return;
        }
        state.root_transform = transform;
        state.update_root_matrix();
        let root = state.root_matrix;
        state.emit(StageEvent::RootTransformChanged(root));
    }

    /// Registers a decoration. If content is already loaded it is configured
    /// right away.
    pub fn add_decoration(&self, mut decoration: Box<dyn Decoration>) {
        let mut state = self.state.lock();
        if let Some(metrics) = state.metrics {
            decoration.reconfigure(&metrics);
        }
        state.decorations.push(decoration);
    }

    #[must_use]
    pub fn vector_size(&self) -> Option<f64> {
        self.state.lock().vector_size
    }

    #[must_use]
    pub fn metrics(&self) -> Option<StageMetrics> {
        self.state.lock().metrics
    }

    #[must_use]
    pub fn root_matrix(&self) -> DMat4 {
        self.state.lock().root_matrix
    }

    // ========================================================================
    // Frame
    // ========================================================================

    /// `false` while loading or after [`request_destroy`](Self::request_destroy).
    #[must_use]
    pub fn frame_allowed(&self) -> bool {
        self.state.lock().frame_allowed()
    }

    /// Stops frame processing for good.
    pub fn request_destroy(&self) {
        self.state.lock().destroy_requested = true;
    }

    /// Advances clips and camera to `time`. Returns `None` for a gated frame.
    pub fn advance(&self, time: f64) -> Option<FrameOutput> {
        let mut state = self.state.lock();
        if !state.frame_allowed() {
            return None;
        }
        Some(state.advance(time))
    }
}

use glam::{DMat4, DVec3};

use crate::animation::{AnimationClip, AnimationManager, FinishedClips};
use crate::assets::{Aabb, LoadedScene};
use crate::camera::{HomePose, OrbitManipulator};
use crate::errors::{Result, StageError};
use crate::settings::StageSettings;
use crate::stage::events::{LoadStatus, StageEvent};
use crate::stage::metrics::{Decoration, RootTransform, StageMetrics};

/// Everything the frame loop and the load worker share.
///
/// Lives behind the stage mutex; the worker only writes it through
/// [`apply_load`](Self::apply_load).
pub struct StageState {
    pub(crate) settings: StageSettings,

    pub(crate) source_uri: Option<String>,
    pub(crate) status: LoadStatus,
    pub(crate) bounds: Aabb,
    pub(crate) vector_size: Option<f64>,
    pub(crate) metrics: Option<StageMetrics>,

    pub(crate) platform_translate: DVec3,
    pub(crate) root_transform: RootTransform,
    pub(crate) root_matrix: DMat4,

    pub(crate) animations: Option<AnimationManager>,
    pub(crate) clip_names: Vec<String>,
    pub(crate) clip_running: Vec<bool>,

    pub(crate) camera: OrbitManipulator,
    /// Home pose configured from outside. `None` means "derive one per load".
    pub(crate) home_pose: Option<HomePose>,

    pub(crate) decorations: Vec<Box<dyn Decoration>>,
    pub(crate) destroy_requested: bool,

    events: flume::Sender<StageEvent>,
}

/// What one [`advance`](crate::stage::Stage::advance) produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    /// Camera-to-world matrix.
    pub camera: DMat4,
    pub view: DMat4,
    /// Transform of the loaded content.
    pub root: DMat4,
    pub finished_clips: FinishedClips,
    pub finished_fly: Option<usize>,
}

impl StageState {
    pub(crate) fn new(settings: StageSettings, events: flume::Sender<StageEvent>) -> Self {
        let mut camera = OrbitManipulator::new(settings.camera.clone());
        let fly_events = events.clone();
        camera.set_fly_finished_callback(move |index| {
            let _ = fly_events.send(StageEvent::FlyFinished(index));
            let _ = fly_events.send(StageEvent::FlyIndexChanged(None));
        });

        Self {
            settings,
            source_uri: None,
            status: LoadStatus::Idle,
            bounds: Aabb::EMPTY,
            vector_size: None,
            metrics: None,
            platform_translate: DVec3::ZERO,
            root_transform: RootTransform::default(),
            root_matrix: DMat4::IDENTITY,
            animations: None,
            clip_names: Vec::new(),
            clip_running: Vec::new(),
            camera,
            home_pose: None,
            decorations: Vec::new(),
            destroy_requested: false,
            events,
        }
    }

    pub(crate) fn emit(&self, event: StageEvent) {
        // The receiver lives in the stage; a send only fails while it is dropped.
        let _ = self.events.send(event);
    }

    pub(crate) fn set_status(&mut self, status: LoadStatus) {
        if self.status != status {
            self.status = status.clone();
            self.emit(StageEvent::LoadStateChanged(status));
        }
    }

    pub(crate) fn frame_allowed(&self) -> bool {
        !self.destroy_requested && !self.status.is_loading()
    }

    // ========================================================================
    // Load merge
    // ========================================================================

    /// Merges the result of a load run. Called with the stage mutex held.
    pub(crate) fn apply_load(&mut self, uri: &str, result: Result<LoadedScene>) {
        let scene = match result {
            Ok(scene) if scene.bounds.is_valid() => scene,
            Ok(_) => return self.fail_load(&StageError::EmptyScene(uri.to_string())),
            Err(e) => return self.fail_load(&e),
        };

        let bounds = scene.bounds;
        let size = bounds.size();
        let center = bounds.center();
        let vector_size = size.x.max(size.y).max(size.z);

        self.bounds = bounds;
        self.vector_size = Some(vector_size);
        self.platform_translate = DVec3::new(-center.x, -center.y, -center.z + size.z / 2.0);
        self.update_root_matrix();

        let metrics = StageMetrics::from_vector_size(vector_size, &self.settings.scale);
        for decoration in &mut self.decorations {
            log::debug!("Reconfiguring decoration '{}'", decoration.name());
            decoration.reconfigure(&metrics);
        }
        self.camera.set_limits(metrics.camera_limits);
        self.metrics = Some(metrics);

        self.install_animations(scene.animations);

        if self.home_pose.is_none() {
            self.camera
                .set_home(HomePose::for_vector_size(vector_size, &self.settings.scale));
        }
        self.camera.home();

        log::info!(
            "Loaded '{uri}': vector size {vector_size:.3}, {} clips",
            self.clip_names.len()
        );
        self.set_status(LoadStatus::Ready);
    }

    fn fail_load(&mut self, error: &StageError) {
        let message = format!("Failed to load model: {error}");
        log::error!("{message}");
        self.set_status(LoadStatus::Failed(message));
    }

    fn install_animations(&mut self, clips: Option<Vec<AnimationClip>>) {
        let Some(clips) = clips else {
            self.animations = None;
            self.clip_running.clear();
            if !self.clip_names.is_empty() {
                self.clip_names.clear();
                self.emit(StageEvent::AnimationListChanged(Vec::new()));
            }
            return;
        };

        let mut manager = AnimationManager::new(clips);
        let events = self.events.clone();
        manager.set_finished_callback(move |index| {
            let _ = events.send(StageEvent::ClipFinished(index));
            let _ = events.send(StageEvent::ClipStatusChanged { index, running: false });
        });

        let names = manager.clip_names();
        self.clip_running = vec![false; names.len()];
        self.animations = Some(manager);
        if names != self.clip_names {
            self.clip_names = names;
            self.emit(StageEvent::AnimationListChanged(self.clip_names.clone()));
        }
    }

    pub(crate) fn update_root_matrix(&mut self) {
        self.root_matrix = DMat4::from_translation(self.platform_translate) * self.root_transform.matrix();
    }

    // ========================================================================
    // Frame
    // ========================================================================

    pub(crate) fn advance(&mut self, time: f64) -> FrameOutput {
        let finished_clips = match self.animations.as_mut() {
            Some(manager) => manager.update(time),
            None => FinishedClips::new(),
        };
        for &index in &finished_clips {
            if let Some(running) = self.clip_running.get_mut(index) {
                *running = false;
            }
        }

        let finished_fly = self.camera.handle_frame(time);

        FrameOutput {
            camera: self.camera.matrix(),
            view: self.camera.view_matrix(),
            root: self.root_matrix,
            finished_clips,
            finished_fly,
        }
    }

    pub(crate) fn set_running(&mut self, index: usize, running: bool) {
        if let Some(flag) = self.clip_running.get_mut(index) {
            *flag = running;
            self.emit(StageEvent::ClipStatusChanged { index, running });
        }
    }
}

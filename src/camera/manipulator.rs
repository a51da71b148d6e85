use glam::{DMat4, DQuat, DVec3};

use crate::camera::event::{CameraEvent, ScrollDirection};
use crate::camera::fly::{ControlPoint, FlyPath};
use crate::camera::pose::{CameraLimits, HomePose, OrbitPose};
use crate::settings::CameraSettings;

/// Invoked with the index of a fly path when its playback completes.
pub type FlyFinishedCallback = Box<dyn FnMut(usize) + Send>;

/// Playback cursor of the active fly path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyCursor {
    pub index: Option<usize>,
    /// Samples taken since the last (re)start. `None` until the first sample
    /// latches the baselines.
    pub counter: Option<u64>,
    pub time_offset: f64,
    pub time_scale: f64,
    pub last_real_time: f64,
    pub last_path_time: f64,
}

impl FlyCursor {
    fn new(time_scale: f64) -> Self {
        Self {
            index: None,
            counter: None,
            time_offset: 0.0,
            time_scale,
            last_real_time: 0.0,
            last_path_time: 0.0,
        }
    }

    fn latch(&mut self, real_time: f64, path_time: f64) {
        self.last_real_time = real_time;
        self.last_path_time = path_time;
    }
}

/// Orbit camera that can be handed over to a fly path.
///
/// Interactive gestures move an [`OrbitPose`]; every gesture is applied to a
/// snapshot-and-restore cycle so the pose either satisfies the
/// [`CameraLimits`] afterwards or is exactly what it was before. While a fly
/// path is active, the sampled [`ControlPoint`] drives the camera matrix.
pub struct OrbitManipulator {
    settings: CameraSettings,
    pose: OrbitPose,
    limits: CameraLimits,
    home: HomePose,
    matrix: DMat4,

    fly_paths: Vec<FlyPath>,
    cursor: FlyCursor,
    fly_finished: Option<FlyFinishedCallback>,

    frame_time: f64,
    delta_frame_time: f64,
    last_motion: Option<CameraEvent>,
    thrown: bool,
}

impl OrbitManipulator {
    #[must_use]
    pub fn new(settings: CameraSettings) -> Self {
        let home = HomePose::default();
        let pose = home.to_pose();
        let cursor = FlyCursor::new(settings.fly_time_scale);
        Self {
            settings,
            pose,
            limits: CameraLimits::UNBOUNDED,
            home,
            matrix: pose.matrix(),
            fly_paths: Vec::new(),
            cursor,
            fly_finished: None,
            frame_time: 0.0,
            delta_frame_time: 0.0,
            last_motion: None,
            thrown: false,
        }
    }

    pub fn set_fly_finished_callback(&mut self, callback: impl FnMut(usize) + Send + 'static) {
        self.fly_finished = Some(Box::new(callback));
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Governs future clamping only; the current pose is left alone.
    pub fn set_limits(&mut self, limits: CameraLimits) {
        self.limits = limits;
    }

    #[must_use]
    pub fn limits(&self) -> CameraLimits {
        self.limits
    }

    pub fn set_home(&mut self, home: HomePose) {
        self.home = home;
    }

    /// Replaces the fly path list. An active fly is stopped.
    pub fn set_fly_paths(&mut self, paths: Vec<FlyPath>) {
        self.fly_paths = paths;
        self.cursor.index = None;
        self.cursor.counter = None;
    }

    #[must_use]
    pub fn fly_paths(&self) -> &[FlyPath] {
        &self.fly_paths
    }

    pub fn set_fly_time_scale(&mut self, scale: f64) {
        self.cursor.time_scale = scale;
    }

    /// Moves to the home pose and restarts the timing of an active fly.
    pub fn home(&mut self) {
        self.reset_fly();
        self.thrown = false;
        self.pose = self.home.to_pose();
        if self.cursor.index.is_none() {
            self.matrix = self.pose.matrix();
        }
    }

    // ========================================================================
    // Fly playback
    // ========================================================================

    /// Starts flying along path `index`.
    ///
    /// The current view is inserted as a control point at the lead-in time so
    /// playback departs smoothly from where the camera is.
    pub fn play_fly(&mut self, index: usize) -> bool {
        let point = self.fly_point();
        let lead_in = self.settings.fly_lead_in_time;
        let count = self.fly_paths.len();
        let Some(path) = self.fly_paths.get_mut(index) else {
            log::warn!("play_fly: no fly path at index {index} ({count} paths)");
            return false;
        };
        path.insert(lead_in, point);
        log::debug!("play_fly: '{}' ({index}), period {:.3}", path.name, path.period());

        self.cursor.index = Some(index);
        self.reset_fly();
        true
    }

    /// Returns `false` if no fly path was active.
    pub fn stop_fly(&mut self) -> bool {
        let was_active = self.active_path().is_some();
        self.cursor.index = None;
        was_active
    }

    #[must_use]
    pub fn fly_index(&self) -> Option<usize> {
        self.cursor.index
    }

    #[must_use]
    pub fn fly_cursor(&self) -> &FlyCursor {
        &self.cursor
    }

    fn active_path(&self) -> Option<&FlyPath> {
        self.cursor.index.and_then(|index| self.fly_paths.get(index))
    }

    fn reset_fly(&mut self) {
        self.cursor.time_offset = self
            .active_path()
            .map_or(0.0, |path| path.first_time() - self.frame_time);
        self.cursor.counter = None;
    }

    // ========================================================================
    // Event handling
    // ========================================================================

    /// Applies a gesture.
    ///
    /// Returns `true` if the pose changed. A result outside the limits is
    /// silently rolled back to the pose before the gesture.
    pub fn handle(&mut self, event: CameraEvent) -> bool {
        let snapshot = self.pose;

        match event {
            CameraEvent::Pan { .. } | CameraEvent::Zoom { .. } | CameraEvent::Orbit { .. } => {
                self.last_motion = Some(event);
                self.perform(event);
            }
            CameraEvent::Wheel(direction) => {
                let dy = match direction {
                    ScrollDirection::Up => -self.settings.wheel_zoom_factor,
                    ScrollDirection::Down => self.settings.wheel_zoom_factor,
                };
                self.zoom(dy, true);
            }
            CameraEvent::Push => {
                self.thrown = false;
                self.last_motion = None;
            }
            CameraEvent::Release { moving } => {
                self.thrown = moving
                    && self.settings.allow_throw
                    && self.last_motion.is_some_and(|motion| motion.is_motion());
            }
            CameraEvent::DumpPose => self.dump_pose(),
        }

        let changed = self.restore_if_outside(snapshot);
        if changed && self.cursor.index.is_none() {
            self.matrix = self.pose.matrix();
        }
        changed
    }

    /// Per-frame update.
    ///
    /// Returns the index of a fly path that finished during this frame.
    pub fn handle_frame(&mut self, time: f64) -> Option<usize> {
        if !self.pose.distance.is_nan() {
            self.matrix = self.pose.matrix();
        }
        self.delta_frame_time = time - self.frame_time;
        self.frame_time = time;

        if let Some(index) = self.cursor.index {
            return self.process_fly_frame(index, time);
        }

        if self.thrown
            && let Some(event) = self.last_motion
        {
            let snapshot = self.pose;
            self.perform(event);
            if self.restore_if_outside(snapshot) {
                self.matrix = self.pose.matrix();
            }
        }
        None
    }

    fn process_fly_frame(&mut self, index: usize, time: f64) -> Option<usize> {
        let path_time = (time + self.cursor.time_offset) * self.cursor.time_scale;
        let (point, period) = match self.fly_paths.get(index) {
            Some(path) => (path.sample(path_time), path.period()),
            None => {
                self.cursor.index = None;
                return None;
            }
        };

        if self.cursor.counter.is_none() {
            self.cursor.latch(time, path_time);
        }
        self.cursor.counter = Some(self.cursor.counter.map_or(1, |n| n + 1));

        let mut finished = None;
        if path_time - self.cursor.last_path_time >= period {
            self.cursor.index = None;
            self.cursor.latch(time, path_time);
            self.cursor.counter = Some(0);
            log::info!("Fly path {index} finished at {time:.3}");
            if let Some(callback) = self.fly_finished.as_mut() {
                callback(index);
            }
            finished = Some(index);
        }

        if let Some(point) = point {
            self.matrix = point.matrix();
            let follow = OrbitPose::from_matrix(&self.matrix, self.pose.distance);
            if follow.is_finite() && self.limits.contains(&follow) {
                self.pose = follow;
            }
        }
        finished
    }

    // ========================================================================
    // Gestures
    // ========================================================================

    fn perform(&mut self, event: CameraEvent) {
        match event {
            CameraEvent::Pan { dx, dy, dt } => {
                let scale = self.settings.pan_factor * self.pose.distance * self.throw_scale(dt);
                self.pan(dx * scale, dy * scale);
            }
            CameraEvent::Zoom { dy, dt } => {
                self.zoom(dy * self.throw_scale(dt), true);
            }
            CameraEvent::Orbit { dx, dy, .. } => self.orbit(dx, dy),
            _ => {}
        }
    }

    fn throw_scale(&self, dt: f64) -> f64 {
        if !self.thrown {
            return 1.0;
        }
        if dt == 0.0 { 0.0 } else { self.delta_frame_time / dt }
    }

    /// Moves the center in the camera plane.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.pose.center += self.pose.rotation * DVec3::new(dx, dy, 0.0);
    }

    /// Scales the distance by `1 + dy`. Below the zoom floor the center is
    /// pushed along the view direction instead when `push_forward` is set.
    pub fn zoom(&mut self, dy: f64, push_forward: bool) {
        let scale = 1.0 + dy;
        let floor = self.settings.zoom_floor;

        if self.pose.distance * scale > floor {
            self.pose.distance *= scale;
        } else if push_forward {
            let forward = self.pose.rotation * DVec3::NEG_Z;
            self.pose.center += forward * (dy * -self.pose.distance);
        } else {
            self.pose.distance = floor;
        }
    }

    /// Rotates around the world Z axis by `-dx` and around the camera's
    /// horizontal axis by `dy`; the pivot stays fixed.
    pub fn orbit(&mut self, dx: f64, dy: f64) {
        let up = DVec3::Z;
        let side = self.pose.rotation * DVec3::X;
        let forward = up.cross(side);
        let side = forward.cross(up).normalize_or_zero();

        let pitch = if side == DVec3::ZERO {
            DQuat::IDENTITY
        } else {
            DQuat::from_axis_angle(side, dy)
        };
        let yaw = DQuat::from_axis_angle(up, -dx);
        let delta = yaw * pitch;

        self.pose.rotation = (delta * self.pose.rotation).normalize();
        self.pose.center = delta * self.pose.center;
    }

    /// Restores `snapshot` if the current pose violates the limits.
    /// Returns `true` if the pose differs from the snapshot afterwards.
    fn restore_if_outside(&mut self, snapshot: OrbitPose) -> bool {
        if !self.limits.contains(&self.pose) {
            self.pose = snapshot;
            return false;
        }
        self.pose != snapshot
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn pose(&self) -> OrbitPose {
        self.pose
    }

    /// Replaces the orbit pose, subject to the limits.
    pub fn set_pose(&mut self, pose: OrbitPose) -> bool {
        let snapshot = self.pose;
        self.pose = pose;
        let changed = self.restore_if_outside(snapshot);
        if changed && self.cursor.index.is_none() {
            self.matrix = self.pose.matrix();
        }
        changed
    }

    /// Camera-to-world matrix of the last frame.
    #[must_use]
    pub fn matrix(&self) -> DMat4 {
        self.matrix
    }

    #[must_use]
    pub fn view_matrix(&self) -> DMat4 {
        self.matrix.inverse()
    }

    /// Current view as `(eye, center, up)`.
    #[must_use]
    pub fn home_point(&self) -> HomePose {
        HomePose::new(self.pose.eye(), self.pose.center, self.pose.up())
    }

    /// Current view as a control point with unit scale.
    #[must_use]
    pub fn fly_point(&self) -> ControlPoint {
        ControlPoint::new(self.pose.eye(), self.pose.rotation, DVec3::ONE)
    }

    #[must_use]
    pub fn home_pose(&self) -> HomePose {
        self.home
    }

    pub fn dump_pose(&self) {
        let home = self.home_point();
        let fly = self.fly_point();
        log::info!(
            "Home point: eye={:?} center={:?} up={:?}",
            home.eye,
            home.center,
            home.up
        );
        log::info!(
            "Fly point: position={:?} rotation={:?} scale={:?}",
            fly.position,
            fly.rotation,
            fly.scale
        );
    }
}

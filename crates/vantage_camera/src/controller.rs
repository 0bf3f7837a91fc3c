//! Animated view controller
//!
//! Owns the live camera pose and ties the pieces together:
//!
//! - inbound placement and trajectory requests fill the transition queue
//! - `update()` runs once per rendered frame, advances the animation and
//!   publishes pose, image and completion messages
//! - pointer input preempts any queued transition and moves the camera directly
//!
//! The live pose is stored in the attached frame. The render surface always
//! receives the camera in the fixed frame.

use crate::command::{CameraPlacement, CameraTrajectory, ControlFlags, PointStamped, Vector3Stamped};
use crate::config::ViewControllerConfig;
use crate::error::{Result, ViewError};
use crate::frames::{AttachmentState, FrameLookup};
use crate::input::{PointerEvent, PointerKind};
use crate::interaction::{Gesture, InteractionController, InteractionMode};
use crate::publish::{Outbound, StampedPose, ViewImage, ViewOutputs};
use crate::surface::{HeadlessSurface, RenderSurface, Viewport};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use vantage_animation::{AnimationDriver, ClockMode, Easing, TickOutcome, TimeSource};
use vantage_core::{Quat, RigidTransform, Vec3, ViewPose};

/// Class tag of [`AnimatedViewController`]
pub const ANIMATED_CLASS: &str = "vantage/Animated";
/// Class tag of orbit controllers, whose focus distance can be trusted
pub const ORBIT_CLASS: &str = "rviz/Orbit";

/// A camera controller another controller can take over from
pub trait ViewSource {
    /// Implementation tag, e.g. [`ORBIT_CLASS`]
    fn class_tag(&self) -> &str;

    /// Camera position and orientation (camera looks along -Z)
    fn camera(&self) -> RigidTransform;

    /// Distance to the focus point, when the controller tracks one
    fn focus_distance(&self) -> Option<f32> {
        None
    }

    /// Frame the source camera is attached to
    fn target_frame(&self) -> Option<&str> {
        None
    }

    /// Full eye/focus/up pose, for controllers that store one
    fn view_pose(&self) -> Option<ViewPose> {
        None
    }
}

/// Camera controller with queued, eased transitions
pub struct AnimatedViewController {
    config: ViewControllerConfig,
    pose: ViewPose,
    driver: AnimationDriver,
    attachment: AttachmentState,
    interaction: InteractionController,
    frames: Arc<dyn FrameLookup>,
    surface: Arc<dyn RenderSurface>,
    outputs: Arc<ViewOutputs>,
    mouse_enabled: bool,
    publish_view_images: bool,
    default_transition_time: f64,
    target_fps: u32,
    dragging: bool,
    /// Messages held back for delivery outside a lock; `None` publishes at once
    outbox: Option<Vec<Outbound>>,
}

impl AnimatedViewController {
    pub fn new(
        config: ViewControllerConfig,
        frames: Arc<dyn FrameLookup>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let mut attachment = AttachmentState::new(config.target_frame.clone());
        if !attachment.refresh(frames.as_ref(), SystemTime::now()) {
            tracing::warn!(
                "AnimatedViewController: frame {:?} not available yet, using identity",
                config.target_frame
            );
        }

        let mut pose = config.default_pose;
        if config.maintain_vertical_axis {
            pose.up = Vec3::UNIT_Z;
        }

        Self {
            pose,
            driver: AnimationDriver::with_queue_capacity(time, config.queue_capacity, config.queue_growth),
            attachment,
            interaction: InteractionController::from_config(&config),
            frames,
            surface: Arc::new(HeadlessSurface::default()),
            outputs: Arc::new(ViewOutputs::new(&config.topics)),
            mouse_enabled: config.mouse_enabled,
            publish_view_images: config.publish_view_images,
            default_transition_time: config.default_transition_time,
            target_fps: config.target_fps.max(1),
            dragging: false,
            outbox: None,
            config,
        }
    }

    /// Builder-style renderer
    pub fn with_surface(mut self, surface: Arc<dyn RenderSurface>) -> Self {
        self.surface = surface;
        self
    }

    /// Hold outbound messages until [`take_outbound`](Self::take_outbound)
    ///
    /// Subscribers then run wherever the caller delivers the messages, which
    /// lets them call back into a handle that wraps this controller.
    pub fn defer_outputs(&mut self) {
        if self.outbox.is_none() {
            self.outbox = Some(Vec::new());
        }
    }

    /// Drain the messages held back since the last call
    pub fn take_outbound(&mut self) -> Vec<Outbound> {
        self.outbox.as_mut().map(std::mem::take).unwrap_or_default()
    }

    fn emit(&mut self, message: Outbound) {
        match &mut self.outbox {
            Some(outbox) => outbox.push(message),
            None => {
                self.outputs.deliver(&message);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Queue a transition to `goal` (attached frame)
    ///
    /// A negative duration is rejected and nothing changes.
    pub fn begin_transition(&mut self, goal: ViewPose, duration_secs: f64, easing: Easing) -> Result<()> {
        self.driver
            .begin_transition(goal, duration_secs, easing, &self.pose)
            .map_err(|err| {
                tracing::warn!("AnimatedViewController: transition dropped: {}", err);
                ViewError::from(err)
            })
    }

    /// Flush every queued movement
    ///
    /// Publishes a completion notification if frame-by-frame playback was
    /// running; playback then reverts to wall-clock timing.
    pub fn cancel_transition(&mut self) {
        if self.driver.cancel() {
            self.emit(Outbound::Finished(true));
            tracing::debug!("AnimatedViewController: frame-by-frame playback cancelled");
        }
    }

    /// Delay playback by `duration`, without blocking
    pub fn request_pause(&mut self, duration: Duration) {
        self.driver.request_pause(duration);
    }

    /// Switch to frame-counted playback
    pub fn use_frame_counted(&mut self, target_fps: u32) {
        self.target_fps = target_fps.max(1);
        self.driver.use_frame_counted(self.target_fps);
    }

    pub fn use_wall_clock(&mut self) {
        self.driver.use_wall_clock();
    }

    /// Transition the focus to `point` (fixed frame), keeping the eye
    ///
    /// Ignored while pointer interaction is disabled.
    pub fn look_at(&mut self, point: Vec3) -> Result<()> {
        if !self.mouse_enabled {
            return Ok(());
        }
        let focus = self.attachment.fixed_to_attached(point);
        let goal = ViewPose::new(self.pose.eye, focus, self.pose.up);
        self.begin_transition(goal, self.default_transition_time, Easing::default())
    }

    /// Transition the eye to `point` (attached frame), keeping the focus
    pub fn orbit_camera_to(&mut self, point: Vec3) -> Result<()> {
        let goal = ViewPose::new(point, self.pose.focus, self.pose.up);
        self.begin_transition(goal, self.default_transition_time, Easing::default())
    }

    /// Transition the eye to `point` (attached frame), dragging the focus along
    pub fn move_eye_with_focus_to(&mut self, point: Vec3) -> Result<()> {
        let goal = ViewPose::new(point, self.pose.focus + (point - self.pose.eye), self.pose.up);
        self.begin_transition(goal, self.default_transition_time, Easing::default())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inbound commands
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply a placement request
    ///
    /// Control flags always apply. A failed reattachment or a negative
    /// `time_from_start` drops the movement.
    pub fn handle_placement(&mut self, placement: &CameraPlacement) -> Result<()> {
        self.apply_flags(placement.flags())?;

        if placement.time_from_start < 0.0 {
            tracing::warn!(
                "AnimatedViewController: placement with time_from_start {}s dropped",
                placement.time_from_start
            );
            return Err(ViewError::NegativeDuration(placement.time_from_start));
        }

        let goal = self.transform_stamped(&placement.eye, &placement.focus, &placement.up)?;
        tracing::debug!("AnimatedViewController: placement to {:?}", goal);
        self.begin_transition(goal, placement.time_from_start, Easing::default())
    }

    /// Apply a trajectory request
    ///
    /// Returns how many waypoints were queued. Waypoints with a negative
    /// duration or an unresolvable frame are skipped.
    pub fn handle_trajectory(&mut self, trajectory: &CameraTrajectory) -> Result<usize> {
        if trajectory.trajectory.is_empty() {
            return Ok(0);
        }

        self.apply_flags(trajectory.flags())?;

        if trajectory.render_frame_by_frame {
            self.use_frame_counted(trajectory.frames_per_second);
            self.publish_view_images = true;
            tracing::info!(
                "AnimatedViewController: rendering frame by frame at {} fps",
                self.target_fps
            );
        }

        let mut queued = 0;
        for (index, waypoint) in trajectory.trajectory.iter().enumerate() {
            if waypoint.transition_duration < 0.0 {
                tracing::warn!(
                    "AnimatedViewController: waypoint {} has duration {}s, skipping",
                    index,
                    waypoint.transition_duration
                );
                continue;
            }
            let goal = match self.transform_stamped(&waypoint.eye, &waypoint.focus, &waypoint.up) {
                Ok(goal) => goal,
                Err(err) => {
                    tracing::warn!("AnimatedViewController: waypoint {} skipped: {}", index, err);
                    continue;
                }
            };
            if self
                .begin_transition(goal, waypoint.transition_duration, waypoint.easing)
                .is_ok()
            {
                queued += 1;
            }
        }

        tracing::debug!(
            "AnimatedViewController: queued {}/{} waypoints",
            queued,
            trajectory.trajectory.len()
        );
        Ok(queued)
    }

    fn apply_flags(&mut self, flags: ControlFlags<'_>) -> Result<()> {
        self.mouse_enabled = !flags.interaction_disabled;
        self.set_maintain_vertical_axis(!flags.allow_free_yaw_axis);
        if let Some(mode) = flags.mode.mode() {
            self.interaction.set_mode(mode);
        }
        if !flags.target_frame.is_empty() && flags.target_frame != self.attachment.frame() {
            self.reattach(flags.target_frame)?;
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Frames
    // ─────────────────────────────────────────────────────────────────────────

    /// Attach the camera to `frame`
    ///
    /// The live pose and every queued movement are re-expressed so the camera
    /// does not jump. On failure nothing changes.
    pub fn reattach(&mut self, frame: &str) -> Result<()> {
        let change = self
            .attachment
            .reattach(frame, self.frames.as_ref(), SystemTime::now())
            .map_err(|err| {
                tracing::warn!("AnimatedViewController: reattach failed: {}", err);
                err
            })?;

        for movement in self.driver.queue_mut().iter_mut() {
            movement.map_pose(|pose| change.apply(pose));
        }
        self.pose = change.apply(&self.pose);
        if self.interaction.maintain_vertical_axis() {
            self.pose.up = Vec3::UNIT_Z;
        }

        tracing::info!("AnimatedViewController: attached to {:?}", frame);
        Ok(())
    }

    /// Express `pose`, given in `source_frame`, in the attached frame
    ///
    /// An empty `source_frame` means the attached frame.
    pub fn transform_external_pose(&self, pose: &ViewPose, source_frame: &str) -> Result<ViewPose> {
        let source = self
            .attachment
            .source_transform(source_frame, self.frames.as_ref(), SystemTime::now())?;
        Ok(self.attachment.import_pose(pose, &source))
    }

    /// Express a pose whose components each carry their own frame in the attached frame
    ///
    /// All three frames are resolved before anything is converted.
    pub fn transform_stamped(
        &self,
        eye: &PointStamped,
        focus: &PointStamped,
        up: &Vector3Stamped,
    ) -> Result<ViewPose> {
        let now = SystemTime::now();
        let lookup = self.frames.as_ref();
        let eye_frame = self.attachment.source_transform(&eye.frame_id, lookup, now)?;
        let focus_frame = self.attachment.source_transform(&focus.frame_id, lookup, now)?;
        let up_frame = self.attachment.source_transform(&up.frame_id, lookup, now)?;

        Ok(ViewPose::new(
            self.attachment.import_point(eye.point, &eye_frame),
            self.attachment.import_point(focus.point, &focus_frame),
            self.attachment.import_vector(up.vector, &up_frame),
        ))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Per-frame update
    // ─────────────────────────────────────────────────────────────────────────

    /// Advance one frame
    ///
    /// Returns the tick outcome while animating, `None` when idle.
    pub fn update(&mut self) -> Option<TickOutcome> {
        let now = SystemTime::now();
        self.attachment.refresh(self.frames.as_ref(), now);

        let outcome = self.driver.tick();
        if let Some(outcome) = &outcome {
            self.pose = outcome.pose;
            self.apply_camera();
            self.publish_pose(now);
            if self.publish_view_images {
                self.publish_view_image(now);
            }
            if outcome.finished {
                self.emit(Outbound::Finished(true));
                tracing::debug!("AnimatedViewController: transition queue drained");
            }
        } else {
            self.apply_camera();
        }
        outcome
    }

    fn apply_camera(&self) {
        let camera = self.fixed_camera();
        self.surface.apply_camera(camera.position, camera.orientation);
    }

    fn publish_pose(&mut self, stamp: SystemTime) {
        if !self.outputs.poses.has_subscribers() {
            return;
        }
        let message = StampedPose::from_view(self.attachment.frame(), stamp, &self.pose);
        self.emit(Outbound::Pose(message));
    }

    fn publish_view_image(&mut self, stamp: SystemTime) {
        if !self.outputs.images.has_subscribers() {
            return;
        }
        let Some(pixels) = self.surface.read_pixels() else {
            tracing::trace!("AnimatedViewController: surface returned no pixels");
            return;
        };
        match ViewImage::from_pixels(self.attachment.frame(), stamp, &pixels) {
            Some(image) => self.emit(Outbound::Image(image)),
            None => tracing::warn!(
                "AnimatedViewController: pixel buffer does not match {}x{}",
                pixels.width,
                pixels.height
            ),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Pointer input
    // ─────────────────────────────────────────────────────────────────────────

    /// Handle a pointer event
    ///
    /// Returns `false` if pointer interaction is disabled.
    pub fn handle_pointer(&mut self, event: &PointerEvent, viewport: &Viewport) -> bool {
        if !self.mouse_enabled {
            return false;
        }

        match event.kind {
            PointerKind::Press => {
                self.dragging = true;
                self.cancel_transition();
            }
            PointerKind::Release => self.dragging = false,
            _ => {}
        }

        let gestures = self
            .interaction
            .gestures(event, self.dragging, self.pose.distance(), viewport);
        if gestures.is_empty() {
            return true;
        }

        let moves = gestures.iter().any(|g| !matches!(g, Gesture::ToggleMode));
        if moves {
            self.cancel_transition();
        }
        for gesture in gestures {
            self.interaction.apply(&mut self.pose, gesture);
        }
        if moves {
            self.apply_camera();
            self.publish_pose(SystemTime::now());
        }
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Controller switching
    // ─────────────────────────────────────────────────────────────────────────

    /// Return to the configured default pose
    pub fn reset(&mut self) {
        self.cancel_transition();
        self.pose = self.config.default_pose;
        if self.interaction.maintain_vertical_axis() {
            self.pose.up = Vec3::UNIT_Z;
        }
        self.apply_camera();
        self.publish_pose(SystemTime::now());
    }

    /// Copy the camera of another controller
    pub fn mimic(&mut self, source: &dyn ViewSource) {
        self.cancel_transition();

        if let Some(frame) = source.target_frame() {
            if let Err(err) = self.reattach(frame) {
                tracing::warn!("AnimatedViewController: mimic keeps current frame: {}", err);
            }
        }

        let camera = source.camera();
        let distance = match source.focus_distance() {
            Some(distance) if source.class_tag() == ORBIT_CLASS => distance,
            _ => camera.position.length(),
        }
        .max(self.interaction.min_distance());

        self.interaction.set_mode(InteractionMode::Orbit);
        self.pose = ViewPose {
            eye: camera.position,
            focus: camera.position + camera.orientation * (Vec3::NEG_Z * distance),
            up: if self.interaction.maintain_vertical_axis() {
                Vec3::UNIT_Z
            } else {
                camera.orientation.y_axis()
            },
        };
        self.apply_camera();
        tracing::debug!("AnimatedViewController: mimicked {}", source.class_tag());
    }

    /// Animate from another animated controller's pose back to ours
    ///
    /// Other controller kinds are ignored.
    pub fn transition_from(&mut self, previous: &dyn ViewSource) -> Result<()> {
        if previous.class_tag() != ANIMATED_CLASS {
            return Ok(());
        }
        let Some(start) = previous.view_pose() else {
            return Ok(());
        };
        let goal = self.pose;
        self.pose = start;
        self.begin_transition(goal, self.default_transition_time, Easing::default())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Properties
    // ─────────────────────────────────────────────────────────────────────────

    /// Live pose in the attached frame
    pub fn pose(&self) -> &ViewPose {
        &self.pose
    }

    /// Live pose in the fixed frame
    pub fn fixed_pose(&self) -> ViewPose {
        self.attachment.export_pose(&self.pose)
    }

    /// Camera transform in the fixed frame
    pub fn fixed_camera(&self) -> RigidTransform {
        let reference = self.attachment.reference();
        RigidTransform::new(
            reference.transform_point(self.pose.eye),
            (reference.orientation * self.pose.orientation()).normalize(),
        )
    }

    /// Replace the whole pose at once
    pub fn set_pose(&mut self, pose: ViewPose) {
        self.pose = pose;
        if self.interaction.maintain_vertical_axis() {
            self.pose.up = Vec3::UNIT_Z;
        }
    }

    pub fn set_eye(&mut self, eye: Vec3) {
        self.pose.eye = eye;
    }

    pub fn set_focus(&mut self, focus: Vec3) {
        self.pose.focus = focus;
    }

    /// Ignored while the vertical axis is maintained
    pub fn set_up(&mut self, up: Vec3) {
        if self.interaction.maintain_vertical_axis() {
            tracing::debug!("AnimatedViewController: up vector locked to +Z");
            return;
        }
        self.pose.up = up.normalize_or(Vec3::UNIT_Z);
    }

    pub fn distance(&self) -> f32 {
        self.pose.distance()
    }

    /// Move the eye along the viewing axis to `distance` from the focus
    pub fn set_distance(&mut self, distance: f32) {
        let distance = distance.max(self.interaction.min_distance());
        let back = self.pose.orientation().z_axis();
        self.pose.eye = self.pose.focus + back * distance;
    }

    pub fn maintain_vertical_axis(&self) -> bool {
        self.interaction.maintain_vertical_axis()
    }

    pub fn set_maintain_vertical_axis(&mut self, maintain: bool) {
        self.interaction.set_maintain_vertical_axis(maintain);
        if maintain {
            self.pose.up = Vec3::UNIT_Z;
        }
    }

    pub fn interaction_mode(&self) -> InteractionMode {
        self.interaction.mode()
    }

    pub fn set_interaction_mode(&mut self, mode: InteractionMode) {
        self.interaction.set_mode(mode);
    }

    pub fn mouse_enabled(&self) -> bool {
        self.mouse_enabled
    }

    pub fn set_mouse_enabled(&mut self, enabled: bool) {
        self.mouse_enabled = enabled;
        if !enabled {
            self.dragging = false;
        }
    }

    pub fn publish_view_images(&self) -> bool {
        self.publish_view_images
    }

    pub fn set_publish_view_images(&mut self, publish: bool) {
        self.publish_view_images = publish;
    }

    pub fn default_transition_time(&self) -> f64 {
        self.default_transition_time
    }

    /// Negative values are ignored
    pub fn set_default_transition_time(&mut self, secs: f64) {
        if secs >= 0.0 {
            self.default_transition_time = secs;
        }
    }

    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    pub fn attached_frame(&self) -> &str {
        self.attachment.frame()
    }

    /// Attached frame's transform in the fixed frame
    pub fn reference(&self) -> &RigidTransform {
        self.attachment.reference()
    }

    pub fn is_animating(&self) -> bool {
        self.driver.is_animating()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Queued movements, including the current start
    pub fn queue_len(&self) -> usize {
        self.driver.queue().len()
    }

    /// Queued poses in playback order, starting with the current start
    pub fn queued_poses(&self) -> Vec<ViewPose> {
        self.driver.queue().iter().map(|m| *m.pose()).collect()
    }

    pub fn clock_mode(&self) -> ClockMode {
        self.driver.clock_mode()
    }

    pub fn viewport(&self) -> Viewport {
        self.surface.viewport()
    }

    pub fn config(&self) -> &ViewControllerConfig {
        &self.config
    }

    /// Outbound streams; subscribe before ticking
    pub fn outputs(&self) -> Arc<ViewOutputs> {
        self.outputs.clone()
    }
}

impl ViewSource for AnimatedViewController {
    fn class_tag(&self) -> &str {
        ANIMATED_CLASS
    }

    fn camera(&self) -> RigidTransform {
        RigidTransform::new(self.pose.eye, self.pose.orientation())
    }

    fn focus_distance(&self) -> Option<f32> {
        Some(self.pose.distance())
    }

    fn target_frame(&self) -> Option<&str> {
        Some(self.attachment.frame())
    }

    fn view_pose(&self) -> Option<ViewPose> {
        Some(self.pose)
    }
}

/// A plain camera placement, e.g. from a controller without a focus point
#[derive(Clone, Debug, PartialEq)]
pub struct StaticView {
    pub class_tag: String,
    pub camera: RigidTransform,
    pub focus_distance: Option<f32>,
    pub target_frame: Option<String>,
}

impl StaticView {
    pub fn new(class_tag: impl Into<String>, position: Vec3, orientation: Quat) -> Self {
        Self {
            class_tag: class_tag.into(),
            camera: RigidTransform::new(position, orientation),
            focus_distance: None,
            target_frame: None,
        }
    }
}

impl ViewSource for StaticView {
    fn class_tag(&self) -> &str {
        &self.class_tag
    }

    fn camera(&self) -> RigidTransform {
        self.camera
    }

    fn focus_distance(&self) -> Option<f32> {
        self.focus_distance
    }

    fn target_frame(&self) -> Option<&str> {
        self.target_frame.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CameraWaypoint;
    use crate::frames::{StaticFrameGraph, FIXED_FRAME};
    use crate::input::{Buttons, Modifiers};
    use crate::publish::{PixelBox, PixelFormat};
    use std::f32::consts::FRAC_PI_2;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vantage_animation::ManualClock;

    fn graph() -> StaticFrameGraph {
        StaticFrameGraph::new()
            .with_frame(
                "base_link",
                RigidTransform::new(Vec3::new(2.0, -1.0, 0.0), Quat::from_rpy(0.0, 0.0, FRAC_PI_2)),
            )
            .with_frame("sensor", RigidTransform::from_translation(Vec3::new(0.0, 0.0, 3.0)))
    }

    fn controller() -> (AnimatedViewController, ManualClock) {
        let time = ManualClock::new();
        let controller = AnimatedViewController::new(
            ViewControllerConfig::default(),
            Arc::new(graph()),
            Arc::new(time.clone()),
        );
        (controller, time)
    }

    fn counter<T>(stream: &crate::publish::Broadcast<T>) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        stream.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    fn goal() -> ViewPose {
        ViewPose::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::UNIT_Z)
    }

    #[test]
    fn test_linear_transition_scenario() {
        let (mut controller, time) = controller();
        let outputs = controller.outputs();
        let finished = counter(&outputs.finished);
        let poses = counter(&outputs.poses);

        controller.begin_transition(goal(), 2.0, Easing::Full).unwrap();

        time.advance(Duration::from_secs(1));
        controller.update();
        assert!(controller
            .pose()
            .eye
            .abs_diff_eq(Vec3::new(2.5, 2.5, 7.5), 1e-5));

        time.advance(Duration::from_secs(1));
        controller.update();
        assert_eq!(controller.pose().eye, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(finished.load(Ordering::SeqCst), 1);

        time.advance(Duration::from_secs(1));
        assert!(controller.update().is_none());
        assert_eq!(controller.pose().eye, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(finished.load(Ordering::SeqCst), 1);
        assert_eq!(poses.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_negative_duration_is_dropped() {
        let (mut controller, _) = controller();
        let err = controller.begin_transition(goal(), -0.5, Easing::Full).unwrap_err();
        assert_eq!(err, ViewError::NegativeDuration(-0.5));
        assert_eq!(controller.queue_len(), 0);
        assert!(!controller.is_animating());
    }

    #[test]
    fn test_press_empties_queue_before_moving() {
        let (mut controller, time) = controller();
        controller.begin_transition(goal(), 2.0, Easing::Full).unwrap();
        time.advance(Duration::from_millis(500));
        controller.update();
        let before = *controller.pose();

        let viewport = Viewport::default();
        assert!(controller.handle_pointer(&PointerEvent::press(100, 100, Buttons::LEFT), &viewport));
        assert_eq!(controller.queue_len(), 0);
        assert!(!controller.is_animating());
        assert_eq!(*controller.pose(), before);

        controller.handle_pointer(&PointerEvent::drag((100, 100), (140, 100), Buttons::LEFT), &viewport);
        assert_ne!(controller.pose().eye, before.eye);
        assert_eq!(controller.pose().focus, before.focus);

        time.advance(Duration::from_secs(5));
        assert!(controller.update().is_none());
    }

    #[test]
    fn test_disabled_mouse_ignores_pointer() {
        let (mut controller, _) = controller();
        controller.set_mouse_enabled(false);
        let before = *controller.pose();
        assert!(!controller.handle_pointer(&PointerEvent::wheel(120), &Viewport::default()));
        assert_eq!(*controller.pose(), before);
        assert!(controller.look_at(Vec3::UNIT_X).is_ok());
        assert_eq!(controller.queue_len(), 0);
    }

    #[test]
    fn test_wheel_cancels_frame_counted_playback() {
        let (mut controller, _) = controller();
        let finished = counter(&controller.outputs().finished);
        controller.use_frame_counted(30);
        controller.begin_transition(goal(), 1.0, Easing::Wave).unwrap();
        controller.update();

        controller.handle_pointer(&PointerEvent::wheel(120), &Viewport::default());
        assert_eq!(finished.load(Ordering::SeqCst), 1);
        assert_eq!(controller.clock_mode(), ClockMode::WallClock);

        // Nothing left to cancel
        controller.handle_pointer(&PointerEvent::wheel(120), &Viewport::default());
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_mode_toggle_keeps_pose() {
        let (mut controller, _) = controller();
        let before = *controller.pose();
        let event = PointerEvent::press(0, 0, Buttons::LEFT).with_modifiers(Modifiers {
            shift: true,
            control: true,
        });
        controller.handle_pointer(&event, &Viewport::default());
        assert_eq!(controller.interaction_mode(), InteractionMode::Fps);
        assert_eq!(*controller.pose(), before);
    }

    #[test]
    fn test_failed_reattach_leaves_everything_unchanged() {
        let (mut controller, time) = controller();
        controller.reattach("base_link").unwrap();
        controller.begin_transition(goal(), 2.0, Easing::Full).unwrap();
        controller
            .begin_transition(ViewPose::new(Vec3::new(1.0, 1.0, 1.0), Vec3::ZERO, Vec3::UNIT_Z), 1.0, Easing::Rising)
            .unwrap();
        time.advance(Duration::from_millis(300));
        controller.update();

        let pose = *controller.pose();
        let queued = controller.queued_poses();
        let reference = *controller.reference();

        let err = controller.reattach("missing").unwrap_err();
        assert!(matches!(err, ViewError::FrameLookup { .. }));
        assert_eq!(*controller.pose(), pose);
        assert_eq!(controller.queued_poses(), queued);
        assert_eq!(*controller.reference(), reference);
        assert_eq!(controller.attached_frame(), "base_link");
    }

    #[test]
    fn test_reattach_keeps_fixed_frame_trajectory() {
        let (mut controller, _) = controller();
        controller.begin_transition(goal(), 2.0, Easing::Full).unwrap();
        let fixed_before = controller.fixed_pose();
        let queued_before: Vec<ViewPose> = controller.queued_poses();

        controller.reattach("sensor").unwrap();
        assert_eq!(controller.attached_frame(), "sensor");
        assert!(controller.fixed_pose().abs_diff_eq(&fixed_before, 1e-4));
        let queued_after = controller.queued_poses();
        assert_eq!(queued_after.len(), queued_before.len());
        for (after, before) in queued_after.iter().zip(&queued_before) {
            assert!(after.eye.abs_diff_eq(before.eye - Vec3::new(0.0, 0.0, 3.0), 1e-5));
        }
    }

    #[test]
    fn test_published_pose_is_in_attached_frame() {
        let (mut controller, time) = controller();
        controller.reattach("sensor").unwrap();
        let received = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let r = received.clone();
        controller.outputs().poses.subscribe(move |pose| r.lock().push(pose.clone()));

        controller.begin_transition(goal(), 1.0, Easing::Full).unwrap();
        time.advance(Duration::from_millis(400));
        controller.update();

        let received = received.lock();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].frame_id, "sensor");
        assert_eq!(received[0].position, controller.pose().eye);
        let fixed = controller.fixed_pose();
        assert!(controller
            .reference()
            .transform_point(received[0].position)
            .abs_diff_eq(fixed.eye, 1e-5));
    }

    #[test]
    fn test_deferred_outputs_wait_for_take() {
        let (mut controller, time) = controller();
        controller.defer_outputs();
        let outputs = controller.outputs();
        let poses = counter(&outputs.poses);
        let finished = counter(&outputs.finished);

        controller.begin_transition(goal(), 1.0, Easing::Full).unwrap();
        time.advance(Duration::from_secs(2));
        controller.update();
        assert_eq!(poses.load(Ordering::SeqCst), 0);
        assert_eq!(finished.load(Ordering::SeqCst), 0);

        let outbound = controller.take_outbound();
        assert_eq!(outbound.len(), 2);
        assert!(matches!(outbound[0], Outbound::Pose(_)));
        assert_eq!(outbound[1], Outbound::Finished(true));
        for message in &outbound {
            outputs.deliver(message);
        }
        assert_eq!(poses.load(Ordering::SeqCst), 1);
        assert_eq!(finished.load(Ordering::SeqCst), 1);
        assert!(controller.take_outbound().is_empty());
    }

    #[test]
    fn test_transform_external_pose_roundtrip() {
        let (mut controller, _) = controller();
        controller.reattach("base_link").unwrap();
        let pose = ViewPose::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(-1.0, 0.0, 0.5), Vec3::UNIT_Z);

        let in_base = controller.transform_external_pose(&pose, "sensor").unwrap();
        controller.reattach("sensor").unwrap();
        let back = controller.transform_external_pose(&in_base, "base_link").unwrap();
        assert!(back.abs_diff_eq(&pose, 1e-4));

        assert!(controller.transform_external_pose(&pose, "missing").is_err());
        let same = controller.transform_external_pose(&pose, "").unwrap();
        assert!(same.abs_diff_eq(&pose, 1e-5));
    }

    #[test]
    fn test_placement_negative_time_keeps_flags() {
        let (mut controller, _) = controller();
        let mut placement = CameraPlacement::from_pose(goal(), -1.0);
        placement.interaction_disabled = true;
        placement.mouse_interaction_mode = crate::command::ModeOverride::Fps;

        assert!(controller.handle_placement(&placement).is_err());
        assert!(!controller.mouse_enabled());
        assert_eq!(controller.interaction_mode(), InteractionMode::Fps);
        assert_eq!(controller.queue_len(), 0);
    }

    #[test]
    fn test_placement_in_other_frame() {
        let (mut controller, _) = controller();
        let mut placement = CameraPlacement::from_pose(goal(), 1.0);
        placement.eye.frame_id = "sensor".to_string();
        controller.handle_placement(&placement).unwrap();

        let queued = controller.queued_poses();
        assert_eq!(queued.len(), 2);
        assert!(queued[1].eye.abs_diff_eq(Vec3::new(0.0, 0.0, 8.0), 1e-5));
    }

    #[test]
    fn test_empty_trajectory_is_noop() {
        let (mut controller, _) = controller();
        let trajectory = CameraTrajectory {
            interaction_disabled: true,
            render_frame_by_frame: true,
            frames_per_second: 10,
            ..Default::default()
        };
        assert_eq!(controller.handle_trajectory(&trajectory).unwrap(), 0);
        assert!(controller.mouse_enabled());
        assert_eq!(controller.clock_mode(), ClockMode::WallClock);
    }

    #[test]
    fn test_trajectory_skips_negative_waypoints() {
        let (mut controller, _) = controller();
        let trajectory = CameraTrajectory::new(vec![
            CameraWaypoint::new(goal(), 1.0, Easing::Full),
            CameraWaypoint::new(ViewPose::default(), -2.0, Easing::Full),
            CameraWaypoint::new(ViewPose::default(), 0.0, Easing::Rising),
        ]);
        assert_eq!(controller.handle_trajectory(&trajectory).unwrap(), 2);
        assert_eq!(controller.queue_len(), 3);
    }

    #[test]
    fn test_frame_by_frame_trajectory() {
        let (mut controller, _) = controller();
        let finished = counter(&controller.outputs().finished);
        let trajectory = CameraTrajectory::new(vec![CameraWaypoint::new(goal(), 1.0, Easing::Full)]).frame_by_frame(4);
        controller.handle_trajectory(&trajectory).unwrap();
        assert!(controller.publish_view_images());
        assert_eq!(controller.clock_mode(), ClockMode::FrameCounted { target_fps: 4 });

        // Frames 0..=4 of a 1s segment at 4 fps, no wall time needed
        let mut ticks = 0;
        while controller.update().is_some() {
            ticks += 1;
        }
        assert_eq!(ticks, 5);
        assert_eq!(controller.pose().eye, goal().eye);
        assert_eq!(finished.load(Ordering::SeqCst), 1);
        assert_eq!(controller.clock_mode(), ClockMode::WallClock);
    }

    struct CountingSurface {
        reads: AtomicUsize,
    }

    impl RenderSurface for CountingSurface {
        fn apply_camera(&self, _position: Vec3, _orientation: Quat) {}

        fn viewport(&self) -> Viewport {
            Viewport::new(2, 1, FRAC_PI_2)
        }

        fn read_pixels(&self) -> Option<PixelBox> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Some(PixelBox::new(2, 1, PixelFormat::Bgr8, vec![0; 6]))
        }
    }

    #[test]
    fn test_images_only_with_subscribers() {
        let surface = Arc::new(CountingSurface {
            reads: AtomicUsize::new(0),
        });
        let time = ManualClock::new();
        let mut controller = AnimatedViewController::new(
            ViewControllerConfig {
                publish_view_images: true,
                ..Default::default()
            },
            Arc::new(graph()),
            Arc::new(time.clone()),
        )
        .with_surface(surface.clone());

        controller.begin_transition(goal(), 1.0, Easing::Full).unwrap();
        time.advance(Duration::from_millis(100));
        controller.update();
        assert_eq!(surface.reads.load(Ordering::SeqCst), 0);

        let images = counter(&controller.outputs().images);
        time.advance(Duration::from_millis(100));
        controller.update();
        assert_eq!(surface.reads.load(Ordering::SeqCst), 1);
        assert_eq!(images.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_pause_delays_progress() {
        let (mut controller, time) = controller();
        controller.begin_transition(goal(), 2.0, Easing::Full).unwrap();
        controller.request_pause(Duration::from_secs(1));
        time.advance(Duration::from_secs(2));
        let outcome = controller.update().unwrap();
        assert!((outcome.time_progress - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_look_at_converts_from_fixed_frame() {
        let (mut controller, _) = controller();
        controller.reattach("sensor").unwrap();
        controller.look_at(Vec3::new(1.0, 0.0, 3.0)).unwrap();
        let queued = controller.queued_poses();
        assert!(queued[1].focus.abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-5));
        assert_eq!(queued[1].eye, queued[0].eye);
    }

    #[test]
    fn test_move_eye_with_focus() {
        let (mut controller, _) = controller();
        let pose = *controller.pose();
        controller.move_eye_with_focus_to(Vec3::new(6.0, 5.0, 10.0)).unwrap();
        controller.orbit_camera_to(Vec3::new(0.0, 0.0, 1.0)).unwrap();
        let queued = controller.queued_poses();
        assert_eq!(queued[1].focus, pose.focus + Vec3::UNIT_X);
        assert_eq!(queued[2].focus, pose.focus);
        assert_eq!(queued[2].eye, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_mimic_orbit_and_plain_views() {
        let (mut controller, _) = controller();
        let orientation = Quat::look_rotation(Vec3::new(0.0, 0.0, -1.0), Vec3::UNIT_Y);

        let mut orbit = StaticView::new(ORBIT_CLASS, Vec3::new(0.0, 0.0, 4.0), orientation);
        orbit.focus_distance = Some(2.0);
        controller.set_interaction_mode(InteractionMode::Fps);
        controller.mimic(&orbit);
        assert_eq!(controller.interaction_mode(), InteractionMode::Orbit);
        assert!(controller.pose().focus.abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), 1e-5));

        let plain = StaticView::new("rviz/XYOrbit", Vec3::new(0.0, 0.0, 4.0), orientation);
        controller.mimic(&plain);
        assert!(controller.pose().focus.abs_diff_eq(Vec3::ZERO, 1e-5));
    }

    #[test]
    fn test_transition_from_animated_controller() {
        let (mut previous, _) = controller();
        previous.set_pose(goal());
        let (mut controller, time) = controller();
        let own = *controller.pose();

        controller.transition_from(&previous).unwrap();
        assert_eq!(*controller.pose(), goal());
        time.advance(Duration::from_secs(1));
        controller.update();
        assert_eq!(*controller.pose(), own);

        let other = StaticView::new(ORBIT_CLASS, Vec3::ZERO, Quat::IDENTITY);
        controller.transition_from(&other).unwrap();
        assert_eq!(controller.queue_len(), 0);
    }

    #[test]
    fn test_reset_restores_default_pose() {
        let (mut controller, _) = controller();
        controller.set_eye(Vec3::new(1.0, 0.0, 0.0));
        controller.begin_transition(goal(), 1.0, Easing::Full).unwrap();
        controller.reset();
        assert_eq!(*controller.pose(), ViewPose::default());
        assert_eq!(controller.queue_len(), 0);
    }

    #[test]
    fn test_pose_setters() {
        let (mut controller, _) = controller();
        controller.set_distance(0.0);
        assert!((controller.distance() - 0.01).abs() < 1e-4);
        controller.set_distance(3.0);
        assert!((controller.distance() - 3.0).abs() < 1e-4);

        controller.set_up(Vec3::UNIT_X);
        assert_eq!(controller.pose().up, Vec3::UNIT_Z);
        controller.set_maintain_vertical_axis(false);
        controller.set_up(Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(controller.pose().up, Vec3::UNIT_X);
        controller.set_maintain_vertical_axis(true);
        assert_eq!(controller.pose().up, Vec3::UNIT_Z);

        assert_eq!(controller.attached_frame(), FIXED_FRAME);
    }
}

//! The locomotion state machine.
//!
//! One [`LocomotionController`] drives one character. A host calls [`LocomotionController::step`]
//! once per simulated frame; each step runs, in order:
//!
//! 1. advance a running gravity reorientation,
//! 2. probe the ground and extend the grounded window on safely grounded frames,
//! 3. classify grounded/ungrounded from the window, handling the jump trigger,
//! 4. build the frame velocity (ground clamp + platform capture, or ceiling bounce + gravity),
//! 5. hand the displacement to the resolver,
//! 6. apply the platform follow-through captured in step 4.

use log::{debug, warn};

use crate::{
    bitmask_flags::MoverFlags,
    collaborators::{DisplacementResolver, GroundProbe},
    contacts::ContactBuffer,
    error::{LocomotionError, Result},
    gravity::{GravityOrientation, GravityProfileSet, ReorientationEvent, unit_up},
    platform::PlatformDisplacement,
    settings::ControllerSettings,
    state::LocomotionState,
    types::{CharacterPose, Surface, Vec3},
    vertical::ground_clamp_speed,
};

/// Everything the controller reads from the outside world for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Strafe axis, clamped to `[-1, 1]`. Positive is right.
    pub horizontal: f32,
    /// Walk axis, clamped to `[-1, 1]`. Positive is forward.
    pub vertical: f32,
    /// Jump was pressed this frame (edge, not level).
    pub jump_pressed: bool,
    /// Elapsed time since the previous frame (seconds).
    pub delta_time: f32,
    /// Monotonic clock (seconds).
    pub time: f32,
}

/// Effects of one step.
#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    pub grounded: bool,
    pub jumped: bool,
    pub ceiling_bounce: bool,
    /// Vertical speed after this frame's integration.
    pub vertical_speed: f32,
    /// Velocity requested from the resolver (before collision).
    pub velocity: Vec3,
    /// `velocity * delta_time`.
    pub displacement: Vec3,
    /// Platform follow-through applied after the move, if any.
    pub platform: Option<PlatformDisplacement>,
    pub reorientation: ReorientationEvent,
}

/// Wires collaborators and configuration into a [`LocomotionController`].
pub struct ControllerBuilder<P, R> {
    probe: Option<P>,
    resolver: Option<R>,
    pose: CharacterPose,
    settings: ControllerSettings,
    profiles: Option<GravityProfileSet>,
}

impl<P, R> Default for ControllerBuilder<P, R> {
    fn default() -> Self {
        Self {
            probe: None,
            resolver: None,
            pose: CharacterPose::default(),
            settings: ControllerSettings::default(),
            profiles: None,
        }
    }
}

impl<P: GroundProbe, R: DisplacementResolver> ControllerBuilder<P, R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probe(mut self, probe: P) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn resolver(mut self, resolver: R) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Initial pose. Its up axis becomes the initial gravity orientation.
    pub fn pose(mut self, pose: CharacterPose) -> Self {
        self.pose = pose;
        self
    }

    pub fn settings(mut self, settings: ControllerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Profiles available for reorientation. Defaults to [`GravityProfileSet::standard`].
    pub fn profiles(mut self, profiles: GravityProfileSet) -> Self {
        self.profiles = Some(profiles);
        self
    }

    pub fn build(self) -> Result<LocomotionController<P, R>> {
        let probe = self
            .probe
            .ok_or(LocomotionError::MissingCollaborator("ground probe"))?;
        let resolver = self
            .resolver
            .ok_or(LocomotionError::MissingCollaborator("displacement resolver"))?;

        self.settings.validate()?;
        let profiles = match self.profiles {
            Some(profiles) => {
                profiles.validate()?;
                profiles
            }
            None => GravityProfileSet::standard(&self.settings),
        };

        let initial_up = unit_up(self.pose.up().into_inner())?;
        let orientation = GravityOrientation::new(initial_up, &self.settings, profiles);

        Ok(LocomotionController {
            probe,
            resolver,
            pose: self.pose,
            settings: self.settings,
            state: LocomotionState::default(),
            orientation,
            contacts: ContactBuffer::default(),
            was_grounded: false,
        })
    }
}

/// Grounded/ungrounded locomotion for a single character.
pub struct LocomotionController<P, R> {
    probe: P,
    resolver: R,
    pose: CharacterPose,
    settings: ControllerSettings,
    state: LocomotionState,
    orientation: GravityOrientation,
    /// Filled by the resolver on every move; read by the next ungrounded frame.
    contacts: ContactBuffer,
    was_grounded: bool,
}

impl<P: GroundProbe, R: DisplacementResolver> LocomotionController<P, R> {
    pub fn builder() -> ControllerBuilder<P, R> {
        ControllerBuilder::new()
    }

    /// Run one frame.
    pub fn step(&mut self, input: &FrameInput) -> StepReport {
        let dt = input.delta_time.max(0.0);
        let now = input.time;

        let reorientation = self.orientation.advance(dt, &mut self.pose);
        let up = self.orientation.up().into_inner();

        let horizontal = input.horizontal.clamp(-1.0, 1.0);
        let vertical = input.vertical.clamp(-1.0, 1.0);
        let move_direction = self.pose.right().into_inner() * horizontal
            + self.pose.forward().into_inner() * vertical;
        let mut velocity = move_direction * self.settings.move_speed;

        let ground = self.probe.detect_ground(&self.pose);
        let is_on_floor = ground.as_ref().is_some_and(|g| g.is_on_floor);
        if self.state.is_safely_grounded(ground.is_some(), is_on_floor) {
            self.state
                .extend_grounded(now, self.settings.time_before_ungrounded);
        }

        let mut grounded = self.state.is_grounded(now);
        let mut jumped = false;
        if grounded && input.jump_pressed {
            self.state.jump(self.orientation.jump_speed());
            grounded = false;
            jumped = true;
            debug!("Jump at t={now:.3} with speed {}", self.state.vertical_speed);
        }

        let mut platform = None;
        let mut ceiling_bounce = false;
        if grounded {
            self.resolver.set_flags(MoverFlags::grounded());
            self.state.land();

            let clamp = ground_clamp_speed(
                self.resolver.max_floor_angle_deg(),
                self.settings.move_speed,
            );
            velocity += up * clamp;

            platform = ground.as_ref().and_then(|g| {
                g.surface
                    .as_ref()
                    .and_then(Surface::as_platform)
                    .map(|p| PlatformDisplacement::at_point(p, &g.point, &self.pose.up()))
            });
        } else {
            self.resolver.set_flags(MoverFlags::airborne());

            ceiling_bounce = self
                .state
                .bounce_off_ceiling(&self.contacts, &self.orientation.up());
            if ceiling_bounce {
                debug!(
                    "Ceiling hit at t={now:.3}, vertical speed now {}",
                    self.state.vertical_speed
                );
            }

            self.state.integrate_gravity(
                self.orientation.gravity(),
                self.settings.min_vertical_speed,
                dt,
            );
            velocity += up * self.state.vertical_speed;
        }

        let displacement = velocity * dt;
        self.resolver
            .move_character(&mut self.pose, displacement, &mut self.contacts);
        if self.contacts.dropped() > 0 {
            warn!(
                "Contact buffer full: dropped {} contact(s) this frame",
                self.contacts.dropped()
            );
        }

        if let Some(follow) = &platform {
            follow.apply(&mut self.pose);
        }

        if grounded != self.was_grounded {
            debug!(
                "Locomotion {} at t={now:.3}",
                if grounded { "grounded" } else { "ungrounded" }
            );
            self.was_grounded = grounded;
        }

        StepReport {
            grounded,
            jumped,
            ceiling_bounce,
            vertical_speed: self.state.vertical_speed,
            velocity,
            displacement,
            platform,
            reorientation,
        }
    }

    /// Whether the character counts as grounded at `now`, from the hysteresis window alone.
    pub fn is_grounded(&self, now: f32) -> bool {
        self.state.is_grounded(now)
    }

    /// Start reorienting toward a named gravity profile.
    pub fn request_reorientation(&mut self, profile: &str) -> Result<()> {
        self.orientation.request(profile, &self.pose)
    }

    pub fn cancel_reorientation(&mut self) -> bool {
        self.orientation.cancel()
    }

    pub fn pose(&self) -> &CharacterPose {
        &self.pose
    }

    pub fn state(&self) -> &LocomotionState {
        &self.state
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn orientation(&self) -> &GravityOrientation {
        &self.orientation
    }

    pub fn contacts(&self) -> &ContactBuffer {
        &self.contacts
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub fn probe_mut(&mut self) -> &mut P {
        &mut self.probe
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }
}

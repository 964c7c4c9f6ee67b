use tracing::{debug, info};

use crate::core::ballistics::{FlightSample, LaunchParams, WorldPoint, advance};
use crate::error::LaunchError;

/// Largest simulated step a single frame may take, in seconds. A stalled or
/// backgrounded host would otherwise teleport the body.
pub const MAX_FRAME_DT_S: f64 = 0.05;

/// Host hook for "call me again on the next refresh".
pub trait FrameScheduler {
    fn request_next_frame(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Running,
    Paused,
    Landed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunState {
    pub phase: RunPhase,
    pub elapsed_s: f64,
    /// Host timestamp of the previous frame, seconds. `None` until the first
    /// frame of a run, so that frame measures a zero delta.
    pub last_frame_ts: Option<f64>,
}

impl RunState {
    pub fn idle() -> Self {
        Self {
            phase: RunPhase::Idle,
            elapsed_s: 0.0,
            last_frame_ts: None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, RunPhase::Running | RunPhase::Paused)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameEvent {
    /// Nothing is running; the host only needs to draw.
    Idle,
    Paused,
    Advanced(FlightSample),
    Landed(FlightSample),
}

pub struct AnimationDriver {
    state: RunState,
    traveled: Vec<WorldPoint>,
    max_frame_dt_s: f64,
}

impl AnimationDriver {
    pub fn new(max_frame_dt_s: f64) -> Self {
        let max_frame_dt_s = if max_frame_dt_s.is_finite() && max_frame_dt_s > 0.0 {
            max_frame_dt_s
        } else {
            MAX_FRAME_DT_S
        };
        Self {
            state: RunState::idle(),
            traveled: Vec::new(),
            max_frame_dt_s,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn phase(&self) -> RunPhase {
        self.state.phase
    }

    pub fn traveled(&self) -> &[WorldPoint] {
        &self.traveled
    }

    pub fn launch(&mut self, params: &LaunchParams, scheduler: &mut impl FrameScheduler) -> Result<(), LaunchError> {
        if self.state.is_active() {
            return Err(LaunchError::RunActive);
        }
        if !params.is_valid() {
            return Err(LaunchError::InvalidParameters(*params));
        }

        self.state = RunState {
            phase: RunPhase::Running,
            elapsed_s: 0.0,
            last_frame_ts: None,
        };
        self.traveled.clear();
        self.traveled.push((0.0, 0.0));
        info!(
            angle_deg = params.angle_deg(),
            speed_mps = params.speed_mps,
            gravity_mps2 = params.gravity_mps2,
            "launched"
        );
        scheduler.request_next_frame();
        Ok(())
    }

    /// One host refresh. `params` are read fresh every frame; changing them
    /// mid-flight bends the remaining path but never rewrites recorded points.
    pub fn frame(
        &mut self,
        timestamp_s: f64,
        params: &LaunchParams,
        scheduler: &mut impl FrameScheduler,
    ) -> FrameEvent {
        if !self.state.is_active() {
            return FrameEvent::Idle;
        }

        let dt = self.measure_dt(timestamp_s);

        if self.state.phase == RunPhase::Paused {
            scheduler.request_next_frame();
            return FrameEvent::Paused;
        }

        let sample = advance(self.state.elapsed_s, dt, params);
        self.state.elapsed_s = sample.elapsed_s;
        self.traveled.push(sample.position);

        if sample.landed {
            self.state.phase = RunPhase::Landed;
            info!(
                elapsed_s = sample.elapsed_s,
                range_m = sample.position.0,
                points = self.traveled.len(),
                "landed"
            );
            return FrameEvent::Landed(sample);
        }

        scheduler.request_next_frame();
        FrameEvent::Advanced(sample)
    }

    fn measure_dt(&mut self, timestamp_s: f64) -> f64 {
        if !timestamp_s.is_finite() {
            return 0.0;
        }
        let last = self.state.last_frame_ts.replace(timestamp_s);
        match last {
            Some(prev) => (timestamp_s - prev).clamp(0.0, self.max_frame_dt_s),
            None => 0.0,
        }
    }

    pub fn toggle_pause(&mut self, scheduler: &mut impl FrameScheduler) -> bool {
        match self.state.phase {
            RunPhase::Running => {
                self.state.phase = RunPhase::Paused;
                debug!(elapsed_s = self.state.elapsed_s, "paused");
                true
            }
            RunPhase::Paused => {
                self.state.phase = RunPhase::Running;
                debug!(elapsed_s = self.state.elapsed_s, "resumed");
                scheduler.request_next_frame();
                true
            }
            RunPhase::Idle | RunPhase::Landed => false,
        }
    }

    pub fn reset(&mut self, scheduler: &mut impl FrameScheduler) {
        self.state = RunState::idle();
        self.traveled.clear();
        scheduler.request_next_frame();
    }
}

impl Default for AnimationDriver {
    fn default() -> Self {
        Self::new(MAX_FRAME_DT_S)
    }
}

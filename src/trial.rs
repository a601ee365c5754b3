use std::time::{Duration, SystemTime};

use strum_macros::Display;
use thiserror::Error;

/// Fixed set of scored areas in the open field arena.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum Region {
    Corner,
    Lateral,
    Center,
}

impl Region {
    /// Report and display order.
    pub const ALL: [Region; 3] = [Region::Corner, Region::Lateral, Region::Center];

    pub fn label(self) -> &'static str {
        match self {
            Region::Corner => "Corner",
            Region::Lateral => "Lateral",
            Region::Center => "Center",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-region accumulator. A region counts as pressed exactly when a press
/// start is recorded.
#[derive(Clone, Copy, Debug, Default)]
pub struct RegionState {
    accumulated_secs: f64,
    press_started_at: Option<SystemTime>,
}

impl RegionState {
    /// Time finalized from completed press/release cycles.
    pub fn accumulated_secs(&self) -> f64 {
        self.accumulated_secs
    }

    pub fn is_pressed(&self) -> bool {
        self.press_started_at.is_some()
    }

    /// Accumulated time plus the in-flight interval of a held press.
    fn live_secs(&self, now: SystemTime) -> f64 {
        match self.press_started_at {
            Some(start) => self.accumulated_secs + secs_between(start, now),
            None => self.accumulated_secs,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Stopped,
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("subject id must not be empty")]
    EmptySubjectId,
    #[error("planned duration must be a positive number of seconds")]
    NonPositiveDuration,
}

/// Read-only view of one region at a single instant.
#[derive(Clone, Copy, Debug)]
pub struct RegionSnapshot {
    pub region: Region,
    pub accumulated_secs: f64,
    pub is_pressed: bool,
}

/// Consistent read of the whole timer, taken from a single clock sample.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub remaining_secs: f64,
    pub running: bool,
    pub regions: [RegionSnapshot; 3],
}

impl Snapshot {
    pub fn region(&self, region: Region) -> &RegionSnapshot {
        &self.regions[region.index()]
    }

    pub fn pressed_region(&self) -> Option<Region> {
        self.regions
            .iter()
            .find(|r| r.is_pressed)
            .map(|r| r.region)
    }
}

/// One observation session: the countdown plus per-region press accounting.
///
/// At most one region is pressed at any instant; pressing a new region ends
/// the previous interval. Once stopped, a trial is never resumed; the next
/// `start` resets every accumulator.
#[derive(Clone, Debug)]
pub struct Trial {
    subject_id: String,
    planned_secs: usize,
    started_at: Option<SystemTime>,
    remaining_secs: f64,
    phase: Phase,
    manual_stop: bool,
    regions: [RegionState; 3],
}

impl Trial {
    pub fn new() -> Self {
        Self {
            subject_id: String::new(),
            planned_secs: 0,
            started_at: None,
            remaining_secs: 0.0,
            phase: Phase::Idle,
            manual_stop: false,
            regions: [RegionState::default(); 3],
        }
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn planned_secs(&self) -> usize {
        self.planned_secs
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn started_at(&self) -> Option<SystemTime> {
        self.started_at
    }

    /// Countdown value as of the last tick (or the stop that froze it).
    pub fn remaining_secs(&self) -> f64 {
        self.remaining_secs
    }

    pub fn was_manual_stop(&self) -> bool {
        self.manual_stop
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn has_finished(&self) -> bool {
        self.phase == Phase::Stopped
    }

    pub fn region(&self, region: Region) -> &RegionState {
        &self.regions[region.index()]
    }

    fn region_mut(&mut self, region: Region) -> &mut RegionState {
        &mut self.regions[region.index()]
    }

    pub fn start(&mut self, subject_id: &str, planned_secs: usize) -> Result<(), ValidationError> {
        self.start_at(subject_id, planned_secs, SystemTime::now())
    }

    /// Validates and begins a fresh session, resetting all region state.
    /// Ignored while a session is already running.
    pub fn start_at(
        &mut self,
        subject_id: &str,
        planned_secs: usize,
        now: SystemTime,
    ) -> Result<(), ValidationError> {
        if self.phase == Phase::Running {
            return Ok(());
        }

        let subject_id = subject_id.trim();
        if subject_id.is_empty() {
            return Err(ValidationError::EmptySubjectId);
        }
        if planned_secs == 0 {
            return Err(ValidationError::NonPositiveDuration);
        }

        self.subject_id = subject_id.to_string();
        self.planned_secs = planned_secs;
        self.started_at = Some(now);
        self.remaining_secs = planned_secs as f64;
        self.phase = Phase::Running;
        self.manual_stop = false;
        self.regions = [RegionState::default(); 3];
        Ok(())
    }

    pub fn stop(&mut self, manual: bool) {
        self.stop_at(manual, SystemTime::now())
    }

    /// Finalizes the session. Any held region is released first so no
    /// interval dangles. No-op unless running, which makes repeated stops
    /// harmless.
    pub fn stop_at(&mut self, manual: bool, now: SystemTime) {
        if self.phase != Phase::Running {
            return;
        }
        for region in Region::ALL {
            self.release_at(region, now);
        }
        self.phase = Phase::Stopped;
        self.manual_stop = manual;
    }

    pub fn press(&mut self, region: Region) {
        self.press_at(region, SystemTime::now())
    }

    /// Marks the subject inside `region`. A different held region is
    /// implicitly released first; pressing the held region again is a no-op.
    pub fn press_at(&mut self, region: Region, now: SystemTime) {
        if self.phase != Phase::Running {
            return;
        }
        for other in Region::ALL {
            if other != region && self.region(other).is_pressed() {
                self.release_at(other, now);
            }
        }
        let state = self.region_mut(region);
        if state.press_started_at.is_none() {
            state.press_started_at = Some(now);
        }
    }

    pub fn release(&mut self, region: Region) {
        self.release_at(region, SystemTime::now())
    }

    /// Ends the held interval for `region` and folds it into the
    /// accumulator. No-op unless running and pressed.
    pub fn release_at(&mut self, region: Region, now: SystemTime) {
        if self.phase != Phase::Running {
            return;
        }
        let state = self.region_mut(region);
        if let Some(start) = state.press_started_at.take() {
            state.accumulated_secs += secs_between(start, now);
        }
    }

    pub fn on_tick(&mut self) {
        self.on_tick_at(SystemTime::now())
    }

    /// Advances the countdown from the wall clock and stops the session once
    /// the planned duration has elapsed. Accumulated region time is never
    /// advanced here, only by press/release pairs.
    pub fn on_tick_at(&mut self, now: SystemTime) {
        if self.phase != Phase::Running {
            return;
        }
        let Some(started) = self.started_at else {
            return;
        };
        let remaining = self.planned_secs as f64 - secs_between(started, now);
        if remaining <= 0.0 {
            self.remaining_secs = 0.0;
            self.stop_at(false, now);
        } else {
            self.remaining_secs = remaining;
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_at(SystemTime::now())
    }

    /// Live view of the countdown and every region, all derived from the
    /// same `now` sample so the figures are mutually consistent.
    pub fn snapshot_at(&self, now: SystemTime) -> Snapshot {
        let remaining_secs = match self.phase {
            Phase::Running => match self.started_at {
                Some(started) => {
                    (self.planned_secs as f64 - secs_between(started, now)).max(0.0)
                }
                None => self.remaining_secs,
            },
            Phase::Idle => self.planned_secs as f64,
            Phase::Stopped => self.remaining_secs,
        };

        let regions = Region::ALL.map(|region| {
            let state = self.region(region);
            RegionSnapshot {
                region,
                accumulated_secs: state.live_secs(now),
                is_pressed: state.is_pressed(),
            }
        });

        Snapshot {
            remaining_secs,
            running: self.phase == Phase::Running,
            regions,
        }
    }
}

impl Default for Trial {
    fn default() -> Self {
        Self::new()
    }
}

fn secs_between(earlier: SystemTime, later: SystemTime) -> f64 {
    later
        .duration_since(earlier)
        .unwrap_or(Duration::ZERO)
        .as_secs_f64()
}

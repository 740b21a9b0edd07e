//! Subject selection - one stable body out of everyone in view
//!
//! Switching between people mid-gesture is far worse than briefly following
//! a degraded skeleton, so the selector is sticky:
//! 1. The active subject is kept for as long as it stays valid.
//! 2. A present-but-degraded active subject is kept while the stick timer runs.
//! 3. Otherwise the valid candidate with the most `Tracked` joints wins
//!    (first seen on ties).
//! 4. With no valid candidate the active id survives for a lost-grace period
//!    before it is dropped entirely.

use serde::{Deserialize, Serialize};
use tracing::debug;
use vitrine_core::{elapsed, ensure_positive, Skeleton, SubjectId, VitrineResult};

/// Selector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Seconds a degraded active subject stays the forced choice
    pub stick_time: f32,

    /// Seconds without any valid subject before the active id is cleared
    pub lost_grace: f32,

    /// Minimum `Tracked` joints for a skeleton to count as valid
    pub min_tracked_joints: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            stick_time: 1.2,
            lost_grace: 0.35,
            min_tracked_joints: 8,
        }
    }
}

impl SelectorConfig {
    pub fn validate(&self) -> VitrineResult<()> {
        ensure_positive("selector.stick_time", self.stick_time)?;
        ensure_positive("selector.lost_grace", self.lost_grace)?;
        Ok(())
    }
}

/// Selection state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SubjectSelection {
    pub active: Option<SubjectId>,
    pub stick_timer: f32,
    pub lost_timer: f32,
}

/// Sticky subject selector
#[derive(Debug)]
pub struct SubjectSelector {
    config: SelectorConfig,
    selection: SubjectSelection,
}

impl SubjectSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self {
            config,
            selection: SubjectSelection::default(),
        }
    }

    /// Valid = body-level tracking flag set and enough `Tracked` joints
    pub fn is_valid(&self, skeleton: &Skeleton) -> bool {
        skeleton.is_tracked
            && skeleton.tracked_joint_count() >= self.config.min_tracked_joints.max(1)
    }

    /// Resolve this frame's subject
    pub fn select(&mut self, candidates: &[Skeleton], dt: f32) -> Option<SubjectId> {
        if let Some(active) = self.selection.active {
            if let Some(current) = find_present(candidates, active) {
                if self.is_valid(current) {
                    self.selection.stick_timer = self.config.stick_time;
                    return Some(self.hold(active, dt));
                }
                if self.selection.stick_timer > 0.0 {
                    return Some(self.hold(active, dt));
                }
            }
        }

        if let Some(best) = self.best_candidate(candidates) {
            match self.selection.active {
                Some(previous) if previous != best => {
                    debug!(from = %previous, to = %best, "subject switched");
                }
                None => debug!(subject = %best, "subject acquired"),
                _ => {}
            }
            self.selection.active = Some(best);
            self.selection.stick_timer = self.config.stick_time;
            return Some(self.hold(best, dt));
        }

        self.lose(dt);
        None
    }

    /// Current selection state
    pub fn selection(&self) -> SubjectSelection {
        self.selection
    }

    /// Retained subject id, even while it is temporarily absent
    pub fn active_subject(&self) -> Option<SubjectId> {
        self.selection.active
    }

    /// Drop the active subject and all timers
    pub fn reset(&mut self) {
        self.selection = SubjectSelection::default();
    }

    fn hold(&mut self, id: SubjectId, dt: f32) -> SubjectId {
        self.selection.lost_timer = 0.0;
        self.selection.stick_timer = (self.selection.stick_timer - dt).max(0.0);
        id
    }

    fn lose(&mut self, dt: f32) {
        let Some(active) = self.selection.active else {
            return;
        };

        self.selection.lost_timer += dt;
        if elapsed(self.selection.lost_timer, self.config.lost_grace) {
            debug!(subject = %active, "subject lost");
            self.reset();
        }
    }

    fn best_candidate(&self, candidates: &[Skeleton]) -> Option<SubjectId> {
        let mut best: Option<(SubjectId, usize)> = None;
        for skeleton in candidates.iter().filter(|s| self.is_valid(s)) {
            let score = skeleton.tracked_joint_count();
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((skeleton.subject_id, score));
            }
        }
        best.map(|(id, _)| id)
    }
}

impl Default for SubjectSelector {
    fn default() -> Self {
        Self::new(SelectorConfig::default())
    }
}

/// A body with this id that the sensor still reports as tracked
pub fn find_present(candidates: &[Skeleton], id: SubjectId) -> Option<&Skeleton> {
    candidates
        .iter()
        .find(|s| s.is_tracked && s.subject_id == id)
}

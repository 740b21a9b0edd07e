//! Identity types
//!
//! The sensor assigns every body it tracks a 64-bit id that stays stable
//! for as long as that body remains in view.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Subject identity - the sensor's tracking id for one body
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub u64);

impl SubjectId {
    /// The sensor reports 0 for slots with no body behind them.
    pub const NONE: SubjectId = SubjectId(0);

    #[inline]
    pub fn new(id: u64) -> Self {
        SubjectId(id)
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Subject({:016x})", self.0)
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

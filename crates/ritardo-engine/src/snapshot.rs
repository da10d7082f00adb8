//! Parameter snapshots for the persistence collaborator.
//!
//! A snapshot holds every raw control value plus the mode toggles - never
//! any delay-line audio. Restoring goes through the normal clamped setters,
//! so a snapshot written by hand (or by an older build with different
//! ranges) cannot push the engine out of bounds.

use serde::{Deserialize, Serialize};

use crate::params::{ParamState, TimeBasis};
use ritardo_core::Subdivision;

/// Serializable capture of the engine's parameter values.
///
/// The mode toggles are stored as four booleans to match the external
/// persistence format; on restore they collapse back to the two exclusive
/// choices (the synced/sixteenth flags win if a hand-edited file claims
/// both sides of a pair).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSnapshot {
    /// Raw feedback amount, \[0, 1\].
    pub feedback: f32,
    /// Raw dry/wet mix, \[0, 1\].
    pub dry_wet: f32,
    /// Raw stereo pan, \[-1, 1\].
    pub pan: f32,
    /// Delay time in milliseconds.
    pub milliseconds: u32,
    /// Tempo-synced step count.
    pub steps: u32,
    /// Milliseconds time basis active.
    pub milliseconds_active: bool,
    /// Tempo-synced time basis active.
    pub steps_active: bool,
    /// Sixteenth-note subdivision active.
    pub sixteenth_active: bool,
    /// Eighth-triplet subdivision active.
    pub eighth_triplet_active: bool,
}

impl ParamSnapshot {
    /// Capture the current values of `params`.
    pub fn capture(params: &ParamState) -> Self {
        Self {
            feedback: params.raw_feedback(),
            dry_wet: params.raw_mix(),
            pan: params.raw_pan(),
            milliseconds: params.delay_ms(),
            steps: params.steps(),
            milliseconds_active: params.milliseconds_active(),
            steps_active: params.steps_active(),
            sixteenth_active: params.sixteenth_active(),
            eighth_triplet_active: params.eighth_triplet_active(),
        }
    }

    /// Apply this snapshot to `params` through the clamped setters.
    pub fn apply(&self, params: &mut ParamState) {
        params.set_feedback(self.feedback);
        params.set_mix(self.dry_wet);
        params.set_pan(self.pan);
        params.set_delay_ms(self.milliseconds);
        params.set_steps(self.steps);
        params.set_time_basis(if self.steps_active {
            TimeBasis::Synced
        } else {
            TimeBasis::Milliseconds
        });
        params.set_subdivision(if self.sixteenth_active {
            Subdivision::Sixteenth
        } else if self.eighth_triplet_active {
            Subdivision::EighthTriplet
        } else {
            Subdivision::Sixteenth
        });
    }
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        Self::capture(&ParamState::default())
    }
}

//! Musical time conversion for tempo-synced delay.
//!
//! Maps a step count and subdivision at a host-reported tempo to a delay
//! time in milliseconds. Pure functions, no state.

use libm::roundf;

/// Tempo substituted when the host reports no usable value.
pub const DEFAULT_BPM: f32 = 120.0;

/// Musical subdivision of a beat used for tempo-synced steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Subdivision {
    /// Sixteenth notes: four steps per beat.
    #[default]
    Sixteenth,
    /// Eighth-note triplets: three steps per beat.
    EighthTriplet,
}

impl Subdivision {
    /// Number of steps that make up one beat.
    pub const fn steps_per_beat(self) -> u32 {
        match self {
            Subdivision::Sixteenth => 4,
            Subdivision::EighthTriplet => 3,
        }
    }

    /// Short display label.
    pub const fn label(self) -> &'static str {
        match self {
            Subdivision::Sixteenth => "1/16",
            Subdivision::EighthTriplet => "1/8T",
        }
    }
}

/// Convert a number of steps at the given tempo to milliseconds:
/// `round(60000 * steps / (k * bpm))` with `k` steps per beat.
///
/// `bpm` must be positive; run the host value through [`effective_bpm`]
/// first. Callers clamp `steps` to its valid range before invocation.
///
/// # Example
///
/// ```rust
/// use ritardo_core::{Subdivision, steps_to_ms};
///
/// // Four sixteenths at 120 BPM = one beat = 500 ms.
/// assert_eq!(steps_to_ms(4, 120.0, Subdivision::Sixteenth), 500);
/// ```
#[inline]
pub fn steps_to_ms(steps: u32, bpm: f32, subdivision: Subdivision) -> u32 {
    let k = subdivision.steps_per_beat() as f32;
    roundf(60_000.0 * steps as f32 / (k * bpm)) as u32
}

/// Return the host tempo if it is usable, or [`DEFAULT_BPM`] when the host
/// reports zero, a negative value, or a non-finite value.
#[inline]
pub fn effective_bpm(host_bpm: f32) -> f32 {
    if host_bpm.is_finite() && host_bpm > 0.0 {
        host_bpm
    } else {
        DEFAULT_BPM
    }
}

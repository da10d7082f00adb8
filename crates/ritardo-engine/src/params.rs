//! Parameter state: raw control values, transfer curves, and the gain pairs
//! the block processor ramps between.
//!
//! Transfer curves are applied once, at the moment a value is set - never
//! per sample. The square-root laws for feedback, mix, and pan are kept
//! exactly as the effect has always voiced them; they are close to but not
//! the same as an equal-power law.

use libm::sqrtf;
use ritardo_core::{
    GainPair, ParamDescriptor, ParamUnit, ParameterInfo, Subdivision, effective_bpm, steps_to_ms,
};

/// Shortest supported delay in milliseconds.
pub const MIN_DELAY_MS: u32 = 1;

/// Longest supported delay in milliseconds (the delay line is sized for
/// this plus one block of headroom).
pub const MAX_DELAY_MS: u32 = 2000;

/// Minimum tempo-synced step count.
pub const MIN_STEPS: u32 = 1;

/// Maximum tempo-synced step count.
pub const MAX_STEPS: u32 = 16;

/// Which quantity drives the delay time.
///
/// Exactly one basis is active at a time; switching to one deactivates the
/// other by construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeBasis {
    /// The delay time is the milliseconds value, set directly.
    Milliseconds,
    /// The delay time is derived from step count, subdivision, and host
    /// tempo every block.
    #[default]
    Synced,
}

/// Parameter indices for [`ParameterInfo`] access.
pub mod index {
    /// Feedback amount, raw \[0, 1\].
    pub const FEEDBACK: usize = 0;
    /// Dry/wet mix, raw \[0, 1\].
    pub const MIX: usize = 1;
    /// Stereo pan, raw \[-1, 1\].
    pub const PAN: usize = 2;
    /// Delay time in milliseconds.
    pub const TIME_MS: usize = 3;
    /// Tempo-synced step count.
    pub const STEPS: usize = 4;
}

const DESCRIPTORS: [ParamDescriptor; 5] = [
    ParamDescriptor {
        name: "Feedback",
        short_name: "Fdbk",
        unit: ParamUnit::Percent,
        min: 0.0,
        max: 1.0,
        default: 0.5,
        step: 0.01,
    },
    ParamDescriptor {
        name: "Dry/Wet",
        short_name: "Mix",
        unit: ParamUnit::Percent,
        min: 0.0,
        max: 1.0,
        default: 0.5,
        step: 0.01,
    },
    ParamDescriptor {
        name: "Pan",
        short_name: "Pan",
        unit: ParamUnit::None,
        min: -1.0,
        max: 1.0,
        default: 0.0,
        step: 0.01,
    },
    ParamDescriptor {
        name: "Time",
        short_name: "Time",
        unit: ParamUnit::Milliseconds,
        min: 1.0,
        max: 2000.0,
        default: 125.0,
        step: 1.0,
    },
    ParamDescriptor {
        name: "Steps",
        short_name: "Steps",
        unit: ParamUnit::Steps,
        min: 1.0,
        max: 16.0,
        default: 1.0,
        step: 1.0,
    },
];

/// All control state the block processor reads once per block.
///
/// Raw values are retained for snapshots and introspection; the derived
/// gains live in [`GainPair`]s so every change ramps in over one block.
#[derive(Debug, Clone)]
pub struct ParamState {
    raw_feedback: f32,
    raw_mix: f32,
    raw_pan: f32,
    steps: u32,
    delay_ms: u32,
    time_basis: TimeBasis,
    subdivision: Subdivision,
    wet_level: f32,
    pan_gains: [f32; 2],
    feedback: GainPair,
    dry: GainPair,
    wet: [GainPair; 2],
}

impl Default for ParamState {
    fn default() -> Self {
        let mut state = Self {
            raw_feedback: 0.0,
            raw_mix: 0.0,
            raw_pan: 0.0,
            steps: MIN_STEPS,
            delay_ms: MIN_DELAY_MS,
            time_basis: TimeBasis::default(),
            subdivision: Subdivision::default(),
            wet_level: 0.0,
            pan_gains: [1.0, 1.0],
            feedback: GainPair::default(),
            dry: GainPair::default(),
            wet: [GainPair::default(); 2],
        };
        state.set_feedback(DESCRIPTORS[index::FEEDBACK].default);
        state.set_mix(DESCRIPTORS[index::MIX].default);
        state.set_pan(DESCRIPTORS[index::PAN].default);
        state.refresh_synced_time(0.0);
        state.shift_gains();
        state
    }
}

impl ParamState {
    /// Set the raw feedback amount. The feedback gain becomes
    /// `sqrt(raw)`, ramped in over the next block.
    pub fn set_feedback(&mut self, raw: f32) {
        let raw = raw.clamp(0.0, 1.0);
        self.raw_feedback = raw;
        self.feedback.set(sqrtf(raw));
    }

    /// Set the raw dry/wet mix. The wet level becomes `sqrt(raw)` and the
    /// dry gain `sqrt(1 - wet)`.
    pub fn set_mix(&mut self, raw: f32) {
        let raw = raw.clamp(0.0, 1.0);
        self.raw_mix = raw;
        self.wet_level = sqrtf(raw);
        self.dry.set(sqrtf(1.0 - self.wet_level));
        self.refresh_wet();
    }

    /// Set the raw stereo pan in \[-1, 1\]. Panning attenuates only the
    /// opposite side: left gain is 1 at or left of center, right gain is 1
    /// at or right of center.
    pub fn set_pan(&mut self, raw: f32) {
        let raw = raw.clamp(-1.0, 1.0);
        self.raw_pan = raw;
        self.pan_gains[0] = if raw <= 0.0 { 1.0 } else { sqrtf(1.0 - raw) };
        self.pan_gains[1] = if raw >= 0.0 { 1.0 } else { sqrtf(1.0 + raw) };
        self.refresh_wet();
    }

    fn refresh_wet(&mut self) {
        for (pair, &pan_gain) in self.wet.iter_mut().zip(&self.pan_gains) {
            pair.set(self.wet_level * pan_gain);
        }
    }

    /// Set the delay time in milliseconds, clamped to
    /// [`MIN_DELAY_MS`]..=[`MAX_DELAY_MS`]. While the synced basis is
    /// active, the value is overwritten on the next block.
    pub fn set_delay_ms(&mut self, ms: u32) {
        self.delay_ms = ms.clamp(MIN_DELAY_MS, MAX_DELAY_MS);
    }

    /// Set the tempo-synced step count, clamped to
    /// [`MIN_STEPS`]..=[`MAX_STEPS`].
    pub fn set_steps(&mut self, steps: u32) {
        self.steps = steps.clamp(MIN_STEPS, MAX_STEPS);
    }

    /// Select which quantity drives the delay time. Activating one basis
    /// deactivates the other.
    pub fn set_time_basis(&mut self, basis: TimeBasis) {
        self.time_basis = basis;
    }

    /// Select the subdivision for tempo-synced steps. Activating one
    /// deactivates the other.
    pub fn set_subdivision(&mut self, subdivision: Subdivision) {
        self.subdivision = subdivision;
    }

    /// Recompute the delay time from steps and tempo. A no-op unless the
    /// synced basis is active. Zero or invalid tempo falls back to the
    /// default 120 BPM. The derived value is clamped like a directly set
    /// one, so extreme step/tempo combinations cannot exceed the line.
    pub fn refresh_synced_time(&mut self, host_bpm: f32) {
        if self.time_basis != TimeBasis::Synced {
            return;
        }
        let ms = steps_to_ms(self.steps, effective_bpm(host_bpm), self.subdivision)
            .clamp(MIN_DELAY_MS, MAX_DELAY_MS);
        #[cfg(feature = "tracing")]
        if ms != self.delay_ms {
            tracing::debug!("synced delay time: {} ms -> {} ms", self.delay_ms, ms);
        }
        self.delay_ms = ms;
    }

    /// Shift every gain pair `current -> previous`. Called by the block
    /// processor at the end of each block, and on reset to cancel pending
    /// ramps.
    pub fn shift_gains(&mut self) {
        self.feedback.shift();
        self.dry.shift();
        for pair in &mut self.wet {
            pair.shift();
        }
    }

    /// Feedback gain pair (post transfer curve).
    pub fn feedback(&self) -> GainPair {
        self.feedback
    }

    /// Dry output gain pair (post transfer curve).
    pub fn dry(&self) -> GainPair {
        self.dry
    }

    /// Wet gain pair for `channel` (wet level x pan gain). Channels beyond
    /// the second share the right gain.
    pub fn wet(&self, channel: usize) -> GainPair {
        self.wet[channel.min(1)]
    }

    /// Raw feedback value as last set.
    pub fn raw_feedback(&self) -> f32 {
        self.raw_feedback
    }

    /// Raw dry/wet value as last set.
    pub fn raw_mix(&self) -> f32 {
        self.raw_mix
    }

    /// Raw pan value as last set.
    pub fn raw_pan(&self) -> f32 {
        self.raw_pan
    }

    /// Effective delay time in milliseconds.
    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    /// Tempo-synced step count.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Active time basis.
    pub fn time_basis(&self) -> TimeBasis {
        self.time_basis
    }

    /// Active subdivision.
    pub fn subdivision(&self) -> Subdivision {
        self.subdivision
    }

    /// Whether the milliseconds basis is active.
    pub fn milliseconds_active(&self) -> bool {
        self.time_basis == TimeBasis::Milliseconds
    }

    /// Whether the tempo-synced basis is active.
    pub fn steps_active(&self) -> bool {
        self.time_basis == TimeBasis::Synced
    }

    /// Whether sixteenth-note steps are active.
    pub fn sixteenth_active(&self) -> bool {
        self.subdivision == Subdivision::Sixteenth
    }

    /// Whether eighth-triplet steps are active.
    pub fn eighth_triplet_active(&self) -> bool {
        self.subdivision == Subdivision::EighthTriplet
    }
}

impl ParameterInfo for ParamState {
    fn param_count(&self) -> usize {
        DESCRIPTORS.len()
    }

    fn param_info(&self, i: usize) -> Option<ParamDescriptor> {
        DESCRIPTORS.get(i).copied()
    }

    fn get_param(&self, i: usize) -> f32 {
        match i {
            index::FEEDBACK => self.raw_feedback,
            index::MIX => self.raw_mix,
            index::PAN => self.raw_pan,
            index::TIME_MS => self.delay_ms as f32,
            index::STEPS => self.steps as f32,
            _ => 0.0,
        }
    }

    fn set_param(&mut self, i: usize, value: f32) {
        match i {
            index::FEEDBACK => self.set_feedback(value),
            index::MIX => self.set_mix(value),
            index::PAN => self.set_pan(value),
            index::TIME_MS => self.set_delay_ms(libm::roundf(value.max(0.0)) as u32),
            index::STEPS => self.set_steps(libm::roundf(value.max(0.0)) as u32),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_curve_is_square_root() {
        let mut params = ParamState::default();
        params.set_feedback(0.25);
        assert!((params.feedback().current - 0.5).abs() < 1e-6);
        params.set_feedback(1.0);
        assert!((params.feedback().current - 1.0).abs() < 1e-6);
        params.set_feedback(0.0);
        assert_eq!(params.feedback().current, 0.0);
    }

    #[test]
    fn mix_curve_links_dry_and_wet() {
        let mut params = ParamState::default();
        params.set_mix(0.5);
        let wet = sqrtf(0.5);
        let dry = sqrtf(1.0 - wet);
        assert!((params.wet(0).current - wet).abs() < 1e-6);
        assert!((params.dry().current - dry).abs() < 1e-6);

        params.set_mix(1.0);
        assert!((params.wet(0).current - 1.0).abs() < 1e-6);
        assert_eq!(params.dry().current, 0.0);
    }

    #[test]
    fn pan_law_attenuates_opposite_side_only() {
        let mut params = ParamState::default();
        params.set_mix(1.0); // wet level 1 so wet pairs expose pan directly

        params.set_pan(0.0);
        assert_eq!(params.wet(0).current, 1.0);
        assert_eq!(params.wet(1).current, 1.0);

        params.set_pan(0.5);
        assert!((params.wet(0).current - sqrtf(0.5)).abs() < 1e-6);
        assert_eq!(params.wet(1).current, 1.0);

        params.set_pan(-0.5);
        assert_eq!(params.wet(0).current, 1.0);
        assert!((params.wet(1).current - sqrtf(0.5)).abs() < 1e-6);

        params.set_pan(1.0);
        assert_eq!(params.wet(0).current, 0.0);
        assert_eq!(params.wet(1).current, 1.0);
    }

    #[test]
    fn raw_values_are_clamped() {
        let mut params = ParamState::default();
        params.set_feedback(1.5);
        assert_eq!(params.raw_feedback(), 1.0);
        params.set_pan(-2.0);
        assert_eq!(params.raw_pan(), -1.0);
        params.set_delay_ms(5000);
        assert_eq!(params.delay_ms(), MAX_DELAY_MS);
        params.set_delay_ms(0);
        assert_eq!(params.delay_ms(), MIN_DELAY_MS);
        params.set_steps(40);
        assert_eq!(params.steps(), MAX_STEPS);
    }

    #[test]
    fn time_basis_is_mutually_exclusive() {
        let mut params = ParamState::default();
        params.set_time_basis(TimeBasis::Milliseconds);
        assert!(params.milliseconds_active());
        assert!(!params.steps_active());

        params.set_time_basis(TimeBasis::Synced);
        assert!(params.steps_active());
        assert!(!params.milliseconds_active());
    }

    #[test]
    fn subdivision_is_mutually_exclusive() {
        let mut params = ParamState::default();
        params.set_subdivision(Subdivision::EighthTriplet);
        assert!(params.eighth_triplet_active());
        assert!(!params.sixteenth_active());

        params.set_subdivision(Subdivision::Sixteenth);
        assert!(params.sixteenth_active());
        assert!(!params.eighth_triplet_active());
    }

    #[test]
    fn synced_time_tracks_tempo() {
        let mut params = ParamState::default();
        params.set_steps(4);
        params.refresh_synced_time(120.0);
        assert_eq!(params.delay_ms(), 500);

        params.refresh_synced_time(240.0);
        assert_eq!(params.delay_ms(), 250);

        params.set_subdivision(Subdivision::EighthTriplet);
        params.refresh_synced_time(120.0);
        // 60000 * 4 / (3 * 120) = 666.67 -> 667
        assert_eq!(params.delay_ms(), 667);
    }

    #[test]
    fn synced_time_ignores_invalid_tempo() {
        let mut params = ParamState::default();
        params.set_steps(4);
        params.refresh_synced_time(0.0);
        assert_eq!(params.delay_ms(), 500); // falls back to 120 BPM
    }

    #[test]
    fn synced_time_is_clamped_to_line_length() {
        let mut params = ParamState::default();
        params.set_steps(16);
        params.set_subdivision(Subdivision::EighthTriplet);
        // 60000 * 16 / (3 * 30) = 10667 ms, far beyond the 2 s line.
        params.refresh_synced_time(30.0);
        assert_eq!(params.delay_ms(), MAX_DELAY_MS);
    }

    #[test]
    fn milliseconds_basis_skips_refresh() {
        let mut params = ParamState::default();
        params.set_time_basis(TimeBasis::Milliseconds);
        params.set_delay_ms(300);
        params.refresh_synced_time(120.0);
        assert_eq!(params.delay_ms(), 300);
    }

    #[test]
    fn gain_pairs_shift_at_block_end() {
        let mut params = ParamState::default();
        params.set_feedback(0.0);
        let before = params.feedback();
        assert!(before.previous > 0.0); // default sqrt(0.5) still ramping out
        assert_eq!(before.current, 0.0);

        params.shift_gains();
        let after = params.feedback();
        assert_eq!(after.previous, 0.0);
        assert_eq!(after.current, 0.0);
    }

    #[test]
    fn parameter_info_roundtrip() {
        let mut params = ParamState::default();
        params.set_param(index::FEEDBACK, 0.7);
        assert!((params.get_param(index::FEEDBACK) - 0.7).abs() < 1e-6);

        params.set_param(index::TIME_MS, 250.4);
        assert_eq!(params.get_param(index::TIME_MS), 250.0);

        params.set_param(index::STEPS, 8.0);
        assert_eq!(params.get_param(index::STEPS), 8.0);

        // Out-of-range index is ignored.
        params.set_param(99, 1.0);
        assert_eq!(params.get_param(99), 0.0);

        assert_eq!(params.param_count(), 5);
        assert_eq!(params.find_param_by_name("mix"), Some(index::MIX));
    }

    #[test]
    fn defaults_match_descriptors() {
        let params = ParamState::default();
        assert_eq!(params.raw_feedback(), 0.5);
        assert_eq!(params.raw_mix(), 0.5);
        assert_eq!(params.raw_pan(), 0.0);
        assert_eq!(params.steps(), 1);
        // One sixteenth at the default 120 BPM.
        assert_eq!(params.delay_ms(), 125);
        assert!(params.steps_active());
        assert!(params.sixteenth_active());
        // No pending ramps right after construction.
        assert_eq!(params.feedback().previous, params.feedback().current);
        assert_eq!(params.dry().previous, params.dry().current);
    }
}

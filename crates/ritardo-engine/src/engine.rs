//! The per-block delay processor.
//!
//! [`DelayEngine`] owns the delay line, the write/read cursor protocol, and
//! the parameter state. Hosts drive it with three calls: [`prepare`] when
//! the session (re)starts or the sample rate changes, [`process_block`] once
//! per audio block, and the parameter setters in between blocks.
//!
//! # Cursor state machine
//!
//! The state machine is implicit in the cursor fields. After a reset,
//! `expected_read_pos` is `None`: the first block has no previous tap to
//! fade out of, so the wet signal fades in from silence. From then on the
//! engine predicts where the next block's read should land; when the actual
//! read position matches the prediction, the tap is read once with a smooth
//! gain ramp. When it differs (the delay time jumped - a tempo change, a
//! step change, a direct edit), the stale tap is faded out while the new tap
//! fades in, both mixed into the same block. That crossfade is what keeps
//! abrupt delay-time changes click-free.
//!
//! [`prepare`]: DelayEngine::prepare
//! [`process_block`]: DelayEngine::process_block

use libm::roundf;
use ritardo_core::{BlockDelay, GainRamp, MixMode, ParamDescriptor, ParameterInfo, Subdivision};
use ritardo_core::{apply_gain_ramp, flush_denormal, ms_to_samples};

use crate::params::{ParamState, TimeBasis};
use crate::snapshot::ParamSnapshot;

/// Maximum supported delay in seconds; the line is sized for this plus one
/// block of headroom per second.
const MAX_DELAY_SECONDS: usize = 2;

/// Tempo-synchronizable feedback delay engine.
///
/// Processes audio in place, block by block, on a single real-time thread:
/// no allocation, locking, or blocking happens inside
/// [`process_block`](Self::process_block). All buffers are sized by
/// [`prepare`](Self::prepare), which must run outside the real-time callback.
///
/// # Example
///
/// ```rust
/// use ritardo_engine::DelayEngine;
///
/// let mut engine = DelayEngine::new(2, 48000.0, 256);
/// engine.params_mut().set_mix(0.5);
/// engine.reset();
///
/// let mut left = [0.0f32; 256];
/// let mut right = [0.0f32; 256];
/// engine.process_block(&mut [&mut left, &mut right], 120.0);
/// ```
#[derive(Debug, Clone)]
pub struct DelayEngine {
    sample_rate: f32,
    max_block: usize,
    delay: BlockDelay,
    write_pos: usize,
    expected_read_pos: Option<usize>,
    params: ParamState,
}

impl DelayEngine {
    /// Create an engine for `channels` channels (1 or 2), sized for
    /// `sample_rate` and blocks up to `max_block` frames.
    ///
    /// # Panics
    ///
    /// Panics if `channels` is not 1 or 2, or if `sample_rate` is not
    /// positive.
    pub fn new(channels: usize, sample_rate: f32, max_block: usize) -> Self {
        assert!(
            channels == 1 || channels == 2,
            "DelayEngine supports mono or stereo"
        );
        assert!(sample_rate > 0.0, "sample rate must be positive");
        Self {
            sample_rate,
            max_block,
            delay: BlockDelay::new(channels, Self::capacity_for(sample_rate, max_block)),
            write_pos: 0,
            expected_read_pos: None,
            params: ParamState::default(),
        }
    }

    fn capacity_for(sample_rate: f32, max_block: usize) -> usize {
        MAX_DELAY_SECONDS * (sample_rate as usize + max_block)
    }

    /// Reallocate the delay line for a new sample rate and maximum block
    /// size, then [`reset`](Self::reset).
    ///
    /// Allocates; must run outside the real-time callback, before
    /// processing resumes.
    pub fn prepare(&mut self, sample_rate: f32, max_block: usize) {
        assert!(sample_rate > 0.0, "sample rate must be positive");
        self.sample_rate = sample_rate;
        self.max_block = max_block;
        self.delay = BlockDelay::new(
            self.delay.channels(),
            Self::capacity_for(sample_rate, max_block),
        );
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "prepared: {} Hz, {} frame blocks, {} sample line",
            sample_rate,
            max_block,
            self.delay.capacity()
        );
        self.reset();
    }

    /// Clear the delay line to silence and return the cursors to their
    /// initial state. Pending gain ramps are cancelled so the next block
    /// starts from settled values. Idempotent.
    pub fn reset(&mut self) {
        self.delay.clear();
        self.write_pos = 0;
        self.expected_read_pos = None;
        self.params.shift_gains();
    }

    /// Process one block in place.
    ///
    /// `channels` holds one buffer per channel, all the same length, at
    /// most the prepared maximum. `host_bpm` is the tempo reported by the
    /// host for this block; zero or invalid values fall back to 120 BPM.
    ///
    /// An empty channel list or a zero-length block is skipped without
    /// touching any state - the only degraded mode.
    pub fn process_block(&mut self, channels: &mut [&mut [f32]], host_bpm: f32) {
        let Some(len) = channels.first().map(|channel| channel.len()) else {
            return;
        };
        if len == 0 {
            return;
        }
        debug_assert!(len <= self.max_block, "block exceeds prepared maximum");
        debug_assert!(
            channels.iter().all(|channel| channel.len() == len),
            "channel buffers must have equal length"
        );
        let used = channels.len().min(self.delay.channels());

        self.params.refresh_synced_time(host_bpm);
        let capacity = self.delay.capacity();
        let delay_samples =
            roundf(ms_to_samples(self.params.delay_ms() as f32, self.sample_rate)) as usize;
        debug_assert!(delay_samples < capacity);

        // Record the incoming block before anything scales it.
        for (ch, buffer) in channels.iter_mut().enumerate().take(used) {
            self.delay
                .write(ch, self.write_pos, buffer, GainRamp::UNITY, MixMode::Replace);
        }

        // Dry path: ramp from the previous block's dry gain.
        let dry = self.params.dry().ramp();
        for buffer in channels.iter_mut().take(used) {
            apply_gain_ramp(buffer, dry);
        }

        let read_pos = (self.write_pos + capacity - delay_samples) % capacity;

        match self.expected_read_pos {
            Some(expected) => {
                // Read where the last block predicted. If the delay time
                // jumped, this tap is now stale: fade it to silence.
                for (ch, buffer) in channels.iter_mut().enumerate().take(used) {
                    let wet = self.params.wet(ch);
                    let ramp = if read_pos == expected {
                        wet.ramp()
                    } else {
                        wet.fade_out()
                    };
                    self.delay
                        .read(ch, expected, buffer, ramp, MixMode::Accumulate);
                }
                // And bring the new tap in from silence.
                if read_pos != expected {
                    for (ch, buffer) in channels.iter_mut().enumerate().take(used) {
                        let ramp = self.params.wet(ch).fade_in();
                        self.delay
                            .read(ch, read_pos, buffer, ramp, MixMode::Accumulate);
                    }
                }
            }
            None => {
                // First block after a reset: nothing to fade out of.
                for (ch, buffer) in channels.iter_mut().enumerate().take(used) {
                    let ramp = self.params.wet(ch).fade_in();
                    self.delay
                        .read(ch, read_pos, buffer, ramp, MixMode::Accumulate);
                }
            }
        }

        // Feedback: the mixed output re-enters the line on top of the dry
        // record. Decaying repeats drift toward the subnormal range, so
        // flush before re-injecting.
        let feedback = self.params.feedback().ramp();
        for (ch, buffer) in channels.iter_mut().enumerate().take(used) {
            for sample in buffer.iter_mut() {
                *sample = flush_denormal(*sample);
            }
            self.delay
                .write(ch, self.write_pos, buffer, feedback, MixMode::Accumulate);
        }

        self.write_pos = (self.write_pos + len) % capacity;
        self.expected_read_pos = Some((read_pos + len) % capacity);
        self.params.shift_gains();
    }

    /// Capture the current parameter values. Delay-line contents are never
    /// part of a snapshot.
    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot::capture(&self.params)
    }

    /// Apply a snapshot through the normal clamped setters, then reset so
    /// the line comes back silent.
    pub fn restore(&mut self, snapshot: &ParamSnapshot) {
        snapshot.apply(&mut self.params);
        #[cfg(feature = "tracing")]
        tracing::debug!("restored snapshot: {:?}", snapshot);
        self.reset();
    }

    /// Shared parameter state.
    pub fn params(&self) -> &ParamState {
        &self.params
    }

    /// Mutable parameter state, for the host's change notifications.
    pub fn params_mut(&mut self) -> &mut ParamState {
        &mut self.params
    }

    /// Configured channel count.
    pub fn channels(&self) -> usize {
        self.delay.channels()
    }

    /// Sample rate the engine was prepared for.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Effective delay time in milliseconds (derived while synced).
    pub fn delay_ms(&self) -> u32 {
        self.params.delay_ms()
    }

    /// Tempo-synced step count.
    pub fn steps(&self) -> u32 {
        self.params.steps()
    }

    /// Active time basis.
    pub fn time_basis(&self) -> TimeBasis {
        self.params.time_basis()
    }

    /// Active subdivision.
    pub fn subdivision(&self) -> Subdivision {
        self.params.subdivision()
    }

    /// Current write cursor, for diagnostics.
    pub fn write_position(&self) -> usize {
        self.write_pos
    }

    /// Predicted read cursor for the next block; `None` until the first
    /// block after a reset has been processed.
    pub fn expected_read_position(&self) -> Option<usize> {
        self.expected_read_pos
    }
}

impl ParameterInfo for DelayEngine {
    fn param_count(&self) -> usize {
        self.params.param_count()
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        self.params.param_info(index)
    }

    fn get_param(&self, index: usize) -> f32 {
        self.params.get_param(index)
    }

    fn set_param(&mut self, index: usize, value: f32) {
        self.params.set_param(index, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono_engine(sample_rate: f32, block: usize) -> DelayEngine {
        let mut engine = DelayEngine::new(1, sample_rate, block);
        engine.params_mut().set_feedback(0.0);
        engine.params_mut().set_time_basis(TimeBasis::Milliseconds);
        engine.reset();
        engine
    }

    #[test]
    fn empty_input_is_skipped() {
        let mut engine = mono_engine(48000.0, 64);
        engine.process_block(&mut [], 120.0);
        assert_eq!(engine.write_position(), 0);
        assert_eq!(engine.expected_read_position(), None);

        let mut empty: [f32; 0] = [];
        engine.process_block(&mut [&mut empty], 120.0);
        assert_eq!(engine.write_position(), 0);
        assert_eq!(engine.expected_read_position(), None);
    }

    #[test]
    fn cursors_advance_per_block() {
        let mut engine = mono_engine(48000.0, 64);
        engine.params_mut().set_delay_ms(100);
        let mut buffer = [0.0f32; 64];
        engine.process_block(&mut [&mut buffer], 120.0);
        assert_eq!(engine.write_position(), 64);
        // read position 4800 behind the (pre-advance) write position
        let capacity = 2 * (48000 + 64);
        let expected = (capacity - 4800 + 64) % capacity;
        assert_eq!(engine.expected_read_position(), Some(expected));
    }

    #[test]
    fn first_block_fades_wet_in_from_silence() {
        // 1 ms delay at 48 kHz = 48 samples, shorter than the block, so the
        // tap reads back this block's own freshly written input.
        let mut engine = mono_engine(48000.0, 480);
        engine.params_mut().set_mix(1.0); // wet 1, dry 0
        engine.params_mut().set_delay_ms(1);
        engine.reset();

        let mut buffer = [1.0f32; 480];
        engine.process_block(&mut [&mut buffer], 120.0);

        // Before the tap delay elapses there is nothing to hear.
        assert_eq!(buffer[0], 0.0);
        assert_eq!(buffer[47], 0.0);
        // After it, the fade-in ramp i/len shows through.
        let expected_mid = 240.0 / 480.0;
        assert!((buffer[240] - expected_mid).abs() < 1e-3);
        let expected_last = 479.0 / 480.0;
        assert!((buffer[479] - expected_last).abs() < 1e-3);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut engine = mono_engine(44100.0, 128);
        engine.params_mut().set_delay_ms(50);
        let mut buffer = [1.0f32; 128];
        for _ in 0..10 {
            engine.process_block(&mut [&mut buffer], 120.0);
        }

        engine.reset();
        assert_eq!(engine.write_position(), 0);
        assert_eq!(engine.expected_read_position(), None);
        engine.reset();
        assert_eq!(engine.write_position(), 0);
        assert_eq!(engine.expected_read_position(), None);

        // Buffers are silent again: a block of silence yields silence.
        let mut silent = [0.0f32; 128];
        engine.process_block(&mut [&mut silent], 120.0);
        assert!(silent.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn snapshot_restore_silences_line() {
        let mut engine = mono_engine(44100.0, 128);
        engine.params_mut().set_delay_ms(10);
        engine.params_mut().set_mix(1.0);
        engine.reset();

        let mut impulse = [0.0f32; 128];
        impulse[0] = 1.0;
        engine.process_block(&mut [&mut impulse], 120.0);

        let snapshot = engine.snapshot();
        engine.restore(&snapshot);

        // The impulse recorded before the restore must be gone.
        let mut silent = [0.0f32; 128];
        for _ in 0..8 {
            silent.fill(0.0);
            engine.process_block(&mut [&mut silent], 120.0);
            assert!(silent.iter().all(|&s| s == 0.0));
        }
    }

    #[test]
    fn extra_host_channels_are_ignored() {
        let mut engine = mono_engine(48000.0, 32);
        let mut a = [0.5f32; 32];
        let mut b = [0.5f32; 32];
        // Engine is mono; the second buffer must pass through untouched by
        // the wet path and unscaled by the dry ramp.
        engine.process_block(&mut [&mut a, &mut b], 120.0);
        assert!(b.iter().all(|&s| s == 0.5));
    }

    #[test]
    #[should_panic]
    fn three_channel_engine_is_rejected() {
        let _ = DelayEngine::new(3, 48000.0, 64);
    }
}

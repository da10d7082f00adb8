//! Fixed-capacity circular delay storage with block-oriented, gain-ramped
//! access.
//!
//! [`BlockDelay`] holds one buffer per audio channel and exposes write/read
//! operations that move a whole block at a time, applying a linear
//! [`GainRamp`] across it. Both operations are wraparound-aware: when a block
//! straddles the end of the buffer, the transfer is split at the boundary and
//! the ramp is partitioned proportionally, so the gain stays a single linear
//! function of sample index with no seam at the split.
//!
//! # Memory
//!
//! Buffers are allocated at construction and never resized. No allocations
//! occur during audio processing.
//!
//! # Example
//!
//! ```rust
//! use ritardo_core::{BlockDelay, GainRamp, MixMode};
//!
//! let mut delay = BlockDelay::new(1, 16);
//! let input = [1.0, 2.0, 3.0, 4.0];
//!
//! // Write near the end of the buffer: wraps transparently.
//! delay.write(0, 14, &input, GainRamp::UNITY, MixMode::Replace);
//!
//! let mut out = [0.0; 4];
//! delay.read(0, 14, &mut out, GainRamp::UNITY, MixMode::Replace);
//! assert_eq!(out, input);
//! ```

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;

use crate::ramp::GainRamp;

/// How a transfer combines with the destination samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MixMode {
    /// Overwrite the destination. Used to stamp fresh input into the delay
    /// line, or to fill an output buffer from scratch.
    Replace,
    /// Add into the destination, preserving existing content. Used for
    /// feedback injection and for mixing delay taps into the output.
    Accumulate,
}

/// Per-channel circular sample store for block-based delay processing.
///
/// Positions are integer sample offsets in `[0, capacity)`; callers own the
/// cursor arithmetic (this type never moves a cursor itself).
#[derive(Debug, Clone)]
pub struct BlockDelay {
    buffers: Vec<Vec<f32>>,
    capacity: usize,
}

impl BlockDelay {
    /// Create a delay store with `channels` buffers of `capacity` samples,
    /// cleared to silence.
    ///
    /// # Panics
    ///
    /// Panics if `channels` or `capacity` is 0.
    pub fn new(channels: usize, capacity: usize) -> Self {
        assert!(channels > 0, "BlockDelay needs at least one channel");
        assert!(capacity > 0, "BlockDelay capacity must be > 0");
        Self {
            buffers: vec![vec![0.0; capacity]; channels],
            capacity,
        }
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.buffers.len()
    }

    /// Capacity in samples (identical for every channel).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clear all channels to silence.
    pub fn clear(&mut self) {
        for buffer in &mut self.buffers {
            buffer.fill(0.0);
        }
    }

    /// Copy or accumulate `input` into channel `channel` starting at
    /// `position`, scaling by a linear ramp across the block.
    ///
    /// If `position + input.len()` exceeds the capacity, the write is split
    /// at the wrap boundary and the ramp is partitioned proportionally at
    /// the split point.
    ///
    /// # Panics
    ///
    /// Panics if `channel` is out of range. Debug-asserts that the block
    /// fits within the capacity and `position` is in range.
    pub fn write(
        &mut self,
        channel: usize,
        position: usize,
        input: &[f32],
        ramp: GainRamp,
        mode: MixMode,
    ) {
        let len = input.len();
        if len == 0 {
            return;
        }
        debug_assert!(len <= self.capacity, "block longer than delay capacity");
        debug_assert!(position < self.capacity, "write position out of range");

        let capacity = self.capacity;
        let buffer = &mut self.buffers[channel];
        if position + len <= capacity {
            mix_block(&mut buffer[position..position + len], input, ramp, mode);
        } else {
            let split = capacity - position;
            let (head, tail) = ramp.split_at(split as f32 / len as f32);
            mix_block(&mut buffer[position..], &input[..split], head, mode);
            mix_block(&mut buffer[..len - split], &input[split..], tail, mode);
        }
    }

    /// Read a block from channel `channel` starting at `position` into
    /// `output`, scaling by a linear ramp across the block. Symmetric
    /// counterpart of [`write`](Self::write), with the same
    /// wraparound-split-and-partition rule.
    pub fn read(
        &self,
        channel: usize,
        position: usize,
        output: &mut [f32],
        ramp: GainRamp,
        mode: MixMode,
    ) {
        let len = output.len();
        if len == 0 {
            return;
        }
        debug_assert!(len <= self.capacity, "block longer than delay capacity");
        debug_assert!(position < self.capacity, "read position out of range");

        let buffer = &self.buffers[channel];
        if position + len <= self.capacity {
            mix_block(output, &buffer[position..position + len], ramp, mode);
        } else {
            let split = self.capacity - position;
            let (head, tail) = ramp.split_at(split as f32 / len as f32);
            mix_block(&mut output[..split], &buffer[position..], head, mode);
            mix_block(&mut output[split..], &buffer[..len - split], tail, mode);
        }
    }
}

/// Scale `src` by the ramp and copy or add it into `dest`.
///
/// Sample `i` of an `n`-sample segment is scaled by
/// `start + (end - start) * i / n` - the same law as
/// [`apply_gain_ramp`](crate::apply_gain_ramp), so split segments whose ramps
/// were partitioned with [`GainRamp::split_at`] reproduce one continuous
/// line.
fn mix_block(dest: &mut [f32], src: &[f32], ramp: GainRamp, mode: MixMode) {
    debug_assert_eq!(dest.len(), src.len());
    let step = if ramp.is_flat() {
        0.0
    } else {
        (ramp.end - ramp.start) / dest.len() as f32
    };
    match mode {
        MixMode::Replace => {
            for (i, (d, s)) in dest.iter_mut().zip(src.iter()).enumerate() {
                *d = s * (ramp.start + step * i as f32);
            }
        }
        MixMode::Accumulate => {
            for (i, (d, s)) in dest.iter_mut().zip(src.iter()).enumerate() {
                *d += s * (ramp.start + step * i as f32);
            }
        }
    }
}

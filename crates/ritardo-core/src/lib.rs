//! Ritardo Core - block-delay DSP primitives
//!
//! Foundational building blocks for a block-based, tempo-synchronizable
//! delay, designed for real-time processing with zero allocation in the
//! audio path.
//!
//! # Core Abstractions
//!
//! ## Delay Storage
//!
//! - [`BlockDelay`] - per-channel circular buffer with gain-ramped,
//!   wraparound-aware block write/read
//! - [`MixMode`] - replace vs accumulate semantics for a transfer
//!
//! ## Gain Ramps
//!
//! Click-free parameter changes at block granularity:
//!
//! - [`GainRamp`] - one linear gain function across a block
//! - [`GainPair`] - previous/current gain handoff between blocks
//! - [`apply_gain_ramp`] - in-place buffer ramping
//!
//! ## Musical Time
//!
//! - [`Subdivision`], [`steps_to_ms`], [`effective_bpm`] - tempo-to-time
//!   conversion for synced delay
//!
//! ## Parameter Introspection
//!
//! - [`ParameterInfo`], [`ParamDescriptor`], [`ParamUnit`]
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! ritardo-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: no allocations in processing paths
//! - **No dependencies on std**: pure `no_std` with `libm` for math
//! - **Cursor-free storage**: [`BlockDelay`] never moves a position itself;
//!   the engine owns the read/write cursor protocol

#![cfg_attr(not(feature = "std"), no_std)]

pub mod block_delay;
pub mod math;
pub mod param_info;
pub mod ramp;
pub mod tempo;

pub use block_delay::{BlockDelay, MixMode};
pub use math::{flush_denormal, lerp, ms_to_samples, samples_to_ms};
pub use param_info::{ParamDescriptor, ParamUnit, ParameterInfo};
pub use ramp::{GainPair, GainRamp, apply_gain_ramp};
pub use tempo::{DEFAULT_BPM, Subdivision, effective_bpm, steps_to_ms};

//! Ritardo Engine - a tempo-synchronizable feedback delay.
//!
//! A circular delay line records the incoming stream, plays it back after a
//! configurable offset, blends it with the dry signal, and feeds a gained
//! copy back into the line - while delay time, feedback, mix, and pan change
//! without clicks.
//!
//! # Components
//!
//! - [`DelayEngine`] - the per-block processor: cursor protocol, crossfade
//!   state machine, feedback path
//! - [`ParamState`] - raw control values, transfer curves, block-ramped
//!   gain pairs, time-basis and subdivision modes
//! - [`ParamSnapshot`] - serializable parameter capture for the persistence
//!   collaborator
//!
//! # Host contract
//!
//! The host shell calls [`DelayEngine::prepare`] before processing (and on
//! any sample-rate or block-size change), then
//! [`DelayEngine::process_block`] once per block with the tempo it reports.
//! Parameter-change notifications land on [`DelayEngine::params_mut`] (or
//! the indexed [`ParameterInfo`](ritardo_core::ParameterInfo) surface)
//! between blocks. Neither the control surface nor the notification
//! mechanism lives here.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod engine;
pub mod params;
pub mod snapshot;

pub use engine::DelayEngine;
pub use params::{MAX_DELAY_MS, MAX_STEPS, MIN_DELAY_MS, MIN_STEPS, ParamState, TimeBasis};
pub use snapshot::ParamSnapshot;

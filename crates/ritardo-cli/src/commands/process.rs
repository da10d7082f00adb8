//! Offline WAV processing through the delay engine.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Args;
use ritardo_core::Subdivision;
use ritardo_engine::{DelayEngine, TimeBasis};
use tracing::info;

use crate::preset;

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file
    input: PathBuf,

    /// Output WAV file (32-bit float)
    output: PathBuf,

    /// Feedback amount (0-1)
    #[arg(long)]
    feedback: Option<f32>,

    /// Dry/wet mix (0-1)
    #[arg(long)]
    mix: Option<f32>,

    /// Stereo pan (-1 = left, 1 = right)
    #[arg(long)]
    pan: Option<f32>,

    /// Fixed delay time in milliseconds (disables tempo sync)
    #[arg(long, conflicts_with = "steps")]
    time_ms: Option<u32>,

    /// Tempo-synced step count (1-16)
    #[arg(long)]
    steps: Option<u32>,

    /// Use eighth-triplet steps instead of sixteenths
    #[arg(long)]
    triplet: bool,

    /// Host tempo in BPM
    #[arg(long, default_value = "120.0")]
    bpm: f32,

    /// Processing block size in frames
    #[arg(long, default_value = "512")]
    block_size: usize,

    /// Extra rendered tail in seconds (lets the repeats ring out)
    #[arg(long, default_value = "2.0")]
    tail: f32,

    /// Load parameters from a TOML preset before applying flags
    #[arg(long)]
    preset: Option<PathBuf>,
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    let mut reader = hound::WavReader::open(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 || channels > 2 {
        bail!("only mono or stereo input is supported, got {channels} channels");
    }
    if args.block_size == 0 {
        bail!("block size must be at least 1");
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .context("decoding float samples")?,
        hound::SampleFormat::Int => {
            let scale = (1i32 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|value| value as f32 / scale))
                .collect::<Result<_, _>>()
                .context("decoding integer samples")?
        }
    };

    let frames = interleaved.len() / channels;
    let tail_frames = (args.tail.max(0.0) * spec.sample_rate as f32) as usize;
    let total_frames = frames + tail_frames;

    // Deinterleave, with the tail appended as silence to render the decay.
    let mut data: Vec<Vec<f32>> = (0..channels)
        .map(|ch| {
            let mut buffer = Vec::with_capacity(total_frames);
            buffer.extend((0..frames).map(|frame| interleaved[frame * channels + ch]));
            buffer.resize(total_frames, 0.0);
            buffer
        })
        .collect();

    let mut engine = DelayEngine::new(channels, spec.sample_rate as f32, args.block_size);
    if let Some(path) = &args.preset {
        let snapshot = preset::load(path)?;
        engine.restore(&snapshot);
    }
    let params = engine.params_mut();
    if let Some(feedback) = args.feedback {
        params.set_feedback(feedback);
    }
    if let Some(mix) = args.mix {
        params.set_mix(mix);
    }
    if let Some(pan) = args.pan {
        params.set_pan(pan);
    }
    if let Some(ms) = args.time_ms {
        params.set_time_basis(TimeBasis::Milliseconds);
        params.set_delay_ms(ms);
    }
    if let Some(steps) = args.steps {
        params.set_time_basis(TimeBasis::Synced);
        params.set_steps(steps);
    }
    if args.triplet {
        params.set_subdivision(Subdivision::EighthTriplet);
    }
    engine.reset();

    let mut start = 0;
    while start < total_frames {
        let end = (start + args.block_size).min(total_frames);
        let mut block: Vec<&mut [f32]> = data
            .iter_mut()
            .map(|channel| &mut channel[start..end])
            .collect();
        engine.process_block(&mut block, args.bpm);
        start = end;
    }

    let out_spec = hound::WavSpec {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(&args.output, out_spec)
        .with_context(|| format!("creating {}", args.output.display()))?;
    for frame in 0..total_frames {
        for channel in &data {
            writer.write_sample(channel[frame])?;
        }
    }
    writer.finalize()?;

    info!(
        "processed {} frames (+{} tail) at {} ms delay",
        frames,
        tail_frames,
        engine.delay_ms()
    );
    println!(
        "{} -> {} ({} frames, {} ms delay)",
        args.input.display(),
        args.output.display(),
        total_frames,
        engine.delay_ms()
    );
    Ok(())
}

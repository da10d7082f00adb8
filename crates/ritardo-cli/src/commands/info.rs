//! Parameter table and mode display.

use std::path::PathBuf;

use clap::Args;
use ritardo_core::{ParamUnit, ParameterInfo};
use ritardo_engine::DelayEngine;

use crate::preset;

#[derive(Args)]
pub struct InfoArgs {
    /// Show the values from a preset file instead of the defaults
    #[arg(long)]
    preset: Option<PathBuf>,
}

pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let mut engine = DelayEngine::new(2, 48000.0, 512);
    if let Some(path) = &args.preset {
        let snapshot = preset::load(path)?;
        engine.restore(&snapshot);
    }

    println!("{:<10} {:<8} {:>10} {:>10} {:>10}", "Parameter", "Short", "Min", "Max", "Value");
    for index in 0..engine.param_count() {
        let Some(desc) = engine.param_info(index) else {
            continue;
        };
        let value = engine.get_param(index);
        println!(
            "{:<10} {:<8} {:>10} {:>10} {:>10}",
            desc.name,
            desc.short_name,
            format_value(desc.unit, desc.name, desc.min),
            format_value(desc.unit, desc.name, desc.max),
            format_value(desc.unit, desc.name, value),
        );
    }

    println!();
    println!(
        "Time basis:  {}",
        if engine.params().steps_active() {
            "tempo-synced"
        } else {
            "milliseconds"
        }
    );
    println!("Subdivision: {}", engine.subdivision().label());
    println!("Steps:       {}", engine.steps());
    println!("Delay:       {} ms", engine.delay_ms());
    Ok(())
}

/// Format a value the way the control surface shows it: raw 0..1 values as
/// percentages, pan with a side marker.
fn format_value(unit: ParamUnit, name: &str, value: f32) -> String {
    if name == "Pan" {
        return if value >= 0.0 {
            format!("{:.0}% R", value * 100.0)
        } else {
            format!("{:.0}% L", -value * 100.0)
        };
    }
    match unit {
        ParamUnit::Percent => format!("{:.0}{}", value * 100.0, unit.suffix()),
        ParamUnit::Milliseconds => format!("{:.0}{}", value, unit.suffix()),
        ParamUnit::Steps => format!("{value:.0}"),
        ParamUnit::None => format!("{value:.2}"),
    }
}

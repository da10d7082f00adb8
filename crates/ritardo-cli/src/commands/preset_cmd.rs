//! Preset template writing.

use std::path::PathBuf;

use clap::Args;
use ritardo_engine::ParamSnapshot;

use crate::preset;

#[derive(Args)]
pub struct PresetArgs {
    /// Output TOML file
    output: PathBuf,
}

pub fn run(args: PresetArgs) -> anyhow::Result<()> {
    let snapshot = ParamSnapshot::default();
    preset::save(&snapshot, &args.output)?;
    println!("wrote {}", args.output.display());
    Ok(())
}

//! CLI subcommands.

pub mod info;
pub mod preset_cmd;
pub mod process;

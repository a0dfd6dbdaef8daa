//! CLI subcommands.

pub mod common;
pub mod serve;
pub mod stitch;

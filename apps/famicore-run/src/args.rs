use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use famicore::FrameTiming;
use tracing::Level;

/// Runs an iNES ROM headless for a number of frames.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the NES ROM file
    #[arg(required = true)]
    pub rom: PathBuf,

    /// Frames to emulate
    #[arg(long, default_value_t = 60)]
    pub frames: u32,

    /// Write the last presented frame as a PNG
    #[arg(long)]
    pub screenshot: Option<PathBuf>,

    /// Log every executed instruction (implies `--log-level trace`)
    #[arg(long)]
    pub trace: bool,

    /// CPU cycles granted per frame
    #[arg(long, value_enum, default_value_t = Timing::Constant)]
    pub timing: Timing,

    #[arg(long, default_value_t = Level::INFO)]
    pub log_level: Level,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Timing {
    /// 29781 cycles every frame
    Constant,
    /// 29780 and 29781 on alternate frames
    Alternating,
}

impl From<Timing> for FrameTiming {
    fn from(timing: Timing) -> Self {
        match timing {
            Timing::Constant => FrameTiming::Constant(FrameTiming::NTSC_CYCLES),
            Timing::Alternating => FrameTiming::Alternating,
        }
    }
}

//! System configuration.

use std::fmt;

/// Console timing profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Region {
    /// North American / Japanese NTSC timing: 262 lines of 341 dots.
    #[default]
    Ntsc,
}

impl Region {
    pub const fn scanlines(self) -> u16 {
        match self {
            Region::Ntsc => 262,
        }
    }

    pub const fn dots_per_scanline(self) -> u16 {
        match self {
            Region::Ntsc => 341,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Region::Ntsc => "ntsc",
        };
        f.write_str(s)
    }
}

/// CPU cycles granted per call to `run_frame`.
///
/// An NTSC frame lasts 29780.5 CPU cycles on average. `Constant` grants the
/// same budget every frame and lets the odd-frame dot skip absorb the
/// difference; `Alternating` grants 29780 and 29781 on successive frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameTiming {
    Constant(i32),
    Alternating,
}

impl FrameTiming {
    pub const NTSC_CYCLES: i32 = 29_781;

    /// Budget for the frame with the given index (0-based).
    pub const fn budget(self, frame: u64) -> i32 {
        match self {
            FrameTiming::Constant(cycles) => cycles,
            FrameTiming::Alternating => {
                if frame % 2 == 0 {
                    29_780
                } else {
                    29_781
                }
            }
        }
    }
}

impl Default for FrameTiming {
    fn default() -> Self {
        FrameTiming::Constant(Self::NTSC_CYCLES)
    }
}

/// Knobs consumed by [`crate::Nes::with_config`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NesConfig {
    pub region: Region,
    pub timing: FrameTiming,
    /// Emit a nestest-style trace line for every instruction at `trace!` level.
    pub trace_cpu: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alternating_budget_averages_half_cycle() {
        let timing = FrameTiming::Alternating;
        let total: i32 = (0..4).map(|frame| timing.budget(frame)).sum();
        assert_eq!(total, 2 * 29_780 + 2 * 29_781);
        assert_eq!(FrameTiming::default().budget(7), 29_781);
    }
}

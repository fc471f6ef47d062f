//! Collaborators supplied by the embedding application.
//!
//! The core never presents pixels or polls a keyboard itself. It hands each
//! finished frame to a [`FrameSink`] and asks an [`Input`] for pad state when
//! the game strobes the controller port.

use crate::ppu::{FRAME_HEIGHT, FRAME_WIDTH, FrameBuffer};

/// Receives the finished 256x240 frame at the start of the post-render line.
pub trait FrameSink {
    fn present(&mut self, frame: &FrameBuffer);
}

/// Button snapshot per controller port.
///
/// Bit order is A, B, Select, Start, Up, Down, Left, Right (bit 0 = A).
pub trait Input {
    fn controller(&self, port: usize) -> u8;
}

impl<T: FrameSink + ?Sized> FrameSink for &mut T {
    fn present(&mut self, frame: &FrameBuffer) {
        (**self).present(frame);
    }
}

impl<T: Input + ?Sized> Input for &T {
    fn controller(&self, port: usize) -> u8 {
        (**self).controller(port)
    }
}

/// Drops every frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn present(&mut self, _frame: &FrameBuffer) {}
}

/// Keeps a copy of the most recent frame.
#[derive(Debug, Clone, Default)]
pub struct FrameCapture {
    last: Option<Box<FrameBuffer>>,
    frames: u64,
}

impl FrameCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> Option<&FrameBuffer> {
        self.last.as_deref()
    }

    /// Number of frames delivered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Last frame as tightly packed RGB8 rows, ready for image encoders.
    pub fn to_rgb8(&self) -> Option<Vec<u8>> {
        let frame = self.last.as_deref()?;
        let mut out = Vec::with_capacity(FRAME_WIDTH * FRAME_HEIGHT * 3);
        for &pixel in frame.iter() {
            out.extend_from_slice(&[(pixel >> 16) as u8, (pixel >> 8) as u8, pixel as u8]);
        }
        Some(out)
    }
}

impl FrameSink for FrameCapture {
    fn present(&mut self, frame: &FrameBuffer) {
        match &mut self.last {
            Some(last) => last.copy_from_slice(frame),
            None => self.last = Some(Box::new(*frame)),
        }
        self.frames += 1;
    }
}

/// No buttons pressed on either port.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleInput;

impl Input for IdleInput {
    fn controller(&self, _port: usize) -> u8 {
        0
    }
}

/// Button ordering follows the controller shift register (A first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    A = 0,
    B = 1,
    Select = 2,
    Start = 3,
    Up = 4,
    Down = 5,
    Left = 6,
    Right = 7,
}

/// Button state for two pads, set programmatically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Pads {
    state: [u8; 2],
}

impl Pads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_button(&mut self, port: usize, button: Button, pressed: bool) {
        let Some(state) = self.state.get_mut(port) else {
            return;
        };
        let bit = 1u8 << (button as u8);
        if pressed {
            *state |= bit;
        } else {
            *state &= !bit;
        }
    }
}

impl Input for Pads {
    fn controller(&self, port: usize) -> u8 {
        self.state.get(port).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_track_buttons_per_port() {
        let mut pads = Pads::new();
        pads.set_button(0, Button::Start, true);
        pads.set_button(1, Button::A, true);
        pads.set_button(1, Button::Right, true);
        pads.set_button(1, Button::A, false);
        pads.set_button(2, Button::B, true);
        assert_eq!(pads.controller(0), 0b0000_1000);
        assert_eq!(pads.controller(1), 0b1000_0000);
        assert_eq!(pads.controller(2), 0);
    }

    #[test]
    fn capture_keeps_latest_frame_as_rgb() {
        let mut capture = FrameCapture::new();
        let mut frame = [0u32; FRAME_WIDTH * FRAME_HEIGHT];
        frame[0] = 0x12_34_56;
        capture.present(&frame);
        frame[0] = 0xAB_CD_EF;
        capture.present(&frame);
        assert_eq!(capture.frames(), 2);
        let rgb = capture.to_rgb8().expect("frame");
        assert_eq!(&rgb[..3], &[0xAB, 0xCD, 0xEF]);
        assert_eq!(rgb.len(), FRAME_WIDTH * FRAME_HEIGHT * 3);
    }
}

//! Raster reconstruction from sync edges.
//!
//! The decoder never sees the model's own counters. It rebuilds the beam
//! position purely from the sync lines: one pixel clock per sample, a new
//! line on each rising edge of horizontal sync, a new frame on each rising
//! edge of vertical sync.

use log::debug;

use crate::exchange::FrameExchange;
use crate::palette;
use crate::timing::VgaTiming;

/// Frames between periodic decoder log lines.
const FRAME_LOG_INTERVAL: u64 = 60;

/// One sample of the video pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncSample {
    pub h_sync: bool,
    pub v_sync: bool,
    /// RGB565 colour bus.
    pub rgb: u16,
}

impl From<sim_core::BoardOutputs> for SyncSample {
    fn from(out: sim_core::BoardOutputs) -> Self {
        Self {
            h_sync: out.h_sync,
            v_sync: out.v_sync,
            rgb: out.rgb,
        }
    }
}

/// Tracks the beam position and writes visible pixels.
#[derive(Debug, Clone)]
pub struct SignalDecoder {
    timing: VgaTiming,
    x: u32,
    y: u32,
    prev_h_sync: bool,
    prev_v_sync: bool,
    frames: u64,
}

impl SignalDecoder {
    #[must_use]
    pub fn new(timing: VgaTiming) -> Self {
        Self {
            timing,
            x: 0,
            y: 0,
            prev_h_sync: false,
            prev_v_sync: false,
            frames: 0,
        }
    }

    #[must_use]
    pub fn timing(&self) -> &VgaTiming {
        &self.timing
    }

    /// Current raster position `(x, y)`, blanking included.
    #[must_use]
    pub fn position(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    /// Frame boundaries seen since the last reset.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Back to the origin with both sync lines assumed low.
    pub fn reset(&mut self) {
        self.x = 0;
        self.y = 0;
        self.prev_h_sync = false;
        self.prev_v_sync = false;
        self.frames = 0;
    }

    /// Advance one pixel clock.
    ///
    /// Writes the pixel into `frames` if the position is visible, and
    /// publishes the frame on a vertical sync rising edge. Returns `true` on
    /// that edge.
    pub fn sample(&mut self, sample: SyncSample, frames: &FrameExchange) -> bool {
        let t = &self.timing;
        self.x = (self.x + 1) % t.total_width;

        if sample.h_sync && !self.prev_h_sync {
            self.x = 0;
            self.y = (self.y + 1) % t.total_height;
        }

        let frame_edge = sample.v_sync && !self.prev_v_sync;
        if frame_edge {
            self.y = 0;
        }

        if let Some((vx, vy)) = t.visible(self.x, self.y) {
            frames.write_pixel(vx, vy, palette::decode_rgb565(sample.rgb));
        }

        if frame_edge {
            frames.publish_frame();
            self.frames += 1;
            if self.frames % FRAME_LOG_INTERVAL == 0 {
                debug!("Decoder: {} frames", self.frames);
            }
        }

        self.prev_h_sync = sample.h_sync;
        self.prev_v_sync = sample.v_sync;
        frame_edge
    }
}

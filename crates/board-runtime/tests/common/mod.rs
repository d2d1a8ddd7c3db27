//! Shared test model: a counter-driven VGA pattern generator.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use board_runtime::VgaTiming;
use sim_core::{BoardInputs, BoardOutputs, LED_COUNT, ModelError, Observable, SteppedModel, Value};

/// Generates sync pulses and a solid colour over the visible window.
///
/// The pixel counters advance on every second rising clock edge, like a
/// design whose pixel clock is the board clock divided by two. LED `n + 1`
/// follows button `n`; LED 0 follows the reset line.
pub struct PatternModel {
    timing: VgaTiming,
    colour: u16,
    inputs: BoardInputs,
    last_clk: bool,
    half: bool,
    h: u32,
    v: u32,
    frames: u64,
    finish_after: Option<u64>,
    finalized: Arc<AtomicUsize>,
}

impl PatternModel {
    pub fn new(timing: VgaTiming, colour: u16) -> Self {
        Self {
            timing,
            colour,
            inputs: BoardInputs::IDLE,
            last_clk: false,
            half: false,
            h: 0,
            v: 0,
            frames: 0,
            finish_after: None,
            finalized: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Report `finished()` once this many frames have been generated.
    pub fn finish_after(mut self, frames: u64) -> Self {
        self.finish_after = Some(frames);
        self
    }

    /// Shared counter of `finalize()` calls.
    pub fn finalize_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.finalized)
    }

    pub fn position(&self) -> (u32, u32) {
        (self.h, self.v)
    }

    fn advance_pixel(&mut self) {
        self.h += 1;
        if self.h == self.timing.total_width {
            self.h = 0;
            self.v += 1;
            if self.v == self.timing.total_height {
                self.v = 0;
                self.frames += 1;
            }
        }
    }
}

impl Observable for PatternModel {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "counter.h" => Some(self.h.into()),
            "counter.v" => Some(self.v.into()),
            _ => self
                .inputs
                .query(path)
                .or_else(|| self.outputs().query(path)),
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        sim_core::PIN_PATHS
    }
}

impl SteppedModel for PatternModel {
    fn inputs_mut(&mut self) -> &mut BoardInputs {
        &mut self.inputs
    }

    fn outputs(&self) -> BoardOutputs {
        let visible = self.timing.visible(self.h, self.v).is_some();
        let mut leds = [true; LED_COUNT];
        leds[0] = self.inputs.reset;
        leds[1..].copy_from_slice(&self.inputs.buttons);
        BoardOutputs {
            h_sync: self.h < 2,
            v_sync: self.v < 1,
            rgb: if visible { self.colour } else { 0 },
            leds,
        }
    }

    fn evaluate(&mut self) -> Result<(), ModelError> {
        let rising = self.inputs.clk && !self.last_clk;
        self.last_clk = self.inputs.clk;
        if !rising {
            return Ok(());
        }
        if !self.inputs.reset {
            self.half = false;
            self.h = 0;
            self.v = 0;
            return Ok(());
        }
        self.half = !self.half;
        if !self.half {
            self.advance_pixel();
        }
        Ok(())
    }

    fn finalize(&mut self) {
        self.finalized.fetch_add(1, Ordering::SeqCst);
    }

    fn finished(&self) -> bool {
        self.finish_after.is_some_and(|n| self.frames >= n)
    }
}

/// 10x6 raster with a 4x3 window at (3, 2).
pub const TINY: VgaTiming = VgaTiming {
    total_width: 10,
    total_height: 6,
    visible_width: 4,
    visible_height: 3,
    h_offset: 3,
    v_offset: 2,
};

//! Development board running the colour-bar VGA design.
//!
//! The design divides the board clock by two to get the pixel clock, runs
//! an 800x525 raster counter on it, and drives eight vertical colour bars
//! over the 640x480 window. LED 1 mirrors the reset line and LEDs 2-5
//! mirror buttons B2-B5.
//!
//! Evaluation follows event-driven HDL semantics: edge triggers fire
//! sequential blocks, which can raise further triggers (the divided clock),
//! and the loop repeats until nothing fires. A design that never settles
//! is an error.

mod timing;

use sim_core::{BoardInputs, BoardOutputs, LED_COUNT, ModelError, Observable, SteppedModel, Value};

pub use timing::{
    H_ACTIVE_START, H_SYNC, H_TOTAL, H_VALID, V_ACTIVE_START, V_SYNC, V_TOTAL, V_VALID,
};

/// Iterations allowed for one evaluation to settle.
pub const SETTLE_LIMIT: u32 = 100;

/// Width of each colour bar in pixels.
pub const BAR_WIDTH: u16 = H_VALID / 8;

/// RGB565 bar colours, left to right.
pub const BAR_COLOURS: [u16; 8] = [
    0xFFFF, // white
    0xFFE0, // yellow
    0x07FF, // cyan
    0x07E0, // green
    0xF81F, // magenta
    0xF800, // red
    0x001F, // blue
    0x0000, // black
];

/// Colour of the bar under visible column `x`.
#[must_use]
pub fn bar_colour(x: u16) -> u16 {
    BAR_COLOURS[usize::from((x / BAR_WIDTH).min(7))]
}

/// The colour-bar board.
pub struct ColorBar {
    inputs: BoardInputs,
    outputs: BoardOutputs,
    prev_clk: bool,
    prev_reset: bool,
    prev_vga_clk: bool,
    vga_clk: bool,
    cnt_h: u16,
    cnt_v: u16,
    frames: u64,
    settle_limit: u32,
}

impl ColorBar {
    #[must_use]
    pub fn new() -> Self {
        let mut board = Self {
            inputs: BoardInputs::IDLE,
            outputs: BoardOutputs::default(),
            prev_clk: false,
            prev_reset: true,
            prev_vga_clk: false,
            vga_clk: false,
            cnt_h: 0,
            cnt_v: 0,
            frames: 0,
            settle_limit: SETTLE_LIMIT,
        };
        board.update_outputs();
        board
    }

    /// Override the settle iteration limit.
    #[must_use]
    pub fn with_settle_limit(mut self, limit: u32) -> Self {
        self.settle_limit = limit;
        self
    }

    /// Raster counters `(cnt_h, cnt_v)`.
    #[must_use]
    pub fn counters(&self) -> (u16, u16) {
        (self.cnt_h, self.cnt_v)
    }

    /// Completed rasters since power-on.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    // always @(posedge clk or negedge reset)
    fn clock_divider(&mut self) {
        self.vga_clk = if self.inputs.reset {
            !self.vga_clk
        } else {
            false
        };
    }

    // always @(posedge vga_clk or negedge reset)
    fn raster_counters(&mut self) {
        if !self.inputs.reset {
            self.cnt_h = 0;
            self.cnt_v = 0;
            return;
        }
        if self.cnt_h == H_TOTAL - 1 {
            self.cnt_h = 0;
            if self.cnt_v == V_TOTAL - 1 {
                self.cnt_v = 0;
                self.frames += 1;
            } else {
                self.cnt_v += 1;
            }
        } else {
            self.cnt_h += 1;
        }
    }

    fn update_outputs(&mut self) {
        let h = self.cnt_h;
        let v = self.cnt_v;
        let active = (H_ACTIVE_START..H_ACTIVE_START + H_VALID).contains(&h)
            && (V_ACTIVE_START..V_ACTIVE_START + V_VALID).contains(&v);

        let mut leds = [true; LED_COUNT];
        leds[0] = self.inputs.reset;
        leds[1..].copy_from_slice(&self.inputs.buttons);

        self.outputs = BoardOutputs {
            h_sync: h < H_SYNC,
            v_sync: v < V_SYNC,
            rgb: if active {
                bar_colour(h - H_ACTIVE_START)
            } else {
                0
            },
            leds,
        };
    }
}

impl Default for ColorBar {
    fn default() -> Self {
        Self::new()
    }
}

impl SteppedModel for ColorBar {
    fn inputs_mut(&mut self) -> &mut BoardInputs {
        &mut self.inputs
    }

    fn outputs(&self) -> BoardOutputs {
        self.outputs
    }

    fn evaluate(&mut self) -> Result<(), ModelError> {
        let mut iterations = 0;
        loop {
            let clk_rise = self.inputs.clk && !self.prev_clk;
            let reset_fall = !self.inputs.reset && self.prev_reset;
            let vga_rise = self.vga_clk && !self.prev_vga_clk;
            self.prev_clk = self.inputs.clk;
            self.prev_reset = self.inputs.reset;
            self.prev_vga_clk = self.vga_clk;

            if !(clk_rise || reset_fall || vga_rise) {
                break;
            }
            iterations += 1;
            if iterations > self.settle_limit {
                return Err(ModelError::SettleDidNotConverge {
                    iterations: self.settle_limit,
                });
            }

            if clk_rise || reset_fall {
                self.clock_divider();
            }
            if vga_rise || reset_fall {
                self.raster_counters();
            }
        }
        self.update_outputs();
        Ok(())
    }
}

impl Observable for ColorBar {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "counter.h" => Some(u32::from(self.cnt_h).into()),
            "counter.v" => Some(u32::from(self.cnt_v).into()),
            "vga_clk" => Some(self.vga_clk.into()),
            "frames" => Some(self.frames.into()),
            "leds" => Some(Value::Array(
                self.outputs.leds.iter().map(|&l| l.into()).collect(),
            )),
            _ => self.inputs.query(path).or_else(|| self.outputs.query(path)),
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "clk",
            "reset",
            "B2",
            "B3",
            "B4",
            "B5",
            "h_sync",
            "v_sync",
            "rgb",
            "led1",
            "led2",
            "led3",
            "led4",
            "led5",
            "counter.h",
            "counter.v",
            "vga_clk",
            "frames",
            "leds",
        ]
    }
}

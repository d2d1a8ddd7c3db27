//! 640x480 @ 60 Hz raster parameters, in pixel clocks and lines.

pub const H_SYNC: u16 = 96;
pub const H_BACK: u16 = 40;
pub const H_LEFT: u16 = 8;
pub const H_VALID: u16 = 640;
pub const H_TOTAL: u16 = 800;

pub const V_SYNC: u16 = 2;
pub const V_BACK: u16 = 25;
pub const V_TOP: u16 = 8;
pub const V_VALID: u16 = 480;
pub const V_TOTAL: u16 = 525;

/// First visible column.
pub const H_ACTIVE_START: u16 = H_SYNC + H_BACK + H_LEFT;

/// First visible line.
pub const V_ACTIVE_START: u16 = V_SYNC + V_BACK + V_TOP;

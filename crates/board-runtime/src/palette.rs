//! RGB565 colour bus decoding.

/// 5-bit channel level to normalised intensity.
pub static RGB5_LEVELS: [f32; 32] = channel_table::<32>();

/// 6-bit channel level to normalised intensity.
pub static RGB6_LEVELS: [f32; 64] = channel_table::<64>();

const fn channel_table<const N: usize>() -> [f32; N] {
    let mut table = [0.0; N];
    let max = (N - 1) as f32;
    let mut i = 0;
    while i < N {
        table[i] = i as f32 / max;
        i += 1;
    }
    table
}

/// Split a 16-bit RGB565 value into normalised red, green and blue.
#[must_use]
pub fn decode_rgb565(rgb: u16) -> [f32; 3] {
    [
        RGB5_LEVELS[usize::from((rgb >> 11) & 0x1F)],
        RGB6_LEVELS[usize::from((rgb >> 5) & 0x3F)],
        RGB5_LEVELS[usize::from(rgb & 0x1F)],
    ]
}

/// Normalised intensity to an 8-bit channel, rounding to nearest.
#[must_use]
pub fn to_u8(level: f32) -> u8 {
    (level.clamp(0.0, 1.0) * 255.0).round() as u8
}

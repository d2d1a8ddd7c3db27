//! Video timing parameters.

/// Geometry of one sync frame: the full raster including blanking, and the
/// visible window inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VgaTiming {
    /// Pixel clocks per line, including blanking.
    pub total_width: u32,
    /// Lines per frame, including blanking.
    pub total_height: u32,
    pub visible_width: u32,
    pub visible_height: u32,
    /// First visible pixel, counted from the rising edge of horizontal sync.
    pub h_offset: u32,
    /// First visible line, counted from the rising edge of vertical sync.
    pub v_offset: u32,
}

impl VgaTiming {
    /// 640x480 at 60 Hz: sync 96 + back porch 40 + border 8 before the first
    /// pixel, sync 2 + back porch 25 + border 8 before the first line.
    pub const VGA_640X480_60: Self = Self {
        total_width: 800,
        total_height: 525,
        visible_width: 640,
        visible_height: 480,
        h_offset: 144,
        v_offset: 35,
    };

    /// Map a raster position to visible-window coordinates.
    #[must_use]
    pub const fn visible(&self, x: u32, y: u32) -> Option<(u32, u32)> {
        if x >= self.h_offset
            && x < self.h_offset + self.visible_width
            && y >= self.v_offset
            && y < self.v_offset + self.visible_height
        {
            Some((x - self.h_offset, y - self.v_offset))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn visible_pixels(&self) -> usize {
        self.visible_width as usize * self.visible_height as usize
    }

    /// Pixel clocks in one full frame.
    #[must_use]
    pub const fn total_pixels(&self) -> u64 {
        self.total_width as u64 * self.total_height as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_window_edges() {
        let t = VgaTiming::VGA_640X480_60;
        assert_eq!(t.visible(144, 35), Some((0, 0)));
        assert_eq!(t.visible(783, 514), Some((639, 479)));
        assert_eq!(t.visible(143, 35), None);
        assert_eq!(t.visible(784, 100), None);
        assert_eq!(t.visible(200, 515), None);
        assert_eq!(t.visible_pixels(), 640 * 480);
    }
}

//! Double-buffered frame handoff between the simulation and render threads.
//!
//! The producer writes pixels into the *writable* buffer and raises the
//! pending flag at each frame boundary. The consumer, when it wants a frame,
//! clears the flag and flips the roles in one step, then reads the
//! *readable* buffer. Roles are a single index bit (`writable = i`,
//! `readable = 1 - i`) so they can never name the same buffer, and the
//! pending flag lives in the same atomic byte so clearing it and flipping
//! the roles is one compare-and-swap.
//!
//! One producer and one consumer only.
//!
//! Pixels are stored as `f32` bit patterns in relaxed atomics. The
//! Release publish and the consumer's Acquire exchange order every pixel
//! written before the frame boundary ahead of the consumer's reads. A write
//! in flight during the flip may still land in the now-readable buffer, so
//! one pixel of the next frame can show up in the claimed one.

use std::sync::atomic::{AtomicU8, AtomicU32, Ordering};

use crate::palette;

/// Whether [`FrameExchange::acquire`] picked up a new frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// A frame boundary was published since the last acquire.
    Fresh,
    /// No new frame; the previously read buffer is returned again.
    Repeat,
}

struct PixelBuffer {
    channels: Box<[AtomicU32]>,
}

impl PixelBuffer {
    fn new(pixels: usize) -> Self {
        Self {
            channels: (0..pixels * 3).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    fn store(&self, index: usize, rgb: [f32; 3]) {
        for (slot, value) in self.channels[index..index + 3].iter().zip(rgb) {
            slot.store(value.to_bits(), Ordering::Relaxed);
        }
    }

    fn load(&self, index: usize) -> [f32; 3] {
        let c = &self.channels[index..index + 3];
        [
            f32::from_bits(c[0].load(Ordering::Relaxed)),
            f32::from_bits(c[1].load(Ordering::Relaxed)),
            f32::from_bits(c[2].load(Ordering::Relaxed)),
        ]
    }

    fn clear(&self) {
        for slot in &self.channels {
            slot.store(0, Ordering::Relaxed);
        }
    }
}

/// Two visible-area framebuffers and the handoff protocol between them.
///
/// Buffers are column-major: pixel `(x, y)` starts at channel
/// `(x * height + y) * 3`.
pub struct FrameExchange {
    width: u32,
    height: u32,
    buffers: [PixelBuffer; 2],
    /// Bit 0: writable buffer index. Bit 1: frame pending.
    state: AtomicU8,
}

const WRITABLE_BIT: u8 = 0b01;
const PENDING_BIT: u8 = 0b10;

impl FrameExchange {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let pixels = width as usize * height as usize;
        Self {
            width,
            height,
            buffers: [PixelBuffer::new(pixels), PixelBuffer::new(pixels)],
            state: AtomicU8::new(0),
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    fn channel_index(&self, x: u32, y: u32) -> usize {
        (x as usize * self.height as usize + y as usize) * 3
    }

    // ===== Producer side =====

    /// Store one pixel into the writable buffer. Out-of-range coordinates
    /// are ignored.
    pub fn write_pixel(&self, x: u32, y: u32, rgb: [f32; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = self.channel_index(x, y);
        self.buffers[self.writable_index()].store(index, rgb);
    }

    /// Mark the writable buffer as holding a complete frame.
    pub fn publish_frame(&self) {
        self.state.fetch_or(PENDING_BIT, Ordering::Release);
    }

    // ===== Consumer side =====

    /// Claim the newest complete frame.
    ///
    /// If a frame was published since the last call, the pending flag is
    /// cleared and the roles flip before the view is taken. Otherwise the
    /// previous readable buffer is returned unchanged.
    pub fn acquire(&self) -> (FrameView<'_>, FrameStatus) {
        let claimed = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |state| {
                (state & PENDING_BIT != 0).then_some((state & WRITABLE_BIT) ^ WRITABLE_BIT)
            });
        let status = if claimed.is_ok() {
            FrameStatus::Fresh
        } else {
            FrameStatus::Repeat
        };
        let view = FrameView {
            exchange: self,
            buffer: self.readable_index(),
        };
        (view, status)
    }

    // ===== Shared =====

    #[must_use]
    pub fn writable_index(&self) -> usize {
        usize::from(self.state.load(Ordering::Acquire) & WRITABLE_BIT)
    }

    #[must_use]
    pub fn readable_index(&self) -> usize {
        1 - self.writable_index()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state.load(Ordering::Acquire) & PENDING_BIT != 0
    }

    /// Zero both buffers and drop any pending frame.
    pub fn clear(&self) {
        self.state.fetch_and(WRITABLE_BIT, Ordering::AcqRel);
        for buffer in &self.buffers {
            buffer.clear();
        }
    }
}

/// Read access to one buffer, as handed to the presentation layer.
#[derive(Clone, Copy)]
pub struct FrameView<'a> {
    exchange: &'a FrameExchange,
    buffer: usize,
}

impl FrameView<'_> {
    #[must_use]
    pub fn width(&self) -> u32 {
        self.exchange.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.exchange.height
    }

    /// Which of the two buffers this view reads.
    #[must_use]
    pub fn buffer_index(&self) -> usize {
        self.buffer
    }

    /// Normalised RGB at `(x, y)`.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 3] {
        let index = self.exchange.channel_index(x, y);
        self.exchange.buffers[self.buffer].load(index)
    }

    /// Write the frame as row-major RGBA8 into `out`, which must hold
    /// `width * height * 4` bytes.
    pub fn write_rgba8(&self, out: &mut [u8]) {
        let width = self.width();
        for (i, px) in out.chunks_exact_mut(4).enumerate() {
            let x = (i % width as usize) as u32;
            let y = (i / width as usize) as u32;
            if y >= self.height() {
                break;
            }
            let [r, g, b] = self.pixel(x, y);
            px[0] = palette::to_u8(r);
            px[1] = palette::to_u8(g);
            px[2] = palette::to_u8(b);
            px[3] = 0xFF;
        }
    }

    /// The frame as a freshly allocated row-major RGBA8 image.
    #[must_use]
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = vec![0; self.width() as usize * self.height() as usize * 4];
        self.write_rgba8(&mut out);
        out
    }
}

impl std::fmt::Debug for FrameView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameView")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("buffer", &self.buffer)
            .finish()
    }
}

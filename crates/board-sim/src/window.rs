//! Windowed frontend: winit for events, pixels for the framebuffer.
//!
//! The event loop is pumped from the runtime's consumer loop rather than
//! owning the main thread, so event polling and frame pacing stay in one
//! place.

use std::time::Duration;

use board_runtime::{
    Control, EventSource, FrameStatus, FrameView, InputEvent, PresentError, PresentationSink,
};
use log::{debug, info};
use pixels::{Pixels, SurfaceTexture};
use sim_core::LED_COUNT;
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowAttributes, WindowId};

/// Height of the LED panel under the video area.
const LED_PANEL_HEIGHT: u32 = 60;
const LED_RADIUS: i32 = 14;
const LED_LIT: [u8; 3] = [0xFF, 0x30, 0x20];
const LED_DARK: [u8; 3] = [0x40, 0x12, 0x10];
const PANEL_BG: [u8; 3] = [0x20, 0x20, 0x20];

/// Pump attempts while waiting for the window to appear.
const OPEN_ATTEMPTS: u32 = 200;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("pixel surface: {0}")]
    Pixels(#[from] pixels::Error),
    #[error("window did not open")]
    NoWindow,
}

/// Map a physical key to a board control.
fn control_for(key: KeyCode) -> Option<Control> {
    match key {
        KeyCode::KeyA => Some(Control::Reset),
        KeyCode::KeyS => Some(Control::Button(0)),
        KeyCode::KeyD => Some(Control::Button(1)),
        KeyCode::KeyF => Some(Control::Button(2)),
        KeyCode::KeyG => Some(Control::Button(3)),
        _ => None,
    }
}

struct App {
    width: u32,
    height: u32,
    scale: u32,
    window: Option<&'static Window>,
    pixels: Option<Pixels<'static>>,
    events: Vec<InputEvent>,
    error: Option<FrontendError>,
}

impl App {
    fn canvas_height(&self) -> u32 {
        self.height + LED_PANEL_HEIGHT
    }

    fn open(&mut self, event_loop: &ActiveEventLoop) -> Result<(), FrontendError> {
        let size = winit::dpi::LogicalSize::new(
            self.width * self.scale,
            self.canvas_height() * self.scale,
        );
        let attrs = WindowAttributes::default()
            .with_title("Board simulator - A: reset, S/D/F/G: B2-B5, Esc/Q: quit")
            .with_inner_size(size)
            .with_resizable(false);

        let window: &'static Window = Box::leak(Box::new(event_loop.create_window(attrs)?));
        let inner = window.inner_size();
        let surface = SurfaceTexture::new(inner.width, inner.height, window);
        self.pixels = Some(Pixels::new(self.width, self.canvas_height(), surface)?);
        self.window = Some(window);
        info!("Window open ({}x{})", inner.width, inner.height);
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.open(event_loop) {
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.events.push(InputEvent::Quit),
            WindowEvent::Resized(size) => {
                if let Some(pixels) = self.pixels.as_mut()
                    && let Err(e) = pixels.resize_surface(size.width, size.height)
                {
                    debug!("Surface resize failed: {e}");
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.repeat {
                    return;
                }
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let pressed = event.state == ElementState::Pressed;
                if matches!(code, KeyCode::Escape | KeyCode::KeyQ) {
                    if pressed {
                        self.events.push(InputEvent::Quit);
                    }
                } else if let Some(control) = control_for(code) {
                    self.events.push(if pressed {
                        InputEvent::Press(control)
                    } else {
                        InputEvent::Release(control)
                    });
                }
            }
            _ => {}
        }
    }
}

/// A window showing the VGA output above a row of LEDs.
pub struct WindowFrontend {
    event_loop: EventLoop<()>,
    app: App,
}

impl WindowFrontend {
    /// Create the window for a `width` x `height` video area.
    pub fn open(width: u32, height: u32, scale: u32) -> Result<Self, FrontendError> {
        let event_loop = EventLoop::new()?;
        let mut frontend = Self {
            event_loop,
            app: App {
                width,
                height,
                scale: scale.max(1),
                window: None,
                pixels: None,
                events: Vec::new(),
                error: None,
            },
        };

        for _ in 0..OPEN_ATTEMPTS {
            let status = frontend
                .event_loop
                .pump_app_events(Some(Duration::from_millis(10)), &mut frontend.app);
            if let Some(e) = frontend.app.error.take() {
                return Err(e);
            }
            if frontend.app.pixels.is_some() {
                return Ok(frontend);
            }
            if let PumpStatus::Exit(_) = status {
                break;
            }
        }
        Err(FrontendError::NoWindow)
    }
}

impl EventSource for WindowFrontend {
    fn poll_events(&mut self, out: &mut Vec<InputEvent>) {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.app);
        out.append(&mut self.app.events);
        if let PumpStatus::Exit(_) = status {
            out.push(InputEvent::Quit);
        }
    }
}

impl PresentationSink for WindowFrontend {
    fn present(
        &mut self,
        frame: FrameView<'_>,
        _status: FrameStatus,
        indicators: &[bool; LED_COUNT],
    ) -> Result<(), PresentError> {
        let width = self.app.width;
        let video_bytes = (width * self.app.height * 4) as usize;
        let Some(pixels) = self.app.pixels.as_mut() else {
            return Err(PresentError::new("no pixel surface"));
        };

        let canvas = pixels.frame_mut();
        frame.write_rgba8(&mut canvas[..video_bytes]);
        draw_led_panel(&mut canvas[video_bytes..], width, indicators);

        pixels
            .render()
            .map_err(|e| PresentError::new(format!("render: {e}")))
    }
}

/// Paint the LED panel: dark background, one lamp per indicator.
fn draw_led_panel(panel: &mut [u8], width: u32, indicators: &[bool; LED_COUNT]) {
    let width = width as i32;
    let centre_y = LED_PANEL_HEIGHT as i32 / 2;
    let spacing = width / (LED_COUNT as i32 + 1);

    for (i, px) in panel.chunks_exact_mut(4).enumerate() {
        let x = i as i32 % width;
        let y = i as i32 / width;
        let mut rgb = PANEL_BG;
        for (n, &lit) in indicators.iter().enumerate() {
            let dx = x - spacing * (n as i32 + 1);
            let dy = y - centre_y;
            if dx * dx + dy * dy <= LED_RADIUS * LED_RADIUS {
                rgb = if lit { LED_LIT } else { LED_DARK };
            }
        }
        px[..3].copy_from_slice(&rgb);
        px[3] = 0xFF;
    }
}

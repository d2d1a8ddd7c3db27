//! Real-time runtime for stepped board models.
//!
//! A simulation thread clocks the model against wall-clock time, rebuilds
//! the VGA raster from the sync pins, and hands finished frames to the
//! render thread through a lock-free double buffer. The render thread polls
//! input, presents frames and indicator lamps, and coordinates shutdown.

pub mod capture;
pub mod config;
pub mod decoder;
pub mod driver;
pub mod error;
pub mod exchange;
pub mod input;
pub mod lifecycle;
pub mod pacer;
pub mod palette;
pub mod presentation;
pub mod session;
pub mod timing;

pub use config::{ConsumerConfig, DriverConfig, PacerConfig, RuntimeConfig};
pub use decoder::{SignalDecoder, SyncSample};
pub use driver::{DriverReport, SimulationDriver};
pub use error::{CaptureError, PresentError, RuntimeError};
pub use exchange::{FrameExchange, FrameStatus, FrameView};
pub use lifecycle::{Coordinator, FrontendStats, ShutdownHandle};
pub use pacer::{ClockPacer, MonotonicClock, PaceOutcome, PacerClock, PacerStats, VirtualClock};
pub use presentation::{EventSource, InputEvent, PresentationSink};
pub use session::{Control, Phase, Session};
pub use timing::VgaTiming;

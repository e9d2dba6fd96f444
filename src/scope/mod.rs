// src/scope/mod.rs
pub mod buffer;
pub mod downsample;
pub mod error;
pub mod protocol;
pub mod reconciler;
pub mod render;
pub mod session;
pub mod sink;
pub mod window;
pub use buffer::{RateConfig, Sample, SampleRingBuffer};
pub use downsample::decimate;
pub use error::ScopeError;
pub use protocol::{Handled, LogEvent, LogLevel, StreamFrame, StreamMessage, StreamProtocolHandler};
pub use reconciler::{ConnectionState, ConnectionStateReconciler, Indicators, LinkState};
pub use render::{ChartLayout, PlotWindow, RenderScheduler};
pub use session::ScopeSession;
pub use sink::ViewerSink;
pub use window::extract;

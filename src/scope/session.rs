use std::time::Instant;
use crate::client::{ApiError, ConnectRequest, RemoteStatus};
use crate::config::ViewerConfig;
use crate::scope::buffer::SampleRingBuffer;
use crate::scope::protocol::{Handled, LogEvent, StreamProtocolHandler};
use crate::scope::reconciler::{ConnectionStateReconciler, Indicators};
use crate::scope::render::RenderScheduler;
use crate::scope::sink::ViewerSink;
use crate::scope::ScopeError;
/// All mutable viewer state, owned in one place.
///
/// Each event kind (stream text, render tick, poll result, connect result)
/// has one method here, and each method runs to completion before the next
/// event is looked at, so a render tick never sees a half-applied reset.
pub struct ScopeSession {
    buffer: SampleRingBuffer,
    reconciler: ConnectionStateReconciler,
    handler: StreamProtocolHandler,
    render: RenderScheduler,
}
impl ScopeSession {
    pub fn new(config: &ViewerConfig) -> Result<Self, ScopeError> {
        Ok(Self {
            buffer: SampleRingBuffer::new(config.default_sample_rate_hz, config.window_seconds)?,
            reconciler: ConnectionStateReconciler::new(config.stale_threshold()),
            handler: StreamProtocolHandler::new(),
            render: RenderScheduler::new(
                config.window_seconds,
                config.max_plot_points,
                config.plot_refresh(),
            ),
        })
    }
    pub fn buffer(&self) -> &SampleRingBuffer {
        &self.buffer
    }
    pub fn reconciler(&self) -> &ConnectionStateReconciler {
        &self.reconciler
    }
    pub fn handler(&self) -> &StreamProtocolHandler {
        &self.handler
    }
    pub fn render(&self) -> &RenderScheduler {
        &self.render
    }
    /// Boot: seed the chart for the default rate.
    pub fn start(&self, sink: &mut impl ViewerSink) {
        self.render.init_chart(&self.buffer, sink);
    }
    pub fn on_stream_text(&mut self, text: &str, now: Instant, sink: &mut impl ViewerSink) -> Handled {
        self.handler.handle_text(
            text,
            &mut self.buffer,
            self.reconciler.state_mut(),
            &self.render,
            now,
            sink,
        )
    }
    pub fn on_stream_opened(&self, sink: &mut impl ViewerSink) {
        sink.log(LogEvent::ok("WebSocket connected"));
    }
    pub fn on_stream_closed(&self, sink: &mut impl ViewerSink) {
        sink.log(LogEvent::bad("WebSocket disconnected"));
    }
    pub fn on_render_tick(&self, sink: &mut impl ViewerSink) {
        self.render.tick(&self.buffer, sink);
    }
    /// Applies a status poll. On failure nothing changes and the error is
    /// returned for the caller to report.
    pub fn on_status(
        &mut self,
        result: Result<RemoteStatus, ApiError>,
        now: Instant,
        sink: &mut impl ViewerSink,
    ) -> Result<Indicators, ApiError> {
        let indicators = self.reconciler.apply_poll(result, now)?;
        if !indicators.connected {
            sink.device_timestamp(None);
        }
        sink.indicators(indicators);
        Ok(indicators)
    }
    /// Local checks before a connect request goes out.
    pub fn prepare_connect(
        &self,
        request: &ConnectRequest,
        sink: &mut impl ViewerSink,
    ) -> Result<(), ScopeError> {
        if request.endpoint.trim().is_empty() {
            sink.log(LogEvent::bad("No port selected"));
            return Err(ScopeError::EndpointRequired);
        }
        if request.sample_rate_hz == 0 {
            sink.log(LogEvent::bad("Sample rate must be greater than zero"));
            return Err(ScopeError::InvalidSampleRate);
        }
        sink.log(LogEvent::dim(format!(
            "Connecting to {} @ {}…",
            request.endpoint, request.baud
        )));
        Ok(())
    }
    /// The back-end accepted a connect: start over at the requested rate.
    pub fn on_connected(
        &mut self,
        request: &ConnectRequest,
        sink: &mut impl ViewerSink,
    ) -> Result<(), ScopeError> {
        self.buffer.reset(request.sample_rate_hz)?;
        self.render.init_chart(&self.buffer, sink);
        self.reconciler.on_connect();
        sink.log(LogEvent::ok("Connected (recording started)"));
        Ok(())
    }
    pub fn on_connect_failed(&self, error: &ApiError, sink: &mut impl ViewerSink) {
        sink.log(LogEvent::bad(format!("Connect failed: {error}")));
    }
    pub fn prepare_disconnect(&self, sink: &mut impl ViewerSink) {
        sink.log(LogEvent::dim("Disconnecting…"));
    }
    pub fn on_disconnected(&self, sink: &mut impl ViewerSink) {
        sink.log(LogEvent::ok("Disconnected (recording stopped)"));
    }
    pub fn on_disconnect_failed(&self, error: &ApiError, sink: &mut impl ViewerSink) {
        sink.log(LogEvent::bad(format!("Disconnect failed: {error}")));
    }
}

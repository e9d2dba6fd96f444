use std::time::Instant;
use log::debug;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use crate::scope::buffer::{Sample, SampleRingBuffer};
use crate::scope::reconciler::ConnectionState;
use crate::scope::render::RenderScheduler;
use crate::scope::sink::ViewerSink;
use crate::scope::ScopeError;
/// Severity tag carried by log lines. Unknown tags read as `Dim`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Ok,
    Bad,
    #[default]
    #[serde(other)]
    Dim,
}
/// Informational line for the log list. Never touches the buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEvent {
    pub message: String,
    pub level: LogLevel,
}
impl LogEvent {
    pub fn new(message: impl Into<String>, level: LogLevel) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }
    pub fn dim(message: impl Into<String>) -> Self {
        Self::new(message, LogLevel::Dim)
    }
    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(message, LogLevel::Ok)
    }
    pub fn bad(message: impl Into<String>) -> Self {
        Self::new(message, LogLevel::Bad)
    }
    /// Lenient decode of a `log` payload. Each field falls back on its own:
    /// a missing or empty message reads as "log", an unreadable level as `Dim`.
    fn from_payload(mut data: Value) -> Self {
        let message = match data.get_mut("message").map(Value::take) {
            Some(Value::String(text)) if !text.is_empty() => text,
            Some(Value::Number(n)) => n.to_string(),
            _ => "log".to_owned(),
        };
        let level = data
            .get_mut("level")
            .map(Value::take)
            .and_then(|level| serde_json::from_value(level).ok())
            .unwrap_or_default();
        Self { message, level }
    }
}
/// Payload of a `frame` message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct StreamFrame {
    #[serde(default)]
    pub sample_rate_hz: Option<u32>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub samples: Vec<Sample>,
    #[serde(default)]
    pub timestamp_ms: Option<i64>,
}
impl StreamFrame {
    /// Announced rate, if any. Zero counts as no announcement.
    pub fn announced_rate(&self) -> Option<u32> {
        self.sample_rate_hz.filter(|&rate| rate > 0)
    }
}
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Sample>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Sample>>::deserialize(deserializer)?.unwrap_or_default())
}
/// Inbound push-channel message, `{"type": ..., "data": {...}}` on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamMessage {
    Frame(StreamFrame),
    Log(LogEvent),
}
#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}
impl StreamMessage {
    /// `Ok(None)` for well-formed messages of a type this client doesn't know.
    pub fn decode(text: &str) -> Result<Option<Self>, ScopeError> {
        let envelope: Envelope = serde_json::from_str(text)?;
        let message = match envelope.kind.as_str() {
            "frame" => StreamMessage::Frame(serde_json::from_value(envelope.data)?),
            "log" => StreamMessage::Log(LogEvent::from_payload(envelope.data)),
            _ => return Ok(None),
        };
        Ok(Some(message))
    }
}
/// What a single inbound message did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handled {
    Frame { appended: usize, rate_changed: bool },
    Log,
    Ignored,
}
/// Applies stream messages to the buffer and connection state.
#[derive(Debug, Default)]
pub struct StreamProtocolHandler {
    frames: u64,
    dropped: u64,
}
impl StreamProtocolHandler {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn frames(&self) -> u64 {
        self.frames
    }
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
    /// Decodes and applies one text message. Never fails: undecodable
    /// input is counted and dropped.
    pub fn handle_text(
        &mut self,
        text: &str,
        buffer: &mut SampleRingBuffer,
        state: &mut ConnectionState,
        render: &RenderScheduler,
        now: Instant,
        sink: &mut impl ViewerSink,
    ) -> Handled {
        match StreamMessage::decode(text) {
            Ok(Some(message)) => self.handle(message, buffer, state, render, now, sink),
            Ok(None) => {
                self.dropped += 1;
                debug!("ignoring stream message of unknown type");
                Handled::Ignored
            }
            Err(e) => {
                self.dropped += 1;
                debug!("dropping stream payload: {e}");
                Handled::Ignored
            }
        }
    }
    pub fn handle(
        &mut self,
        message: StreamMessage,
        buffer: &mut SampleRingBuffer,
        state: &mut ConnectionState,
        render: &RenderScheduler,
        now: Instant,
        sink: &mut impl ViewerSink,
    ) -> Handled {
        match message {
            StreamMessage::Frame(frame) => self.apply_frame(frame, buffer, state, render, now, sink),
            StreamMessage::Log(event) => {
                sink.log(event);
                Handled::Log
            }
        }
    }
    fn apply_frame(
        &mut self,
        frame: StreamFrame,
        buffer: &mut SampleRingBuffer,
        state: &mut ConnectionState,
        render: &RenderScheduler,
        now: Instant,
        sink: &mut impl ViewerSink,
    ) -> Handled {
        self.frames += 1;
        let mut rate_changed = false;
        if let Some(rate) = frame.announced_rate() {
            if rate != buffer.sample_rate_hz() {
                // Reset before anything from this frame is appended.
                match buffer.reset(rate) {
                    Ok(()) => {
                        render.init_chart(buffer, sink);
                        sink.log(LogEvent::dim(format!("Sample rate updated to {rate} Hz")));
                        rate_changed = true;
                    }
                    Err(e) => debug!("ignoring announced rate {rate}: {e}"),
                }
            }
        }
        let appended = frame.samples.len();
        if appended > 0 {
            buffer.append(&frame.samples);
            state.mark_frame(now);
        }
        if let Some(ts) = frame.timestamp_ms {
            sink.device_timestamp(Some(ts));
        }
        Handled::Frame {
            appended,
            rate_changed,
        }
    }
}

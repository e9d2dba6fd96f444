//! Output side of the scope core.
//!
//! Everything the core produces (chart seeds and refreshes, log lines, the
//! latest device timestamp, connection indicators, port listings) leaves through a
//! [`ViewerSink`]. The engine forwards these to the GUI; tests record them.

use crate::client::PortInfo;
use crate::scope::protocol::LogEvent;
use crate::scope::reconciler::Indicators;
use crate::scope::render::{ChartLayout, PlotWindow};

pub trait ViewerSink {
    /// One-time (per rate) chart setup with seed arrays.
    fn init_chart(&mut self, layout: &ChartLayout, seed: PlotWindow);
    /// Per-tick chart refresh.
    fn update_chart(&mut self, window: PlotWindow);
    fn log(&mut self, event: LogEvent);
    /// Latest device timestamp; `None` clears the display.
    fn device_timestamp(&mut self, timestamp_ms: Option<i64>);
    fn indicators(&mut self, indicators: Indicators);
    fn ports(&mut self, ports: Vec<PortInfo>);
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum SinkCall {
        InitChart(ChartLayout, PlotWindow),
        UpdateChart(PlotWindow),
        Log(LogEvent),
        DeviceTimestamp(Option<i64>),
        Indicators(Indicators),
        Ports(Vec<PortInfo>),
    }

    /// Sink that keeps every call in order.
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        pub calls: Vec<SinkCall>,
    }

    impl RecordingSink {
        pub fn logs(&self) -> impl Iterator<Item = &LogEvent> {
            self.calls.iter().filter_map(|c| match c {
                SinkCall::Log(e) => Some(e),
                _ => None,
            })
        }
        pub fn chart_updates(&self) -> impl Iterator<Item = &PlotWindow> {
            self.calls.iter().filter_map(|c| match c {
                SinkCall::UpdateChart(w) => Some(w),
                _ => None,
            })
        }
        pub fn chart_inits(&self) -> usize {
            self.calls
                .iter()
                .filter(|c| matches!(c, SinkCall::InitChart(..)))
                .count()
        }
        pub fn last_indicators(&self) -> Option<Indicators> {
            self.calls.iter().rev().find_map(|c| match c {
                SinkCall::Indicators(i) => Some(*i),
                _ => None,
            })
        }
        pub fn clear(&mut self) {
            self.calls.clear();
        }
    }

    impl ViewerSink for RecordingSink {
        fn init_chart(&mut self, layout: &ChartLayout, seed: PlotWindow) {
            self.calls.push(SinkCall::InitChart(layout.clone(), seed));
        }
        fn update_chart(&mut self, window: PlotWindow) {
            self.calls.push(SinkCall::UpdateChart(window));
        }
        fn log(&mut self, event: LogEvent) {
            self.calls.push(SinkCall::Log(event));
        }
        fn device_timestamp(&mut self, timestamp_ms: Option<i64>) {
            self.calls.push(SinkCall::DeviceTimestamp(timestamp_ms));
        }
        fn indicators(&mut self, indicators: Indicators) {
            self.calls.push(SinkCall::Indicators(indicators));
        }
        fn ports(&mut self, ports: Vec<PortInfo>) {
            self.calls.push(SinkCall::Ports(ports));
        }
    }
}

// src/types.rs
use crate::client::{ConnectRequest, PortInfo};
use crate::scope::{ChartLayout, Indicators, LogEvent, PlotWindow};

// GUI -> engine
#[derive(Clone, Debug)]
pub enum ViewerCommand {
    RefreshPorts,
    Connect(ConnectRequest),
    Disconnect,
    // Drop the push connection and open a fresh one
    ReconnectStream,
}

// engine -> GUI
#[derive(Clone, Debug)]
pub enum ViewerMessage {
    Log(LogEvent),
    Ports(Vec<PortInfo>),
    ChartInit { layout: ChartLayout, seed: PlotWindow },
    Chart(PlotWindow),
    DeviceTimestamp(Option<i64>),
    Indicators(Indicators),
}

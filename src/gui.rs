// src/gui.rs
use std::collections::VecDeque;
use std::sync::mpsc::Receiver;
use std::time::Duration;
use eframe::egui;
use egui::{Color32, RichText, Sense, Vec2};
use egui_plot::{Line, Plot, PlotPoints};
use tokio::sync::mpsc::UnboundedSender;
use crate::client::{ConnectRequest, PortInfo};
use crate::config::ViewerConfig;
use crate::scope::{ChartLayout, Indicators, LinkState, LogEvent, LogLevel, PlotWindow};
use crate::types::{ViewerCommand, ViewerMessage};

const OK_GREEN: Color32 = Color32::from_rgb(36, 193, 122);
const BAD_RED: Color32 = Color32::from_rgb(255, 77, 77);

struct LogLine {
    stamp: String,
    event: LogEvent,
}

pub struct ScopeApp {
    // link state as last reported by the engine
    indicators: Indicators,
    device_timestamp_ms: Option<i64>,

    // connect form
    ports: Vec<PortInfo>,
    selected_port: Option<usize>,
    baud_input: String,
    rate_input: String,

    // chart
    layout: Option<ChartLayout>,
    chart: PlotWindow,

    // log list
    logs: VecDeque<LogLine>,
    log_capacity: usize,

    // channels
    rx: Receiver<ViewerMessage>,
    tx_cmd: UnboundedSender<ViewerCommand>,
}

impl ScopeApp {
    pub fn new(
        config: &ViewerConfig,
        rx: Receiver<ViewerMessage>,
        tx_cmd: UnboundedSender<ViewerCommand>,
    ) -> Self {
        Self {
            indicators: Indicators {
                link: LinkState::Disconnected,
                connected: false,
                recording: false,
            },
            device_timestamp_ms: None,
            ports: Vec::new(),
            selected_port: None,
            baud_input: config.default_baud.to_string(),
            rate_input: config.default_sample_rate_hz.to_string(),
            layout: None,
            chart: PlotWindow::default(),
            logs: VecDeque::new(),
            log_capacity: config.log_capacity.max(1),
            rx,
            tx_cmd,
        }
    }

    fn log(&mut self, event: LogEvent) {
        self.logs.push_back(LogLine {
            stamp: chrono::Local::now().format("%H:%M:%S").to_string(),
            event,
        });
        while self.logs.len() > self.log_capacity {
            self.logs.pop_front();
        }
    }

    fn send(&mut self, cmd: ViewerCommand) {
        if self.tx_cmd.send(cmd).is_err() {
            self.log(LogEvent::bad("Engine is not running"));
        }
    }

    fn drain_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                ViewerMessage::Log(event) => self.log(event),
                ViewerMessage::Ports(ports) => {
                    self.selected_port = if ports.is_empty() { None } else { Some(0) };
                    self.ports = ports;
                }
                ViewerMessage::ChartInit { layout, seed } => {
                    self.layout = Some(layout);
                    self.chart = seed;
                }
                ViewerMessage::Chart(window) => self.chart = window,
                ViewerMessage::DeviceTimestamp(ts) => self.device_timestamp_ms = ts,
                ViewerMessage::Indicators(indicators) => self.indicators = indicators,
            }
        }
    }

    fn selected_port(&self) -> Option<&PortInfo> {
        self.selected_port.and_then(|i| self.ports.get(i))
    }

    fn connect_clicked(&mut self) {
        let endpoint = self.selected_port().map(|p| p.id.clone()).unwrap_or_default();
        let Ok(baud) = self.baud_input.trim().parse::<u32>() else {
            self.log(LogEvent::bad(format!("Invalid baud rate: {}", self.baud_input)));
            return;
        };
        let Ok(sample_rate_hz) = self.rate_input.trim().parse::<u32>() else {
            self.log(LogEvent::bad(format!("Invalid sample rate: {}", self.rate_input)));
            return;
        };
        self.send(ViewerCommand::Connect(ConnectRequest {
            endpoint,
            baud,
            sample_rate_hz,
        }));
    }

    fn pill(ui: &mut egui::Ui, text: &str, good: bool) {
        let color = if good { OK_GREEN } else { BAD_RED };
        ui.label(RichText::new(text).color(color).strong());
    }

    fn data_dot(ui: &mut egui::Ui, streaming: bool) {
        let (rect, _) = ui.allocate_exact_size(Vec2::splat(14.0), Sense::hover());
        let color = if streaming { OK_GREEN } else { BAD_RED };
        ui.painter().circle_filled(rect.center(), 6.0, color);
        ui.label(if streaming { "Streaming" } else { "No data" });
    }

    fn level_color(level: LogLevel) -> Color32 {
        match level {
            LogLevel::Dim => Color32::GRAY,
            LogLevel::Ok => OK_GREEN,
            LogLevel::Bad => BAD_RED,
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let current = self
                .selected_port()
                .map(|p| p.label.clone())
                .unwrap_or_else(|| "No ports found".to_owned());
            egui::ComboBox::from_label("Port")
                .selected_text(current)
                .show_ui(ui, |ui| {
                    for (i, port) in self.ports.iter().enumerate() {
                        ui.selectable_value(&mut self.selected_port, Some(i), port.label.as_str());
                    }
                });
            if ui.button("Refresh").clicked() {
                self.send(ViewerCommand::RefreshPorts);
            }
            ui.label("Baud");
            ui.add(egui::TextEdit::singleline(&mut self.baud_input).desired_width(80.0));
            ui.label("Rate (Hz)");
            ui.add(egui::TextEdit::singleline(&mut self.rate_input).desired_width(70.0));

            let connected = self.indicators.connected;
            if ui.add_enabled(!connected, egui::Button::new("Connect")).clicked() {
                self.connect_clicked();
            }
            if ui.add_enabled(connected, egui::Button::new("Disconnect")).clicked() {
                self.send(ViewerCommand::Disconnect);
            }
            if ui.button("Reconnect stream").clicked() {
                self.send(ViewerCommand::ReconnectStream);
            }
        });
        let meta = self
            .selected_port()
            .map(PortInfo::meta_line)
            .unwrap_or_else(|| "—".to_owned());
        ui.label(RichText::new(meta).small());
    }

    fn status_row(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let connected = self.indicators.connected;
            Self::pill(ui, if connected { "Connected" } else { "Disconnected" }, connected);
            let recording = self.indicators.recording;
            Self::pill(ui, if recording { "REC • ON" } else { "REC • OFF" }, recording);
            ui.separator();
            Self::data_dot(ui, self.indicators.link.is_streaming());
            ui.separator();
            let ts = match self.device_timestamp_ms {
                Some(ms) if connected => format!("{ms} ms"),
                _ => "—".to_owned(),
            };
            ui.label(format!("Device time: {ts}"));
        });
    }

    fn log_panel(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Log");
            if ui.button("Clear").clicked() {
                self.logs.clear();
                self.log(LogEvent::dim("Logs cleared"));
            }
        });
        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for line in &self.logs {
                    let text = format!("[{}] {}", line.stamp, line.event.message);
                    ui.label(
                        RichText::new(text)
                            .monospace()
                            .color(Self::level_color(line.event.level)),
                    );
                }
            });
    }

    fn chart(&self, ui: &mut egui::Ui) {
        let (x_label, y_label) = match &self.layout {
            Some(layout) => (layout.x_label.clone(), layout.y_label.clone()),
            None => ("Time (s)".to_owned(), "Amplitude".to_owned()),
        };
        Plot::new("scope_plot")
            .x_axis_label(x_label)
            .y_axis_label(y_label)
            .allow_drag(false)
            .allow_scroll(false)
            .auto_bounds_x()
            .auto_bounds_y()
            .show(ui, |plot_ui| {
                if !self.chart.is_empty() {
                    plot_ui.line(
                        Line::new(PlotPoints::new(self.chart.points()))
                            .color(Color32::from_rgb(0, 180, 255))
                            .width(2.0),
                    );
                }
            });
    }
}

impl eframe::App for ScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_messages();

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.heading("TLV Scope");
            self.controls(ui);
            self.status_row(ui);
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("logs")
            .resizable(true)
            .min_height(120.0)
            .show(ctx, |ui| self.log_panel(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.chart(ui));

        // Engine output arrives on its own schedule; keep polling the channel.
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

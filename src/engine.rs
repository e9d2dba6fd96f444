// src/engine.rs
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use log::{debug, error, info, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{interval, MissedTickBehavior};
use tokio_tungstenite::tungstenite;
use crate::client::{ApiClient, ApiError, ConnectRequest, PortInfo, RemoteStatus};
use crate::config::ViewerConfig;
use crate::scope::{ChartLayout, Indicators, LogEvent, PlotWindow, ScopeSession, ViewerSink};
use crate::stream::{self, LiveStream, StreamEvent};
use crate::types::{ViewerCommand, ViewerMessage};

/// Forwards core output to the GUI thread.
pub struct ChannelSink {
    tx: Sender<ViewerMessage>,
}

impl ChannelSink {
    pub fn new(tx: Sender<ViewerMessage>) -> Self {
        Self { tx }
    }
    fn send(&self, msg: ViewerMessage) {
        // GUI gone means we are shutting down anyway.
        self.tx.send(msg).ok();
    }
}

impl ViewerSink for ChannelSink {
    fn init_chart(&mut self, layout: &ChartLayout, seed: PlotWindow) {
        self.send(ViewerMessage::ChartInit {
            layout: layout.clone(),
            seed,
        });
    }
    fn update_chart(&mut self, window: PlotWindow) {
        self.send(ViewerMessage::Chart(window));
    }
    fn log(&mut self, event: LogEvent) {
        self.send(ViewerMessage::Log(event));
    }
    fn device_timestamp(&mut self, timestamp_ms: Option<i64>) {
        self.send(ViewerMessage::DeviceTimestamp(timestamp_ms));
    }
    fn indicators(&mut self, indicators: Indicators) {
        self.send(ViewerMessage::Indicators(indicators));
    }
    fn ports(&mut self, ports: Vec<PortInfo>) {
        self.send(ViewerMessage::Ports(ports));
    }
}

/// Results of remote work, delivered back onto the engine loop.
enum Completion {
    Ports(Result<Vec<PortInfo>, ApiError>),
    Status(Result<RemoteStatus, ApiError>),
    Connect {
        request: ConnectRequest,
        result: Result<(), ApiError>,
    },
    Disconnect(Result<(), ApiError>),
    StreamOpened {
        epoch: u64,
        result: Result<LiveStream, tungstenite::Error>,
    },
}

/// Starts the engine on its own thread with a single-threaded runtime.
pub fn spawn_thread(
    config: ViewerConfig,
    tx: Sender<ViewerMessage>,
    rx_cmd: UnboundedReceiver<ViewerCommand>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("scope-engine".to_owned())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    error!("failed to start engine runtime: {e}");
                    return;
                }
            };
            runtime.block_on(async move {
                match Engine::new(config, ChannelSink::new(tx)) {
                    Ok(engine) => engine.run(rx_cmd).await,
                    Err(e) => error!("engine failed to start: {e:#}"),
                }
            });
        })
}

pub struct Engine<S: ViewerSink> {
    session: ScopeSession,
    sink: S,
    api: ApiClient,
    config: ViewerConfig,
    done_tx: UnboundedSender<Completion>,
    done_rx: UnboundedReceiver<Completion>,
    stream: Option<LiveStream>,
    stream_epoch: u64,
    poll_in_flight: bool,
}

impl<S: ViewerSink> Engine<S> {
    pub fn new(config: ViewerConfig, sink: S) -> anyhow::Result<Self> {
        let session = ScopeSession::new(&config)?;
        let api = ApiClient::new(config.api_base.clone(), config.request_timeout())?;
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        Ok(Self {
            session,
            sink,
            api,
            config,
            done_tx,
            done_rx,
            stream: None,
            stream_epoch: 0,
            poll_in_flight: false,
        })
    }

    /// Runs until the command channel closes.
    pub async fn run(mut self, mut rx_cmd: UnboundedReceiver<ViewerCommand>) {
        info!(
            "engine up: api {} stream {}",
            self.api.base(),
            self.config.stream_url
        );
        self.sink.log(LogEvent::dim("UI loaded"));
        self.request_ports();
        self.open_stream();
        self.session.start(&mut self.sink);
        self.request_status();

        let mut render = interval(self.session.render().period());
        render.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut poll = interval(self.config.status_poll());
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                cmd = rx_cmd.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                Some(done) = self.done_rx.recv() => self.handle_completion(done),
                event = stream::next_event(&mut self.stream) => self.handle_stream_event(event),
                _ = render.tick() => self.session.on_render_tick(&mut self.sink),
                _ = poll.tick() => self.request_status(),
            }
        }
        info!("engine stopped");
    }

    fn handle_command(&mut self, cmd: ViewerCommand) {
        match cmd {
            ViewerCommand::RefreshPorts => self.request_ports(),
            ViewerCommand::Connect(request) => {
                if self.session.prepare_connect(&request, &mut self.sink).is_err() {
                    return;
                }
                let api = self.api.clone();
                let done = self.done_tx.clone();
                tokio::spawn(async move {
                    let result = api.connect(&request).await;
                    done.send(Completion::Connect { request, result }).ok();
                });
            }
            ViewerCommand::Disconnect => {
                self.session.prepare_disconnect(&mut self.sink);
                let api = self.api.clone();
                let done = self.done_tx.clone();
                tokio::spawn(async move {
                    done.send(Completion::Disconnect(api.disconnect().await)).ok();
                });
            }
            ViewerCommand::ReconnectStream => self.open_stream(),
        }
    }

    fn handle_completion(&mut self, done: Completion) {
        match done {
            Completion::Ports(Ok(ports)) => {
                debug!("{} ports listed", ports.len());
                self.sink.ports(ports);
            }
            Completion::Ports(Err(e)) => {
                warn!("port listing failed: {e}");
                self.sink.log(LogEvent::bad(format!("Port listing failed: {e}")));
            }
            Completion::Status(result) => {
                self.poll_in_flight = false;
                if let Err(e) = self.session.on_status(result, Instant::now(), &mut self.sink) {
                    let streak = self.session.reconciler().failed_polls();
                    warn!("status poll failed ({streak} in a row): {e}");
                }
            }
            Completion::Connect { request, result } => match result {
                Ok(()) => {
                    if let Err(e) = self.session.on_connected(&request, &mut self.sink) {
                        warn!("connect accepted with unusable rate: {e}");
                    }
                    self.request_status();
                }
                Err(e) => {
                    warn!("connect to {} failed: {e}", request.endpoint);
                    self.session.on_connect_failed(&e, &mut self.sink);
                }
            },
            Completion::Disconnect(result) => {
                match result {
                    Ok(()) => self.session.on_disconnected(&mut self.sink),
                    Err(e) => {
                        warn!("disconnect failed: {e}");
                        self.session.on_disconnect_failed(&e, &mut self.sink);
                    }
                }
                self.request_status();
            }
            Completion::StreamOpened { epoch, result } => {
                if epoch != self.stream_epoch {
                    debug!("discarding stream opened under stale epoch {epoch}");
                    return;
                }
                match result {
                    Ok(live) => {
                        self.stream = Some(live);
                        self.session.on_stream_opened(&mut self.sink);
                    }
                    Err(e) => {
                        warn!("stream connect failed: {e}");
                        self.session.on_stream_closed(&mut self.sink);
                    }
                }
            }
        }
    }

    fn handle_stream_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Text(text) => {
                self.session.on_stream_text(&text, Instant::now(), &mut self.sink);
            }
            StreamEvent::Closed => {
                self.stream = None;
                self.session.on_stream_closed(&mut self.sink);
            }
        }
    }

    /// Replaces the push connection. The old one is dropped first, so none
    /// of its messages reach the handler after this point.
    fn open_stream(&mut self) {
        if let Some(old) = self.stream.take() {
            debug!("closing stream epoch {}", old.epoch());
        }
        self.stream_epoch += 1;
        let epoch = self.stream_epoch;
        let url = self.config.stream_url.clone();
        let done = self.done_tx.clone();
        tokio::spawn(async move {
            let result = LiveStream::open(&url, epoch).await;
            done.send(Completion::StreamOpened { epoch, result }).ok();
        });
    }

    fn request_status(&mut self) {
        if self.poll_in_flight {
            return;
        }
        self.poll_in_flight = true;
        let api = self.api.clone();
        let done = self.done_tx.clone();
        tokio::spawn(async move {
            done.send(Completion::Status(api.status().await)).ok();
        });
    }

    fn request_ports(&mut self) {
        let api = self.api.clone();
        let done = self.done_tx.clone();
        tokio::spawn(async move {
            done.send(Completion::Ports(api.ports().await)).ok();
        });
    }
}

//! Watch face terminal loop.
//!
//! The terminal stands in for the watch display; key presses stand in
//! for the platform events the source face received from the OS:
//! `a` toggles ambient mode, `v` toggles visibility, `r` forces a
//! weather request, `z` re-reads the timezone, `q` or ctrl-c exits.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, FixedOffset, Utc};
use crossterm::{
    event::{self as crossterm_event, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use zenoh::sample::SampleKind;

use wristcast_bus::{ConnectionManager, DEFAULT_CONNECT_TIMEOUT};
use wristcast_protocol::{channels, WeatherSnapshot};

use crate::config::Config;
use crate::requester::request_weather;

pub mod state;
mod ui;

use state::{DisplayState, Visibility};

pub struct WatchFace {
    manager: Arc<ConnectionManager>,
    config: Config,
    pub state: DisplayState,
    tz_offset: FixedOffset,
    data_rx: Option<mpsc::Receiver<WeatherSnapshot>>,
    data_stop: Option<watch::Sender<()>>,
    data_task: Option<JoinHandle<()>>,
    next_request_at: Option<Instant>,
}

impl WatchFace {
    pub fn new(manager: Arc<ConnectionManager>, config: Config) -> Self {
        let state = DisplayState::new(config.low_color);
        Self {
            manager,
            config,
            state,
            tz_offset: current_offset(),
            data_rx: None,
            data_stop: None,
            data_task: None,
            next_request_at: None,
        }
    }

    /// Wall-clock time under the cached timezone offset.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.tz_offset)
    }

    fn refresh_timezone(&mut self) {
        self.tz_offset = current_offset();
    }

    /// Visibility transition: gaining visibility re-reads the
    /// timezone, starts the data listener, and arms an immediate
    /// weather request; losing it tears all of that down and drops
    /// the bus connection.
    pub async fn set_visible(&mut self, visible: bool) {
        if visible == self.state.visibility.is_visible() {
            return;
        }
        if visible {
            self.refresh_timezone();
            self.state.visibility = Visibility::Interactive;
            self.spawn_data_listener();
            self.next_request_at = Some(Instant::now());
        } else {
            self.state.visibility = Visibility::Invisible;
            self.next_request_at = None;
            self.stop_data_listener().await;
            self.manager.disconnect().await;
        }
    }

    fn toggle_ambient(&mut self) {
        self.state.visibility = match self.state.visibility {
            Visibility::Interactive => Visibility::Ambient,
            Visibility::Ambient => Visibility::Interactive,
            Visibility::Invisible => Visibility::Invisible,
        };
    }

    fn spawn_data_listener(&mut self) {
        let (stop_tx, mut stop_rx) = watch::channel(());
        let (tx, rx) = mpsc::channel(16);
        let manager = self.manager.clone();

        let handle = tokio::spawn(async move {
            let session = match manager.connect(DEFAULT_CONNECT_TIMEOUT).await {
                Ok(session) => session,
                Err(e) => {
                    log::error!("Watch face failed to connect: {}", e);
                    return;
                }
            };
            let subscriber = match session.declare_subscriber(channels::WEATHER_INFO_WEAR).await {
                Ok(subscriber) => subscriber,
                Err(e) => {
                    log::error!(
                        "Failed to subscribe to {}: {}",
                        channels::WEATHER_INFO_WEAR,
                        e
                    );
                    return;
                }
            };
            log::info!("Watching {}", channels::WEATHER_INFO_WEAR);

            loop {
                tokio::select! {
                    biased;
                    _ = stop_rx.changed() => break,
                    sample = subscriber.recv_async() => {
                        match sample {
                            Ok(sample) => {
                                if sample.kind() != SampleKind::Put {
                                    continue;
                                }
                                let payload = sample.payload().to_bytes();
                                match WeatherSnapshot::from_payload(&payload) {
                                    Ok(snapshot) => {
                                        if tx.send(snapshot).await.is_err() {
                                            break;
                                        }
                                    }
                                    Err(e) => log::warn!(
                                        "Undecodable snapshot on {}: {}",
                                        channels::WEATHER_INFO_WEAR,
                                        e
                                    ),
                                }
                            }
                            Err(_) => break,
                        }
                    }
                }
            }
            log::debug!("Data listener stopped");
        });

        self.data_rx = Some(rx);
        self.data_stop = Some(stop_tx);
        self.data_task = Some(handle);
    }

    async fn stop_data_listener(&mut self) {
        if let Some(stop) = self.data_stop.take() {
            let _ = stop.send(());
        }
        self.data_rx = None;
        if let Some(handle) = self.data_task.take() {
            // The listener may still be inside its bounded connect;
            // don't hold teardown hostage to it.
            handle.abort();
            let _ = handle.await;
        }
    }

    /// Apply any pending snapshots. The new data is painted on the
    /// next draw pass; no forced redraw.
    fn drain_data(&mut self) {
        let Some(rx) = self.data_rx.as_mut() else {
            return;
        };
        while let Ok(snapshot) = rx.try_recv() {
            if self.state.accept_snapshot(&snapshot) {
                log::debug!(
                    "Weather updated: low={:?} high={:?}",
                    self.state.low,
                    self.state.high
                );
            }
        }
    }

    /// Fire the self-rescheduling request timer when due. The send
    /// itself runs off the render path since discovery blocks.
    fn maybe_request(&mut self) {
        if !self.state.visibility.is_visible() {
            return;
        }
        let Some(due) = self.next_request_at else {
            return;
        };
        if Instant::now() < due {
            return;
        }
        self.next_request_at =
            Some(Instant::now() + Duration::from_secs(self.config.request_interval_secs));

        let manager = self.manager.clone();
        let timeout = Duration::from_secs(self.config.discovery_timeout_secs);
        tokio::spawn(async move {
            // Establish the connection first under the bounded wait,
            // as the source's request service did with its own client;
            // the initiator itself only checks, never connects.
            if let Err(e) = manager.connect(DEFAULT_CONNECT_TIMEOUT).await {
                log::warn!("Weather request skipped: {}", e);
                return;
            }
            match request_weather(&manager, timeout).await {
                Ok(outcome) => log::debug!("Weather request: {:?}", outcome),
                Err(e) => log::warn!("Weather request failed: {}", e),
            }
        });
    }

    /// How long the event poll may sleep before the next redraw or
    /// timer is due. Interactive mode re-fires at second boundaries,
    /// ambient at minute boundaries.
    fn poll_timeout(&self) -> Duration {
        let now_ms = Utc::now().timestamp_millis();
        let draw_delay = match self.state.visibility {
            Visibility::Interactive => state::next_tick_delay(now_ms),
            Visibility::Ambient => state::next_minute_delay(now_ms),
            Visibility::Invisible => Duration::from_millis(250),
        };
        match self
            .next_request_at
            .map(|at| at.saturating_duration_since(Instant::now()))
        {
            Some(request_delay) if request_delay < draw_delay => request_delay,
            _ => draw_delay,
        }
    }

    /// Returns true when the app should exit.
    async fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('a') => self.toggle_ambient(),
            KeyCode::Char('v') => {
                let visible = self.state.visibility.is_visible();
                self.set_visible(!visible).await;
            }
            KeyCode::Char('r') => {
                if self.state.visibility.is_visible() {
                    self.next_request_at = Some(Instant::now());
                }
            }
            KeyCode::Char('z') => self.refresh_timezone(),
            _ => {}
        }
        false
    }
}

fn current_offset() -> FixedOffset {
    *chrono::Local::now().offset()
}

/// Run the watch face until quit or shutdown.
pub async fn run(
    manager: Arc<ConnectionManager>,
    config: Config,
    shutdown_rx: watch::Receiver<()>,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = WatchFace::new(manager, config);
    app.set_visible(true).await;

    let result = run_loop(&mut terminal, &mut app, shutdown_rx).await;

    app.set_visible(false).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut WatchFace,
    shutdown: watch::Receiver<()>,
) -> Result<()> {
    loop {
        if shutdown.has_changed().unwrap_or(true) {
            break;
        }

        app.drain_data();
        app.maybe_request();

        let now = app.now();
        terminal.draw(|f| ui::render(f, &app.state, now))?;

        if crossterm_event::poll(app.poll_timeout())? {
            if let Event::Key(key) = crossterm_event::read()? {
                if app.handle_key(key).await {
                    break;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_app(interval_secs: u64) -> WatchFace {
        let config = Config {
            request_interval_secs: interval_secs,
            ..Config::default()
        };
        WatchFace::new(Arc::new(ConnectionManager::new(None)), config)
    }

    #[tokio::test]
    async fn gaining_visibility_arms_an_immediate_request() {
        let mut app = make_app(1800);
        assert!(app.next_request_at.is_none());

        app.set_visible(true).await;
        assert_eq!(app.state.visibility, Visibility::Interactive);
        let due = app.next_request_at.unwrap();
        assert!(due <= Instant::now());

        app.set_visible(false).await;
        assert_eq!(app.state.visibility, Visibility::Invisible);
        assert!(app.next_request_at.is_none());
        assert!(app.data_rx.is_none());
    }

    #[tokio::test]
    async fn request_timer_reschedules_with_fixed_delay() {
        let mut app = make_app(1800);
        app.set_visible(true).await;

        app.maybe_request();
        let due = app.next_request_at.unwrap();
        let remaining = due.saturating_duration_since(Instant::now());
        assert!(remaining > Duration::from_secs(1790));
        assert!(remaining <= Duration::from_secs(1800));

        app.set_visible(false).await;
    }

    #[tokio::test]
    async fn ambient_toggle_only_applies_while_visible() {
        let mut app = make_app(1800);
        app.toggle_ambient();
        assert_eq!(app.state.visibility, Visibility::Invisible);

        app.set_visible(true).await;
        app.toggle_ambient();
        assert_eq!(app.state.visibility, Visibility::Ambient);
        app.toggle_ambient();
        assert_eq!(app.state.visibility, Visibility::Interactive);

        app.set_visible(false).await;
    }

    #[tokio::test]
    async fn poll_timeout_stays_within_a_second_while_interactive() {
        let mut app = make_app(1800);
        app.set_visible(true).await;
        app.maybe_request(); // push the request timer out of the way
        let timeout = app.poll_timeout();
        assert!(timeout <= Duration::from_secs(1));

        app.set_visible(false).await;
    }
}

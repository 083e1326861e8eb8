//! App — the render/input loop.
//!
//! Architecture:
//! - The loop sleeps until the playback state raises its refresh signal, a
//!   message arrives, or the render timeout passes; then it lowers the
//!   signal, reads one snapshot and draws a frame from it.
//! - A blocking reader thread forwards terminal events as `AppMessage`s.
//! - Keys become `Action`s; transport actions go to the session fire-and-forget,
//!   searches run on their own task and report back through the channel.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::Rect,
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use spot_core::config::Config;
use spot_core::protocol::{TrackSummary, TransportCommand};
use spot_core::remote::{RemoteError, RemotePlayback};
use spot_core::session::{search_tracks, PlaybackSession};

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
    components::{header::draw_header, now_playing, search_overlay::SearchOverlay},
    intent::IntentState,
    theme::Palette,
    widgets::status_bar::draw_help_line,
};

/// How long the reader thread blocks before checking whether the App is gone.
const INPUT_POLL: Duration = Duration::from_millis(100);

#[derive(Debug)]
enum AppMessage {
    Event(Event),
    SearchFinished {
        query: String,
        result: Result<Vec<TrackSummary>, RemoteError>,
    },
}

pub struct App {
    state: AppState,
    overlay: SearchOverlay,
    pause_intent: IntentState<bool>,
    render_timeout: Duration,
    search_limit: u32,
    should_quit: bool,
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self {
            state: AppState::new(Palette::from_config(&config.theme)),
            overlay: SearchOverlay::new(),
            pause_intent: IntentState::new(false),
            render_timeout: config.sync.render_timeout(),
            search_limit: config.sync.search_limit,
            should_quit: false,
        }
    }

    pub async fn run<R: RemotePlayback>(mut self, session: &PlaybackSession<R>) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let result = self.event_loop(&mut terminal, session).await;

        // ── Teardown ──────────────────────────────────────────────────────────
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        info!("ui: closed");

        result
    }

    async fn event_loop<R: RemotePlayback>(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        session: &PlaybackSession<R>,
    ) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<AppMessage>(256);

        // ── Background task: keyboard events ─────────────────────────────────
        let event_tx = tx.clone();
        tokio::task::spawn_blocking(move || loop {
            if event_tx.is_closed() {
                break;
            }
            match event::poll(INPUT_POLL) {
                Ok(true) => match event::read() {
                    Ok(ev) => {
                        if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("input: read failed: {}", e);
                        break;
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    warn!("input: poll failed: {}", e);
                    break;
                }
            }
        });

        // ── Main loop ─────────────────────────────────────────────────────────
        let shared = session.state();
        loop {
            shared.clear_refresh();
            let snapshot = shared.get_snapshot().await;
            self.pause_intent.on_confirmed(snapshot.is_playing);
            if self.pause_intent.tick() {
                warn!("ui: pause toggle not confirmed by the remote");
            }
            self.state.shown_playing = *self.pause_intent.intended();
            self.state.pause_hint = self.pause_intent.render_state();
            self.state.snapshot = snapshot;

            terminal.draw(|f| self.draw(f))?;

            if self.should_quit {
                break;
            }

            tokio::select! {
                _ = shared.wait_for_refresh(self.render_timeout) => {}
                Some(msg) = rx.recv() => {
                    self.handle_message(msg, session, &tx);
                    while let Ok(msg) = rx.try_recv() {
                        self.handle_message(msg, session, &tx);
                    }
                }
            }
        }
        Ok(())
    }

    // ── Message handler ───────────────────────────────────────────────────────

    fn handle_message<R: RemotePlayback>(
        &mut self,
        msg: AppMessage,
        session: &PlaybackSession<R>,
        tx: &mpsc::Sender<AppMessage>,
    ) {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                for action in self.handle_key(key) {
                    self.dispatch(action, session, tx);
                }
            }
            AppMessage::Event(_) => {}
            AppMessage::SearchFinished { query, result } => {
                let result = result.map_err(|e| {
                    warn!("search: {:?} failed: {}", query, e);
                    e.to_string()
                });
                self.overlay.on_results(&query, result);
            }
        }
    }

    /// Map a key to actions. While the query box is focused it takes every
    /// key except Ctrl+C.
    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return vec![Action::Quit];
        }
        if self.overlay.is_editing() {
            return self.overlay.handle_key(key, &self.state);
        }
        match key.code {
            KeyCode::Char(c) => match c.to_ascii_lowercase() {
                'q' => vec![Action::Quit],
                'i' => vec![Action::OpenSearch],
                'k' => vec![Action::TogglePause],
                'j' => vec![Action::Prev],
                'l' => vec![Action::Next],
                _ => vec![],
            },
            _ => self.overlay.handle_key(key, &self.state),
        }
    }

    fn dispatch<R: RemotePlayback>(
        &mut self,
        action: Action,
        session: &PlaybackSession<R>,
        tx: &mpsc::Sender<AppMessage>,
    ) {
        debug!("dispatch: {:?}", action);
        match action {
            Action::Quit => self.should_quit = true,
            Action::TogglePause => {
                let playing = *self.pause_intent.intended();
                self.pause_intent.set_intent(!playing);
                session.submit(if playing {
                    TransportCommand::Pause
                } else {
                    TransportCommand::Resume
                });
            }
            Action::Next => session.submit(TransportCommand::SkipNext),
            Action::Prev => session.submit(TransportCommand::SkipPrevious),
            Action::PlayTrack(track) => {
                info!("ui: play {} - {}", track.name, track.artist);
                session.submit(TransportCommand::Play { uri: track.uri });
            }
            Action::SubmitSearch(query) => {
                let remote = session.remote();
                let limit = self.search_limit;
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = search_tracks(Arc::as_ref(&remote), &query, limit).await;
                    let _ = tx.send(AppMessage::SearchFinished { query, result }).await;
                });
            }
            Action::OpenSearch | Action::CloseSearch => {
                self.overlay.on_action(&action, &self.state);
            }
        }
    }

    // ── Layout ────────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if area.height == 0 {
            return;
        }
        let row = |y: u16, h: u16| Rect::new(area.x, area.y + y, area.width, h);

        draw_header(frame, row(0, 1), &self.state);
        if area.height > 2 + now_playing::HEIGHT {
            now_playing::draw_now_playing(frame, row(2, now_playing::HEIGHT), &self.state);
        }

        // Overlay fills the space between the controls and the help line.
        if area.height > 10 && area.width > 8 {
            let overlay_area = Rect::new(area.x + 2, area.y + 7, area.width - 4, area.height - 8);
            self.overlay.draw(frame, overlay_area, &self.state);
        }

        draw_help_line(frame, row(area.height - 1, 1), self.state.palette.style_muted());
    }
}

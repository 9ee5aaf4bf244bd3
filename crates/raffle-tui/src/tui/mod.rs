// TUI: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors what the orchestrator last sent.
// The orchestrator pushes `UiUpdate` messages over an mpsc channel; the TUI
// applies them to `ViewState` and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;
use tokio::time::Instant;

use raffle_core::animator::DrawDuration;
use raffle_core::config::UiConfig;
use raffle_core::pool::filter_by_name;
use raffle_core::{Participant, Winner};

use crate::protocol::{AppSnapshot, Notice, UiUpdate, UserCommand};

use layout::build_layout;

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

/// Which list has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Participants,
    Winners,
}

/// A destructive action waiting for y/n.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    ClearParticipants,
    ClearWinners,
}

impl ConfirmAction {
    pub fn prompt(self) -> &'static str {
        match self {
            ConfirmAction::ClearParticipants => "Remove every participant?",
            ConfirmAction::ClearWinners => "Clear the winner history?",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// The add-names editor is open.
    Adding,
    /// Typing into the participant search box.
    Searching,
    Confirm(ConfirmAction),
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state that mirrors the application state for rendering.
#[derive(Debug)]
pub struct ViewState {
    pub participants: Vec<Participant>,
    pub winners: Vec<Winner>,
    /// Name in the display panel. `None` shows the placeholder.
    pub display: Option<String>,
    pub drawing: bool,
    /// Winner shown in the reveal dialog until dismissed.
    pub winner: Option<String>,
    pub draw_duration_secs: u32,
    /// Current notice and when it stops being shown.
    pub notice: Option<(Notice, Instant)>,
    pub notice_ttl: Duration,
    pub placeholder: String,
    pub mode: InputMode,
    pub focus: Panel,
    /// Selected row within the filtered participant list.
    pub selected: usize,
    pub winners_scroll: usize,
    pub search: String,
    pub add_buffer: String,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            participants: Vec::new(),
            winners: Vec::new(),
            display: None,
            drawing: false,
            winner: None,
            draw_duration_secs: DrawDuration::DEFAULT,
            notice: None,
            notice_ttl: Duration::from_secs(4),
            placeholder: String::new(),
            mode: InputMode::Normal,
            focus: Panel::Participants,
            selected: 0,
            winners_scroll: 0,
            search: String::new(),
            add_buffer: String::new(),
        }
    }
}

impl ViewState {
    pub fn new(ui: &UiConfig) -> Self {
        ViewState {
            notice_ttl: ui.notice_duration(),
            placeholder: ui.placeholder.clone(),
            ..ViewState::default()
        }
    }

    /// Apply a full state snapshot from the orchestrator. Local UI state
    /// (mode, focus, search text) is left alone; the selection is clamped.
    pub fn apply_snapshot(&mut self, snapshot: AppSnapshot) {
        self.participants = snapshot.participants;
        self.winners = snapshot.winners;
        self.drawing = snapshot.drawing;
        self.winner = snapshot.winner;
        self.draw_duration_secs = snapshot.draw_duration_secs;
        self.clamp_selection();
        self.winners_scroll = self.winners_scroll.min(self.winners.len().saturating_sub(1));
    }

    /// Participants matching the search box, in list order.
    pub fn visible_participants(&self) -> Vec<&Participant> {
        filter_by_name(&self.participants, &self.search)
    }

    pub fn selected_participant(&self) -> Option<&Participant> {
        self.visible_participants().get(self.selected).copied()
    }

    pub fn clamp_selection(&mut self) {
        let len = self.visible_participants().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn show_notice(&mut self, notice: Notice) {
        self.notice = Some((notice, Instant::now() + self.notice_ttl));
    }

    /// Drop the notice once its time is up.
    pub fn expire_notice(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|(_, until)| now >= *until) {
            self.notice = None;
        }
    }

    pub fn current_notice(&self) -> Option<&Notice> {
        self.notice.as_ref().map(|(notice, _)| notice)
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::StateSnapshot(snapshot) => {
            state.apply_snapshot(*snapshot);
        }
        UiUpdate::Display(name) => {
            state.display = name;
        }
        UiUpdate::Notice(notice) => {
            state.show_notice(notice);
        }
        UiUpdate::WinnerRevealed(name) => {
            state.drawing = false;
            state.display = Some(name.clone());
            state.winner = Some(name);
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete frame: panels first, then whichever overlay the
/// current mode calls for.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::display::render(frame, layout.display, state);
    widgets::participants::render(frame, layout.participants, state);
    widgets::winners::render(frame, layout.winners, state);
    widgets::status_bar::render_help(frame, layout.help_bar, state);

    match state.mode {
        InputMode::Adding => widgets::add_names::render(frame, frame.area(), state),
        InputMode::Confirm(action) => widgets::confirm::render(frame, frame.area(), action),
        InputMode::Normal | InputMode::Searching => {}
    }

    if let Some(name) = &state.winner {
        widgets::winner_dialog::render(frame, frame.area(), name);
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// 1. Initializes the terminal (raw mode, alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    ui_config: UiConfig,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::new(&ui_config);
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result = loop {
        tokio::select! {
            // UI updates from the orchestrator
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    // Orchestrator is gone
                    None => break Ok(()),
                }
            }

            // Keyboard input
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break Ok(());
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(anyhow::Error::new(e).context("terminal input failed")),
                    None => break Ok(()),
                }
            }

            // Render tick
            _ = render_tick.tick() => {
                view_state.expire_notice(Instant::now());
                if let Err(e) = terminal.draw(|frame| render_frame(frame, &view_state)) {
                    break Err(anyhow::Error::new(e).context("failed to draw frame"));
                }
            }
        }
    };

    ratatui::restore();
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Messages between the terminal front-end and the app orchestrator.
//
// The TUI sends `UserCommand` intents; the orchestrator answers with
// `UiUpdate` messages. Neither side shares mutable state with the other.

use raffle_core::{Participant, ParticipantId, Winner};

/// Intents forwarded from the TUI to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Raw text from the add-names editor, one name per line.
    AddNames(String),
    DeleteParticipant(ParticipantId),
    ClearParticipants,
    ClearWinners,
    Draw,
    /// Requested animation length in seconds. Clamped by the orchestrator.
    SetDrawDuration(u32),
    DismissWinner,
    Quit,
}

/// Everything the TUI needs to redraw its panels.
#[derive(Debug, Clone, PartialEq)]
pub struct AppSnapshot {
    /// Most recently added first.
    pub participants: Vec<Participant>,
    /// Most recently drawn first.
    pub winners: Vec<Winner>,
    pub drawing: bool,
    /// Winner awaiting dismissal.
    pub winner: Option<String>,
    pub draw_duration_secs: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A transient status-line message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: NoticeKind::Info,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: NoticeKind::Error,
        }
    }
}

/// Updates pushed from the orchestrator to the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    StateSnapshot(Box<AppSnapshot>),
    /// Name to show in the display panel. `None` shows the placeholder.
    Display(Option<String>),
    Notice(Notice),
    WinnerRevealed(String),
}

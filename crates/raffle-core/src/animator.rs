// Presentation animator: the cosmetic name cycling shown while idle and
// during a draw.
//
// Pure state. The orchestrator owns the timer and calls `tick` once per
// interval; the animator decides what to show and when the draw animation
// has run out. It holds its own copy of the names and its own random source
// so nothing it does can influence the draw engine's pick.

use std::time::Duration;

use rand::seq::IndexedRandom;
use rand::Rng;

/// Default period between idle frames.
pub const IDLE_INTERVAL: Duration = Duration::from_millis(500);

/// Default period between frames while a draw is animating.
pub const DRAW_INTERVAL: Duration = Duration::from_millis(60);

/// How long the draw animation runs, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DrawDuration(u32);

impl DrawDuration {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 30;
    pub const DEFAULT: u32 = 3;

    /// Clamp `secs` into `MIN..=MAX`.
    pub fn clamped(secs: u32) -> Self {
        Self(secs.clamp(Self::MIN, Self::MAX))
    }

    /// Parse user input. Anything that is not a whole number counts as the
    /// minimum; numbers are clamped.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.parse::<i64>() {
            Ok(n) => Self::clamped(n.clamp(0, i64::from(Self::MAX)) as u32),
            Err(_) => Self(Self::MIN),
        }
    }

    pub fn secs(self) -> u32 {
        self.0
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_secs(u64::from(self.0))
    }

    /// Number of frames that fit in this duration at `interval`, rounded
    /// down, never fewer than one.
    pub fn iterations(self, interval: Duration) -> u32 {
        let interval_ms = interval.as_millis().max(1);
        let total_ms = self.as_duration().as_millis();
        u32::try_from(total_ms / interval_ms).unwrap_or(u32::MAX).max(1)
    }

    pub fn increment(self) -> Self {
        Self::clamped(self.0.saturating_add(1))
    }

    pub fn decrement(self) -> Self {
        Self::clamped(self.0.saturating_sub(1))
    }
}

impl Default for DrawDuration {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Stopped,
    Idle,
    Draw { remaining: u32 },
}

/// What the display should do after a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Show this name.
    Show(String),
    /// Nothing to cycle through; show the placeholder.
    Empty,
    /// The draw animation just used its last frame. The name is the last
    /// one displayed, not the winner.
    Finished(String),
}

#[derive(Debug, Clone)]
pub struct Animator {
    mode: Mode,
    names: Vec<String>,
    idle_interval: Duration,
    draw_interval: Duration,
}

impl Default for Animator {
    fn default() -> Self {
        Self::new(IDLE_INTERVAL, DRAW_INTERVAL)
    }
}

impl Animator {
    pub fn new(idle_interval: Duration, draw_interval: Duration) -> Self {
        Self {
            mode: Mode::Stopped,
            names: Vec::new(),
            idle_interval,
            draw_interval,
        }
    }

    pub fn idle_interval(&self) -> Duration {
        self.idle_interval
    }

    pub fn draw_interval(&self) -> Duration {
        self.draw_interval
    }

    /// Start idle cycling over `names`. An empty pool leaves the animator
    /// stopped.
    pub fn start_idle(&mut self, names: Vec<String>) {
        self.names = names;
        self.mode = if self.names.is_empty() {
            Mode::Stopped
        } else {
            Mode::Idle
        };
    }

    /// Replace the names cycled while idle. Stops when the pool empties.
    /// Has no effect on a running draw, which keeps its snapshot.
    pub fn set_pool(&mut self, names: Vec<String>) {
        match self.mode {
            Mode::Draw { .. } => {}
            _ => self.start_idle(names),
        }
    }

    /// Start the draw animation over the pre-draw snapshot for `iterations`
    /// frames.
    pub fn start_draw(&mut self, snapshot: Vec<String>, iterations: u32) {
        self.names = snapshot;
        self.mode = Mode::Draw {
            remaining: iterations.max(1),
        };
    }

    pub fn stop(&mut self) {
        self.mode = Mode::Stopped;
    }

    pub fn is_running(&self) -> bool {
        self.mode != Mode::Stopped
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.mode, Mode::Draw { .. })
    }

    /// Period the timer should run at for the current mode, or `None` when
    /// stopped.
    pub fn interval(&self) -> Option<Duration> {
        match self.mode {
            Mode::Stopped => None,
            Mode::Idle => Some(self.idle_interval),
            Mode::Draw { .. } => Some(self.draw_interval),
        }
    }

    /// Advance one frame.
    ///
    /// Returns `None` when stopped. A draw that uses up its last frame
    /// reports `Finished` and stops the animator.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Frame> {
        match self.mode {
            Mode::Stopped => None,
            Mode::Idle => Some(match self.names.choose(rng) {
                Some(name) => Frame::Show(name.clone()),
                None => {
                    self.mode = Mode::Stopped;
                    Frame::Empty
                }
            }),
            Mode::Draw { remaining } => {
                let name = self.names.choose(rng).cloned();
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    self.mode = Mode::Stopped;
                    return Some(Frame::Finished(name.unwrap_or_default()));
                }
                self.mode = Mode::Draw { remaining };
                Some(match name {
                    Some(name) => Frame::Show(name),
                    None => Frame::Empty,
                })
            }
        }
    }
}

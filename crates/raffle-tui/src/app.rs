// Application state and orchestration logic.
//
// The event loop that turns user commands into raffle operations and drives
// the shuffle animation. Owns the store, the draw engine, the animator and
// its ticker, and pushes UI updates to the TUI render loop.

use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use raffle_core::animator::{Animator, DrawDuration, Frame};
use raffle_core::config::Config;
use raffle_core::draw::DrawEngine;
use raffle_core::store::Database;
use raffle_core::ticker::{Tick, Ticker};
use raffle_core::{ledger, pool, RaffleError};

use crate::protocol::{AppSnapshot, Notice, UiUpdate, UserCommand};

/// Settings key for the last chosen draw duration.
pub const DRAW_DURATION_KEY: &str = "draw_duration_secs";

/// Buffered ticks. A slow consumer only ever falls behind by a few frames.
const TICK_CHANNEL_CAPACITY: usize = 16;

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub engine: DrawEngine,
    pub animator: Animator,
    pub draw_duration: DrawDuration,
    ticker: Option<Ticker>,
    /// Incremented every time the ticker is replaced. Ticks from older
    /// generations are discarded in `handle_tick`.
    pub tick_generation: u64,
    tick_tx: mpsc::Sender<Tick>,
    tick_rx: Option<mpsc::Receiver<Tick>>,
    /// Picks winners. Never used for display.
    draw_rng: StdRng,
    /// Picks names for the animation. Never used for draws.
    display_rng: StdRng,
}

impl AppState {
    /// Create the state with OS-seeded random sources.
    pub fn new(config: Config, db: Database) -> anyhow::Result<Self> {
        Self::with_rngs(config, db, StdRng::from_os_rng(), StdRng::from_os_rng())
    }

    /// Create the state with explicit random sources, for deterministic tests.
    pub fn with_rngs(
        config: Config,
        db: Database,
        draw_rng: StdRng,
        display_rng: StdRng,
    ) -> anyhow::Result<Self> {
        let draw_duration = match db
            .load_setting(DRAW_DURATION_KEY)
            .context("failed to load saved draw duration")?
            .and_then(|v| v.as_u64())
        {
            Some(secs) => DrawDuration::clamped(u32::try_from(secs).unwrap_or(u32::MAX)),
            None => config.draw.duration(),
        };

        let animator = Animator::new(config.draw.idle_interval(), config.draw.draw_interval());
        let (tick_tx, tick_rx) = mpsc::channel(TICK_CHANNEL_CAPACITY);

        Ok(AppState {
            config,
            db,
            engine: DrawEngine::new(),
            animator,
            draw_duration,
            ticker: None,
            tick_generation: 0,
            tick_tx,
            tick_rx: Some(tick_rx),
            draw_rng,
            display_rng,
        })
    }

    /// Build a full snapshot for the TUI from the store and engine.
    pub fn snapshot(&self) -> Result<AppSnapshot, RaffleError> {
        Ok(AppSnapshot {
            participants: pool::list(&self.db)?,
            winners: ledger::history(&self.db)?,
            drawing: self.engine.is_drawing(),
            winner: self.engine.pending_winner().map(|w| w.name.clone()),
            draw_duration_secs: self.draw_duration.secs(),
        })
    }

    pub fn ticker_running(&self) -> bool {
        self.ticker.as_ref().is_some_and(Ticker::is_running)
    }

    /// Make the ticker match what the animator needs: stopped, or running at
    /// the animator's current interval. Replacing it bumps the generation.
    fn sync_ticker(&mut self) {
        let wanted = self.animator.interval();
        let current = self.ticker.as_ref().map(Ticker::period);
        if wanted == current && (wanted.is_none() || self.ticker_running()) {
            return;
        }

        if let Some(mut old) = self.ticker.take() {
            old.stop();
        }
        self.tick_generation += 1;

        if let Some(period) = wanted {
            debug!("Ticker started at {:?} (gen: {})", period, self.tick_generation);
            self.ticker = Some(Ticker::spawn(period, self.tick_generation, self.tick_tx.clone()));
        }
    }

    fn stop_ticker(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.stop();
        }
        self.tick_generation += 1;
    }

    /// Point idle cycling at the current pool. No-op while a draw animates
    /// or a winner is on screen.
    fn refresh_idle(&mut self) -> Result<bool, RaffleError> {
        if self.engine.is_drawing() || self.engine.pending_winner().is_some() {
            return Ok(false);
        }
        let names: Vec<String> = pool::list(&self.db)?.into_iter().map(|p| p.name).collect();
        let empty = names.is_empty();
        self.animator.set_pool(names);
        self.sync_ticker();
        Ok(empty)
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens on two channels using `tokio::select!`:
/// 1. User commands from the TUI
/// 2. Animation ticks from the current ticker
///
/// Recoverable raffle errors become notices. A storage failure ends the loop
/// with an error, since the pool and ledger may no longer agree.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    let mut tick_rx = state
        .tick_rx
        .take()
        .context("event loop already started for this state")?;

    state.engine.recover(&state.db)?;
    push_snapshot(&state, &ui_tx).await?;
    if state.refresh_idle()? {
        let _ = ui_tx.send(UiUpdate::Display(None)).await;
    }

    loop {
        tokio::select! {
            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        let result = handle_user_command(&mut state, cmd, &ui_tx).await;
                        surface(result, &ui_tx).await?;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            // --- Animation ticks ---
            Some(tick) = tick_rx.recv() => {
                let result = handle_tick(&mut state, tick, &ui_tx).await;
                surface(result, &ui_tx).await?;
            }
        }
    }

    state.stop_ticker();
    info!("Application event loop exiting");
    Ok(())
}

/// Turn a recoverable error into a notice; propagate the rest.
async fn surface(
    result: Result<(), RaffleError>,
    ui_tx: &mpsc::Sender<UiUpdate>,
) -> anyhow::Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.is_recoverable() => {
            warn!("{}", e);
            let _ = ui_tx.send(UiUpdate::Notice(Notice::error(e.to_string()))).await;
            Ok(())
        }
        Err(e) => Err(anyhow::Error::new(e).context("raffle storage failed")),
    }
}

async fn push_snapshot(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) -> Result<(), RaffleError> {
    let snapshot = state.snapshot()?;
    let _ = ui_tx.send(UiUpdate::StateSnapshot(Box::new(snapshot))).await;
    Ok(())
}

/// Resync idle cycling after the pool changed, then push a snapshot.
async fn pool_changed(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) -> Result<(), RaffleError> {
    if state.refresh_idle()? {
        let _ = ui_tx.send(UiUpdate::Display(None)).await;
    }
    push_snapshot(state, ui_tx).await
}

/// Dispatch a single user command.
async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) -> Result<(), RaffleError> {
    match cmd {
        UserCommand::AddNames(text) => {
            let outcome = pool::add_names(&state.db, &text)?;
            let _ = ui_tx.send(UiUpdate::Notice(Notice::info(outcome.message()))).await;
            pool_changed(state, ui_tx).await
        }
        UserCommand::DeleteParticipant(id) => {
            pool::remove(&state.db, id)?;
            pool_changed(state, ui_tx).await
        }
        UserCommand::ClearParticipants => {
            let removed = pool::clear_all(&state.db)?;
            let _ = ui_tx
                .send(UiUpdate::Notice(Notice::info(format!(
                    "Removed {removed} {}",
                    pool::plural(removed, "participant")
                ))))
                .await;
            pool_changed(state, ui_tx).await
        }
        UserCommand::ClearWinners => {
            let removed = ledger::clear(&state.db)?;
            let _ = ui_tx
                .send(UiUpdate::Notice(Notice::info(format!(
                    "Cleared {removed} {}",
                    pool::plural(removed, "winner")
                ))))
                .await;
            pool_changed(state, ui_tx).await
        }
        UserCommand::Draw => start_draw(state, ui_tx).await,
        UserCommand::SetDrawDuration(secs) => {
            state.draw_duration = DrawDuration::clamped(secs);
            state
                .db
                .save_setting(DRAW_DURATION_KEY, &serde_json::json!(state.draw_duration.secs()))
                .map_err(RaffleError::Storage)?;
            info!("Draw duration set to {}s", state.draw_duration.secs());
            push_snapshot(state, ui_tx).await
        }
        UserCommand::DismissWinner => {
            if state.engine.acknowledge().is_some() {
                pool_changed(state, ui_tx).await?;
            }
            Ok(())
        }
        UserCommand::Quit => Ok(()),
    }
}

/// Begin a draw and switch the animator to the fast shuffle.
async fn start_draw(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) -> Result<(), RaffleError> {
    let had_winner = state.engine.pending_winner().is_some();
    let begun: Result<Vec<String>, RaffleError> = state
        .engine
        .begin(&state.db)
        .map(|snapshot| snapshot.iter().map(|p| p.name.clone()).collect());
    let snapshot = match begun {
        Ok(snapshot) => snapshot,
        Err(e) => {
            // The winner was dismissed even though no draw started.
            if had_winner {
                pool_changed(state, ui_tx).await?;
            }
            return Err(e);
        }
    };

    let iterations = state.draw_duration.iterations(state.animator.draw_interval());
    info!(
        "Animating draw over {} names for {} frames",
        snapshot.len(),
        iterations
    );
    state.animator.start_draw(snapshot, iterations);
    state.sync_ticker();
    push_snapshot(state, ui_tx).await
}

/// Advance the animation by one frame. Settles the draw when the shuffle
/// runs out.
async fn handle_tick(
    state: &mut AppState,
    tick: Tick,
    ui_tx: &mpsc::Sender<UiUpdate>,
) -> Result<(), RaffleError> {
    if tick.generation != state.tick_generation {
        debug!(
            "Discarding stale tick (gen: {}, current: {})",
            tick.generation, state.tick_generation
        );
        return Ok(());
    }

    match state.animator.tick(&mut state.display_rng) {
        None => Ok(()),
        Some(Frame::Show(name)) => {
            let _ = ui_tx.send(UiUpdate::Display(Some(name))).await;
            Ok(())
        }
        Some(Frame::Empty) => {
            state.sync_ticker();
            let _ = ui_tx.send(UiUpdate::Display(None)).await;
            Ok(())
        }
        Some(Frame::Finished(_)) => {
            state.sync_ticker();
            finish_draw(state, ui_tx).await
        }
    }
}

async fn finish_draw(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) -> Result<(), RaffleError> {
    match state.engine.settle(&state.db, &mut state.draw_rng) {
        Ok(winner) => {
            let _ = ui_tx.send(UiUpdate::Display(Some(winner.name.clone()))).await;
            let _ = ui_tx.send(UiUpdate::WinnerRevealed(winner.name)).await;
            push_snapshot(state, ui_tx).await
        }
        Err(e) => {
            // The engine is back to Idle; let the pool resume cycling before
            // reporting.
            if e.is_recoverable() {
                pool_changed(state, ui_tx).await?;
            }
            Err(e)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

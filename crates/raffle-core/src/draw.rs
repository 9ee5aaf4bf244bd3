// Draw engine: authoritative winner selection and the atomic move from the
// pool into the ledger.
//
// Phases:
//
//   Idle --begin--> Drawing --settle--> Settled --acknowledge--> Idle
//                      |                   |
//                      +--error--> Idle    +--begin--> Drawing
//
// The engine never looks at what the animator displays. Selection happens in
// `settle`, against a fresh snapshot of the store, with a caller-supplied
// random source.

use rand::Rng;
use tracing::{info, warn};

use crate::error::RaffleError;
use crate::model::{Participant, Winner};
use crate::store::RaffleStore;

/// Pick an index uniformly at random from `[0, len)`.
///
/// Uses `rand`'s range sampling, which rejects the biased tail instead of
/// reducing a raw integer modulo `len`. Returns `None` for an empty range.
pub fn select_winner<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(rng.random_range(0..len))
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DrawPhase {
    #[default]
    Idle,
    /// A draw has started. `snapshot` is the pool as it was at that moment,
    /// for the animator to cycle through.
    Drawing { snapshot: Vec<Participant> },
    /// The draw committed. Waiting for the caller to acknowledge `winner`.
    Settled { winner: Winner },
}

#[derive(Debug, Default)]
pub struct DrawEngine {
    phase: DrawPhase,
}

impl DrawEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &DrawPhase {
        &self.phase
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.phase, DrawPhase::Drawing { .. })
    }

    /// The committed winner awaiting acknowledgement, if any.
    pub fn pending_winner(&self) -> Option<&Winner> {
        match &self.phase {
            DrawPhase::Settled { winner } => Some(winner),
            _ => None,
        }
    }

    /// Finish any draw a previous session left half-committed. Call once at
    /// startup.
    pub fn recover<S: RaffleStore + ?Sized>(&self, store: &S) -> Result<usize, RaffleError> {
        let repaired = store.reconcile_draws().map_err(RaffleError::Storage)?;
        if repaired > 0 {
            warn!("Recovered {} interrupted draw(s) from a previous session", repaired);
        }
        Ok(repaired)
    }

    /// Start a draw: Idle (or Settled) -> Drawing.
    ///
    /// Returns the pre-draw snapshot for display purposes. A winner still
    /// awaiting acknowledgement is acknowledged implicitly, even when the
    /// draw then fails to start.
    pub fn begin<S: RaffleStore + ?Sized>(&mut self, store: &S) -> Result<&[Participant], RaffleError> {
        if self.is_drawing() {
            return Err(RaffleError::DrawInProgress);
        }
        self.acknowledge();

        let snapshot = store.list_participants().map_err(RaffleError::Storage)?;
        if snapshot.is_empty() {
            return Err(RaffleError::EmptyPool);
        }

        info!("Draw started with {} participant(s)", snapshot.len());
        self.phase = DrawPhase::Drawing { snapshot };
        Ok(self.snapshot())
    }

    /// The pool as it was when the current draw began. Empty outside a draw.
    pub fn snapshot(&self) -> &[Participant] {
        match &self.phase {
            DrawPhase::Drawing { snapshot } => snapshot,
            _ => &[],
        }
    }

    /// Pick the winner and commit it: Drawing -> Settled.
    ///
    /// Re-reads the pool so deletions made while the animation ran are
    /// respected, then selects uniformly with `rng` and moves the winner into
    /// the ledger through [`RaffleStore::commit_draw`]. On any error the
    /// engine returns to Idle and nothing is reported as drawn.
    pub fn settle<S, R>(&mut self, store: &S, rng: &mut R) -> Result<Winner, RaffleError>
    where
        S: RaffleStore + ?Sized,
        R: Rng + ?Sized,
    {
        if !self.is_drawing() {
            warn!("settle called outside of a draw");
        }
        self.phase = DrawPhase::Idle;

        // A previous attempt may have written the ledger but not removed the
        // participant. Finish it before picking, so the same person cannot
        // win twice.
        store.reconcile_draws().map_err(RaffleError::Storage)?;

        let pool = store.list_participants().map_err(RaffleError::Storage)?;
        let index = select_winner(pool.len(), rng).ok_or(RaffleError::EmptyPool)?;
        let chosen = &pool[index];

        let winner = store
            .commit_draw(chosen)
            .map_err(RaffleError::Storage)?
            .ok_or(RaffleError::NotFound { id: chosen.id })?;

        info!(
            "Drew {} ({}) from a pool of {}",
            winner.name,
            chosen.id,
            pool.len()
        );
        self.phase = DrawPhase::Settled {
            winner: winner.clone(),
        };
        Ok(winner)
    }

    /// Dismiss the revealed winner: Settled -> Idle.
    pub fn acknowledge(&mut self) -> Option<Winner> {
        match std::mem::take(&mut self.phase) {
            DrawPhase::Settled { winner } => Some(winner),
            other => {
                self.phase = other;
                None
            }
        }
    }

    /// Run a whole draw with no animation.
    pub fn draw<S, R>(&mut self, store: &S, rng: &mut R) -> Result<Winner, RaffleError>
    where
        S: RaffleStore + ?Sized,
        R: Rng + ?Sized,
    {
        self.begin(store)?;
        self.settle(store, rng)
    }
}

// Persistence collaborator: the boundary between the raffle core and its
// durable backing store.

pub mod memory;
pub mod sqlite;

use std::collections::HashSet;

use anyhow::Result;
use tracing::warn;

use crate::model::{Participant, ParticipantId, Winner};

pub use memory::MemoryStore;
pub use sqlite::Database;

/// Durable storage for the participant pool and the winner ledger.
///
/// Every method is individually atomic. Cross-call atomicity for a draw is
/// requested through [`RaffleStore::commit_draw`]; stores with transactions
/// override it, everything else gets the compensating order below.
pub trait RaffleStore {
    /// Active participants, most recently created first.
    fn list_participants(&self) -> Result<Vec<Participant>>;

    /// Insert every name as a new participant. All or nothing. Returns the
    /// number inserted.
    fn insert_participants(&self, names: &[String]) -> Result<usize>;

    /// Returns `false` if no participant had this id.
    fn delete_participant(&self, id: ParticipantId) -> Result<bool>;

    /// Returns the number of participants removed.
    fn delete_all_participants(&self) -> Result<usize>;

    /// Ledger entries, most recently drawn first.
    fn list_winners(&self) -> Result<Vec<Winner>>;

    /// Append a ledger entry stamped with the current time.
    fn insert_winner(&self, name: &str, participant_id: Option<ParticipantId>) -> Result<Winner>;

    /// Returns `false` if no ledger entry had this id.
    fn delete_winner(&self, id: i64) -> Result<bool>;

    /// Returns the number of ledger entries removed.
    fn clear_winners(&self) -> Result<usize>;

    /// Move `participant` from the pool into the ledger.
    ///
    /// Default order: ledger write first, then removal. A failure between
    /// the two leaves a ledger entry whose participant is still pooled,
    /// which [`RaffleStore::reconcile_draws`] detects and repairs. The
    /// reverse order could lose a participant with no record of the draw.
    ///
    /// Returns `None` when the participant was no longer in the pool and
    /// nothing was written.
    fn commit_draw(&self, participant: &Participant) -> Result<Option<Winner>> {
        let winner = self.insert_winner(&participant.name, Some(participant.id))?;
        if !self.delete_participant(participant.id)? {
            warn!(
                "Participant {} was already gone when the draw committed; ledger entry withdrawn",
                participant.id
            );
            self.delete_winner(winner.id)?;
            return Ok(None);
        }
        Ok(Some(winner))
    }

    /// Finish interrupted draws: remove every participant that a ledger
    /// entry says was already drawn. Returns the number repaired.
    fn reconcile_draws(&self) -> Result<usize> {
        let drawn: HashSet<ParticipantId> = self
            .list_winners()?
            .into_iter()
            .filter_map(|w| w.participant_id)
            .collect();
        if drawn.is_empty() {
            return Ok(0);
        }

        let mut repaired = 0;
        for participant in self.list_participants()? {
            if drawn.contains(&participant.id) && self.delete_participant(participant.id)? {
                warn!(
                    "Reconciled interrupted draw: removed {} ({})",
                    participant.name, participant.id
                );
                repaired += 1;
            }
        }
        Ok(repaired)
    }
}

// In-process store with no durability.

use std::sync::{Mutex, MutexGuard};

use anyhow::Result;
use chrono::Utc;

use super::RaffleStore;
use crate::model::{Participant, ParticipantId, Winner};

#[derive(Debug, Default)]
struct Inner {
    /// Insertion order (oldest first).
    participants: Vec<Participant>,
    /// Insertion order (oldest first).
    winners: Vec<Winner>,
    next_participant_id: i64,
    next_winner_id: i64,
}

/// Mutex-guarded in-memory store. Ids increase monotonically and are never
/// reused. Uses the default (non-transactional) draw commit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store mutex poisoned")
    }
}

impl RaffleStore for MemoryStore {
    fn list_participants(&self) -> Result<Vec<Participant>> {
        Ok(self.inner().participants.iter().rev().cloned().collect())
    }

    fn insert_participants(&self, names: &[String]) -> Result<usize> {
        let mut inner = self.inner();
        let created_at = Utc::now();
        for name in names {
            inner.next_participant_id += 1;
            let id = ParticipantId(inner.next_participant_id);
            inner.participants.push(Participant {
                id,
                name: name.clone(),
                created_at,
            });
        }
        Ok(names.len())
    }

    fn delete_participant(&self, id: ParticipantId) -> Result<bool> {
        let mut inner = self.inner();
        let before = inner.participants.len();
        inner.participants.retain(|p| p.id != id);
        Ok(inner.participants.len() < before)
    }

    fn delete_all_participants(&self) -> Result<usize> {
        let mut inner = self.inner();
        let removed = inner.participants.len();
        inner.participants.clear();
        Ok(removed)
    }

    fn list_winners(&self) -> Result<Vec<Winner>> {
        Ok(self.inner().winners.iter().rev().cloned().collect())
    }

    fn insert_winner(&self, name: &str, participant_id: Option<ParticipantId>) -> Result<Winner> {
        let mut inner = self.inner();
        inner.next_winner_id += 1;
        let winner = Winner {
            id: inner.next_winner_id,
            name: name.to_string(),
            drawn_at: Utc::now(),
            participant_id,
        };
        inner.winners.push(winner.clone());
        Ok(winner)
    }

    fn delete_winner(&self, id: i64) -> Result<bool> {
        let mut inner = self.inner();
        let before = inner.winners.len();
        inner.winners.retain(|w| w.id != id);
        Ok(inner.winners.len() < before)
    }

    fn clear_winners(&self) -> Result<usize> {
        let mut inner = self.inner();
        let removed = inner.winners.len();
        inner.winners.clear();
        Ok(removed)
    }
}

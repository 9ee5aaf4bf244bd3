// Participant pool operations: the add pipeline, removal, and search.

use tracing::info;

use crate::error::RaffleError;
use crate::model::{Participant, ParticipantId};
use crate::normalize::normalize_names;
use crate::resolve::{name_key, resolve_duplicates};
use crate::store::RaffleStore;

/// Outcome of a successful add.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOutcome {
    pub added: usize,
    pub skipped: usize,
}

impl AddOutcome {
    /// User-facing summary, e.g. "Added 3 names. 2 duplicates skipped."
    pub fn message(&self) -> String {
        let added = format!("Added {} {}.", self.added, plural(self.added, "name"));
        if self.skipped > 0 {
            format!(
                "{added} {} {} skipped.",
                self.skipped,
                plural(self.skipped, "duplicate")
            )
        } else {
            added
        }
    }
}

/// `word` with an "s" unless `count` is exactly one.
pub fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

/// Parse `raw` (one name per line), drop names already in the pool or
/// repeated within the batch, and insert the rest.
///
/// The duplicate check reads the pool and then writes it in two separate
/// store calls. Two concurrent callers adding the same new name can both
/// pass the check; a single caller per session is assumed.
pub fn add_names<S: RaffleStore + ?Sized>(store: &S, raw: &str) -> Result<AddOutcome, RaffleError> {
    let candidates = normalize_names(raw);
    if candidates.is_empty() {
        return Err(RaffleError::EmptyInput);
    }

    let existing = store.list_participants().map_err(RaffleError::Storage)?;
    let resolution = resolve_duplicates(&candidates, existing.iter().map(|p| p.name.as_str()));
    if resolution.to_insert.is_empty() {
        return Err(RaffleError::AllDuplicates {
            submitted: candidates.len(),
        });
    }

    let added = store
        .insert_participants(&resolution.to_insert)
        .map_err(RaffleError::Storage)?;
    info!(
        "Added {} participant(s), skipped {} duplicate(s)",
        added, resolution.skipped
    );

    Ok(AddOutcome {
        added,
        skipped: resolution.skipped,
    })
}

/// Remove one participant. `NotFound` if the id is not in the pool.
pub fn remove<S: RaffleStore + ?Sized>(store: &S, id: ParticipantId) -> Result<(), RaffleError> {
    if store.delete_participant(id).map_err(RaffleError::Storage)? {
        info!("Removed participant {}", id);
        Ok(())
    } else {
        Err(RaffleError::NotFound { id })
    }
}

/// Remove every participant. Returns how many were removed; 0 on an
/// already-empty pool.
pub fn clear_all<S: RaffleStore + ?Sized>(store: &S) -> Result<usize, RaffleError> {
    let removed = store
        .delete_all_participants()
        .map_err(RaffleError::Storage)?;
    info!("Cleared {} participant(s)", removed);
    Ok(removed)
}

/// Active participants, most recently created first.
pub fn list<S: RaffleStore + ?Sized>(store: &S) -> Result<Vec<Participant>, RaffleError> {
    store.list_participants().map_err(RaffleError::Storage)
}

/// Case-insensitive substring search. An empty query matches everyone.
pub fn filter_by_name<'a>(participants: &'a [Participant], query: &str) -> Vec<&'a Participant> {
    let needle = name_key(query.trim());
    participants
        .iter()
        .filter(|p| needle.is_empty() || name_key(&p.name).contains(&needle))
        .collect()
}

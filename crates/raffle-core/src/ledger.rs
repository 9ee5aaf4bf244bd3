// Winner ledger: the append-only history of draws.

use tracing::info;

use crate::error::RaffleError;
use crate::model::Winner;
use crate::store::RaffleStore;

/// Past winners, most recently drawn first.
pub fn history<S: RaffleStore + ?Sized>(store: &S) -> Result<Vec<Winner>, RaffleError> {
    store.list_winners().map_err(RaffleError::Storage)
}

/// Empty the ledger. Interrupted draws are finished first, since the ledger
/// entries are the only record of which participants they removed.
pub fn clear<S: RaffleStore + ?Sized>(store: &S) -> Result<usize, RaffleError> {
    store.reconcile_draws().map_err(RaffleError::Storage)?;
    let removed = store.clear_winners().map_err(RaffleError::Storage)?;
    info!("Cleared {} winner(s) from the ledger", removed);
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool;
    use crate::store::MemoryStore;

    #[test]
    fn clear_finishes_interrupted_draws_before_emptying() {
        let store = MemoryStore::new();
        pool::add_names(&store, "Alice\nBob").unwrap();
        let bob = pool::list(&store).unwrap().remove(0);
        store.insert_winner(&bob.name, Some(bob.id)).unwrap();

        assert_eq!(clear(&store).unwrap(), 1);
        assert!(history(&store).unwrap().is_empty());

        let remaining: Vec<String> = pool::list(&store)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(remaining, vec!["Alice"]);
    }

    #[test]
    fn history_survives_participant_deletion() {
        let store = MemoryStore::new();
        pool::add_names(&store, "Alice").unwrap();
        let alice = pool::list(&store).unwrap().remove(0);
        store.commit_draw(&alice).unwrap();
        pool::clear_all(&store).unwrap();

        let winners = history(&store).unwrap();
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].name, "Alice");
    }
}

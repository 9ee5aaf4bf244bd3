// Integration tests for the raffle engine.
//
// These run the add pipeline, the draw engine and the winner ledger together
// through the public API, against both store implementations.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;

use raffle_core::draw::DrawEngine;
use raffle_core::store::{Database, MemoryStore};
use raffle_core::{ledger, pool, RaffleError, RaffleStore};

// ===========================================================================
// Test helpers
// ===========================================================================

fn sqlite() -> Database {
    Database::open(":memory:").expect("in-memory db")
}

fn pool_names<S: RaffleStore + ?Sized>(store: &S) -> Vec<String> {
    pool::list(store)
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect()
}

/// Run the same scenario against both stores.
fn for_each_store(scenario: impl Fn(&dyn RaffleStore)) {
    scenario(&MemoryStore::new());
    scenario(&sqlite());
}

// ===========================================================================
// Add pipeline
// ===========================================================================

#[test]
fn distinct_batch_inserts_every_unique_name() {
    for_each_store(|store| {
        pool::add_names(store, "Zed").unwrap();
        let before = pool::list(store).unwrap().len();

        let outcome = pool::add_names(store, "Alice\nBob\n  bob \nCarol\n\n").unwrap();
        assert_eq!(outcome.added, 3);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(pool::list(store).unwrap().len(), before + 3);
    });
}

#[test]
fn casing_variants_collapse_to_first_seen() {
    for_each_store(|store| {
        let outcome = pool::add_names(store, "Alice\nalice\nALICE").unwrap();
        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.skipped, 2);
        assert_eq!(pool_names(store), vec!["Alice"]);
    });
}

#[test]
fn resubmitting_existing_names_is_all_duplicates() {
    for_each_store(|store| {
        pool::add_names(store, "Alice\nBob").unwrap();
        let err = pool::add_names(store, "ALICE\nbob").unwrap_err();
        assert!(matches!(err, RaffleError::AllDuplicates { submitted: 2 }));
        assert_eq!(pool::list(store).unwrap().len(), 2);
    });
}

#[test]
fn blank_input_is_empty_input() {
    for_each_store(|store| {
        let err = pool::add_names(store, "  \n\n\t\n").unwrap_err();
        assert!(matches!(err, RaffleError::EmptyInput));
    });
}

#[test]
fn clear_all_twice_is_a_no_op_the_second_time() {
    for_each_store(|store| {
        pool::add_names(store, "A\nB\nC").unwrap();
        assert_eq!(pool::clear_all(store).unwrap(), 3);
        assert_eq!(pool::clear_all(store).unwrap(), 0);
        assert!(pool::list(store).unwrap().is_empty());
    });
}

// ===========================================================================
// Draws
// ===========================================================================

#[test]
fn draw_moves_one_name_from_pool_to_ledger() {
    for_each_store(|store| {
        pool::add_names(store, "Alice\nBob\nCarol").unwrap();
        let mut engine = DrawEngine::new();
        let mut rng = StdRng::seed_from_u64(11);

        let winner = engine.draw(store, &mut rng).unwrap();
        let remaining = pool_names(store);
        assert_eq!(remaining.len(), 2);
        assert!(!remaining.contains(&winner.name));

        let history = ledger::history(store).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].name, winner.name);
    });
}

#[test]
fn empty_pool_draw_leaves_ledger_unchanged() {
    for_each_store(|store| {
        pool::add_names(store, "Alice").unwrap();
        let mut engine = DrawEngine::new();
        let mut rng = StdRng::seed_from_u64(12);
        engine.draw(store, &mut rng).unwrap();
        engine.acknowledge();

        let err = engine.draw(store, &mut rng).unwrap_err();
        assert!(matches!(err, RaffleError::EmptyPool));
        assert_eq!(ledger::history(store).unwrap().len(), 1);
    });
}

#[test]
fn drawn_names_survive_verbatim_in_ledger() {
    for_each_store(|store| {
        let submitted = ["Zoë Ångström", "O'Brien", "李雷", "Mary-Jane  Watson"];
        pool::add_names(store, &submitted.join("\n")).unwrap();

        let mut engine = DrawEngine::new();
        let mut rng = StdRng::seed_from_u64(13);
        for _ in 0..submitted.len() {
            engine.draw(store, &mut rng).unwrap();
        }
        assert!(pool::list(store).unwrap().is_empty());

        let mut recorded: Vec<String> = ledger::history(store)
            .unwrap()
            .into_iter()
            .map(|w| w.name)
            .collect();
        recorded.sort();
        let mut expected: Vec<String> = submitted.iter().map(|s| s.to_string()).collect();
        expected.sort();
        assert_eq!(recorded, expected);
    });
}

#[test]
fn each_participant_wins_about_one_in_n() {
    let n = 4;
    let trials = 4_000;
    let mut rng = StdRng::seed_from_u64(2024);
    let mut wins: HashMap<String, usize> = HashMap::new();

    for _ in 0..trials {
        let store = MemoryStore::new();
        pool::add_names(&store, "North\nEast\nSouth\nWest").unwrap();
        let winner = DrawEngine::new().draw(&store, &mut rng).unwrap();
        *wins.entry(winner.name).or_default() += 1;
    }

    assert_eq!(wins.len(), n);
    let expected = trials as f64 / n as f64;
    for (name, count) in &wins {
        let deviation = (*count as f64 - expected).abs() / expected;
        assert!(
            deviation < 0.1,
            "{name} won {count} times, expected ~{expected}"
        );
    }
}

#[test]
fn ledger_clear_keeps_pool_and_history_is_newest_first() {
    let store = sqlite();
    pool::add_names(&store, "A\nB\nC").unwrap();
    let mut engine = DrawEngine::new();
    let mut rng = StdRng::seed_from_u64(14);
    let first = engine.draw(&store, &mut rng).unwrap();
    let second = engine.draw(&store, &mut rng).unwrap();

    let history = ledger::history(&store).unwrap();
    assert_eq!(history[0].name, second.name);
    assert_eq!(history[1].name, first.name);

    assert_eq!(ledger::clear(&store).unwrap(), 2);
    assert!(ledger::history(&store).unwrap().is_empty());
    assert_eq!(pool::list(&store).unwrap().len(), 1);
}

#[test]
fn a_drawn_name_can_be_added_again() {
    for_each_store(|store| {
        pool::add_names(store, "Alice").unwrap();
        DrawEngine::new()
            .draw(store, &mut StdRng::seed_from_u64(15))
            .unwrap();

        let outcome = pool::add_names(store, "alice").unwrap();
        assert_eq!(outcome.added, 1);
        assert_eq!(pool_names(store), vec!["alice"]);
    });
}

// ===========================================================================
// Persistence across reopen
// ===========================================================================

#[test]
fn file_database_keeps_pool_and_ledger_across_reopen() {
    let dir = std::env::temp_dir().join("raffle_integration_reopen");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("raffle.db");
    let path = path.to_str().unwrap();

    let drawn = {
        let db = Database::open(path).unwrap();
        pool::add_names(&db, "Alice\nBob\nCarol").unwrap();
        DrawEngine::new()
            .draw(&db, &mut StdRng::seed_from_u64(16))
            .unwrap()
            .name
    };

    let db = Database::open(path).unwrap();
    let engine = DrawEngine::new();
    assert_eq!(engine.recover(&db).unwrap(), 0);
    let remaining = pool_names(&db);
    assert_eq!(remaining.len(), 2);
    assert!(!remaining.contains(&drawn));
    assert_eq!(ledger::history(&db).unwrap()[0].name, drawn);

    drop(db);
    let _ = std::fs::remove_dir_all(&dir);
}

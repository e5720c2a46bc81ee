//! Tests for best score persistence
//!
//! File-backed tests share one path in the temp dir and run serially.

use std::path::PathBuf;

use serial_test::serial;
use snake::error::StoreError;
use snake::game::{test_helpers::*, Direction, GameEvent};
use snake::store::{BestScore, BestScoreStore, FileStore, MemoryStore};

fn shared_path() -> PathBuf {
    std::env::temp_dir().join("snake_best_score_test.txt")
}

fn fresh_file_store() -> FileStore {
    let path = shared_path();
    let _ = std::fs::remove_file(&path);
    FileStore::new(path)
}

// ============================================================================
// File Store Tests
// ============================================================================

mod file_store {
    use super::*;

    #[test]
    #[serial]
    fn missing_file_loads_as_zero() {
        let store = fresh_file_store();
        assert_eq!(store.load().unwrap(), 0);
    }

    #[test]
    #[serial]
    fn saved_score_loads_back() {
        let mut store = fresh_file_store();

        store.save(17).unwrap();

        assert_eq!(FileStore::new(shared_path()).load().unwrap(), 17);
    }

    #[test]
    #[serial]
    fn surrounding_whitespace_is_ignored() {
        let store = fresh_file_store();
        std::fs::write(store.path(), "  42\n").unwrap();

        assert_eq!(store.load().unwrap(), 42);
    }

    #[test]
    #[serial]
    fn garbage_is_reported_as_corrupt() {
        let store = fresh_file_store();
        std::fs::write(store.path(), "lots").unwrap();

        assert!(matches!(store.load(), Err(StoreError::Corrupt(s)) if s == "lots"));
    }

    #[test]
    #[serial]
    fn corrupt_file_starts_best_at_zero() {
        let store = fresh_file_store();
        std::fs::write(store.path(), "-3").unwrap();

        let best = BestScore::load(store);

        assert_eq!(best.value(), 0);
    }

    #[test]
    #[serial]
    fn best_score_survives_sessions() {
        let mut first = BestScore::load(fresh_file_store());
        first.record(9);

        let second = BestScore::load(FileStore::new(shared_path()));

        assert_eq!(second.value(), 9);
    }
}

// ============================================================================
// Best Score Tests
// ============================================================================

mod best_score {
    use super::*;

    #[test]
    fn loads_stored_value() {
        let best = BestScore::load(MemoryStore::with_score(12));
        assert_eq!(best.value(), 12);
    }

    #[test]
    fn higher_score_is_saved() {
        let mut best = BestScore::load(MemoryStore::with_score(3));

        assert!(best.record(5));

        assert_eq!(best.value(), 5);
        assert_eq!(best.store().stored(), Some(5));
        assert_eq!(best.store().saves, 1);
    }

    #[test]
    fn equal_or_lower_score_is_not_saved() {
        let mut best = BestScore::load(MemoryStore::with_score(5));

        assert!(!best.record(5));
        assert!(!best.record(2));

        assert_eq!(best.value(), 5);
        assert_eq!(best.store().saves, 0);
    }

    #[test]
    fn best_never_decreases() {
        let mut best = BestScore::load(MemoryStore::new());

        for score in [4, 1, 7, 0, 6, 7, 8] {
            let before = best.value();
            best.record(score);
            assert!(best.value() >= before);
        }

        assert_eq!(best.value(), 8);
        assert_eq!(best.store().saves, 3);
    }

    #[test]
    fn game_over_event_feeds_best_score() {
        let mut best = BestScore::load(MemoryStore::with_score(0));
        let mut game = game_with(
            10,
            &[(5, 5), (4, 5), (4, 4), (5, 4), (6, 4)],
            Direction::Right,
            &[(6, 5), (0, 0)],
        );

        game.tick();
        game.set_direction(Direction::Up);
        game.tick();

        for event in game.take_events() {
            if let GameEvent::GameOver { score } = event {
                best.record(score);
            }
        }

        assert!(game.is_game_over());
        assert_eq!(best.value(), 1);
        assert_eq!(best.store().stored(), Some(1));
    }
}

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use tempfile::tempdir;

use file_roulette::seen::SeenStore;
use file_roulette::{
    AppConfig, DedupMode, Error, SelectionRequest, SessionEngine, SilentReporter,
};

fn engine_for(root: &Path, config: &AppConfig) -> SessionEngine {
    SessionEngine::new(SeenStore::new(config.seen_path(root)))
}

fn request(root: &Path, count: usize, dedup: DedupMode, seed: Option<u64>) -> SelectionRequest {
    SelectionRequest {
        root: root.to_path_buf(),
        count,
        dedup,
        seed,
        config: AppConfig::default(),
    }
}

fn file_names(picks: &[file_roulette::selector::Pick]) -> HashSet<String> {
    picks
        .iter()
        .map(|p| {
            p.candidate
                .path
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect()
}

#[test]
fn test_default_filter_scenario() {
    // Tree {a.txt, b.tmp, .hidden, c.jpg}: the default filter drops b.tmp and
    // .hidden, so count=2 with dedup off must return exactly {a.txt, c.jpg}.
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "aaa").unwrap();
    fs::write(dir.path().join("b.tmp"), "bbb").unwrap();
    fs::write(dir.path().join(".hidden"), "hhh").unwrap();
    fs::write(dir.path().join("c.jpg"), "ccc").unwrap();

    let req = request(dir.path(), 2, DedupMode::Disabled, Some(1));
    let engine = engine_for(dir.path(), &req.config);
    let outcome = engine.run(&req, &SilentReporter).unwrap();

    assert_eq!(outcome.total_candidates, 2);
    assert!(!outcome.shortfall);
    let expected: HashSet<String> = ["a.txt", "c.jpg"].iter().map(|s| s.to_string()).collect();
    assert_eq!(file_names(&outcome.picks), expected);
}

#[test]
fn test_empty_after_filtering_is_an_error_not_an_empty_result() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("b.tmp"), "bbb").unwrap();
    fs::write(dir.path().join(".hidden"), "hhh").unwrap();

    let req = request(dir.path(), 1, DedupMode::Enabled, Some(1));
    let engine = engine_for(dir.path(), &req.config);
    let result = engine.run(&req, &SilentReporter);

    assert!(matches!(result, Err(Error::EmptyTree(_))));
    // The failed run must not touch persisted state.
    assert!(!req.config.seen_path(dir.path()).exists());
}

#[test]
fn test_invalid_root_is_fatal() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");

    let req = request(&missing, 1, DedupMode::Enabled, None);
    let engine = engine_for(&missing, &req.config);
    assert!(matches!(
        engine.run(&req, &SilentReporter),
        Err(Error::InvalidRoot { .. })
    ));

    let file = dir.path().join("a.txt");
    fs::write(&file, "a").unwrap();
    let req = request(&file, 1, DedupMode::Enabled, None);
    let engine = engine_for(&file, &req.config);
    assert!(matches!(
        engine.run(&req, &SilentReporter),
        Err(Error::InvalidRoot { .. })
    ));
}

#[test]
fn test_count_exceeding_candidates_returns_all_with_shortfall() {
    let dir = tempdir().unwrap();
    for name in ["a.txt", "b.txt", "c.txt"] {
        fs::write(dir.path().join(name), name).unwrap();
    }

    let req = request(dir.path(), 5, DedupMode::Disabled, Some(2));
    let engine = engine_for(dir.path(), &req.config);
    let outcome = engine.run(&req, &SilentReporter).unwrap();

    assert_eq!(outcome.picks.len(), 3);
    assert!(outcome.shortfall);
    assert_eq!(file_names(&outcome.picks).len(), 3);
}

#[test]
fn test_history_survives_across_engine_instances() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "a").unwrap();
    fs::write(dir.path().join("b.txt"), "b").unwrap();

    let config = AppConfig::default();
    let first = engine_for(dir.path(), &config);
    let outcome = first
        .run(&request(dir.path(), 1, DedupMode::Enabled, Some(3)), &SilentReporter)
        .unwrap();
    let first_pick = file_names(&outcome.picks);

    assert!(config.seen_path(dir.path()).exists());

    // A new process run must remember the first pick.
    let second = engine_for(dir.path(), &config);
    let outcome = second
        .run(&request(dir.path(), 1, DedupMode::Enabled, Some(4)), &SilentReporter)
        .unwrap();
    let second_pick = file_names(&outcome.picks);

    assert!(first_pick.is_disjoint(&second_pick));
}

#[test]
fn test_dedup_never_repeats_until_pool_is_exhausted() {
    // Across repeated dedup-on runs, no identity repeats until every other
    // passing candidate has been selected at least once. Over two full
    // cycles of a 4-file tree each file is selected exactly twice.
    let dir = tempdir().unwrap();
    let names = ["a.txt", "b.txt", "c.txt", "d.txt"];
    for name in names {
        fs::write(dir.path().join(name), name).unwrap();
    }

    let config = AppConfig::default();
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut first_cycle: HashSet<String> = HashSet::new();

    for run in 0..8u64 {
        let engine = engine_for(dir.path(), &config);
        let outcome = engine
            .run(
                &request(dir.path(), 1, DedupMode::Enabled, Some(run)),
                &SilentReporter,
            )
            .unwrap();
        assert_eq!(outcome.picks.len(), 1);
        let name = file_names(&outcome.picks).into_iter().next().unwrap();

        if run < 4 {
            assert!(
                !outcome.recycled,
                "recycling fired before the pool was exhausted (run {})",
                run
            );
            assert!(
                first_cycle.insert(name.clone()),
                "{} repeated before every candidate was selected",
                name
            );
        }
        if run == 4 {
            assert!(outcome.recycled, "pool exhaustion must trigger recycling");
        }

        *counts.entry(name).or_default() += 1;
    }

    assert_eq!(first_cycle.len(), 4);
    for name in names {
        assert_eq!(
            counts.get(name).copied().unwrap_or(0),
            2,
            "{} should be selected exactly twice over two cycles",
            name
        );
    }
}

#[test]
fn test_recycled_picks_are_flagged() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("only.txt"), "x").unwrap();

    let config = AppConfig::default();
    let engine = engine_for(dir.path(), &config);

    let outcome = engine
        .run(&request(dir.path(), 1, DedupMode::Enabled, Some(1)), &SilentReporter)
        .unwrap();
    assert!(!outcome.picks[0].recycled);

    let outcome = engine
        .run(&request(dir.path(), 1, DedupMode::Enabled, Some(2)), &SilentReporter)
        .unwrap();
    assert!(outcome.recycled);
    assert!(outcome.picks[0].recycled);
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let dir = tempdir().unwrap();
    for name in ["a.txt", "b.txt", "c.txt", "d.txt", "e.txt"] {
        fs::write(dir.path().join(name), name).unwrap();
    }

    let config = AppConfig::default();
    // Dedup off so neither run records history that would perturb the other.
    let run = |seed| {
        let engine = engine_for(dir.path(), &config);
        let outcome = engine
            .run(&request(dir.path(), 2, DedupMode::Disabled, Some(seed)), &SilentReporter)
            .unwrap();
        outcome
            .picks
            .iter()
            .map(|p| p.candidate.path.clone())
            .collect::<Vec<_>>()
    };

    assert_eq!(run(99), run(99));
}

#[test]
fn test_dedup_off_does_not_write_history() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "a").unwrap();

    let config = AppConfig::default();
    let engine = engine_for(dir.path(), &config);
    engine
        .run(&request(dir.path(), 1, DedupMode::Disabled, Some(1)), &SilentReporter)
        .unwrap();

    assert!(!config.seen_path(dir.path()).exists());
}

#[test]
fn test_unwritable_history_keeps_picks_and_reports_save_error() {
    // Selection succeeds even when the seen set cannot be persisted; the
    // failure is surfaced on the outcome instead of failing the run.
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "a").unwrap();

    let config = AppConfig {
        seen_file: dir
            .path()
            .join("no-such-dir")
            .join("seen.json")
            .to_string_lossy()
            .into_owned(),
        ..AppConfig::default()
    };
    let engine = engine_for(dir.path(), &config);
    let req = SelectionRequest {
        root: dir.path().to_path_buf(),
        count: 1,
        dedup: DedupMode::Enabled,
        seed: Some(1),
        config: config.clone(),
    };

    let outcome = engine.run(&req, &SilentReporter).unwrap();
    assert_eq!(outcome.picks.len(), 1);
    assert!(outcome.save_error.is_some());
    assert!(!config.seen_path(dir.path()).exists());
}

#[test]
fn test_corrupt_history_recovers_and_run_succeeds() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "a").unwrap();

    let config = AppConfig::default();
    fs::write(config.seen_path(dir.path()), "not json at all").unwrap();

    let engine = engine_for(dir.path(), &config);
    let outcome = engine
        .run(&request(dir.path(), 1, DedupMode::Enabled, Some(1)), &SilentReporter)
        .unwrap();

    assert!(outcome.seen_recovered);
    assert_eq!(outcome.picks.len(), 1);

    // The replacement file is valid again.
    let reloaded = SeenStore::new(config.seen_path(dir.path())).load();
    assert!(!reloaded.recovered);
    assert_eq!(reloaded.set.len(), 1);
}

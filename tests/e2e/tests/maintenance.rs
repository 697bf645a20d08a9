//! Maintenance journeys: retention, consolidation, staleness, context

use mnemo_core::{ConsolidateOptions, HybridSearchOptions, RetentionConfig, SummaryInput};
use mnemo_e2e_tests::{observation, TestDb};

const DAY_MS: i64 = 86_400_000;

#[test]
fn retention_spares_important_knowledge() {
    let db = TestDb::new();

    let mut input = observation("p", "constraint", "never bypass the write queue");
    input.facts = Some(r#"{"importance":5}"#.to_string());
    let exempt = db.create(input);

    let now_ms = chrono::Utc::now().timestamp_millis();
    db.backdate(exempt, now_ms - 400 * DAY_MS);

    let outcome = db.storage.apply_retention(&RetentionConfig::default()).unwrap();
    assert_eq!(outcome.knowledge, 0);
    assert!(db.storage.get_observation(exempt).unwrap().is_some());
}

#[test]
fn retention_is_a_noop_the_second_time() {
    let db = TestDb::new();
    let now_ms = chrono::Utc::now().timestamp_millis();

    let doomed = db.create(observation("p", "command", "ancient command"));
    db.backdate(doomed, now_ms - 60 * DAY_MS);
    let kept = db.create(observation("p", "decision", "old but knowledge"));
    db.backdate(kept, now_ms - 60 * DAY_MS);

    let cfg = RetentionConfig::default();
    let first = db.storage.apply_retention(&cfg).unwrap();
    assert_eq!(first.observations, 1);
    assert_eq!(first.knowledge, 0);
    assert_eq!(first.total, 1);

    let second = db.storage.apply_retention(&cfg).unwrap();
    assert_eq!(second.total, 0);

    assert!(db.storage.get_observation(doomed).unwrap().is_none());
    assert!(db.storage.get_observation(kept).unwrap().is_some());
}

#[test]
fn consolidation_merges_a_file_write_burst() {
    let db = TestDb::new();

    for (i, text) in ["t1", "t2", "t3", "t4"].iter().enumerate() {
        let mut input = observation("p", "file-write", &format!("edit pass {}", i + 1));
        input.files_modified = Some("a.ts,b.ts".to_string());
        input.text = Some(text.to_string());
        db.create(input);
    }
    let before = db.storage.count_by_project("p").unwrap();

    let outcome = db
        .storage
        .consolidate_observations("p", &ConsolidateOptions::default())
        .unwrap();
    assert_eq!(outcome.merged, 1);
    assert_eq!(outcome.removed, 3);

    // Conservation: before == after + removed
    let after = db.storage.count_by_project("p").unwrap();
    assert_eq!(before, after + outcome.removed as i64);

    let survivors = db.storage.get_timeline(Some("p"), 10, None).unwrap();
    assert_eq!(survivors.len(), 1);
    let keeper = &survivors[0];
    assert!(keeper.title.starts_with("[consolidated x4]"));
    let text = keeper.text.as_deref().unwrap();
    assert!(text.starts_with("t4"));
    for t in ["t1", "t2", "t3", "t4"] {
        assert!(text.contains(t));
    }
    assert_eq!(text.matches("\n---\n").count(), 3);

    // Deleted members left no embedding rows behind
    let raw = db.raw();
    let orphans: i64 = raw
        .query_row(
            "SELECT COUNT(*) FROM observation_embeddings e
             LEFT JOIN observations o ON o.id = e.observation_id
             WHERE o.id IS NULL",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(orphans, 0);
}

#[test]
fn consolidation_dry_run_only_counts() {
    let db = TestDb::new();
    for i in 0..3 {
        let mut input = observation("p", "file-write", &format!("edit {i}"));
        input.files_modified = Some("x.rs".to_string());
        input.text = Some(format!("t{i}"));
        db.create(input);
    }

    let outcome = db
        .storage
        .consolidate_observations(
            "p",
            &ConsolidateOptions {
                dry_run: true,
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!((outcome.merged, outcome.removed), (1, 2));
    assert_eq!(db.storage.count_by_project("p").unwrap(), 3);
}

#[test]
fn staleness_flags_changed_files_and_ignores_missing_ones() {
    let db = TestDb::new();
    let tracked = db.dir().join("tracked.rs");
    std::fs::write(&tracked, "fn main() {}").unwrap();

    let mut input = observation("p", "file-write", "edited tracked.rs");
    input.files_modified = Some(format!(
        "{},/definitely/not/a/real/path.rs",
        tracked.to_str().unwrap()
    ));
    let id = db.create(input);

    // Pretend the observation predates the file's current mtime
    let now_ms = chrono::Utc::now().timestamp_millis();
    db.backdate(id, now_ms - 60_000);

    let stale = db.storage.detect_stale("p").unwrap();
    assert_eq!(stale, vec![id]);
    assert!(db.storage.get_observation(id).unwrap().unwrap().is_stale);

    // Clearing the flag works through the same bulk surface
    assert_eq!(db.storage.mark_stale(&[id], false).unwrap(), 1);
    assert!(!db.storage.get_observation(id).unwrap().unwrap().is_stale);
}

#[test]
fn smart_context_prefers_knowledge_and_respects_budget() {
    let db = TestDb::new();
    db.storage
        .save_summary(SummaryInput {
            session_id: "s1".to_string(),
            project: "p".to_string(),
            learned: Some("summaries prime sessions".to_string()),
            ..Default::default()
        })
        .unwrap();

    for i in 0..5 {
        let mut input = observation("p", "command", &format!("ran step {i}"));
        input.text = Some("routine output".to_string());
        db.create(input);
    }
    let constraint = db.create(observation("p", "constraint", "api keys live in the vault"));

    let context = db.storage.get_smart_context("p", 10_000).unwrap();
    assert_eq!(context.summaries.len(), 1);
    assert_eq!(context.items[0].id, constraint);
    assert!(context.tokens_used <= context.token_budget);

    // A tight budget admits fewer items but never errors
    let tight = db.storage.get_smart_context("p", 12).unwrap();
    assert!(tight.tokens_used <= 12);
    assert!(tight.items.len() < context.items.len());
}

#[test]
fn search_still_works_after_maintenance_passes() {
    let db = TestDb::new();
    for i in 0..4 {
        let mut input = observation("p", "file-write", &format!("edit {i}"));
        input.files_modified = Some("m.rs".to_string());
        input.text = Some(format!("change number {i}"));
        db.create(input);
    }

    db.storage
        .consolidate_observations("p", &ConsolidateOptions::default())
        .unwrap();
    db.storage.apply_retention(&RetentionConfig::default()).unwrap();

    // The FTS index survived the trigger cascades
    let results = db
        .storage
        .hybrid_search("change number", &HybridSearchOptions::default())
        .unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].observation.title.starts_with("[consolidated x4]"));
}

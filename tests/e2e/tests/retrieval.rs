//! Retrieval journeys: FTS ranking, hybrid ordering, boundaries

use mnemo_core::{
    EmbeddingProvider, HybridSearchOptions, SearchFilters, SearchSource, VectorSearchOptions,
};
use mnemo_e2e_tests::{observation, StubProvider, TestDb};

#[test]
fn fts_ranks_title_matches_above_body_matches() {
    let db = TestDb::new();

    let mut a = observation("p", "note", "handle auth bug");
    a.text = Some("fix jwt".to_string());
    let mut b = observation("p", "note", "refactor");
    b.text = Some("handle auth token parse bug".to_string());
    let mut c = observation("p", "note", "unrelated");
    c.text = Some("colors".to_string());

    let a_id = db.create(a);
    let b_id = db.create(b);
    let c_id = db.create(c);

    let results = db
        .storage
        .search_observations_fts("auth bug", &SearchFilters::default())
        .unwrap();
    let ids: Vec<i64> = results.iter().map(|o| o.id).collect();

    // Title hits (weight 10) outrank body hits (weight 1); the
    // non-matching row has no FTS rank at all
    assert_eq!(ids, vec![a_id, b_id]);
    assert!(!ids.contains(&c_id));
}

#[test]
fn hybrid_results_are_sorted_bounded_and_deterministic() {
    let db = TestDb::new();
    for i in 0..15 {
        let mut input = observation("p", "note", &format!("database migration step {i}"));
        input.text = Some(format!("details about migration number {i}"));
        db.create(input);
    }

    let opts = HybridSearchOptions {
        project: Some("p".to_string()),
        limit: 5,
        ..Default::default()
    };
    let first = db.storage.hybrid_search("database migration", &opts).unwrap();
    assert_eq!(first.len(), 5);
    for window in first.windows(2) {
        assert!(window[0].score >= window[1].score);
    }
    for result in &first {
        assert!(result.score >= 0.0 && result.score <= 1.0);
    }

    // Same query, same snapshot: identical order
    let second = db.storage.hybrid_search("database migration", &opts).unwrap();
    let first_ids: Vec<i64> = first.iter().map(|r| r.observation.id).collect();
    let second_ids: Vec<i64> = second.iter().map(|r| r.observation.id).collect();
    assert_eq!(first_ids, second_ids);
}

#[test]
fn dual_leg_hits_are_labeled_hybrid_and_touch_access_time() {
    let db = TestDb::new();
    let id = db.create(observation("p", "note", "vector search candidate window"));

    let opts = HybridSearchOptions {
        project: Some("p".to_string()),
        ..Default::default()
    };
    let results = db
        .storage
        .hybrid_search("vector search candidate window", &opts)
        .unwrap();
    assert_eq!(results[0].observation.id, id);
    assert_eq!(results[0].source, SearchSource::Hybrid);

    let stored = db.storage.get_observation(id).unwrap().unwrap();
    assert!(stored.last_accessed_epoch.is_some());
}

#[test]
fn fresher_twin_outranks_week_old_twin() {
    let db = TestDb::new();
    let old = db.create(observation("p", "note", "deploy checklist runbook"));
    let new = db.create(observation("p", "note", "deploy checklist runbook"));

    // Age the first copy by exactly one recency half-life
    let now_ms = chrono::Utc::now().timestamp_millis();
    db.backdate(old, now_ms - 168 * 3_600_000);

    let results = db
        .storage
        .hybrid_search("deploy checklist runbook", &HybridSearchOptions::default())
        .unwrap();
    let ids: Vec<i64> = results.iter().map(|r| r.observation.id).collect();
    assert_eq!(ids, vec![new, old]);
    assert!(results[0].score > results[1].score);
}

#[test]
fn project_filter_scopes_both_legs() {
    let db = TestDb::new();
    let mine = db.create(observation("alpha", "note", "shared retention wording"));
    db.create(observation("beta", "note", "shared retention wording"));

    let opts = HybridSearchOptions {
        project: Some("alpha".to_string()),
        ..Default::default()
    };
    let results = db.storage.hybrid_search("shared retention", &opts).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].observation.id, mine);
    assert_eq!(results[0].project_match, 1.0);
}

#[test]
fn vector_search_respects_threshold_and_window() {
    let db = TestDb::new();
    let id = db.create(observation("p", "note", "tokio runtime shutdown order"));
    db.create(observation("p", "note", "grocery list milk eggs"));

    let query = StubProvider.embed("tokio runtime shutdown order").unwrap();
    let hits = db
        .storage
        .vector_search(&query, &VectorSearchOptions::default())
        .unwrap();
    assert_eq!(hits[0].observation_id, id);
    assert!(hits[0].similarity > 0.9);

    // A zero-size candidate window returns nothing
    let opts = VectorSearchOptions {
        max_candidates: 0,
        ..Default::default()
    };
    assert!(db.storage.vector_search(&query, &opts).unwrap().is_empty());
}

#[test]
fn oversized_queries_degrade_instead_of_failing() {
    let db = TestDb::new();
    db.create(observation("p", "note", "needle in a long query"));

    // 150 terms: sanitized down to 100, still searches
    let long_terms = (0..149)
        .map(|i| format!("term{i}"))
        .collect::<Vec<_>>()
        .join(" ")
        + " needle";
    let results = db
        .storage
        .search_observations_fts(&long_terms, &SearchFilters::default())
        .unwrap();
    // "needle" was term 150 and fell off; no panic, no error
    assert!(results.is_empty());

    // 10 001 chars: truncated before sanitize, still fine
    let giant = "a".repeat(10_001);
    let results = db
        .storage
        .search_observations_fts(&giant, &SearchFilters::default())
        .unwrap();
    assert!(results.is_empty());

    // limit 0 is an empty result, not an error
    let opts = HybridSearchOptions {
        limit: 0,
        ..Default::default()
    };
    assert!(db.storage.hybrid_search("needle", &opts).unwrap().is_empty());
}

#[test]
fn knowledge_types_outrank_plain_notes() {
    let db = TestDb::new();
    db.create(observation("p", "note", "caching strategy overview"));
    let constraint = db.create(observation("p", "constraint", "caching strategy overview"));

    let results = db
        .storage
        .hybrid_search("caching strategy overview", &HybridSearchOptions::default())
        .unwrap();
    // Same signals, but the constraint carries a 1.3× boost
    assert_eq!(results[0].observation.id, constraint);
}

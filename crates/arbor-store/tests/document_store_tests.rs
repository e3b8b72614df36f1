#![allow(clippy::unwrap_used, clippy::expect_used)]

use arbor_core::errors::ExErrorKind;
use arbor_store::{
    AssetSetRecord, DocumentStore, InMemoryDocumentStore, NewAsset, SqliteDocumentStore,
};
use serde_json::value::RawValue;

fn tree<'a>(set: &'a str, name: &'a str) -> NewAsset<'a> {
    NewAsset {
        asset_set_id: set,
        asset_type: "BehaviourTree",
        asset_name: name,
        content: r#"{"Nodes":[]}"#,
    }
}

/// A solution holding two asset sets, returned as (first, second)
fn two_sets(store: &dyn DocumentStore) -> (AssetSetRecord, AssetSetRecord) {
    let solution = store.create_solution("game").unwrap();
    let id = &solution.summary.solution_id;
    (
        store.create_asset_set(id, "set-1").unwrap(),
        store.create_asset_set(id, "set-2").unwrap(),
    )
}

/// Run the same scenario against both store implementations
fn each_store(check: impl Fn(&dyn DocumentStore)) {
    let sqlite = SqliteDocumentStore::open_in_memory().unwrap();
    check(&sqlite);
    let memory = InMemoryDocumentStore::new();
    check(&memory);
}

#[test]
fn test_create_then_load() {
    each_store(|store| {
        let (set, _) = two_sets(store);
        let record = store.create(tree(&set.asset_set_id, "patrol")).unwrap();
        let loaded = store.load(&record.asset_id).unwrap();

        assert_eq!(loaded.content, r#"{"Nodes":[]}"#);
        assert_eq!(loaded.version, record.asset_version);
        assert!(uuid::Uuid::parse_str(&loaded.version).is_ok());
    });
}

#[test]
fn test_save_with_current_version() {
    each_store(|store| {
        let (set, _) = two_sets(store);
        let record = store.create(tree(&set.asset_set_id, "patrol")).unwrap();

        let v2 = store
            .save(&record.asset_id, "updated", &record.asset_version)
            .unwrap();
        let v3 = store.save(&record.asset_id, "again", &v2).unwrap();

        assert_ne!(v2, record.asset_version);
        assert_ne!(v3, v2);
        let loaded = store.load(&record.asset_id).unwrap();
        assert_eq!(loaded.content, "again");
        assert_eq!(loaded.version, v3);
    });
}

#[test]
fn test_save_with_stale_version_conflicts() {
    each_store(|store| {
        let (set, _) = two_sets(store);
        let record = store.create(tree(&set.asset_set_id, "patrol")).unwrap();
        let v2 = store
            .save(&record.asset_id, "first", &record.asset_version)
            .unwrap();

        let err = store
            .save(&record.asset_id, "second", &record.asset_version)
            .unwrap_err();

        assert_eq!(err.kind(), ExErrorKind::VersionConflict);
        assert_eq!(err.stored_version(), Some(v2.as_str()));
        assert_eq!(err.requested_version(), Some(record.asset_version.as_str()));
        assert_eq!(store.load(&record.asset_id).unwrap().content, "first");
    });
}

#[test]
fn test_missing_asset_is_not_found() {
    each_store(|store| {
        assert_eq!(store.load("nope").unwrap_err().kind(), ExErrorKind::NotFound);
        assert_eq!(
            store.save("nope", "x", "v").unwrap_err().kind(),
            ExErrorKind::NotFound
        );
        assert_eq!(
            store.get_asset("nope").unwrap_err().kind(),
            ExErrorKind::NotFound
        );
    });
}

#[test]
fn test_duplicate_name_across_asset_sets() {
    each_store(|store| {
        let (one, two) = two_sets(store);
        store.create(tree(&one.asset_set_id, "patrol")).unwrap();
        let err = store.create(tree(&two.asset_set_id, "patrol")).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::AlreadyExists);
    });
}

#[test]
fn test_list_filters_and_orders_by_name() {
    each_store(|store| {
        let (one, two) = two_sets(store);
        store.create(tree(&one.asset_set_id, "zeta")).unwrap();
        store.create(tree(&one.asset_set_id, "alpha")).unwrap();
        store.create(tree(&two.asset_set_id, "mid")).unwrap();

        let all: Vec<String> = store
            .list(None)
            .unwrap()
            .into_iter()
            .map(|s| s.asset_name)
            .collect();
        assert_eq!(all, vec!["alpha", "mid", "zeta"]);

        let set1: Vec<String> = store
            .list(Some(one.asset_set_id.as_str()))
            .unwrap()
            .into_iter()
            .map(|s| s.asset_name)
            .collect();
        assert_eq!(set1, vec!["alpha", "zeta"]);
    });
}

#[test]
fn test_summary_serializes_without_content() {
    let store = InMemoryDocumentStore::new();
    let (set, _) = two_sets(&store);
    store.create(tree(&set.asset_set_id, "patrol")).unwrap();

    let value = serde_json::to_value(&store.list(None).unwrap()[0]).unwrap();
    assert_eq!(value["assetName"], "patrol");
    assert_eq!(value["assetSetId"], set.asset_set_id.as_str());
    assert!(value.get("content").is_none());
}

#[test]
fn test_file_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");

    let (asset_id, version) = {
        let store = SqliteDocumentStore::open(&path).unwrap();
        let (set, _) = two_sets(&store);
        let record = store.create(tree(&set.asset_set_id, "patrol")).unwrap();
        let v2 = store
            .save(&record.asset_id, "persisted", &record.asset_version)
            .unwrap();
        (record.asset_id, v2)
    };

    let reopened = SqliteDocumentStore::open(&path).unwrap();
    let loaded = reopened.load(&asset_id).unwrap();
    assert_eq!(loaded.content, "persisted");
    assert_eq!(loaded.version, version);
}

// ===== ORGANIZATION =====

#[test]
fn test_create_asset_requires_existing_set() {
    each_store(|store| {
        let err = store.create(tree("no-such-set", "patrol")).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidAssetSet);
        assert!(store.list(None).unwrap().is_empty());
    });
}

#[test]
fn test_solution_names_are_unique() {
    each_store(|store| {
        let created = store.create_solution("game").unwrap();
        assert_eq!(created.solution_meta.get(), "{}");
        assert!(uuid::Uuid::parse_str(&created.summary.solution_version).is_ok());

        let err = store.create_solution("game").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::DuplicateSolutionName);

        store.create_solution("arcade").unwrap();
        let names: Vec<String> = store
            .list_solutions()
            .unwrap()
            .into_iter()
            .map(|s| s.solution_name)
            .collect();
        assert_eq!(names, vec!["arcade", "game"]);
    });
}

#[test]
fn test_submit_solution_meta_rotates_version() {
    each_store(|store| {
        let created = store.create_solution("game").unwrap();
        let id = created.summary.solution_id.clone();
        let meta = RawValue::from_string(r#"{"blackboards":["npc"]}"#.to_string()).unwrap();

        let updated = store
            .submit_solution_meta(&id, &meta, &created.summary.solution_version)
            .unwrap();
        assert_ne!(updated.summary.solution_version, created.summary.solution_version);
        assert_eq!(updated.solution_meta.get(), r#"{"blackboards":["npc"]}"#);

        let stale = store
            .submit_solution_meta(&id, &meta, &created.summary.solution_version)
            .unwrap_err();
        assert_eq!(stale.kind(), ExErrorKind::SolutionVersionConflict);
        assert_eq!(
            stale.stored_version(),
            Some(updated.summary.solution_version.as_str())
        );

        let detail = store.get_solution(&id).unwrap();
        assert_eq!(detail.solution_meta.get(), updated.solution_meta.get());
    });
}

#[test]
fn test_unknown_solution_is_invalid() {
    each_store(|store| {
        let meta = RawValue::from_string("{}".to_string()).unwrap();
        assert_eq!(
            store.get_solution("ghost").unwrap_err().kind(),
            ExErrorKind::InvalidSolution
        );
        assert_eq!(
            store.submit_solution_meta("ghost", &meta, "v").unwrap_err().kind(),
            ExErrorKind::InvalidSolution
        );
        assert_eq!(
            store.create_asset_set("ghost", "npc").unwrap_err().kind(),
            ExErrorKind::InvalidSolution
        );
    });
}

#[test]
fn test_asset_set_names_unique_within_solution() {
    each_store(|store| {
        let game = store.create_solution("game").unwrap().summary.solution_id;
        let arcade = store.create_solution("arcade").unwrap().summary.solution_id;

        store.create_asset_set(&game, "npc").unwrap();
        store.create_asset_set(&game, "boss").unwrap();
        store.create_asset_set(&arcade, "npc").unwrap();
        let err = store.create_asset_set(&game, "npc").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::DuplicateAssetSetName);

        let in_game: Vec<String> = store
            .list_asset_sets(Some(game.as_str()))
            .unwrap()
            .into_iter()
            .map(|s| s.asset_set_name)
            .collect();
        assert_eq!(in_game, vec!["boss", "npc"]);
        assert_eq!(store.list_asset_sets(None).unwrap().len(), 3);
    });
}

#[test]
fn test_find_asset_set() {
    each_store(|store| {
        let (set, _) = two_sets(store);
        assert_eq!(store.find_asset_set(&set.asset_set_id).unwrap(), Some(set));
        assert_eq!(store.find_asset_set("ghost").unwrap(), None);
    });
}

#[test]
fn test_solution_detail_serializes_meta_inline() {
    let store = InMemoryDocumentStore::new();
    let created = store.create_solution("game").unwrap();

    let value = serde_json::to_value(&created).unwrap();
    assert_eq!(value["solutionName"], "game");
    assert_eq!(value["solutionId"], created.summary.solution_id.as_str());
    assert_eq!(value["solutionMeta"], serde_json::json!({}));
}

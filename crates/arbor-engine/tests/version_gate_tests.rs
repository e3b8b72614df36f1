#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;
use std::thread;

use arbor_core::errors::ExErrorKind;
use arbor_core::logging_facility::test_capture::init_test_capture;
use arbor_core::model::{Document, NodeType, Position};
use arbor_core::{Mutation, NodeMovement};
use arbor_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use arbor_engine::{EditorService, LockManager, VersionGate};
use arbor_store::{AssetRecord, DocumentStore, InMemoryDocumentStore};
use common::{ctx, memory_service, new_tree, root_id, sqlite_service};

fn create_task(service: &EditorService, asset_id: &str, version: &str, x: f32) -> (String, String) {
    let modification = service
        .create_node(
            &ctx(),
            asset_id,
            version,
            NodeType::Task,
            Position::new(x, 0.0),
            None,
        )
        .unwrap();
    (modification.diffs[0].node_id.clone(), modification.new_version)
}

#[test]
fn test_same_version_twice_conflicts() {
    let (service, _) = sqlite_service();
    let asset = new_tree(&service, "conflict");

    let first = service
        .create_node(
            &ctx(),
            &asset.asset_id,
            &asset.asset_version,
            NodeType::Selector,
            Position::new(0.0, 0.0),
            None,
        )
        .unwrap();
    assert_ne!(first.new_version, asset.asset_version);
    assert_eq!(first.prev_version, asset.asset_version);

    let err = service
        .create_node(
            &ctx(),
            &asset.asset_id,
            &asset.asset_version,
            NodeType::Selector,
            Position::new(0.0, 0.0),
            None,
        )
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::VersionConflict);
    assert_eq!(err.stored_version(), Some(first.new_version.as_str()));
    assert_eq!(err.requested_version(), Some(asset.asset_version.as_str()));
}

#[test]
fn test_noop_keeps_version_and_content() {
    let (service, store) = sqlite_service();
    let asset = new_tree(&service, "noop");
    let before = store.load(&asset.asset_id).unwrap();

    let modification = service
        .move_nodes(
            &ctx(),
            &asset.asset_id,
            &asset.asset_version,
            vec![NodeMovement::new("does-not-exist", 5.0, 5.0)],
        )
        .unwrap();

    assert!(modification.diffs.is_empty());
    assert!(modification.is_noop());
    assert_eq!(modification.new_version, asset.asset_version);
    assert_eq!(store.load(&asset.asset_id).unwrap(), before);
}

#[test]
fn test_failed_remove_leaves_document_untouched() {
    let (service, store) = sqlite_service();
    let asset = new_tree(&service, "remove-root");
    let (task, version) = create_task(&service, &asset.asset_id, &asset.asset_version, 10.0);
    let root = root_id(store.as_ref(), &asset.asset_id);
    let before = store.load(&asset.asset_id).unwrap();

    let err = service
        .remove_nodes(&ctx(), &asset.asset_id, &version, vec![root.clone(), task])
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::IllegalRemoveRoot);
    assert_eq!(err.node_id(), Some(root.as_str()));
    let after = store.load(&asset.asset_id).unwrap();
    assert_eq!(after.content, before.content);
    assert_eq!(after.version, before.version);
}

#[test]
fn test_remove_parent_detaches_children() {
    let (service, store) = sqlite_service();
    let asset = new_tree(&service, "cascade");
    let root = root_id(store.as_ref(), &asset.asset_id);

    let seq = service
        .create_node(
            &ctx(),
            &asset.asset_id,
            &asset.asset_version,
            NodeType::Sequence,
            Position::new(0.0, 0.0),
            None,
        )
        .unwrap();
    let seq_id = seq.diffs[0].node_id.clone();
    let mut version = service
        .connect_node(&ctx(), &asset.asset_id, &seq.new_version, &root, &seq_id)
        .unwrap()
        .new_version;

    let mut children = Vec::new();
    for x in [10.0, 20.0] {
        let (child, v) = create_task(&service, &asset.asset_id, &version, x);
        version = service
            .connect_node(&ctx(), &asset.asset_id, &v, &seq_id, &child)
            .unwrap()
            .new_version;
        children.push(child);
    }

    let modification = service
        .remove_nodes(&ctx(), &asset.asset_id, &version, vec![seq_id.clone()])
        .unwrap();

    assert_eq!(modification.diffs.len(), 3);
    for child in &children {
        let diff = modification.diffs.iter().find(|d| &d.node_id == child).unwrap();
        assert_eq!(diff.pre.as_ref().unwrap().parent_id, seq_id);
        let post = diff.post.as_ref().unwrap();
        assert_eq!(post.parent_id, "");
        assert_eq!(post.order, -1);
    }
    let removed = modification
        .diffs
        .iter()
        .find(|d| d.node_id == seq_id)
        .unwrap();
    assert!(removed.post.is_none());
}

#[test]
fn test_missing_asset_is_not_found() {
    let (service, _) = memory_service();
    let err = service
        .move_nodes(&ctx(), "missing", "v", Vec::new())
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert_eq!(err.asset_id(), Some("missing"));
}

#[test]
fn test_corrupt_content_is_deserialization_error() {
    let store = Arc::new(InMemoryDocumentStore::new());
    store.insert(AssetRecord {
        asset_id: "broken".to_string(),
        asset_set_id: "set-1".to_string(),
        asset_type: "BehaviourTree".to_string(),
        asset_name: "broken".to_string(),
        content: "{not json".to_string(),
        asset_version: "v1".to_string(),
    });
    let gate = VersionGate::new(store, Arc::new(LockManager::new()));

    let err = gate
        .mutate(
            &ctx(),
            "broken",
            "v1",
            Mutation::RemoveNodes {
                node_ids: Vec::new(),
            },
        )
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Deserialization);
}

#[test]
fn test_persisted_timestamp_is_stamped() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let mut doc = Document::new_empty();
    doc.modify_timestamp = 0;
    store.insert(AssetRecord {
        asset_id: "stamped".to_string(),
        asset_set_id: "set-1".to_string(),
        asset_type: "BehaviourTree".to_string(),
        asset_name: "stamped".to_string(),
        content: doc.to_json().unwrap(),
        asset_version: "v1".to_string(),
    });
    let gate = VersionGate::new(store.clone(), Arc::new(LockManager::new()));

    gate.mutate(
        &ctx(),
        "stamped",
        "v1",
        Mutation::CreateNode {
            node_type: NodeType::Task,
            position: Position::new(1.0, 1.0),
            initial_settings: None,
        },
    )
    .unwrap();

    let saved = Document::from_json(&store.load("stamped").unwrap().content).unwrap();
    assert!(saved.modify_timestamp > 0);
    assert_eq!(saved.nodes.len(), 2);
}

#[test]
fn test_error_carries_request_context() {
    let (service, _) = memory_service();
    let asset = new_tree(&service, "context");
    let request = ctx();

    let skipped = service
        .disconnect_nodes(
            &request,
            &asset.asset_id,
            &asset.asset_version,
            vec!["ghost".to_string()],
        )
        .map(|m| m.diffs.len());

    // Unknown ids are skipped, so a detached-only batch is a no-op.
    assert_eq!(skipped.unwrap(), 0);

    let err = service
        .update_node_settings(&request, &asset.asset_id, &asset.asset_version, "ghost", None)
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidNodeId);
    assert_eq!(err.op(), Some("update_node_settings"));
    assert_eq!(err.asset_id(), Some(asset.asset_id.as_str()));
    assert_eq!(err.request_id(), Some(&request.request_id));
}

#[test]
fn test_get_node_reads_current_state() {
    let (service, store) = sqlite_service();
    let asset = new_tree(&service, "reads");
    let (task, _) = create_task(&service, &asset.asset_id, &asset.asset_version, 42.0);

    let node = service.get_node(&ctx(), &asset.asset_id, &task).unwrap();
    assert_eq!(node.position.x, 42.0);
    assert!(node.is_detached());

    let root = root_id(store.as_ref(), &asset.asset_id);
    assert!(service.get_node(&ctx(), &asset.asset_id, &root).unwrap().is_root());

    let err = service.get_node(&ctx(), &asset.asset_id, "ghost").unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert_eq!(err.op(), Some("get_node"));
}

#[test]
fn test_concurrent_writers_serialize_with_retry() {
    let (service, store) = sqlite_service();
    let asset = new_tree(&service, "concurrent");
    let service = Arc::new(service);
    let writers = 8;

    let handles: Vec<_> = (0..writers)
        .map(|i| {
            let service = Arc::clone(&service);
            let store = Arc::clone(&store);
            let asset_id = asset.asset_id.clone();
            thread::spawn(move || loop {
                let version = store.load(&asset_id).unwrap().version;
                match service.create_node(
                    &ctx(),
                    &asset_id,
                    &version,
                    NodeType::Task,
                    Position::new(i as f32, 0.0),
                    None,
                ) {
                    Ok(_) => break,
                    Err(e) if e.kind() == ExErrorKind::VersionConflict => continue,
                    Err(e) => panic!("unexpected error: {}", e),
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let doc = Document::from_json(&store.load(&asset.asset_id).unwrap().content).unwrap();
    assert_eq!(doc.nodes.len(), writers + 1);
}

#[test]
fn test_lifecycle_events_logged() {
    let capture = init_test_capture();
    let (service, _) = memory_service();
    let asset = new_tree(&service, "logged");

    service
        .create_node(
            &ctx(),
            &asset.asset_id,
            &asset.asset_version,
            NodeType::Task,
            Position::new(0.0, 0.0),
            None,
        )
        .unwrap();
    let _ = service.create_node(
        &ctx(),
        &asset.asset_id,
        &asset.asset_version,
        NodeType::Task,
        Position::new(0.0, 0.0),
        None,
    );

    let events: Vec<_> = capture
        .events_for("create_node")
        .into_iter()
        .filter(|e| e.field("asset_id") == Some(asset.asset_id.as_str()))
        .collect();
    let kinds: Vec<_> = events.iter().filter_map(|e| e.event.as_deref()).collect();
    assert_eq!(kinds, vec![EVENT_START, EVENT_END, EVENT_START, EVENT_END_ERROR]);

    let end = &events[1];
    assert_eq!(end.field("diff_count"), Some("1"));
    let error = &events[3];
    assert_eq!(error.field("err_code"), Some("ERR_VERSION_CONFLICT"));
}

#[test]
fn test_non_finite_positions_never_reach_the_store() {
    let (service, store) = memory_service();
    let asset = new_tree(&service, "finite");
    let (task, version) = create_task(&service, &asset.asset_id, &asset.asset_version, 5.0);
    let before = store.load(&asset.asset_id).unwrap();

    let err = service
        .create_node(
            &ctx(),
            &asset.asset_id,
            &version,
            NodeType::Task,
            Position::new(f32::NAN, 0.0),
            None,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    assert_eq!(err.op(), Some("create_node"));

    let err = service
        .move_nodes(
            &ctx(),
            &asset.asset_id,
            &version,
            vec![NodeMovement::new(task.clone(), f32::INFINITY, 0.0)],
        )
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);

    // The version did not rotate and the asset still loads
    assert_eq!(store.load(&asset.asset_id).unwrap(), before);
    let node = service.get_node(&ctx(), &asset.asset_id, &task).unwrap();
    assert_eq!(node.position, Position::new(5.0, 0.0));
    service
        .move_nodes(
            &ctx(),
            &asset.asset_id,
            &version,
            vec![NodeMovement::new(task, 6.0, 0.0)],
        )
        .unwrap();
}

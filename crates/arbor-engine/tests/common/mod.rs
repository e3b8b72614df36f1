use std::sync::Arc;

use arbor_core_types::RequestContext;
use arbor_engine::{EditorService, LockManager};
use arbor_store::{AssetRecord, DocumentStore, InMemoryDocumentStore, SqliteDocumentStore};

/// Service over an in-memory SQLite store
#[allow(dead_code)]
pub fn sqlite_service() -> (EditorService, Arc<dyn DocumentStore>) {
    let store: Arc<dyn DocumentStore> = Arc::new(SqliteDocumentStore::open_in_memory().unwrap());
    let service = EditorService::new(Arc::clone(&store), Arc::new(LockManager::new()));
    (service, store)
}

#[allow(dead_code)]
pub fn memory_service() -> (EditorService, Arc<dyn DocumentStore>) {
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
    let service = EditorService::new(Arc::clone(&store), Arc::new(LockManager::new()));
    (service, store)
}

/// Id of the asset set called `name`, created under a shared solution on first use
#[allow(dead_code)]
pub fn set_id(service: &EditorService, name: &str) -> String {
    if let Some(set) = service
        .list_asset_sets(None)
        .unwrap()
        .into_iter()
        .find(|s| s.asset_set_name == name)
    {
        return set.asset_set_id;
    }

    let solution = match service.list_solutions().unwrap().into_iter().next() {
        Some(solution) => solution.solution_id,
        None => {
            service
                .create_solution(&RequestContext::new(), "game")
                .unwrap()
                .summary
                .solution_id
        }
    };
    service
        .create_asset_set(&RequestContext::new(), &solution, name)
        .unwrap()
        .asset_set_id
}

/// Register an empty behaviour tree in `set-1`
#[allow(dead_code)]
pub fn new_tree(service: &EditorService, name: &str) -> AssetRecord {
    let set = set_id(service, "set-1");
    service
        .create_asset(&RequestContext::new(), &set, "BehaviourTree", name)
        .unwrap()
}

/// Id of the root node of a stored tree
#[allow(dead_code)]
pub fn root_id(store: &dyn DocumentStore, asset_id: &str) -> String {
    let stored = store.load(asset_id).unwrap();
    let doc = arbor_core::Document::from_json(&stored.content).unwrap();
    doc.root().unwrap().id.clone()
}

#[allow(dead_code)]
pub fn ctx() -> RequestContext {
    RequestContext::new()
}

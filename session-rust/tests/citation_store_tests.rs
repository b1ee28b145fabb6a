use scholar_sdk::Citation;
use scholar_session::{
    BlobStore, CitationStore, FileBlobStore, MemoryBlobStore, StoreError, StoreResult,
    CITATIONS_KEY,
};
use std::sync::Arc;

fn citation(id: &str, uri: &str) -> Citation {
    Citation::new(id, format!("Title {id}"), uri).with_source("Google Search")
}

struct ReadOnlyBlobStore {
    snapshot: Option<String>,
}

impl BlobStore for ReadOnlyBlobStore {
    fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        Ok(self.snapshot.clone())
    }

    fn set(&self, key: &str, _value: &str) -> StoreResult<()> {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

#[test]
fn save_keeps_one_citation_per_uri_in_any_order() {
    let orders = [
        vec![
            citation("1", "https://a"),
            citation("2", "https://b"),
            citation("3", "https://a"),
        ],
        vec![
            citation("3", "https://a"),
            citation("1", "https://a"),
            citation("2", "https://b"),
        ],
        vec![
            citation("2", "https://b"),
            citation("3", "https://a"),
            citation("1", "https://a"),
        ],
    ];

    for order in orders {
        let store = CitationStore::load(Arc::new(MemoryBlobStore::new()));
        let inserted: Vec<bool> = order.iter().cloned().map(|c| store.save(c)).collect();

        assert_eq!(inserted.iter().filter(|i| **i).count(), 2);
        assert_eq!(store.len(), 2);
        let mut uris: Vec<String> = store.citations().into_iter().map(|c| c.uri).collect();
        uris.sort();
        assert_eq!(uris, vec!["https://a", "https://b"]);
    }
}

#[test]
fn is_saved_matches_by_id_or_uri() {
    let store = CitationStore::load(Arc::new(MemoryBlobStore::new()));
    assert!(store.save(citation("1", "https://a")));

    assert!(store.is_saved(&citation("1", "https://elsewhere")));
    assert!(store.is_saved(&citation("fresh-id", "https://a")));
    assert!(!store.is_saved(&citation("2", "https://b")));
}

#[test]
fn remove_and_clear() {
    let store = CitationStore::load(Arc::new(MemoryBlobStore::new()));
    store.save(citation("1", "https://a"));
    store.save(citation("2", "https://b"));

    assert!(store.remove("1"));
    assert!(!store.remove("1"));
    assert_eq!(store.citations(), vec![citation("2", "https://b")]);

    store.clear();
    assert!(store.is_empty());
}

#[test]
fn citations_survive_a_reload_from_disk() {
    let dir = tempfile::tempdir().unwrap();

    let store = CitationStore::load(Arc::new(FileBlobStore::new(dir.path())));
    store.save(citation("1", "https://a"));
    store.save(citation("2", "https://b").with_snippet("an excerpt"));
    store.remove("1");
    drop(store);

    let reloaded = CitationStore::load(Arc::new(FileBlobStore::new(dir.path())));
    assert_eq!(
        reloaded.citations(),
        vec![citation("2", "https://b").with_snippet("an excerpt")]
    );
}

#[test]
fn corrupt_snapshot_loads_as_empty_store() {
    let blob_store = Arc::new(MemoryBlobStore::new());
    blob_store.set(CITATIONS_KEY, "{not json").unwrap();

    let store = CitationStore::load(blob_store.clone());
    assert!(store.is_empty());

    assert!(store.save(citation("1", "https://a")));
    let snapshot = blob_store.get(CITATIONS_KEY).unwrap().unwrap();
    let persisted: Vec<Citation> = serde_json::from_str(&snapshot).unwrap();
    assert_eq!(persisted, vec![citation("1", "https://a")]);
}

#[test]
fn duplicate_uris_in_snapshot_are_dropped_on_load() {
    let snapshot = serde_json::to_string(&vec![
        citation("1", "https://a"),
        citation("2", "https://a"),
        citation("3", "https://b"),
    ])
    .unwrap();
    let blob_store = Arc::new(MemoryBlobStore::new());
    blob_store.set(CITATIONS_KEY, &snapshot).unwrap();

    let store = CitationStore::load(blob_store);
    assert_eq!(
        store.citations(),
        vec![citation("1", "https://a"), citation("3", "https://b")]
    );
}

#[test]
fn persistence_failures_do_not_reach_the_caller() {
    let store = CitationStore::load(Arc::new(ReadOnlyBlobStore { snapshot: None }));

    assert!(store.save(citation("1", "https://a")));
    assert!(store.is_saved(&citation("1", "https://a")));
    assert!(store.remove("1"));
    assert!(store.is_empty());
}

use futures::StreamExt;
use scholar_sdk::{Citation, Language, SearchResult};
use scholar_session::{
    history::{HistoryCollection, InMemoryHistoryCollection, NewHistoryItem},
    HistoryStore, UserId,
};
use std::{sync::Arc, time::Duration};
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(2);

fn result(text: &str) -> SearchResult {
    SearchResult::new(
        text,
        vec![Citation::new("s1", "Source", format!("https://{text}.example"))],
    )
}

fn record(query: &str, timestamp: i64) -> NewHistoryItem {
    NewHistoryItem {
        query: query.to_string(),
        result: result(query),
        timestamp,
        language: Language::En,
    }
}

fn setup() -> (Arc<InMemoryHistoryCollection>, HistoryStore) {
    let collection = Arc::new(InMemoryHistoryCollection::new());
    let store = HistoryStore::new(collection.clone());
    (collection, store)
}

fn queries(store: &HistoryStore) -> Vec<String> {
    store.items().into_iter().map(|item| item.query).collect()
}

#[tokio::test]
async fn feed_is_ordered_newest_first_after_adds_and_deletes() {
    let (collection, store) = setup();
    let alice = UserId::new("alice");
    store.subscribe(&alice);

    let mid = collection.create(&alice, record("mid", 200)).await.unwrap();
    collection.create(&alice, record("old", 100)).await.unwrap();
    collection.create(&alice, record("new", 300)).await.unwrap();
    collection.create(&alice, record("mid-later", 200)).await.unwrap();

    assert_eq!(queries(&store), vec!["new", "mid", "mid-later", "old"]);

    assert!(store.delete_one(Some(&alice), &mid).await);
    assert_eq!(queries(&store), vec!["new", "mid-later", "old"]);
}

#[tokio::test]
async fn append_assigns_ids_and_is_delivered_to_subscribers() {
    let (_, store) = setup();
    let alice = UserId::new("alice");
    let mut subscription = store.subscribe(&alice);
    assert!(subscription.current().is_empty());

    let id = store
        .append(Some(&alice), "quantum", result("quantum"), Language::Si)
        .await
        .unwrap();
    assert_eq!(id.len(), 20);

    let delivered = timeout(WAIT, subscription.changed()).await.unwrap().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].id, id);
    assert_eq!(delivered[0].query, "quantum");
    assert_eq!(delivered[0].language, Language::Si);
    assert_eq!(store.find(&id), Some(delivered[0].clone()));
}

#[tokio::test]
async fn no_identity_means_empty_view_and_no_writes() {
    let (collection, store) = setup();

    assert_eq!(
        store.append(None, "ignored", result("ignored"), Language::En).await,
        None
    );
    assert!(!store.delete_one(None, "anything").await);
    assert!(store.is_empty());
    assert_eq!(store.active_identity(), None);
    assert_eq!(collection.len(&UserId::new("alice")), 0);
}

#[tokio::test]
async fn delete_all_is_observed_all_at_once() {
    let (collection, store) = setup();
    let alice = UserId::new("alice");
    let subscription = store.subscribe(&alice);
    for (i, query) in ["a", "b", "c"].into_iter().enumerate() {
        collection
            .create(&alice, record(query, i64::try_from(i).unwrap()))
            .await
            .unwrap();
    }

    let observer = tokio::spawn(async move {
        let mut sizes = Vec::new();
        let mut stream = Box::pin(subscription.into_stream());
        while let Some(items) = stream.next().await {
            sizes.push(items.len());
            if items.is_empty() {
                break;
            }
        }
        sizes
    });

    let items = store.items();
    assert_eq!(items.len(), 3);
    assert!(store.delete_all(Some(&alice), &items).await);

    let sizes = timeout(WAIT, observer).await.unwrap().unwrap();
    assert!(sizes.iter().all(|size| *size == 3 || *size == 0));
    assert_eq!(sizes.last(), Some(&0));
    assert_eq!(collection.len(&alice), 0);
}

#[tokio::test]
async fn failed_writes_leave_the_feed_untouched() {
    let (collection, store) = setup();
    let alice = UserId::new("alice");
    store.subscribe(&alice);
    let kept = store
        .append(Some(&alice), "kept", result("kept"), Language::En)
        .await
        .unwrap();

    collection.set_offline(true);
    assert_eq!(
        store.append(Some(&alice), "lost", result("lost"), Language::En).await,
        None
    );
    assert!(!store.delete_one(Some(&alice), &kept).await);
    let items = store.items();
    assert!(!store.delete_all(Some(&alice), &items).await);
    assert_eq!(queries(&store), vec!["kept"]);

    collection.set_offline(false);
    assert!(store.delete_all(Some(&alice), &items).await);
    assert!(store.is_empty());
}

#[tokio::test]
async fn switching_identity_closes_the_previous_subscription() {
    let (collection, store) = setup();
    let alice = UserId::new("alice");
    let bob = UserId::new("bob");
    collection.create(&alice, record("alice's", 1)).await.unwrap();
    collection.create(&bob, record("bob's", 2)).await.unwrap();

    let mut alice_subscription = store.subscribe(&alice);
    assert_eq!(queries(&store), vec!["alice's"]);

    store.set_identity(Some(&bob));
    assert!(alice_subscription.is_closed());
    assert!(alice_subscription.current().is_empty());
    assert_eq!(timeout(WAIT, alice_subscription.changed()).await.unwrap(), None);
    assert_eq!(store.active_identity(), Some(bob.clone()));
    assert_eq!(queries(&store), vec!["bob's"]);

    // alice's records still exist, they are just no longer visible.
    collection.create(&alice, record("alice's later", 3)).await.unwrap();
    assert_eq!(queries(&store), vec!["bob's"]);

    store.set_identity(None);
    assert!(store.is_empty());
    assert_eq!(store.active_identity(), None);
}

#[tokio::test]
async fn subscribing_twice_to_the_same_identity_keeps_the_subscription() {
    let (_, store) = setup();
    let alice = UserId::new("alice");
    let first = store.subscribe(&alice);
    let second = store.subscribe(&alice);

    assert!(!first.is_closed());
    assert!(!second.is_closed());

    store.unsubscribe();
    assert!(first.is_closed());
    assert!(second.is_closed());
}

#[tokio::test]
async fn stream_ends_when_the_store_is_dropped() {
    let (_, store) = setup();
    let alice = UserId::new("alice");
    let mut stream = Box::pin(store.subscribe(&alice).into_stream());

    assert_eq!(stream.next().await, Some(Vec::new()));
    drop(store);
    assert_eq!(timeout(WAIT, stream.next()).await.unwrap(), None);
}

#[tokio::test]
async fn unsubscribing_a_handle_closes_the_store_view() {
    let (_, store) = setup();
    let alice = UserId::new("alice");
    let subscription = store.subscribe(&alice);
    let mut clone = subscription.clone();
    store
        .append(Some(&alice), "q", result("q"), Language::En)
        .await
        .unwrap();
    assert_eq!(store.len(), 1);

    subscription.unsubscribe();
    assert!(clone.is_closed());
    assert!(clone.current().is_empty());
    assert_eq!(timeout(WAIT, clone.changed()).await.unwrap(), None);
    assert_eq!(store.active_identity(), None);
    assert!(store.is_empty());

    let again = store.subscribe(&alice);
    assert!(!again.is_closed());
    assert_eq!(again.current().len(), 1);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn dropping_a_handle_keeps_the_subscription() {
    let (_, store) = setup();
    let alice = UserId::new("alice");
    drop(store.subscribe(&alice));

    store
        .append(Some(&alice), "kept", result("kept"), Language::En)
        .await
        .unwrap();
    assert_eq!(store.active_identity(), Some(alice));
    assert_eq!(queries(&store), vec!["kept"]);
}

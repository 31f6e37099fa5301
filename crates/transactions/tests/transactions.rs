use std::{thread, time::Duration};

use stun_kit_transactions::{TransactionStore, TransactionStoreOptions};

#[test]
fn transaction_lifecycle() {
    let store = TransactionStore::new(TransactionStoreOptions {
        invalidation: Duration::from_millis(100),
    });

    // a pending transaction is consumed exactly once before the timer
    // fires.
    let id = store.insert(String::from("binding towards stun.example.org"));
    assert_eq!(
        store.unset(&id).as_deref(),
        Some("binding towards stun.example.org")
    );
    assert_eq!(store.unset(&id), None);

    // an abandoned transaction ages out and is unreachable afterwards.
    let id = store.insert(String::from("abandoned"));
    thread::sleep(Duration::from_millis(350));
    assert_eq!(store.unset(&id), None);

    // records inserted after a scavenger pass are unaffected by it.
    let id = store.insert(String::from("fresh"));
    assert_eq!(store.unset(&id).as_deref(), Some("fresh"));
}

#[test]
fn dropping_the_store_drops_the_records() {
    let store = TransactionStore::new(TransactionStoreOptions::default());
    let id = store.insert(vec![1u8, 2, 3]);

    let weak = std::sync::Arc::downgrade(&store);
    drop(store);

    // nothing keeps the table alive, pending contexts went with it.
    assert!(weak.upgrade().is_none());
    let _ = id;
}

//! ## STUN transaction tracking
//!
//! A STUN request and its response are correlated by the 96 bit
//! transaction id the client put on the wire. This crate owns that
//! bookkeeping for client style usages: every outgoing request gets a
//! fresh id bound to a caller supplied context, a response consumes the
//! record by id, and abandoned records age out in the background so the
//! table cannot grow without bound.
//!
//! The codec stays pure; this is the only stateful piece of the
//! workspace and the only one that spawns a thread.

use std::{
    sync::{Arc, Weak},
    thread,
    time::{Duration, Instant},
};

use ahash::{HashMap, HashMapExt};
use codec::message::generate_transaction_id;
use parking_lot::Mutex;

/// The 96 bit transaction id of a STUN message.
pub type TransactionId = [u8; 12];

/// The default time a pending transaction survives without being
/// consumed: 150 seconds.
pub const DEFAULT_INVALIDATION: Duration = Duration::from_micros(150_000_000);

#[derive(Debug, Clone, Copy)]
pub struct TransactionStoreOptions {
    /// How long a record stays reachable after insertion. The
    /// background scavenger also wakes at this interval, so a record
    /// disappears between one and two periods after it expired.
    pub invalidation: Duration,
}

impl Default for TransactionStoreOptions {
    fn default() -> Self {
        Self {
            invalidation: DEFAULT_INVALIDATION,
        }
    }
}

struct Record<T> {
    created: Instant,
    data: T,
}

/// Time indexed transaction id to context mapping.
///
/// The store owns its records but not the meaning of the contexts they
/// carry; whatever went in through [`TransactionStore::insert`] comes
/// back verbatim from [`TransactionStore::unset`]. A record is
/// consumed at most once: either the caller unset it or the scavenger
/// dropped it, never both.
///
/// # Test
///
/// ```
/// use stun_kit_transactions::TransactionStore;
///
/// let store = TransactionStore::new(Default::default());
///
/// let id = store.insert("pending binding");
/// assert_eq!(store.unset(&id), Some("pending binding"));
/// assert_eq!(store.unset(&id), None);
/// ```
pub struct TransactionStore<T> {
    transactions: Mutex<HashMap<TransactionId, Record<T>>>,
    invalidation: Duration,
}

impl<T: Send + 'static> TransactionStore<T> {
    /// Create a store and spawn its scavenger.
    ///
    /// The scavenger holds only a weak reference: dropping the last
    /// [`Arc`] drops every record and ends the thread on its next
    /// wakeup.
    pub fn new(options: TransactionStoreOptions) -> Arc<Self> {
        let this = Arc::new(Self {
            transactions: Mutex::new(HashMap::with_capacity(255)),
            invalidation: options.invalidation,
        });

        let this_ = Arc::downgrade(&this);
        thread::spawn(move || scavenger(this_, options.invalidation));

        this
    }
}

impl<T> TransactionStore<T> {
    /// Bind a context to a freshly generated transaction id and return
    /// the id for the caller to put on the wire.
    ///
    /// Generation does not check the table for an existing entry; with
    /// 96 bits of CSPRNG output a collision is not expected to happen,
    /// and if it does the older record is replaced under a warning.
    pub fn insert(&self, data: T) -> TransactionId {
        let id = generate_transaction_id();
        let record = Record {
            created: Instant::now(),
            data,
        };

        if self.transactions.lock().insert(id, record).is_some() {
            log::warn!("transaction id collision, replaced the pending record");
        }

        id
    }

    /// Atomically remove and return the context bound to the id.
    ///
    /// Returns `None` when the id was never inserted, was already
    /// consumed, or aged out.
    pub fn unset(&self, id: &TransactionId) -> Option<T> {
        self.transactions.lock().remove(id).map(|it| it.data)
    }

    /// The configured record lifetime.
    pub fn invalidation(&self) -> Duration {
        self.invalidation
    }

    /// Number of pending transactions.
    pub fn len(&self) -> usize {
        self.transactions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.lock().is_empty()
    }
}

// This is a background thread that silently drops transactions nobody
// consumed in time. Expired keys are collected first and removed in a
// second step, so the scan never observes its own structural changes.
fn scavenger<T>(store: Weak<TransactionStore<T>>, invalidation: Duration) {
    let mut expired = Vec::with_capacity(255);

    loop {
        thread::sleep(invalidation);

        let Some(store) = store.upgrade() else {
            break;
        };

        let now = Instant::now();
        let mut transactions = store.transactions.lock();

        expired.extend(
            transactions
                .iter()
                .filter(|(_, it)| now.duration_since(it.created) >= invalidation)
                .map(|(id, _)| *id),
        );

        for id in expired.drain(..) {
            transactions.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_before_expiry() {
        let store = TransactionStore::new(TransactionStoreOptions {
            invalidation: Duration::from_millis(100),
        });

        let context = Box::new(42u32);
        let id = store.insert(context);

        assert_eq!(store.unset(&id), Some(Box::new(42u32)));
        assert_eq!(store.unset(&id), None);
    }

    #[test]
    fn expire_when_abandoned() {
        let store = TransactionStore::new(TransactionStoreOptions {
            invalidation: Duration::from_millis(50),
        });

        let id = store.insert(());
        assert_eq!(store.len(), 1);

        // two full scavenger periods with margin.
        thread::sleep(Duration::from_millis(200));

        assert_eq!(store.unset(&id), None);
        assert!(store.is_empty());
    }

    #[test]
    fn ids_are_unique_per_insert() {
        let store = TransactionStore::new(Default::default());

        let a = store.insert(1);
        let b = store.insert(2);

        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }
}

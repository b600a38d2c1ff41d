//! A single slot channel where a new item replaces any item that was not yet taken.

use std::sync::{Arc, Mutex, MutexGuard};

/// Create a connected publisher and drain pair.
pub fn channel<T>() -> (Publisher<T>, Drain<T>) {
    let slot = Arc::new(Mutex::new(None));
    (
        Publisher { slot: slot.clone() },
        Drain { slot },
    )
}

fn lock<T>(slot: &Mutex<Option<T>>) -> MutexGuard<'_, Option<T>> {
    // The slot only holds plain data, so a poisoned lock is still consistent.
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Producer side of the slot.
#[derive(Debug)]
pub struct Publisher<T> {
    slot: Arc<Mutex<Option<T>>>,
}

impl<T> Clone for Publisher<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T> Publisher<T> {
    /// Store the item, returning the stale item it replaced if the consumer had not taken it.
    pub fn publish(&self, item: T) -> Option<T> {
        lock(&self.slot).replace(item)
    }
}

/// Consumer side of the slot. Never blocks on an empty slot.
#[derive(Debug)]
pub struct Drain<T> {
    slot: Arc<Mutex<Option<T>>>,
}

impl<T> Drain<T> {
    /// Take the pending item, if any.
    pub fn try_take(&self) -> Option<T> {
        lock(&self.slot).take()
    }

    /// Iterate until the slot is empty.
    pub fn drain(&self) -> impl Iterator<Item = T> + '_ {
        std::iter::from_fn(|| self.try_take())
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.slot).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_publish_wins() {
        let (tx, rx) = channel();
        assert_eq!(tx.publish("a"), None);
        assert_eq!(tx.publish("b"), Some("a"));

        let drained: Vec<_> = rx.drain().collect();
        assert_eq!(drained, ["b"]);
        assert!(rx.is_empty());
    }

    #[test]
    fn empty_take_returns_none() {
        let (_tx, rx) = channel::<u8>();
        assert_eq!(rx.try_take(), None);
        assert_eq!(rx.drain().count(), 0);
    }

    #[test]
    fn publish_after_take_does_not_evict() {
        let (tx, rx) = channel();
        tx.publish(1);
        assert_eq!(rx.try_take(), Some(1));
        assert_eq!(tx.publish(2), None);
        assert_eq!(rx.try_take(), Some(2));
    }

    #[test]
    fn works_across_threads() {
        let (tx, rx) = channel();
        let handle = std::thread::spawn(move || {
            for i in 0..100 {
                tx.publish(i);
            }
        });
        handle.join().unwrap();
        assert_eq!(rx.try_take(), Some(99));
    }
}

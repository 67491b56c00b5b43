//! Fixed-capacity circular handoff between one producer and one consumer.
//!
//! All state lives behind a single mutex. Three condition variables hang off
//! it: `not_full` (producer waits), `not_empty` (consumer waits) and `drained`
//! (the orchestrator waits for both run counters to reach a target). Every
//! wait is a `while` loop over its predicate, so spurious wakeups are
//! harmless.
//!
//! Signalling uses `notify_one` on `not_full`/`not_empty`, which is enough
//! while there is exactly one waiter per side. Supporting several producers
//! or consumers means switching those to `notify_all`.

use std::sync::{Condvar, Mutex, MutexGuard};

// The Inner struct holds everything the mutex guards.
#[derive(Debug)]
struct Inner<T> {
    slots: Vec<Option<T>>,
    write: usize,
    read: usize,
    occupied: usize,
    produced: usize,
    consumed: usize,
}

#[derive(Debug)]
pub struct BoundedBuffer<T> {
    capacity: usize,
    mutex: Mutex<Inner<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    drained: Condvar,
}

impl<T> BoundedBuffer<T> {
    /// # Panics
    ///
    /// Panics if `capacity` is 0; such a buffer could never accept an item.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "BoundedBuffer capacity must be > 0");
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        BoundedBuffer {
            capacity,
            mutex: Mutex::new(Inner {
                slots,
                write: 0,
                read: 0,
                occupied: 0,
                produced: 0,
                consumed: 0,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            drained: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.mutex.lock().expect("BoundedBuffer mutex poisoned")
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // The accessors below are snapshots and may be stale once returned.
    pub fn occupied(&self) -> usize {
        self.lock().occupied
    }

    pub fn produced(&self) -> usize {
        self.lock().produced
    }

    pub fn consumed(&self) -> usize {
        self.lock().consumed
    }

    /// Stores `item` at the write cursor, blocking while the buffer is full.
    pub fn put(&self, item: T) {
        let mut inner = self.lock();
        while inner.occupied == self.capacity {
            inner = self
                .not_full
                .wait(inner)
                .expect("BoundedBuffer condvar poisoned");
        }
        let at = inner.write;
        debug_assert!(inner.slots[at].is_none());
        inner.slots[at] = Some(item);
        inner.write = (at + 1) % self.capacity;
        inner.occupied += 1;
        inner.produced += 1;
        self.not_empty.notify_one();
        self.drained.notify_all();
    }

    /// Takes the item at the read cursor, blocking while the buffer is empty.
    pub fn get(&self) -> T {
        let mut inner = self.lock();
        while inner.occupied == 0 {
            inner = self
                .not_empty
                .wait(inner)
                .expect("BoundedBuffer condvar poisoned");
        }
        let at = inner.read;
        let item = inner.slots[at]
            .take()
            .expect("BoundedBuffer read slot empty while occupied");
        inner.read = (at + 1) % self.capacity;
        inner.occupied -= 1;
        inner.consumed += 1;
        self.not_full.notify_one();
        self.drained.notify_all();
        item
    }

    /// Blocks until at least `target` items have been both put and taken.
    pub fn wait_until_drained(&self, target: usize) {
        let mut inner = self.lock();
        while inner.produced < target || inner.consumed < target {
            inner = self
                .drained
                .wait(inner)
                .expect("BoundedBuffer condvar poisoned");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_single_thread() {
        let buf = BoundedBuffer::new(3);
        buf.put(1);
        buf.put(2);
        assert_eq!(buf.occupied(), 2);
        assert_eq!(buf.get(), 1);
        buf.put(3);
        buf.put(4);
        assert_eq!(buf.occupied(), 3);
        assert_eq!(buf.get(), 2);
        assert_eq!(buf.get(), 3);
        assert_eq!(buf.get(), 4);
        assert_eq!(buf.occupied(), 0);
        assert_eq!(buf.produced(), 4);
        assert_eq!(buf.consumed(), 4);
    }

    #[test]
    #[should_panic(expected = "capacity must be > 0")]
    fn test_zero_capacity_panics() {
        let _ = BoundedBuffer::<u8>::new(0);
    }

    #[test]
    fn test_fifo_across_threads() {
        for capacity in [1, 2, 7] {
            let buf = BoundedBuffer::new(capacity);
            let n = 5_000;
            let got = thread::scope(|s| {
                s.spawn(|| {
                    for i in 0..n {
                        buf.put(i);
                    }
                });
                let consumer = s.spawn(|| {
                    let mut got = Vec::with_capacity(n);
                    for _ in 0..n {
                        assert!(buf.occupied() <= capacity);
                        got.push(buf.get());
                    }
                    got
                });
                buf.wait_until_drained(n);
                consumer.join().unwrap()
            });
            assert_eq!(got, (0..n).collect::<Vec<_>>());
            assert_eq!(buf.produced(), n);
            assert_eq!(buf.consumed(), n);
            assert_eq!(buf.occupied(), 0);
        }
    }

    #[test]
    fn test_put_blocks_when_full() {
        let buf = BoundedBuffer::new(1);
        buf.put("a");
        thread::scope(|s| {
            let producer = s.spawn(|| buf.put("b"));
            thread::sleep(Duration::from_millis(50));
            assert_eq!(buf.produced(), 1);
            assert_eq!(buf.occupied(), 1);
            assert_eq!(buf.get(), "a");
            producer.join().unwrap();
        });
        assert_eq!(buf.produced(), 2);
        assert_eq!(buf.get(), "b");
    }

    #[test]
    fn test_wait_until_drained_zero() {
        let buf = BoundedBuffer::<u8>::new(1);
        buf.wait_until_drained(0);
    }
}

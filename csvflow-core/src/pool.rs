//! A process-wide pool of reusable buffers.
//!
//! Readers and writers rent their char arenas, read buffers and transcoding
//! buffers here and return them on drop, so that opening and closing many
//! short-lived readers does not churn the allocator. The pool is initialized
//! lazily on first rental and lives until process exit. Rent and return are
//! internally synchronized.

use std::sync::{Mutex, OnceLock};

use log::trace;

/// The maximum number of buffers retained per bucket.
const MAX_POOLED: usize = 16;

/// Buffers larger than this are dropped instead of returned to the pool.
///
/// This bounds the memory a burst of very wide rows can pin for the rest of
/// the process lifetime.
const MAX_RETAINED: usize = 1 << 20;

struct Pool {
    strings: Mutex<Vec<String>>,
    chars: Mutex<Vec<Vec<char>>>,
    bytes: Mutex<Vec<Vec<u8>>>,
}

fn pool() -> &'static Pool {
    static POOL: OnceLock<Pool> = OnceLock::new();
    POOL.get_or_init(|| Pool {
        strings: Mutex::new(Vec::new()),
        chars: Mutex::new(Vec::new()),
        bytes: Mutex::new(Vec::new()),
    })
}

fn rent<T>(bucket: &Mutex<Vec<T>>, min_capacity: usize, new: impl Fn(usize) -> T, reserve: impl Fn(&mut T, usize)) -> T {
    let pooled = bucket.lock().unwrap().pop();
    match pooled {
        Some(mut buf) => {
            reserve(&mut buf, min_capacity);
            buf
        }
        None => {
            trace!("buffer pool miss, allocating {} fresh", min_capacity);
            new(min_capacity)
        }
    }
}

fn give<T>(bucket: &Mutex<Vec<T>>, buf: T, capacity: usize) {
    if capacity > MAX_RETAINED {
        return;
    }
    let mut bucket = bucket.lock().unwrap();
    if bucket.len() < MAX_POOLED {
        bucket.push(buf);
    }
}

/// Rent a cleared `String` with at least `min_capacity` bytes of storage.
pub fn rent_string(min_capacity: usize) -> String {
    rent(&pool().strings, min_capacity, String::with_capacity, |s, n| {
        s.reserve(n);
    })
}

/// Return a `String` to the pool.
pub fn give_string(mut buf: String) {
    buf.clear();
    let capacity = buf.capacity();
    give(&pool().strings, buf, capacity);
}

/// Rent a cleared `Vec<char>` with at least `min_capacity` slots.
pub fn rent_chars(min_capacity: usize) -> Vec<char> {
    rent(&pool().chars, min_capacity, Vec::with_capacity, |v, n| {
        v.reserve(n);
    })
}

/// Return a `Vec<char>` to the pool.
pub fn give_chars(mut buf: Vec<char>) {
    buf.clear();
    let capacity = buf.capacity();
    give(&pool().chars, buf, capacity);
}

/// Rent a cleared `Vec<u8>` with at least `min_capacity` bytes.
pub fn rent_bytes(min_capacity: usize) -> Vec<u8> {
    rent(&pool().bytes, min_capacity, Vec::with_capacity, |v, n| {
        v.reserve(n);
    })
}

/// Return a `Vec<u8>` to the pool.
pub fn give_bytes(mut buf: Vec<u8>) {
    buf.clear();
    let capacity = buf.capacity();
    give(&pool().bytes, buf, capacity);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_round_trip() {
        let mut s = rent_string(64);
        assert!(s.capacity() >= 64);
        s.push_str("hello");
        give_string(s);

        let s = rent_string(0);
        assert!(s.is_empty());
    }

    #[test]
    fn rented_buffers_are_cleared() {
        let mut b = rent_bytes(16);
        b.extend_from_slice(b"junk");
        give_bytes(b);
        assert!(rent_bytes(16).is_empty());
    }

    #[test]
    fn oversized_buffers_are_dropped() {
        let b = rent_bytes(MAX_RETAINED + 1);
        let cap = b.capacity();
        give_bytes(b);
        // Not observable directly; this mostly checks we don't panic on the
        // drop path for large buffers.
        assert!(cap > MAX_RETAINED);
    }
}

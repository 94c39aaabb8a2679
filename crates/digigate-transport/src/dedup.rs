//! Duplicate-frame store using two-set rotation.
//!
//! Frames are keyed by the SHA-256 of their address text and payload. When
//! the current set exceeds the rotation threshold it becomes the previous
//! set and a new empty set is started; both sets are consulted.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use crate::services::DupeCheck;

/// Default rotation threshold of a [`DupeStore`].
pub const DUPE_ROTATION_THRESHOLD: usize = 4096;

type FrameKey = [u8; 32];

fn frame_key(address: &[u8], payload: &[u8]) -> FrameKey {
    let mut hasher = Sha256::new();
    hasher.update(address);
    hasher.update([0u8]);
    hasher.update(payload);
    hasher.finalize().into()
}

/// Recently seen frames, in two generations.
pub struct DupeStore {
    current: HashSet<FrameKey>,
    prev: HashSet<FrameKey>,
    threshold: usize,
}

impl DupeStore {
    /// Store rotating at `DUPE_ROTATION_THRESHOLD` entries.
    pub fn new() -> Self {
        Self::with_threshold(DUPE_ROTATION_THRESHOLD)
    }

    /// Store rotating when the current generation exceeds `threshold`.
    pub fn with_threshold(threshold: usize) -> Self {
        Self {
            current: HashSet::new(),
            prev: HashSet::new(),
            threshold,
        }
    }

    fn contains(&self, key: &FrameKey) -> bool {
        self.current.contains(key) || self.prev.contains(key)
    }

    fn maybe_rotate(&mut self) {
        if self.current.len() > self.threshold {
            self.prev = std::mem::take(&mut self.current);
        }
    }

    /// Entries in both generations.
    pub fn len(&self) -> usize {
        self.current.len() + self.prev.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty() && self.prev.is_empty()
    }

    /// Entries in the current generation.
    pub fn current_len(&self) -> usize {
        self.current.len()
    }

    /// Entries in the previous generation.
    pub fn prev_len(&self) -> usize {
        self.prev.len()
    }
}

impl Default for DupeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DupeCheck for DupeStore {
    fn register(&mut self, address: &[u8], payload: &[u8]) -> bool {
        let key = frame_key(address, payload);
        if self.contains(&key) {
            return false;
        }
        self.current.insert(key);
        self.maybe_rotate();
        true
    }

    fn is_duplicate(&self, address: &[u8], payload: &[u8]) -> bool {
        self.contains(&frame_key(address, payload))
    }
}

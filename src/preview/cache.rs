use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use super::projection::Preview;

/// Number of previews kept by default
pub const DEFAULT_CAPACITY: usize = 20;

/// Least-recently-used store of finished previews, keyed by session path
#[derive(Debug, Clone)]
pub struct PreviewCache {
    capacity: usize,
    /// Most recently used at the back
    entries: VecDeque<(PathBuf, Preview)>,
}

impl Default for PreviewCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl PreviewCache {
    pub fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), entries: VecDeque::with_capacity(capacity) }
    }

    pub fn get(&mut self, path: &Path) -> Option<&Preview> {
        let index = self.entries.iter().position(|(p, _)| p == path)?;
        let entry = self.entries.remove(index)?;
        self.entries.push_back(entry);
        self.entries.back().map(|(_, preview)| preview)
    }

    pub fn insert(&mut self, path: PathBuf, preview: Preview) {
        if let Some(index) = self.entries.iter().position(|(p, _)| *p == path) {
            self.entries.remove(index);
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back((path, preview));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

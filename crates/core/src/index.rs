use crate::error::StorageError;
use crate::models::IndexEntry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const ENTRIES_FILE: &str = "entries.json";
const FORMAT_VERSION: u32 = 1;

#[derive(Deserialize)]
struct PersistedIndex {
    version: u32,
    entries: Vec<IndexEntry>,
}

#[derive(Serialize)]
struct PersistedIndexRef<'a> {
    version: u32,
    entries: &'a [IndexEntry],
}

/// Persistent store of (vector, passage, metadata) entries with cosine
/// nearest-neighbor search. One directory per corpus; single concurrent
/// writer assumed.
pub struct VectorIndex {
    dir: PathBuf,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Loads persisted entries from `dir` if present, otherwise starts an
    /// empty index there. Unreadable or unparseable state is a
    /// [`StorageError::Corrupt`], never silently discarded.
    pub fn open_or_create(dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(dir)?;
        let file = dir.join(ENTRIES_FILE);

        let entries = if file.exists() {
            let raw = fs::read_to_string(&file)?;
            let persisted: PersistedIndex =
                serde_json::from_str(&raw).map_err(|error| StorageError::Corrupt {
                    path: file.display().to_string(),
                    details: error.to_string(),
                })?;
            if persisted.version != FORMAT_VERSION {
                return Err(StorageError::Corrupt {
                    path: file.display().to_string(),
                    details: format!("unsupported format version {}", persisted.version),
                });
            }
            persisted.entries
        } else {
            Vec::new()
        };

        tracing::debug!(dir = %dir.display(), count = entries.len(), "opened vector index");

        Ok(Self {
            dir: dir.to_path_buf(),
            entries,
        })
    }

    /// Appends fully-constructed entries. No deduplication: re-inserting
    /// the same content grows the index.
    pub fn insert(&mut self, entries: Vec<IndexEntry>) {
        self.entries.extend(entries);
    }

    /// Top-`k` entries by cosine similarity, descending; entries with equal
    /// similarity keep their insertion order.
    pub fn search(
        &self,
        query_vector: &[f32],
        k: usize,
    ) -> Result<Vec<(IndexEntry, f32)>, StorageError> {
        if self.entries.is_empty() {
            return Err(StorageError::EmptyIndex);
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (position, cosine_similarity(query_vector, &entry.vector)))
            .collect();

        // Stable sort keeps insertion order for equal scores.
        scored.sort_by(|left, right| right.1.total_cmp(&left.1));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(position, score)| (self.entries[position].clone(), score))
            .collect())
    }

    /// Flushes all entries to disk via a temp file and rename. Durability
    /// boundary: entries inserted since the last call are lost on crash.
    pub fn persist(&self) -> Result<(), StorageError> {
        let state = PersistedIndexRef {
            version: FORMAT_VERSION,
            entries: &self.entries,
        };
        let data = serde_json::to_string(&state)?;

        let tmp = self.dir.join(format!("{ENTRIES_FILE}.tmp"));
        fs::write(&tmp, data)?;
        fs::rename(&tmp, self.dir.join(ENTRIES_FILE))?;

        tracing::debug!(count = self.entries.len(), "persisted vector index");
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[cfg(test)]
mod tests {
    use super::{cosine_similarity, VectorIndex};
    use crate::error::StorageError;
    use crate::models::IndexEntry;
    use std::fs;
    use tempfile::tempdir;

    fn entry(vector: Vec<f32>, text: &str) -> IndexEntry {
        IndexEntry {
            vector,
            text: text.to_string(),
            document: "doc.pdf".to_string(),
            page: 1,
        }
    }

    #[test]
    fn search_on_empty_index_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let index = VectorIndex::open_or_create(dir.path()).expect("open");
        assert!(matches!(
            index.search(&[1.0, 0.0], 5),
            Err(StorageError::EmptyIndex)
        ));
    }

    #[test]
    fn results_are_ordered_by_descending_similarity() {
        let dir = tempdir().expect("tempdir");
        let mut index = VectorIndex::open_or_create(dir.path()).expect("open");
        index.insert(vec![
            entry(vec![0.0, 1.0], "orthogonal"),
            entry(vec![1.0, 0.0], "aligned"),
            entry(vec![0.7, 0.7], "diagonal"),
        ]);

        let hits = index.search(&[1.0, 0.0], 3).expect("search");
        assert_eq!(hits[0].0.text, "aligned");
        assert_eq!(hits[1].0.text, "diagonal");
        assert_eq!(hits[2].0.text, "orthogonal");
        assert!(hits[0].1 >= hits[1].1 && hits[1].1 >= hits[2].1);
    }

    #[test]
    fn equal_scores_keep_insertion_order() {
        let dir = tempdir().expect("tempdir");
        let mut index = VectorIndex::open_or_create(dir.path()).expect("open");
        index.insert(vec![
            entry(vec![1.0, 0.0], "first inserted"),
            entry(vec![1.0, 0.0], "second inserted"),
        ]);

        let hits = index.search(&[1.0, 0.0], 2).expect("search");
        assert_eq!(hits[0].0.text, "first inserted");
        assert_eq!(hits[1].0.text, "second inserted");
    }

    #[test]
    fn k_larger_than_index_returns_everything() {
        let dir = tempdir().expect("tempdir");
        let mut index = VectorIndex::open_or_create(dir.path()).expect("open");
        index.insert(vec![entry(vec![1.0, 0.0], "only")]);

        let hits = index.search(&[1.0, 0.0], 10).expect("search");
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn persisted_entries_survive_reopen() {
        let dir = tempdir().expect("tempdir");
        {
            let mut index = VectorIndex::open_or_create(dir.path()).expect("open");
            index.insert(vec![entry(vec![0.5, 0.5], "durable")]);
            index.persist().expect("persist");
        }

        let reopened = VectorIndex::open_or_create(dir.path()).expect("reopen");
        assert_eq!(reopened.count(), 1);
        let hits = reopened.search(&[0.5, 0.5], 1).expect("search");
        assert_eq!(hits[0].0.text, "durable");
    }

    #[test]
    fn unpersisted_inserts_do_not_survive_reopen() {
        let dir = tempdir().expect("tempdir");
        {
            let mut index = VectorIndex::open_or_create(dir.path()).expect("open");
            index.insert(vec![entry(vec![0.5, 0.5], "volatile")]);
            // no persist()
        }

        let reopened = VectorIndex::open_or_create(dir.path()).expect("reopen");
        assert!(reopened.is_empty());
    }

    #[test]
    fn corrupt_state_is_reported_not_discarded() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("entries.json"), b"{ not json").expect("write");

        let result = VectorIndex::open_or_create(dir.path());
        assert!(matches!(result, Err(StorageError::Corrupt { .. })));
    }

    #[test]
    fn cosine_handles_zero_and_mismatched_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        let similar = cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]);
        assert!((similar - 1.0).abs() < 1e-6);
    }
}

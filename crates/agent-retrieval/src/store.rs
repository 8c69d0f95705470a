//! Document Store
//!
//! Abstraction over vector-tagged record stores. A backend either has a
//! native nearest-neighbor index (`has_native_search`) or exposes its
//! raw records for brute-force fallback scoring. The `Retriever`
//! selects the path through one interface instead of branching on store
//! identity.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::embedding::EmbeddingProvider;
use crate::error::{Result, RetrievalError};
use crate::ranker::{self, ScoredResult};

/// A vector-tagged document, immutable once stored.
///
/// Re-ingestion under the same id replaces the record; dimensionality is
/// fixed per store instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Unique record id
    pub id: String,

    /// Embedding vector (dimensionality fixed per store)
    pub vector: Vec<f32>,

    /// Arbitrary key-value metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,

    /// Original text
    pub text: String,

    /// Ingestion timestamp
    #[serde(default = "Utc::now")]
    pub ingested_at: DateTime<Utc>,
}

impl DocumentRecord {
    pub fn new(id: impl Into<String>, vector: Vec<f32>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            vector,
            metadata: HashMap::new(),
            text: text.into(),
            ingested_at: Utc::now(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Document store trait (Strategy pattern)
///
/// Implement this for each backend: in-memory, MongoDB, LanceDB, etc.
/// Upserts must be atomic per backing instance; reads may run
/// concurrently with writes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Whether the backend has its own nearest-neighbor index
    fn has_native_search(&self) -> bool;

    /// Insert or replace a record by id.
    ///
    /// Fails with `DimensionMismatch` if the vector length differs from
    /// the store's dimensionality (fixed on first insert).
    async fn upsert(&self, record: DocumentRecord) -> Result<()>;

    /// All records, for fallback scoring. O(n), document-count-bounded.
    async fn all_records(&self) -> Result<Vec<DocumentRecord>>;

    /// Top-k by descending score, ties broken by ascending id
    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredResult>>;
}

/// In-memory document store (for development/testing)
///
/// No native index; search is brute-force ranking over all records.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    records: BTreeMap<String, DocumentRecord>,
    dimensions: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.records.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn has_native_search(&self) -> bool {
        false
    }

    async fn upsert(&self, record: DocumentRecord) -> Result<()> {
        let mut inner = self.inner.write().await;

        let actual = record.vector.len();
        match inner.dimensions {
            None => inner.dimensions = Some(actual),
            Some(expected) if expected != actual => {
                return Err(RetrievalError::DimensionMismatch { expected, actual });
            }
            Some(_) => {}
        }

        inner.records.insert(record.id.clone(), record);
        Ok(())
    }

    async fn all_records(&self) -> Result<Vec<DocumentRecord>> {
        Ok(self.inner.read().await.records.values().cloned().collect())
    }

    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredResult>> {
        let inner = self.inner.read().await;
        let candidates: Vec<(String, Vec<f32>)> = inner
            .records
            .values()
            .map(|r| (r.id.clone(), r.vector.clone()))
            .collect();
        ranker::rank(query, &candidates, k)
    }
}

/// Query-side retrieval over a store and an embedding provider.
///
/// Embeds the query text, then takes the native path when the backend
/// has an index, or the brute-force fallback otherwise.
pub struct Retriever {
    store: Arc<dyn DocumentStore>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Retriever {
    pub fn new(store: Arc<dyn DocumentStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, embedder }
    }

    /// Top-k scored results for a text query.
    ///
    /// Fails with `EmptyStore` on the fallback path when no records
    /// exist; callers should treat that as "no results", not fatal.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredResult>> {
        let query_vector = self.embedder.embed(query).await?;

        if self.store.has_native_search() {
            let mut hits = self.store.search(&query_vector, k).await?;
            // Native backends may not guarantee the tie-break
            ranker::enforce_ordering(&mut hits, k);
            return Ok(hits);
        }

        tracing::debug!(k, "no native index, brute-force scoring over all records");
        let records = self.store.all_records().await?;
        if records.is_empty() {
            return Err(RetrievalError::EmptyStore);
        }

        let candidates: Vec<(String, Vec<f32>)> =
            records.into_iter().map(|r| (r.id, r.vector)).collect();
        ranker::rank(&query_vector, &candidates, k)
    }

    /// Like [`search`](Self::search), with each hit joined back to its record
    pub async fn search_records(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<(ScoredResult, DocumentRecord)>> {
        let hits = self.search(query, k).await?;

        let mut by_id: HashMap<String, DocumentRecord> = self
            .store
            .all_records()
            .await?
            .into_iter()
            .map(|r| (r.id.clone(), r))
            .collect();

        Ok(hits
            .into_iter()
            .filter_map(|hit| by_id.remove(&hit.record_id).map(|record| (hit, record)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::StaticEmbedder;

    const QUERY: &str = "find the most relevant course to 'mobile app development'";

    /// Three-course store with embeddings placing Flutter closest to the
    /// mobile-development query
    async fn course_store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .upsert(
                DocumentRecord::new(
                    "flutter",
                    vec![0.9, 0.1, 0.0],
                    "Flutter is a cross-platform mobile development framework created by Google.",
                )
                .with_metadata("topic", serde_json::json!("Mobile")),
            )
            .await
            .unwrap();
        store
            .upsert(
                DocumentRecord::new(
                    "kotlin",
                    vec![0.7, 0.3, 0.0],
                    "Kotlin is a modern programming language for Android development.",
                )
                .with_metadata("topic", serde_json::json!("Mobile")),
            )
            .await
            .unwrap();
        store
            .upsert(
                DocumentRecord::new(
                    "langchain",
                    vec![0.1, 0.9, 0.2],
                    "LangChain is a framework for developing applications powered by language models.",
                )
                .with_metadata("topic", serde_json::json!("AI")),
            )
            .await
            .unwrap();
        store
    }

    fn course_embedder() -> StaticEmbedder {
        StaticEmbedder::new().with_vector(QUERY, vec![1.0, 0.0, 0.0])
    }

    #[tokio::test]
    async fn test_upsert_fixes_dimensionality() {
        let store = MemoryStore::new();
        store
            .upsert(DocumentRecord::new("a", vec![1.0, 0.0], "first"))
            .await
            .unwrap();

        let err = store
            .upsert(DocumentRecord::new("b", vec![1.0, 0.0, 0.0], "second"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RetrievalError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let store = MemoryStore::new();
        store
            .upsert(DocumentRecord::new("a", vec![1.0, 0.0], "old text"))
            .await
            .unwrap();
        store
            .upsert(DocumentRecord::new("a", vec![0.0, 1.0], "new text"))
            .await
            .unwrap();

        let records = store.all_records().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "new text");
    }

    #[tokio::test]
    async fn test_fallback_search_empty_store() {
        let retriever = Retriever::new(
            Arc::new(MemoryStore::new()),
            Arc::new(StaticEmbedder::new().with_fallback(vec![1.0, 0.0])),
        );

        let err = retriever.search("anything", 3).await.unwrap_err();
        assert!(matches!(err, RetrievalError::EmptyStore));
    }

    #[tokio::test]
    async fn test_most_relevant_course_is_flutter() {
        let retriever = Retriever::new(Arc::new(course_store().await), Arc::new(course_embedder()));

        let results = retriever.search(QUERY, 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].record_id, "flutter");
        assert_eq!(results[0].rank, 1);
    }

    #[tokio::test]
    async fn test_search_records_joins_metadata() {
        let retriever = Retriever::new(Arc::new(course_store().await), Arc::new(course_embedder()));

        let results = retriever.search_records(QUERY, 2).await.unwrap();
        assert_eq!(results.len(), 2);

        let (hit, record) = &results[0];
        assert_eq!(hit.record_id, "flutter");
        assert_eq!(record.metadata["topic"], serde_json::json!("Mobile"));
        assert_eq!(results[1].0.record_id, "kotlin");
    }

    #[tokio::test]
    async fn test_native_path_resorted_to_contract() {
        /// Backend claiming a native index that returns hits unsorted
        struct UnsortedNativeStore;

        #[async_trait]
        impl DocumentStore for UnsortedNativeStore {
            fn has_native_search(&self) -> bool {
                true
            }

            async fn upsert(&self, _record: DocumentRecord) -> Result<()> {
                Ok(())
            }

            async fn all_records(&self) -> Result<Vec<DocumentRecord>> {
                Ok(vec![])
            }

            async fn search(&self, _query: &[f32], _k: usize) -> Result<Vec<ScoredResult>> {
                Ok(vec![
                    ScoredResult {
                        record_id: "b".into(),
                        score: 0.5,
                        rank: 1,
                    },
                    ScoredResult {
                        record_id: "c".into(),
                        score: 0.9,
                        rank: 2,
                    },
                    ScoredResult {
                        record_id: "a".into(),
                        score: 0.5,
                        rank: 3,
                    },
                ])
            }
        }

        let retriever = Retriever::new(
            Arc::new(UnsortedNativeStore),
            Arc::new(StaticEmbedder::new().with_fallback(vec![1.0])),
        );

        let results = retriever.search("anything", 3).await.unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.record_id.as_str()).collect();
        // Descending score, tie between a and b broken by ascending id
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[2].rank, 3);
    }
}

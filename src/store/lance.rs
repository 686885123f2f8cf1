//! Embedded LanceDB document store.
//!
//! Zero-config: data lives in a local directory, no external services
//! required. The collection is a single table created on first start and
//! reopened on every start after that.

use std::path::PathBuf;
use std::sync::Arc;

use arrow_array::types::Float32Type;
use arrow_array::{Array, FixedSizeListArray, RecordBatch, RecordBatchIterator, StringArray};
use arrow_schema::{DataType, Field, Schema};
use async_trait::async_trait;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::embedding::Embedder;
use crate::store::{Document, DocumentStore};

/// Configuration for the embedded LanceDB store.
#[derive(Debug, Clone)]
pub struct LanceStoreConfig {
    /// Path to the data directory.
    pub data_path: PathBuf,
    /// Collection/table name.
    pub collection_name: String,
}

impl Default for LanceStoreConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("./db"),
            collection_name: "docs".to_string(),
        }
    }
}

pub struct LanceStore {
    db: lancedb::Connection,
    config: LanceStoreConfig,
    embedder: Arc<dyn Embedder>,
    table: Arc<RwLock<Option<lancedb::Table>>>,
}

impl LanceStore {
    /// Open (or create) the database directory and connect.
    ///
    /// The collection itself is opened by [`initialize`](DocumentStore::initialize).
    pub async fn new(
        config: LanceStoreConfig,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&config.data_path).map_err(|e| StoreError::Backend {
            reason: format!("Failed to create data dir {:?}: {}", config.data_path, e),
        })?;

        let path = config.data_path.to_string_lossy().to_string();
        let db = lancedb::connect(&path)
            .execute()
            .await
            .map_err(|e| StoreError::Backend {
                reason: format!("Failed to connect to LanceDB: {}", e),
            })?;

        Ok(Self {
            db,
            config,
            embedder,
            table: Arc::new(RwLock::new(None)),
        })
    }

    fn build_schema(&self) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("text", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    self.embedder.dimension() as i32,
                ),
                true,
            ),
        ]))
    }

    async fn get_table(&self) -> Result<lancedb::Table, StoreError> {
        let guard = self.table.read().await;
        guard.clone().ok_or(StoreError::NotInitialized)
    }

    fn make_record_batch(
        &self,
        schema: &Arc<Schema>,
        id: &str,
        text: &str,
        embedding: &[f32],
    ) -> Result<RecordBatch, StoreError> {
        let dimension = self.embedder.dimension();
        if embedding.len() != dimension {
            return Err(StoreError::DimensionMismatch {
                expected: dimension,
                actual: embedding.len(),
            });
        }

        let vector_array = FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(
            vec![Some(embedding.iter().map(|v| Some(*v)).collect::<Vec<_>>())],
            dimension as i32,
        );

        RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![id])),
                Arc::new(StringArray::from(vec![text])),
                Arc::new(vector_array),
            ],
        )
        .map_err(|e| StoreError::Backend {
            reason: format!("Failed to create record batch: {}", e),
        })
    }

    fn parse_document(&self, batch: &RecordBatch, row: usize) -> Option<Document> {
        let id_col = batch
            .column_by_name("id")
            .and_then(|c| c.as_any().downcast_ref::<StringArray>())?;
        let text_col = batch
            .column_by_name("text")
            .and_then(|c| c.as_any().downcast_ref::<StringArray>())?;

        Some(Document {
            id: id_col.value(row).to_string(),
            text: text_col.value(row).to_string(),
        })
    }
}

#[async_trait]
impl DocumentStore for LanceStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        let table_names =
            self.db
                .table_names()
                .execute()
                .await
                .map_err(|e| StoreError::Backend {
                    reason: format!("Failed to list tables: {}", e),
                })?;

        let table = if table_names.contains(&self.config.collection_name) {
            self.db
                .open_table(&self.config.collection_name)
                .execute()
                .await
                .map_err(|e| StoreError::Backend {
                    reason: format!(
                        "Failed to open table '{}': {}",
                        self.config.collection_name, e
                    ),
                })?
        } else {
            // Create the table from an initial empty batch carrying the schema
            let schema = self.build_schema();
            let empty_batch = RecordBatch::new_empty(schema.clone());
            let batches = RecordBatchIterator::new(vec![Ok(empty_batch)], schema);

            self.db
                .create_table(&self.config.collection_name, Box::new(batches))
                .execute()
                .await
                .map_err(|e| StoreError::Backend {
                    reason: format!(
                        "Failed to create table '{}': {}",
                        self.config.collection_name, e
                    ),
                })?
        };

        let mut guard = self.table.write().await;
        *guard = Some(table);
        Ok(())
    }

    async fn add(&self, id: &str, text: &str) -> Result<(), StoreError> {
        let table = self.get_table().await?;
        let embedding = self.embedder.embed(text).await?;

        let schema = self.build_schema();
        let batch = self.make_record_batch(&schema, id, text, &embedding)?;
        let batches = RecordBatchIterator::new(vec![Ok(batch)], schema);

        table
            .add(Box::new(batches))
            .execute()
            .await
            .map_err(|e| StoreError::Backend {
                reason: format!("Failed to insert document: {}", e),
            })?;

        Ok(())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Document>, StoreError> {
        let table = self.get_table().await?;
        let embedding = self.embedder.embed(query).await?;

        let results = table
            .vector_search(embedding)
            .map_err(|e| StoreError::Backend {
                reason: format!("Failed to build vector search: {}", e),
            })?
            .distance_type(lancedb::DistanceType::Cosine)
            .limit(limit)
            .execute()
            .await
            .map_err(|e| StoreError::Backend {
                reason: format!("Vector search failed: {}", e),
            })?
            .try_collect::<Vec<_>>()
            .await
            .map_err(|e| StoreError::Backend {
                reason: format!("Failed to collect search results: {}", e),
            })?;

        let mut documents = Vec::new();
        for batch in &results {
            for row in 0..batch.num_rows() {
                if let Some(doc) = self.parse_document(batch, row) {
                    documents.push(doc);
                }
            }
        }

        Ok(documents)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let table = self.get_table().await?;
        table
            .count_rows(None)
            .await
            .map_err(|e| StoreError::Backend {
                reason: format!("Failed to count rows: {}", e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::embedding::HashEmbedder;
    use tempfile::TempDir;

    fn make_test_config(tmp: &TempDir) -> LanceStoreConfig {
        LanceStoreConfig {
            data_path: tmp.path().to_path_buf(),
            collection_name: "test_docs".to_string(),
        }
    }

    async fn make_store(tmp: &TempDir) -> LanceStore {
        LanceStore::new(make_test_config(tmp), Arc::new(HashEmbedder::new(16)))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_initialize_creates_empty_collection() {
        let tmp = TempDir::new().unwrap();
        let store = make_store(&tmp).await;
        store.initialize().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_add_before_initialize_fails() {
        let tmp = TempDir::new().unwrap();
        let store = make_store(&tmp).await;

        let err = store.add("doc-1", "some text").await.unwrap_err();
        assert!(matches!(err, StoreError::NotInitialized));
    }

    #[tokio::test]
    async fn test_add_and_count() {
        let tmp = TempDir::new().unwrap();
        let store = make_store(&tmp).await;
        store.initialize().await.unwrap();

        store.add("doc-1", "Rust is a systems language").await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);

        store.add("doc-2", "Python is interpreted").await.unwrap();
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_search_returns_exact_match_first() {
        let tmp = TempDir::new().unwrap();
        let store = make_store(&tmp).await;
        store.initialize().await.unwrap();

        store.add("doc-1", "The sky is blue.").await.unwrap();
        store.add("doc-2", "Bananas are yellow.").await.unwrap();

        // Identical text embeds identically, so the exact match is nearest
        let results = store.search("The sky is blue.", 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "doc-1");
        assert_eq!(results[0].text, "The sky is blue.");
    }

    #[tokio::test]
    async fn test_search_empty_collection_returns_nothing() {
        let tmp = TempDir::new().unwrap();
        let store = make_store(&tmp).await;
        store.initialize().await.unwrap();

        let results = store.search("anything", 1).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = make_store(&tmp).await;
        store.initialize().await.unwrap();

        store.add("doc-1", "persisted text").await.unwrap();

        // Re-initializing must reopen, not recreate
        store.initialize().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
    }
}

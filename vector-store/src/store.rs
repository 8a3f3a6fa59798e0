use crate::document::DocumentMetadata;
use crate::error::VectorStoreError;
use log::{debug, info};
use rag_embeddings::Embedder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const FORMAT_VERSION: u32 = 1;

/// A search result from the vector store
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Stored document text
    pub document: String,

    /// Metadata stored with the document
    pub metadata: DocumentMetadata,

    /// Cosine similarity (-1.0 to 1.0, higher is better)
    pub score: f32,

    /// Distance from the query vector (lower is better)
    pub distance: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRecord {
    document: String,
    #[serde(default)]
    metadata: DocumentMetadata,
    vector: Vec<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    version: u32,
    dimension: Option<usize>,
    records: Vec<StoredRecord>,
}

/// Flat vector index persisted as a single JSON file.
///
/// Records keep insertion order, so `list_all` returns documents and
/// metadata aligned by position. Search is exhaustive cosine similarity.
pub struct VectorStore {
    db_path: PathBuf,
    dimension: Option<usize>,
    records: Vec<StoredRecord>,
}

impl VectorStore {
    /// Open or create a vector store at the specified path
    pub async fn new(db_path: &Path) -> Result<Self, VectorStoreError> {
        if db_path.exists() {
            return Self::open(db_path).await;
        }

        info!("Creating vector store at {}", db_path.display());
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        Ok(Self {
            db_path: db_path.to_path_buf(),
            dimension: None,
            records: Vec::new(),
        })
    }

    /// Open an existing vector store. Fails if the file is missing or unreadable.
    pub async fn open(db_path: &Path) -> Result<Self, VectorStoreError> {
        info!("Opening vector store at {}", db_path.display());

        if !db_path.exists() {
            return Err(VectorStoreError::NotFound(db_path.to_path_buf()));
        }

        let content = tokio::fs::read(db_path).await?;
        let index: IndexFile = serde_json::from_slice(&content)?;

        if index.version != FORMAT_VERSION {
            return Err(VectorStoreError::Initialization(format!(
                "unsupported index format version {} (expected {FORMAT_VERSION})",
                index.version
            )));
        }

        if let Some(dimension) = index.dimension {
            if let Some(bad) = index.records.iter().find(|r| r.vector.len() != dimension) {
                return Err(VectorStoreError::DimensionMismatch {
                    expected: dimension,
                    actual: bad.vector.len(),
                });
            }
        } else if !index.records.is_empty() {
            return Err(VectorStoreError::Initialization(
                "index has records but no dimension".to_string(),
            ));
        }

        info!(
            "Vector store loaded: {} records, dimension {:?}",
            index.records.len(),
            index.dimension
        );

        Ok(Self {
            db_path: db_path.to_path_buf(),
            dimension: index.dimension,
            records: index.records,
        })
    }

    async fn save_to_disk(&self) -> Result<(), VectorStoreError> {
        let index = IndexFile {
            version: FORMAT_VERSION,
            dimension: self.dimension,
            records: self.records.clone(),
        };
        let content = serde_json::to_vec(&index)?;

        let tmp_path = self.db_path.with_extension("tmp");
        tokio::fs::write(&tmp_path, content).await?;
        tokio::fs::rename(&tmp_path, &self.db_path).await?;
        Ok(())
    }

    /// Embed and append documents, then persist the index
    pub async fn add_documents(
        &mut self,
        embedder: &dyn Embedder,
        documents: Vec<(String, DocumentMetadata)>,
    ) -> Result<(), VectorStoreError> {
        if documents.is_empty() {
            return Ok(());
        }

        info!("Adding {} documents to vector store", documents.len());

        let texts: Vec<String> = documents.iter().map(|(text, _)| text.clone()).collect();
        let embeddings = embedder.embed(texts)?;
        if embeddings.len() != documents.len() {
            return Err(VectorStoreError::AdditionFailed(format!(
                "embedder returned {} vectors for {} documents",
                embeddings.len(),
                documents.len()
            )));
        }

        let dimension = *self.dimension.get_or_insert(embedder.dimension());
        if let Some(bad) = embeddings.iter().find(|v| v.len() != dimension) {
            return Err(VectorStoreError::DimensionMismatch {
                expected: dimension,
                actual: bad.len(),
            });
        }

        for ((document, metadata), vector) in documents.into_iter().zip(embeddings) {
            self.records.push(StoredRecord {
                document,
                metadata,
                vector,
            });
        }

        self.save_to_disk().await?;

        info!("Successfully added documents");
        Ok(())
    }

    /// Nearest neighbours of `query_vector`, most similar first.
    ///
    /// Records with empty document text are never returned.
    pub fn similarity_search(
        &self,
        query_vector: &[f32],
        k: usize,
    ) -> Result<Vec<SearchResult>, VectorStoreError> {
        let Some(dimension) = self.dimension else {
            return Ok(Vec::new());
        };
        if query_vector.len() != dimension {
            return Err(VectorStoreError::DimensionMismatch {
                expected: dimension,
                actual: query_vector.len(),
            });
        }

        debug!("Similarity search over {} records (k: {k})", self.records.len());

        let mut scored: Vec<(usize, f32)> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| !record.document.is_empty())
            .map(|(idx, record)| (idx, cosine_similarity(query_vector, &record.vector)))
            .collect();

        // Stable, so equal scores keep insertion order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let results: Vec<SearchResult> = scored
            .into_iter()
            .take(k)
            .map(|(idx, similarity)| {
                let record = &self.records[idx];
                SearchResult {
                    document: record.document.clone(),
                    metadata: record.metadata.clone(),
                    score: similarity,
                    distance: 1.0 - similarity,
                }
            })
            .collect();

        debug!("Found {} results", results.len());
        Ok(results)
    }

    /// Every stored document and its metadata, aligned by position
    pub fn list_all(&self) -> (Vec<String>, Vec<DocumentMetadata>) {
        self.records
            .iter()
            .map(|record| (record.document.clone(), record.metadata.clone()))
            .unzip()
    }

    /// Get the total number of records in the store
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Vector dimension, once the first document has been added
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        0.0
    } else {
        dot / (mag_a * mag_b)
    }
}

use log::{debug, warn};
use rag_vector_store::DocumentMetadata;
use serde::{Deserialize, Serialize};

/// Title given to documents whose metadata carries none
pub const DEFAULT_TITLE: &str = "Untitled";

/// A retrievable passage. Identity is its content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub title: String,
}

impl Document {
    pub fn new(content: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            title: title.into(),
        }
    }

    pub fn untitled(content: impl Into<String>) -> Self {
        Self::new(content, DEFAULT_TITLE)
    }

    /// First `max_chars` characters of the content, for logging
    pub fn preview(&self, max_chars: usize) -> &str {
        match self.content.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.content[..idx],
            None => &self.content,
        }
    }
}

/// Read-only ordered collection of documents, loaded once from the vector index
#[derive(Debug, Clone, Default)]
pub struct CorpusStore {
    documents: Vec<Document>,
}

impl CorpusStore {
    /// Build the corpus from documents and metadata read back from the index.
    ///
    /// The two lists are zipped by position. Documents with empty content are
    /// dropped; the vector index skips the same records at search time, so both
    /// retrievers see one corpus.
    pub fn from_index_contents(contents: Vec<String>, metadatas: Vec<DocumentMetadata>) -> Self {
        if contents.len() != metadatas.len() {
            warn!(
                "Index returned {} documents but {} metadata entries; extra entries are ignored",
                contents.len(),
                metadatas.len()
            );
        }

        let aligned = contents.len().min(metadatas.len());
        let documents: Vec<Document> = contents
            .into_iter()
            .zip(metadatas)
            .filter(|(content, _)| !content.is_empty())
            .map(|(content, metadata)| {
                let title = metadata.title.unwrap_or_else(|| DEFAULT_TITLE.to_string());
                Document { content, title }
            })
            .collect();

        debug!(
            "Loaded {} documents into corpus ({} empty skipped)",
            documents.len(),
            aligned - documents.len()
        );

        Self { documents }
    }

    pub fn from_documents(documents: Vec<Document>) -> Self {
        Self {
            documents: documents
                .into_iter()
                .filter(|doc| !doc.content.is_empty())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }
}

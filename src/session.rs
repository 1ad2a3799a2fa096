//! The load and chat operations.
//!
//! A [`Session`] owns the current [`EmbeddingIndex`] in a single atomic
//! slot. A load builds a complete new index on the side and publishes it
//! with one swap, so a chat turn sees either the previous index or the new
//! one in full. Failed loads leave the slot untouched.
//!
//! # Example
//!
//! ```rust,no_run
//! use quote_desk::config::Config;
//! use quote_desk::embedding::create_provider;
//! use quote_desk::session::Session;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::minimal();
//! let provider = create_provider(&config.embedding)?;
//! let session = Session::new(config, provider)?;
//!
//! println!("{}", session.load(&["quotes.txt"]).await);
//! let history = session.chat("Price for 150 units of Product Y?", &[]).await;
//! println!("{}", history[0].assistant);
//! # Ok(())
//! # }
//! ```

use arc_swap::ArcSwapOption;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::answer::synthesize;
use crate::chunk::chunk_documents;
use crate::config::Config;
use crate::embedding::{embed_query, EmbeddingProvider};
use crate::error::ChatError;
use crate::extract::FactExtractor;
use crate::index::EmbeddingIndex;
use crate::loader::load_documents;
use crate::models::{ScoredChunk, Turn};

/// Outcome of a successful load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub documents: usize,
    pub chunks: usize,
}

pub struct Session {
    config: Config,
    provider: Arc<dyn EmbeddingProvider>,
    extractor: FactExtractor,
    index: ArcSwapOption<EmbeddingIndex>,
}

impl Session {
    pub fn new(config: Config, provider: Arc<dyn EmbeddingProvider>) -> anyhow::Result<Self> {
        let extractor = FactExtractor::new(&config.answer.product)?;
        Ok(Self {
            config,
            provider,
            extractor,
            index: ArcSwapOption::const_empty(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_indexed(&self) -> bool {
        self.index.load().is_some()
    }

    /// Number of chunks in the current index (0 when nothing is loaded).
    pub fn chunk_count(&self) -> usize {
        self.index.load().as_ref().map(|idx| idx.len()).unwrap_or(0)
    }

    /// Load, chunk and index `paths`, replacing the current index on success.
    pub async fn try_load<P: AsRef<Path>>(&self, paths: &[P]) -> Result<LoadReport, ChatError> {
        if paths.is_empty() {
            return Err(ChatError::NoFilesSelected);
        }

        let docs = load_documents(paths, &self.config.loader)?;
        let chunks = chunk_documents(&docs, &self.config.chunking);
        if chunks.is_empty() {
            return Err(ChatError::EmptyInput);
        }
        info!(documents = docs.len(), chunks = chunks.len(), "chunked documents");

        let report = LoadReport {
            documents: docs.len(),
            chunks: chunks.len(),
        };
        let index = EmbeddingIndex::build(
            self.provider.as_ref(),
            chunks,
            self.config.embedding.batch_size,
        )
        .await?;

        self.index.store(Some(Arc::new(index)));
        info!(chunks = report.chunks, model = self.provider.model_name(), "documents indexed");
        Ok(report)
    }

    /// Load operation with a user-facing status line.
    pub async fn load<P: AsRef<Path>>(&self, paths: &[P]) -> String {
        match self.try_load(paths).await {
            Ok(report) => format!("Successfully loaded {} document chunks.", report.chunks),
            Err(e @ (ChatError::NoFilesSelected | ChatError::EmptyInput)) => {
                warn!("{}", e);
                e.user_message(&self.config.answer.product)
            }
            Err(e) => {
                error!(error = %e, "error loading documents");
                format!("Error loading documents: {}", e)
            }
        }
    }

    /// The `k` indexed chunks nearest to `query`, nearest first.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>, ChatError> {
        let index = self.index.load_full().ok_or(ChatError::NotIndexed)?;
        retrieve_from(&index, self.provider.as_ref(), query, k).await
    }

    /// Answer a single message against the current index.
    pub async fn answer(&self, message: &str) -> Result<String, ChatError> {
        // One snapshot for the whole turn, even if a load lands meanwhile.
        let index = self.index.load_full().ok_or(ChatError::NotIndexed)?;

        let hits = retrieve_from(
            &index,
            self.provider.as_ref(),
            message,
            self.config.retrieval.top_k,
        )
        .await?;
        let facts = self
            .extractor
            .extract(hits.iter().map(|h| h.chunk.text.as_str()));

        let requested = self
            .extractor
            .parse_request(message)
            .ok_or(ChatError::UnparseableRequest)?;

        let answer = synthesize(requested, &facts, &self.config.answer)?;
        Ok(answer.render(&self.config.answer.product))
    }

    /// Chat operation: answer `message` and return `history` with the new
    /// turn appended. Failures become the turn's response text.
    pub async fn chat(&self, message: &str, history: &[Turn]) -> Vec<Turn> {
        let response = match self.answer(message).await {
            Ok(text) => text,
            Err(e) => {
                if matches!(e, ChatError::Embedding(_) | ChatError::Io { .. }) {
                    error!(error = %e, "error processing query");
                }
                e.user_message(&self.config.answer.product)
            }
        };

        let mut updated = history.to_vec();
        updated.push(Turn::new(message, response));
        updated
    }
}

async fn retrieve_from(
    index: &EmbeddingIndex,
    provider: &dyn EmbeddingProvider,
    query: &str,
    k: usize,
) -> Result<Vec<ScoredChunk>, ChatError> {
    let query_vec = embed_query(provider, query)
        .await
        .map_err(|e| ChatError::embedding(format!("{:#}", e)))?;
    Ok(index.nearest(&query_vec, k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmbeddingConfig;
    use crate::embedding::{create_provider, DisabledProvider};
    use std::fs;
    use tempfile::TempDir;

    fn hash_session() -> Session {
        let mut config = Config::minimal();
        config.embedding = EmbeddingConfig {
            provider: "hash".to_string(),
            ..EmbeddingConfig::default()
        };
        let provider = create_provider(&config.embedding).unwrap();
        Session::new(config, provider).unwrap()
    }

    fn write(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn test_chat_before_load() {
        let session = hash_session();
        let history = session.chat("100 units of Product Y please", &[]).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].user, "100 units of Product Y please");
        assert_eq!(history[0].assistant, "Please load documents first.");
        assert!(matches!(session.retrieve("anything", 3).await, Err(ChatError::NotIndexed)));
    }

    #[tokio::test]
    async fn test_load_status_strings() {
        let tmp = TempDir::new().unwrap();
        let session = hash_session();
        let empty: [&Path; 0] = [];
        assert_eq!(session.load(&empty).await, "Error: No files selected.");

        let md = write(&tmp, "a.md", "not a text file");
        assert_eq!(
            session.load(&[md]).await,
            "No documents found in the selected files."
        );

        let txt = write(&tmp, "a.txt", "The price for 100 units of Product Y is $50.");
        assert_eq!(session.load(&[txt]).await, "Successfully loaded 1 document chunks.");
        assert_eq!(session.chunk_count(), 1);
    }

    #[tokio::test]
    async fn test_blank_file_counts_as_no_documents() {
        let tmp = TempDir::new().unwrap();
        let blank = write(&tmp, "blank.txt", "   \n\n  ");
        let session = hash_session();
        assert!(matches!(session.try_load(&[blank]).await, Err(ChatError::EmptyInput)));
        assert!(!session.is_indexed());
    }

    #[tokio::test]
    async fn test_exact_and_estimated_answers() {
        let tmp = TempDir::new().unwrap();
        let txt = write(
            &tmp,
            "quote.txt",
            "Thanks for reaching out. The price for 100 units of Product Y is $50 and we can deliver within 3 days.",
        );
        let session = hash_session();
        session.try_load(&[txt]).await.unwrap();

        let exact = session.answer("What is the price for 100 units of Product Y?").await.unwrap();
        assert!(exact.contains("$50"), "{}", exact);
        assert!(exact.contains("3 days"), "{}", exact);

        let estimate = session.answer("Can I get 150 units of Product Y?").await.unwrap();
        assert!(estimate.contains("approximately $75"), "{}", estimate);
        assert!(estimate.contains("8 days"), "{}", estimate);
    }

    #[tokio::test]
    async fn test_unparseable_and_no_facts() {
        let tmp = TempDir::new().unwrap();
        let txt = write(&tmp, "misc.txt", "Our office hours are 9 to 5.");
        let session = hash_session();
        session.try_load(&[txt]).await.unwrap();

        assert!(matches!(
            session.answer("hello there").await,
            Err(ChatError::UnparseableRequest)
        ));
        assert!(matches!(
            session.answer("40 units of Product Y").await,
            Err(ChatError::NoFactsAvailable)
        ));

        let history = session.chat("hello there", &[]).await;
        assert_eq!(
            history[0].assistant,
            "I'm sorry, but I couldn't determine the quantity you requested."
        );
    }

    #[tokio::test]
    async fn test_chat_appends_to_history() {
        let session = hash_session();
        let prior = vec![Turn::new("hi", "hello")];
        let history = session.chat("second", &prior).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], prior[0]);
        assert_eq!(history[1].user, "second");
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_index() {
        let tmp = TempDir::new().unwrap();
        let txt = write(&tmp, "quote.txt", "The price for 100 units of Product Y is $50.");
        let session = hash_session();
        session.try_load(&[txt]).await.unwrap();

        let missing = tmp.path().join("gone.txt");
        assert_eq!(
            session.load(&[missing]).await,
            "No documents found in the selected files."
        );
        assert!(session.is_indexed());
        assert_eq!(session.chunk_count(), 1);
    }

    #[tokio::test]
    async fn test_reload_replaces_index() {
        let tmp = TempDir::new().unwrap();
        let a = write(&tmp, "a.txt", "The price for 100 units of Product Y is $50.");
        let b = write(&tmp, "b.txt", "The price for 200 units of Product Y is $90.");
        let session = hash_session();

        session.try_load(&[a]).await.unwrap();
        session.try_load(&[b]).await.unwrap();
        assert_eq!(session.chunk_count(), 1);

        let answer = session.answer("100 units of Product Y").await.unwrap();
        assert!(answer.contains("approximately $45"), "{}", answer);
        assert!(!answer.contains("$50"), "{}", answer);
    }

    #[tokio::test]
    async fn test_embedding_failure_reported() {
        let tmp = TempDir::new().unwrap();
        let txt = write(&tmp, "quote.txt", "The price for 100 units of Product Y is $50.");
        let session = Session::new(Config::minimal(), Arc::new(DisabledProvider)).unwrap();

        let status = session.load(&[txt]).await;
        assert!(status.starts_with("Error loading documents: embedding failed"), "{}", status);
        assert!(!session.is_indexed());
    }
}

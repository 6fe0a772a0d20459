//! The typed façade the rest of the system talks to (spec §4.3).
//!
//! Isolates SQL from the retrieval pipeline and agent orchestrator: they
//! see only `vector_search`/`text_search`/`hybrid_search`/document and
//! session operations, never a query string.

use std::collections::HashMap;

use rag_core::document::{Document, EmbeddingProvider};
use rag_core::search::SearchResult;
use rag_core::session::{Message, Role, Session};
use sqlx::PgPool;

use crate::documents::{self, DocumentSummary};
use crate::error::StoreError;
use crate::hybrid;
use crate::sessions;
use crate::text;
use crate::vector;

/// Thin client over a relational store with a vector extension. Holds a
/// shared connection pool and the provider→dimension registry used to
/// reject cross-provider dimension errors before issuing any query.
#[derive(Clone)]
pub struct VectorStoreGateway {
    pool: PgPool,
    dimensions: HashMap<EmbeddingProvider, usize>,
}

impl VectorStoreGateway {
    #[must_use]
    pub fn new(pool: PgPool, dimensions: HashMap<EmbeddingProvider, usize>) -> Self {
        Self { pool, dimensions }
    }

    fn dimension_for(&self, provider: EmbeddingProvider) -> Result<usize, StoreError> {
        self.dimensions
            .get(&provider)
            .copied()
            .ok_or_else(|| StoreError::UnknownProvider(provider.to_string()))
    }

    /// Spec §4.3 operation 1.
    ///
    /// # Errors
    ///
    /// See [`vector::vector_search`].
    pub async fn vector_search(
        &self,
        query_vec: &[f32],
        provider: EmbeddingProvider,
        k: u32,
    ) -> Result<Vec<SearchResult>, StoreError> {
        let dimension = self.dimension_for(provider)?;
        vector::vector_search(&self.pool, query_vec, provider, dimension, k).await
    }

    /// Spec §4.3 operation 2.
    ///
    /// # Errors
    ///
    /// See [`text::text_search`].
    pub async fn text_search(
        &self,
        query_text: &str,
        provider: EmbeddingProvider,
        k: u32,
    ) -> Result<Vec<SearchResult>, StoreError> {
        text::text_search(&self.pool, query_text, provider, k).await
    }

    /// Spec §4.3 operation 3.
    ///
    /// # Errors
    ///
    /// See [`hybrid::hybrid_search`].
    pub async fn hybrid_search(
        &self,
        query_vec: &[f32],
        query_text: &str,
        provider: EmbeddingProvider,
        k: u32,
        w_vec: f64,
        w_text: f64,
    ) -> Result<Vec<SearchResult>, StoreError> {
        let dimension = self.dimension_for(provider)?;
        hybrid::hybrid_search(
            &self.pool, query_vec, query_text, provider, dimension, k, w_vec, w_text,
        )
        .await
    }

    /// # Errors
    ///
    /// See [`documents::get_document`].
    pub async fn get_document(&self, id: &str) -> Result<Document, StoreError> {
        documents::get_document(&self.pool, id).await
    }

    /// # Errors
    ///
    /// See [`documents::list_documents`].
    pub async fn list_documents(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<DocumentSummary>, StoreError> {
        documents::list_documents(&self.pool, limit, offset).await
    }

    /// # Errors
    ///
    /// See [`sessions::create_session`].
    pub async fn create_session(
        &self,
        user_id: Option<String>,
        metadata: serde_json::Value,
    ) -> Result<Session, StoreError> {
        sessions::create_session(&self.pool, user_id, metadata).await
    }

    /// # Errors
    ///
    /// See [`sessions::get_session`].
    pub async fn get_session(&self, id: &str) -> Result<Session, StoreError> {
        sessions::get_session(&self.pool, id).await
    }

    /// # Errors
    ///
    /// See [`sessions::append_message`].
    pub async fn append_message(
        &self,
        session_id: &str,
        role: Role,
        content: String,
        metadata: serde_json::Value,
    ) -> Result<Message, StoreError> {
        sessions::append_message(&self.pool, session_id, role, content, metadata).await
    }

    /// # Errors
    ///
    /// See [`sessions::recent_messages`].
    pub async fn recent_messages(
        &self,
        session_id: &str,
        limit: i64,
    ) -> Result<Vec<Message>, StoreError> {
        sessions::recent_messages(&self.pool, session_id, limit).await
    }

    /// A cheap reachability probe used by readiness checks (spec §4.7,
    /// §4.6 `GET /health`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StoreUnavailable`] if the store cannot be
    /// reached.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

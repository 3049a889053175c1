//! Session registry for the streamable HTTP transport
//!
//! A session binds an opaque id to a live server instance. The registry owns
//! eviction: removing an entry drops the session's close channel, which ends
//! any event stream still attached to it.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

use crate::server::SqlSelectServer;

/// One active session: a server instance plus its close signal
pub struct McpSession {
    server: SqlSelectServer,
    close: watch::Sender<()>,
}

impl McpSession {
    pub fn new(server: SqlSelectServer) -> Self {
        let (close, _) = watch::channel(());
        Self { server, close }
    }

    /// The server handling this session's requests
    pub fn server(&self) -> &SqlSelectServer {
        &self.server
    }

    /// Receiver that fails once the session has been evicted
    ///
    /// Event streams hold only this receiver, never the session itself, so
    /// eviction is what ends them.
    pub fn watch_close(&self) -> watch::Receiver<()> {
        self.close.subscribe()
    }
}

/// Concurrent map from session id to live session
#[derive(Default)]
pub struct SessionStore {
    inner: RwLock<HashMap<String, Arc<McpSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, id: String, session: Arc<McpSession>) {
        self.inner.write().await.insert(id, session);
    }

    pub async fn get(&self, id: &str) -> Option<Arc<McpSession>> {
        self.inner.read().await.get(id).cloned()
    }

    /// Remove the session, giving up the registry's reference to it
    pub async fn remove(&self, id: &str) -> Option<Arc<McpSession>> {
        self.inner.write().await.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcp_common::async_trait;
    use pg_common::{ExecutorError, QueryExecutor, QueryReply};

    struct NoopExecutor;

    #[async_trait]
    impl QueryExecutor for NoopExecutor {
        async fn execute(
            &self,
            _sql: &str,
            _params: &[String],
        ) -> Result<QueryReply, ExecutorError> {
            Ok(QueryReply {
                rows: vec![],
                row_count: 0,
                fields: None,
            })
        }
    }

    fn session() -> Arc<McpSession> {
        Arc::new(McpSession::new(SqlSelectServer::new(Arc::new(NoopExecutor))))
    }

    #[tokio::test]
    async fn test_insert_then_get_returns_same_session() {
        let store = SessionStore::new();
        let created = session();
        store.insert("s1".to_string(), created.clone()).await;

        let found = store.get("s1").await.unwrap();
        assert!(Arc::ptr_eq(&created, &found));
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_none() {
        let store = SessionStore::new();
        assert!(store.get("nope").await.is_none());
    }

    #[tokio::test]
    async fn test_remove_evicts_the_entry() {
        let store = SessionStore::new();
        store.insert("s1".to_string(), session()).await;

        assert!(store.remove("s1").await.is_some());
        assert!(store.get("s1").await.is_none());
        assert!(store.remove("s1").await.is_none());
    }

    #[tokio::test]
    async fn test_close_receiver_fails_after_evict() {
        let store = SessionStore::new();
        store.insert("s1".to_string(), session()).await;

        let mut closed = store.get("s1").await.unwrap().watch_close();
        store.remove("s1").await;

        assert!(closed.changed().await.is_err());
    }
}

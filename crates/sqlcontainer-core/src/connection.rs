//! Connection trait and the factory seam used by the pool

use crate::{QueryResult, Result, StatementResult, Value};
use async_trait::async_trait;
use std::sync::Arc;

/// A physical database connection supplied by a driver
///
/// The pool only relies on the transaction-state and lifecycle methods;
/// `execute` and `query` are what callers use once they hold a reserved
/// connection.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the driver name (e.g., "sqlite", "postgresql", "mysql")
    fn driver_name(&self) -> &str;

    /// Execute a statement that modifies data (INSERT/UPDATE/DELETE) or
    /// configures the session
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult>;

    /// Execute a query that returns rows (SELECT)
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult>;

    /// Whether every statement is committed as soon as it runs
    fn is_auto_commit(&self) -> bool;

    /// Switch autocommit mode
    async fn set_auto_commit(&self, auto_commit: bool) -> Result<()>;

    /// Commit the open transaction
    async fn commit(&self) -> Result<()>;

    /// Roll back the open transaction
    async fn rollback(&self) -> Result<()>;

    /// Close the connection
    async fn close(&self) -> Result<()>;

    /// Check if the connection is closed
    fn is_closed(&self) -> bool;
}

/// Whether two handles refer to the same physical connection.
///
/// Identity is the allocation, not the vtable, so handles obtained through
/// different trait-object coercions still compare equal.
pub fn connection_eq(a: &Arc<dyn Connection>, b: &Arc<dyn Connection>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Everything a driver needs to open one connection
#[derive(Clone)]
pub struct ConnectInfo {
    /// Driver identity, e.g. "com.mysql.jdbc.Driver" or "postgresql"
    pub driver: String,
    /// Connection URI understood by the driver
    pub uri: String,
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for ConnectInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectInfo")
            .field("driver", &self.driver)
            .field("uri", &self.uri)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Factory trait for opening new physical connections
#[async_trait]
pub trait ConnectionFactory: Send + Sync + 'static {
    /// Open a new connection. May block on network I/O for as long as the
    /// driver takes; callers impose no timeout.
    async fn connect(&self, info: &ConnectInfo) -> Result<Arc<dyn Connection>>;
}

#[async_trait]
impl<T: ConnectionFactory> ConnectionFactory for Arc<T> {
    async fn connect(&self, info: &ConnectInfo) -> Result<Arc<dyn Connection>> {
        (**self).connect(info).await
    }
}

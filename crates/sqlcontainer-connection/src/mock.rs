//! Mock connections and factory shared by the unit tests

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use sqlcontainer_core::{
    ConnectInfo, Connection, ConnectionFactory, QueryResult, Result, SqlContainerError,
    StatementResult, Value,
};

/// Mock connection whose failure modes are switched on per test
pub(crate) struct MockConnection {
    pub(crate) id: usize,
    driver: String,
    closed: AtomicBool,
    auto_commit: AtomicBool,
    pub(crate) fail_query: AtomicBool,
    pub(crate) fail_rollback: AtomicBool,
    pub(crate) fail_execute: AtomicBool,
    pub(crate) fail_set_auto_commit: AtomicBool,
    pub(crate) rollbacks: AtomicUsize,
    pub(crate) executed: Mutex<Vec<String>>,
}

impl MockConnection {
    fn new(id: usize, driver: &str) -> Self {
        Self {
            id,
            driver: driver.to_string(),
            closed: AtomicBool::new(false),
            auto_commit: AtomicBool::new(true),
            fail_query: AtomicBool::new(false),
            fail_rollback: AtomicBool::new(false),
            fail_execute: AtomicBool::new(false),
            fail_set_auto_commit: AtomicBool::new(false),
            rollbacks: AtomicUsize::new(0),
            executed: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Connection for MockConnection {
    fn driver_name(&self) -> &str {
        &self.driver
    }

    async fn execute(&self, sql: &str, _params: &[Value]) -> Result<StatementResult> {
        self.executed.lock().push(sql.to_string());
        if self.fail_execute.load(Ordering::SeqCst) {
            return Err(SqlContainerError::Query(format!("cannot execute {}", sql)));
        }
        Ok(StatementResult::default())
    }

    async fn query(&self, sql: &str, _params: &[Value]) -> Result<QueryResult> {
        if self.fail_query.load(Ordering::SeqCst) {
            return Err(SqlContainerError::Query(format!("cannot run {}", sql)));
        }
        Ok(QueryResult::empty())
    }

    fn is_auto_commit(&self) -> bool {
        self.auto_commit.load(Ordering::SeqCst)
    }

    async fn set_auto_commit(&self, auto_commit: bool) -> Result<()> {
        if self.fail_set_auto_commit.load(Ordering::SeqCst) {
            return Err(SqlContainerError::Connection("autocommit is locked".into()));
        }
        self.auto_commit.store(auto_commit, Ordering::SeqCst);
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        self.rollbacks.fetch_add(1, Ordering::SeqCst);
        if self.fail_rollback.load(Ordering::SeqCst) {
            return Err(SqlContainerError::Connection("connection reset".into()));
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Mock factory that records every connection it opens
#[derive(Default)]
pub(crate) struct MockFactory {
    counter: AtomicUsize,
    pub(crate) fail_connect: AtomicBool,
    /// Connections opened from now on fail every `execute`
    pub(crate) fail_execute: AtomicBool,
    /// Connections opened from now on refuse to change autocommit
    pub(crate) fail_set_auto_commit: AtomicBool,
    /// How many connections were still open each time `connect` ran
    pub(crate) live_at_connect: Mutex<Vec<usize>>,
    created: Mutex<Vec<Arc<MockConnection>>>,
}

impl MockFactory {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn count(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }

    pub(crate) fn created(&self) -> Vec<Arc<MockConnection>> {
        self.created.lock().clone()
    }

    /// The mock behind a handle the pool returned
    pub(crate) fn find(&self, connection: &Arc<dyn Connection>) -> Arc<MockConnection> {
        self.created
            .lock()
            .iter()
            .find(|c| {
                let handle: Arc<dyn Connection> = Arc::clone(c) as Arc<dyn Connection>;
                sqlcontainer_core::connection_eq(&handle, connection)
            })
            .cloned()
            .expect("connection was not created by this factory")
    }
}

#[async_trait]
impl ConnectionFactory for MockFactory {
    async fn connect(&self, info: &ConnectInfo) -> Result<Arc<dyn Connection>> {
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(SqlContainerError::Connection(format!(
                "cannot reach {}",
                info.uri
            )));
        }
        let live = self.created.lock().iter().filter(|c| !c.is_closed()).count();
        self.live_at_connect.lock().push(live);

        let id = self.counter.fetch_add(1, Ordering::SeqCst);
        let connection = Arc::new(MockConnection::new(id, &info.driver));
        connection
            .fail_execute
            .store(self.fail_execute.load(Ordering::SeqCst), Ordering::SeqCst);
        connection.fail_set_auto_commit.store(
            self.fail_set_auto_commit.load(Ordering::SeqCst),
            Ordering::SeqCst,
        );
        self.created.lock().push(Arc::clone(&connection));
        Ok(connection)
    }
}

/// Install a test subscriber once per process
pub(crate) fn init_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive("sqlcontainer_connection=debug".parse().expect("valid directive")),
            )
            .with_test_writer()
            .finish();

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

//! Opening and preparing physical connections for the pool

use std::sync::Arc;

use sqlcontainer_core::{ConnectInfo, Connection, ConnectionFactory, Result};

use super::config::PoolConfig;

/// Session setup run on every new MySQL connection
pub const MYSQL_SETUP_STATEMENT: &str = "SET SESSION sql_mode = 'ANSI'";

/// Dialect-specific statement to run once on a fresh connection
pub(crate) fn setup_statement(driver: &str) -> Option<&'static str> {
    if driver.to_ascii_lowercase().contains("mysql") {
        Some(MYSQL_SETUP_STATEMENT)
    } else {
        None
    }
}

/// Creates connections the way the pool wants them: autocommit off,
/// dialect setup applied.
pub(crate) struct Connector {
    factory: Arc<dyn ConnectionFactory>,
    info: ConnectInfo,
}

impl Connector {
    pub(crate) fn new(factory: Arc<dyn ConnectionFactory>, config: &PoolConfig) -> Self {
        Self {
            factory,
            info: config.connect_info(),
        }
    }

    pub(crate) async fn open(&self) -> Result<Arc<dyn Connection>> {
        let connection = self.factory.connect(&self.info).await?;
        if let Err(e) = connection.set_auto_commit(false).await {
            close_quietly(&connection).await;
            return Err(e);
        }

        if let Some(statement) = setup_statement(&self.info.driver) {
            if let Err(e) = connection.execute(statement, &[]).await {
                tracing::warn!(
                    driver = %self.info.driver,
                    error = %e,
                    "session setup statement failed, continuing"
                );
            }
        }

        tracing::debug!(driver = %self.info.driver, uri = %self.info.uri, "opened pooled connection");
        Ok(connection)
    }

    /// Open `count` connections; on failure close the ones already opened
    pub(crate) async fn open_many(&self, count: usize) -> Result<Vec<Arc<dyn Connection>>> {
        let mut opened = Vec::with_capacity(count);
        for _ in 0..count {
            match self.open().await {
                Ok(connection) => opened.push(connection),
                Err(e) => {
                    for connection in opened {
                        close_quietly(&connection).await;
                    }
                    return Err(e);
                }
            }
        }
        Ok(opened)
    }
}

/// Best-effort close; failures are logged and dropped
pub(crate) async fn close_quietly(connection: &Arc<dyn Connection>) {
    if let Err(e) = connection.close().await {
        tracing::warn!(error = %e, "failed to close pooled connection");
    }
}

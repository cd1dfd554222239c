//! Capability root shared by every handler role

use std::sync::Arc;

#[cfg(feature = "database")]
use sqlx::PgPool;

use crate::{
    config::Config,
    error::{Error, Result},
};

/// Configuration and injected resources available to every handler
///
/// The database connection is injected at construction; handlers never look
/// it up from ambient state. `D` is whatever connection abstraction the
/// application uses (a `PgPool` with the `database` feature).
#[derive(Debug, Clone)]
pub struct BaseHandler<D = ()> {
    config: Arc<Config>,
    db_conn: Option<D>,
}

impl<D> Default for BaseHandler<D> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<D> BaseHandler<D> {
    /// Create a handler base with no database connection
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            db_conn: None,
        }
    }

    /// Inject the database connection
    #[must_use]
    pub fn with_db_conn(mut self, db_conn: D) -> Self {
        self.db_conn = Some(db_conn);
        self
    }

    /// The service configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether unclassified error details may be disclosed
    pub fn debug(&self) -> bool {
        self.config.debug()
    }

    /// The injected database connection
    ///
    /// Fails with [`Error::MissingDatabase`] when none was provided; that is
    /// a deployment fault, not a request failure.
    pub fn db_conn(&self) -> Result<&D> {
        self.db_conn.as_ref().ok_or(Error::MissingDatabase)
    }
}

#[cfg(feature = "database")]
impl BaseHandler<PgPool> {
    /// Build a handler base, connecting to `config.database` when present
    pub async fn connect(config: Config) -> Result<Self> {
        let pool = match config.database {
            Some(ref db_config) => Some(crate::database::create_pool(db_config).await?),
            None => {
                tracing::warn!("No database configured; db_conn() will fail");
                None
            }
        };

        let handler = Self::new(config);
        Ok(match pool {
            Some(pool) => handler.with_db_conn(pool),
            None => handler,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct FakeConn(&'static str);

    #[test]
    fn test_db_conn_missing_is_configuration_error() {
        let handler = BaseHandler::<FakeConn>::new(Config::default());
        let err = handler.db_conn().unwrap_err();
        assert!(matches!(err, Error::MissingDatabase));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_db_conn_returns_injected_connection() {
        let handler = BaseHandler::new(Config::default()).with_db_conn(FakeConn("primary"));
        assert_eq!(handler.db_conn().unwrap(), &FakeConn("primary"));
    }

    #[test]
    fn test_clones_share_config() {
        let mut config = Config::default();
        config.service.debug = true;
        let handler = BaseHandler::<()>::new(config);
        let clone = handler.clone();
        assert!(clone.debug());
        assert!(Arc::ptr_eq(&handler.config, &clone.config));
    }
}

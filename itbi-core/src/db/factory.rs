use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::repository::{PropertyRepository, RepositoryError};

/// Where the property register lives.
///
/// `backend` selects a registered [`RepositoryFactory`]; `connection_string`
/// is handed to it untouched.
///
/// | backend    | connection_string examples          |
/// |------------|-------------------------------------|
/// | `sqlite`   | `properties.db`, `:memory:`         |
///
/// Missing keys take the defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub backend: String,
    pub connection_string: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        }
    }
}

/// One implementation per storage backend, registered at startup.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    /// Opens the store and returns a ready repository. Schema migrations
    /// run here.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn PropertyRepository>, RepositoryError>;
}

/// Backend factories keyed by [`RepositoryFactory::backend_name`].
#[derive(Default)]
pub struct RepositoryRegistry {
    factories: HashMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory, replacing any previous one with the same name.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_factory(
        mut self,
        factory: Box<dyn RepositoryFactory>,
    ) -> Self {
        self.register(factory);
        self
    }

    /// Names of every registered backend, sorted alphabetically.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Opens a repository with the factory named by `config.backend`.
    ///
    /// # Errors
    /// * [`RepositoryError::Configuration`] when no such backend is registered.
    /// * Whatever the factory itself returns.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn PropertyRepository>, RepositoryError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                RepositoryError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        tracing::debug!(backend = factory.backend_name(), "opening property repository");
        factory.create(config).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use crate::models::{NewProperty, Property, StateCode};

    use super::{
        DbConfig, PropertyRepository, RepositoryError, RepositoryFactory, RepositoryRegistry,
    };

    // ── stub repository ──────────────────────────────────────────────────
    // The registry tests only check routing, so no method is ever called.
    struct StubRepository;

    #[async_trait]
    impl PropertyRepository for StubRepository {
        async fn create_property(
            &self,
            _property: NewProperty,
        ) -> Result<Property, RepositoryError> {
            unimplemented!()
        }
        async fn get_property(
            &self,
            _id: i64,
        ) -> Result<Property, RepositoryError> {
            unimplemented!()
        }
        async fn update_property(
            &self,
            _property: &Property,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn delete_property(
            &self,
            _id: i64,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn list_properties(
            &self,
            _state: Option<StateCode>,
        ) -> Result<Vec<Property>, RepositoryError> {
            unimplemented!()
        }
    }

    // ── stub factories ───────────────────────────────────────────────────
    struct StubFactory {
        name: &'static str,
        called: Arc<AtomicBool>,
    }

    #[async_trait]
    impl RepositoryFactory for StubFactory {
        fn backend_name(&self) -> &'static str {
            self.name
        }
        async fn create(
            &self,
            _config: &DbConfig,
        ) -> Result<Box<dyn PropertyRepository>, RepositoryError> {
            self.called.store(true, Ordering::SeqCst);
            Ok(Box::new(StubRepository))
        }
    }

    struct FailingFactory;

    #[async_trait]
    impl RepositoryFactory for FailingFactory {
        fn backend_name(&self) -> &'static str {
            "failing"
        }
        async fn create(
            &self,
            _config: &DbConfig,
        ) -> Result<Box<dyn PropertyRepository>, RepositoryError> {
            Err(RepositoryError::Connection("disk unavailable".to_string()))
        }
    }

    fn stub_factory(name: &'static str) -> (Box<dyn RepositoryFactory>, Arc<AtomicBool>) {
        let flag = Arc::new(AtomicBool::new(false));
        (
            Box::new(StubFactory {
                name,
                called: flag.clone(),
            }),
            flag,
        )
    }

    fn config(backend: &str) -> DbConfig {
        DbConfig {
            backend: backend.to_string(),
            connection_string: ":memory:".to_string(),
        }
    }

    // ── DbConfig ─────────────────────────────────────────────────────────
    #[test]
    fn dbconfig_default_is_sqlite_memory() {
        let cfg = DbConfig::default();
        assert_eq!(cfg.backend, "sqlite");
        assert_eq!(cfg.connection_string, ":memory:");
    }

    // ── registration ─────────────────────────────────────────────────────
    #[test]
    fn new_registry_has_no_backends() {
        assert!(RepositoryRegistry::new().available_backends().is_empty());
    }

    #[test]
    fn available_backends_is_sorted_and_deduplicated() {
        let (f1, _) = stub_factory("sqlite");
        let (f2, _) = stub_factory("postgres");
        let (f3, _) = stub_factory("sqlite");
        let reg = RepositoryRegistry::new()
            .with_factory(f1)
            .with_factory(f2)
            .with_factory(f3);

        assert_eq!(reg.available_backends(), vec!["postgres", "sqlite"]);
    }

    // ── dispatch ─────────────────────────────────────────────────────────
    #[tokio::test]
    async fn create_calls_only_the_matching_factory() {
        let (sqlite, sqlite_called) = stub_factory("sqlite");
        let (postgres, postgres_called) = stub_factory("postgres");
        let reg = RepositoryRegistry::new()
            .with_factory(sqlite)
            .with_factory(postgres);

        let result = reg.create(&config("sqlite")).await;

        assert!(result.is_ok(), "expected Ok, got {:#?}", result.err());
        assert!(sqlite_called.load(Ordering::SeqCst));
        assert!(!postgres_called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn unknown_backend_names_requested_and_available_backends() {
        let (f, _) = stub_factory("sqlite");
        let reg = RepositoryRegistry::new().with_factory(f);

        match reg.create(&config("postgres")).await {
            Err(RepositoryError::Configuration(msg)) => {
                assert!(msg.contains("postgres"));
                assert!(msg.contains("sqlite"));
            }
            Err(other) => panic!("expected Configuration error, got {other:#?}"),
            Ok(_) => panic!("expected Configuration error, got a repository"),
        }
    }

    #[tokio::test]
    async fn create_propagates_factory_error() {
        let reg = RepositoryRegistry::new().with_factory(Box::new(FailingFactory));

        let err = reg.create(&config("failing")).await.err();

        assert_eq!(
            err,
            Some(RepositoryError::Connection("disk unavailable".to_string()))
        );
    }
}

//! BackendRegistry - name -> backend map with a single active selection

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use contracts::{Backend, MetricsError};
use tracing::{debug, info, instrument};

struct ActiveBackend {
    name: String,
    backend: Arc<dyn Backend>,
}

/// Registry of publishing backends
///
/// Publishers read the active backend through [`BackendRegistry::active`],
/// which clones the `Arc` out under a read lock. Selection swaps the whole
/// entry under a write lock, so a publisher sees either the old or the new
/// backend, never a mix.
#[derive(Default)]
pub struct BackendRegistry {
    backends: RwLock<HashMap<String, Arc<dyn Backend>>>,
    active: RwLock<Option<ActiveBackend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the backend stored under `name`
    ///
    /// Replacing a registered name does not change the active backend;
    /// call [`select_active`](Self::select_active) again to pick it up.
    pub fn register(&self, name: impl Into<String>, backend: Arc<dyn Backend>) {
        let name = name.into();
        debug!(backend = %name, "Registering backend");
        self.backends
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, backend);
    }

    /// Make `name` the backend used by subsequent publishes
    ///
    /// # Errors
    /// `MetricsError::BackendNotFound` if `name` is not registered; the
    /// previous selection is kept.
    #[instrument(name = "registry_select_active", skip(self))]
    pub fn select_active(&self, name: &str) -> Result<(), MetricsError> {
        let backend = self
            .get(name)
            .ok_or_else(|| MetricsError::backend_not_found(name))?;

        *self.active.write().unwrap_or_else(PoisonError::into_inner) = Some(ActiveBackend {
            name: name.to_string(),
            backend,
        });

        info!(backend = %name, "Active backend selected");
        Ok(())
    }

    /// Currently active backend, if any
    pub fn active(&self) -> Option<Arc<dyn Backend>> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|active| Arc::clone(&active.backend))
    }

    /// Name the active backend was selected under
    pub fn active_name(&self) -> Option<String> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|active| active.name.clone())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Backend>> {
        self.backends
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .backends
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use contracts::Event;

    struct NamedBackend(&'static str);

    #[async_trait]
    impl Backend for NamedBackend {
        fn name(&self) -> &str {
            self.0
        }

        async fn publish(&self, _events: &[Event]) -> Result<(), MetricsError> {
            Ok(())
        }
    }

    #[test]
    fn test_nothing_active_by_default() {
        let registry = BackendRegistry::new();
        registry.register("a", Arc::new(NamedBackend("a")));
        assert!(registry.active().is_none());
        assert!(registry.active_name().is_none());
    }

    #[test]
    fn test_select_missing_keeps_previous() {
        let registry = BackendRegistry::new();
        registry.register("a", Arc::new(NamedBackend("a")));
        registry.select_active("a").unwrap();

        let err = registry.select_active("missing").unwrap_err();
        assert!(matches!(err, MetricsError::BackendNotFound { ref name } if name == "missing"));
        assert_eq!(registry.active_name().as_deref(), Some("a"));
        assert_eq!(registry.active().map(|b| b.name().to_string()).as_deref(), Some("a"));
    }

    #[test]
    fn test_register_last_writer_wins() {
        let registry = BackendRegistry::new();
        registry.register("out", Arc::new(NamedBackend("first")));
        registry.register("out", Arc::new(NamedBackend("second")));
        registry.register("err", Arc::new(NamedBackend("third")));

        registry.select_active("out").unwrap();
        assert_eq!(registry.active().unwrap().name(), "second");
        assert_eq!(registry.names(), vec!["err", "out"]);
    }
}

//! Per-update resource resolution.
//!
//! A [`ServiceProvider`] is built once at startup and holds singletons plus
//! factories for scoped services. Every dispatched update gets its own
//! [`ServiceScope`]; scoped instances are created on first use, cached for the
//! rest of that update and released when the scope is dropped.
//!
//! ```rust,ignore
//! let provider = ServiceProvider::builder()
//!     .singleton(HttpClient::new())
//!     .scoped(|scope| Ok(WeatherService::new(scope.require::<HttpClient>()?)))
//!     .build();
//!
//! let scope = provider.create_scope();
//! let weather = scope.require::<WeatherService>()?;
//! ```

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::foundation::error::{ServiceError, ServiceResult};

type Instance = Arc<dyn Any + Send + Sync>;
type Factory = Arc<dyn Fn(&ServiceScope) -> ServiceResult<Instance> + Send + Sync>;

enum Registration {
    Singleton(Instance),
    Scoped(Factory),
}

/// Root registry of services.
#[derive(Default)]
pub struct ServiceProvider {
    registrations: HashMap<TypeId, Registration>,
}

impl ServiceProvider {
    /// An empty provider.
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn builder() -> ServiceProviderBuilder {
        ServiceProviderBuilder::default()
    }

    /// Opens a new scope for one update.
    pub fn create_scope(self: &Arc<Self>) -> ServiceScope {
        ServiceScope {
            root: Arc::clone(self),
            instances: Mutex::new(HashMap::new()),
        }
    }
}

impl std::fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("registrations", &self.registrations.len())
            .finish()
    }
}

/// Builder for [`ServiceProvider`].
#[derive(Default)]
pub struct ServiceProviderBuilder {
    registrations: HashMap<TypeId, Registration>,
}

impl ServiceProviderBuilder {
    /// Registers a value shared by every scope.
    pub fn singleton<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.registrations
            .insert(TypeId::of::<T>(), Registration::Singleton(Arc::new(value)));
        self
    }

    /// Registers an already shared value.
    pub fn singleton_arc<T: Send + Sync + 'static>(mut self, value: Arc<T>) -> Self {
        self.registrations
            .insert(TypeId::of::<T>(), Registration::Singleton(value));
        self
    }

    /// Registers a factory run at most once per scope.
    ///
    /// The factory receives the scope so it can resolve its own dependencies.
    pub fn scoped<T, F>(mut self, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ServiceScope) -> ServiceResult<T> + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(move |scope| Ok(Arc::new(factory(scope)?) as Instance));
        self.registrations
            .insert(TypeId::of::<T>(), Registration::Scoped(factory));
        self
    }

    pub fn build(self) -> Arc<ServiceProvider> {
        Arc::new(ServiceProvider {
            registrations: self.registrations,
        })
    }
}

/// Services visible while one update is being dispatched.
pub struct ServiceScope {
    root: Arc<ServiceProvider>,
    instances: Mutex<HashMap<TypeId, Instance>>,
}

impl ServiceScope {
    /// Resolves a service, or `None` if it was never registered.
    ///
    /// Factory errors are treated as absence; use [`require`](Self::require)
    /// to see them.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.require().ok()
    }

    /// Resolves a service, failing if it is not registered.
    pub fn require<T: Send + Sync + 'static>(&self) -> ServiceResult<Arc<T>> {
        let id = TypeId::of::<T>();
        let not_registered = || ServiceError::NotRegistered {
            type_name: type_name::<T>(),
        };

        let instance = match self.root.registrations.get(&id) {
            None => return Err(not_registered()),
            Some(Registration::Singleton(value)) => Arc::clone(value),
            Some(Registration::Scoped(factory)) => {
                if let Some(cached) = self.instances.lock().get(&id) {
                    return Arc::clone(cached).downcast().map_err(|_| not_registered());
                }

                // The lock is not held while the factory runs so it can resolve
                // other services from this scope.
                let created = factory(self)?;
                trace!(service = type_name::<T>(), "Created scoped service");
                Arc::clone(self.instances.lock().entry(id).or_insert(created))
            }
        };

        instance.downcast().map_err(|_| not_registered())
    }

    /// The provider this scope was opened from.
    pub fn provider(&self) -> &Arc<ServiceProvider> {
        &self.root
    }
}

impl std::fmt::Debug for ServiceScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceScope")
            .field("resolved", &self.instances.lock().len())
            .finish()
    }
}

use std::error::Error;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::annotation::{self, ClassDescriptor, ClassTarget, ServiceArg};
use crate::container::core::ContainerCore;
use crate::container::injector::{Injector, InjectorError};
use crate::container::registry::{ConfigurerImpl, Registration, RegistryError};
use crate::container::{Instance, Managed};
use crate::id::{ServiceId, ServiceRef};
use crate::injectable::{Arguments, Injectable};
use crate::module::Module;
use crate::registration;

/// A registry of named singleton services.
///
/// Cloning a [`Container`] is cheap and every clone shares the same records
/// and cached instances.
#[derive(Clone)]
pub struct Container {
    core: Arc<ContainerCore>,
}

impl Container {
    pub fn new() -> Self {
        Self {
            core: Arc::new(ContainerCore::new()),
        }
    }

    /// Builds a container and lets `module` register its services.
    ///
    /// # Errors
    ///
    /// Returns an error if any module fails to configure.
    pub fn init<M>(module: M) -> Result<Self, RegistryError>
    where
        M: Module,
    {
        let mut configurer = ConfigurerImpl::new(Self::new());
        module.setup(&mut configurer);
        configurer.finish()
    }

    /// Registers `C` as its own declaration describes and returns the
    /// identifier it was registered under.
    pub fn declare<C>(&self) -> ServiceId
    where
        C: Injectable,
    {
        let target = ClassTarget::Descriptor(ClassDescriptor::of());
        annotation::declare_service::<C>(self, ServiceArg::Target(target)).finish(self)
    }

    /// Registers `C` under `id` with the given constructor dependencies,
    /// regardless of what `C` declares about its identifier and
    /// dependencies. Its decorator and factory hooks still apply.
    pub fn register<C>(
        &self,
        id: impl Into<ServiceId>,
        dependencies: impl IntoIterator<Item = ServiceRef>,
    ) -> ServiceId
    where
        C: Injectable,
    {
        registration::register::<C>(self, id, dependencies)
    }

    /// Registers a value that is already built.
    pub fn value<T>(&self, id: impl Into<ServiceId>, value: T) -> ServiceId
    where
        T: Managed,
    {
        registration::register_value(self, id, value)
    }

    /// Registers a closure which builds the service on first access.
    pub fn factory<T, F, E>(&self, id: impl Into<ServiceId>, factory: F) -> ServiceId
    where
        T: Managed,
        F: Fn(&dyn Injector) -> Result<T, E> + Send + Sync + 'static,
        E: Into<Box<dyn Error + Send + Sync>> + 'static,
    {
        registration::register_factory(self, id, factory)
    }

    /// Builds a fresh `C` the way the container would, without caching it.
    ///
    /// Arguments provided in `args` are kept; the other dependency slots are
    /// filled from the container.
    ///
    /// # Errors
    ///
    /// Returns an error if a dependency can't be resolved or the construction
    /// fails.
    pub fn instantiate<C>(&self, args: Arguments) -> Result<C, InjectorError>
    where
        C: Injectable,
    {
        registration::instantiate::<C>(self, args)
    }

    /// Drops every cached instance. Registrations stay, so the next access
    /// to any identifier constructs a new instance.
    pub fn reset_providers(&self) -> usize {
        self.core.reset()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.core.contains(id)
    }

    /// Returns every registered identifier in lexical order.
    pub fn ids(&self) -> Vec<ServiceId> {
        self.core.ids()
    }

    pub(crate) fn insert(&self, record: Registration) {
        self.core.register(record);
    }

    pub(crate) fn registration(&self, id: &str) -> Option<Arc<Registration>> {
        self.core.registration(id)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Container")
            .field("ids", &self.ids())
            .finish()
    }
}

impl Injector for Container {
    fn dyn_get(&self, id: &ServiceId) -> Result<Instance, InjectorError> {
        self.core.dyn_get(id)
    }

    fn identify(&self, reference: &ServiceRef) -> ServiceId {
        self.core.identify(reference)
    }
}

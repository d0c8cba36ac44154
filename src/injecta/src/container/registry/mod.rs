mod configurer;
mod provider_map;

use std::error::Error;
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};

use snafu::prelude::*;

use crate::container::injector::{Injector, InjectorError};
use crate::container::{Container, Instance, Managed};
use crate::id::{ClassRef, ServiceId, ServiceRef};
use crate::injectable::Injectable;
use crate::provider::{CallContext, Provider};

pub(crate) use configurer::ConfigurerImpl;
pub(crate) use provider_map::ProviderMap;

/// A post-construction step applied by the container to a fresh instance.
pub type Decorator = Box<dyn Fn(Instance) -> Result<Instance, InjectorError> + Send + Sync>;

/// The deferred instantiation rule stored for one identifier.
pub struct Registration {
    id: ServiceId,
    class: Option<ClassRef>,
    dependencies: Vec<ServiceRef>,
    provider: Box<dyn Provider>,
    decorator: Option<Decorator>,
}

impl Registration {
    pub fn new(id: ServiceId, provider: Box<dyn Provider>) -> Self {
        Self {
            id,
            class: None,
            dependencies: Vec::new(),
            provider,
            decorator: None,
        }
    }

    pub fn with_class(mut self, class: ClassRef) -> Self {
        self.class = Some(class);
        self
    }

    pub fn with_dependencies(mut self, dependencies: Vec<ServiceRef>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn with_decorator(mut self, decorator: Decorator) -> Self {
        self.decorator = Some(decorator);
        self
    }

    pub fn id(&self) -> &ServiceId {
        &self.id
    }

    pub fn class(&self) -> Option<&ClassRef> {
        self.class.as_ref()
    }

    pub fn dependencies(&self) -> &[ServiceRef] {
        &self.dependencies
    }

    /// Runs the provider and then the decorator, if any.
    pub(crate) fn provide(&self, injector: &dyn Injector) -> Result<Instance, InjectorError> {
        let context = CallContext::new(&self.id);
        let object = self.provider.dyn_provide(injector, &context)?;
        match &self.decorator {
            Some(decorator) => decorator(object),
            None => Ok(object),
        }
    }
}

impl Debug for Registration {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("class", &self.class)
            .field("dependencies", &self.dependencies)
            .field("provider", &self.provider)
            .field("decorator", &self.decorator.is_some())
            .finish()
    }
}

/// The interface through which a [`Module`] sets up a container.
///
/// [`Module`]: crate::module::Module
pub trait Configurer {
    fn container(&self) -> &Container;

    fn report_module_error(&mut self, module: &'static str, err: Box<dyn Error + Send + Sync>);
}

pub trait TypedConfigurer: Configurer {
    fn declare<C>(&mut self) -> ServiceId
    where
        C: Injectable,
    {
        self.container().declare::<C>()
    }

    fn register<C>(
        &mut self,
        id: impl Into<ServiceId>,
        dependencies: impl IntoIterator<Item = ServiceRef>,
    ) -> ServiceId
    where
        C: Injectable,
    {
        self.container().register::<C>(id, dependencies)
    }

    fn value<T>(&mut self, id: impl Into<ServiceId>, value: T) -> ServiceId
    where
        T: Managed,
    {
        self.container().value(id, value)
    }

    fn factory<T, F, E>(&mut self, id: impl Into<ServiceId>, factory: F) -> ServiceId
    where
        T: Managed,
        F: Fn(&dyn Injector) -> Result<T, E> + Send + Sync + 'static,
        E: Into<Box<dyn Error + Send + Sync>> + 'static,
    {
        self.container().factory(id, factory)
    }
}

impl<T: Configurer + ?Sized> TypedConfigurer for T {}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum RegistryError {
    #[snafu(display("module {module} fails to setup the configuration"))]
    #[non_exhaustive]
    ModuleInner {
        module: &'static str,
        source: Box<dyn Error + Send + Sync>,
    },
    #[snafu(display("aggregated registry errors:\n{}", AggregatedDisplayer::new(errors)))]
    Aggregated { errors: Vec<RegistryError> },
}

struct AggregatedDisplayer<'a> {
    errors: &'a [RegistryError],
}

impl<'a> AggregatedDisplayer<'a> {
    fn new(errors: &'a [RegistryError]) -> Self {
        Self { errors }
    }
}

impl Display for AggregatedDisplayer<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (i, error) in self.errors.iter().enumerate() {
            writeln!(f, "{:4}: {}", i + 1, error)?;
        }
        Ok(())
    }
}

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::container::injector::{InjectorError, TypedInjector};
use crate::id::ServiceRef;
use crate::injectable::{Arguments, Injectable};
use crate::provider::{CallContext, TypedProvider};

/// The [`Provider`] a container uses to instantiate an [`Injectable`].
///
/// Before delegating to [`Injectable::construct`], it resolves the declared
/// dependencies into the matching positional arguments. A slot the caller
/// already provided is never overwritten, and slots past the dependency list
/// are left alone. Code constructing `C` directly never goes through here.
///
/// [`Provider`]: crate::provider::Provider
pub struct InjectableProvider<C>
where
    C: Injectable,
{
    dependencies: Vec<ServiceRef>,
    _marker: PhantomData<fn() -> C>,
}

impl<C> InjectableProvider<C>
where
    C: Injectable,
{
    pub fn new(dependencies: Vec<ServiceRef>) -> Self {
        Self {
            dependencies,
            _marker: PhantomData,
        }
    }

    pub fn dependencies(&self) -> &[ServiceRef] {
        &self.dependencies
    }

    /// Instantiates `C` from `args`, filling the dependency slots the caller
    /// left empty.
    ///
    /// # Errors
    ///
    /// Returns an error if a dependency can't be resolved or the construction
    /// fails.
    pub fn instantiate<I>(&self, mut args: Arguments, injector: &I) -> Result<C, InjectorError>
    where
        I: TypedInjector + ?Sized,
    {
        for (position, dependency) in self.dependencies.iter().enumerate() {
            if args.is_provided(position) {
                continue;
            }
            let id = injector.identify(dependency);
            let object = injector.dyn_get(&id)?;
            args.fill(position, object);
        }
        C::construct(&mut args, injector.upcast_dyn())
    }
}

impl<C> Debug for InjectableProvider<C>
where
    C: Injectable,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("InjectableProvider")
            .field("service", &C::NAME)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

impl<C> TypedProvider for InjectableProvider<C>
where
    C: Injectable,
{
    type Output = C;

    fn provide<I>(
        &self,
        injector: &I,
        _context: &CallContext<'_>,
    ) -> Result<Arc<Self::Output>, InjectorError>
    where
        I: TypedInjector + ?Sized,
    {
        self.instantiate(Arguments::new(), injector).map(Arc::new)
    }
}

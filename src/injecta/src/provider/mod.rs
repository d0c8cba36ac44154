pub mod context;
pub mod factory;
pub mod injectable;
pub mod instance;

use std::fmt::Debug;
use std::sync::Arc;

use crate::container::injector::{Injector, InjectorError, TypedInjector};
use crate::container::{Instance, Managed};

pub use context::CallContext;

/// A deferred instantiation rule for one service.
///
/// A [`Provider`] is responsible for constructing an object on each request
/// and retrieving all dependencies from an [`Injector`]. Caching is not its
/// business: a container calls its provider at most once per service until
/// the container's cached instances are reset.
///
/// Usually, you don't need to implement [`Provider`] manually, since this is
/// automatically done by [`TypedProvider`]'s blanket implementation.
pub trait Provider: Debug + Send + Sync + 'static {
    /// Provides a newly created type-erased object. A [`Injector`] is needed
    /// since some other objects may be dependent on the object requested by
    /// the caller. The `context` preserves all additional information.
    ///
    /// # Errors
    ///
    /// Returns an error if all dependencies can't be fetched or the object
    /// construction fails.
    fn dyn_provide(
        &self,
        injector: &dyn Injector,
        context: &CallContext<'_>,
    ) -> Result<Instance, InjectorError>;
}

/// A static variant of the [`Provider`] trait, leveraging static dispatch and
/// type-safety.
pub trait TypedProvider: Provider {
    /// The type of the provided service.
    type Output: Managed;

    /// Provides a newly created object of type [`TypedProvider::Output`].
    ///
    /// # Errors
    ///
    /// Returns an error if all dependencies can't be fetched or the object
    /// construction fails.
    fn provide<I>(
        &self,
        injector: &I,
        context: &CallContext<'_>,
    ) -> Result<Arc<Self::Output>, InjectorError>
    where
        I: TypedInjector + ?Sized;
}

impl<T: TypedProvider> Provider for T {
    fn dyn_provide(
        &self,
        injector: &dyn Injector,
        context: &CallContext<'_>,
    ) -> Result<Instance, InjectorError> {
        self.provide(injector, context)
            .map(|obj| -> Instance { obj })
    }
}

use std::error::Error;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::container::injector::{Injector, InjectorError, TypedInjector};
use crate::container::Managed;
use crate::provider::{CallContext, TypedProvider};

/// A [`Provider`] which builds its service by calling a factory with the
/// container.
///
/// An [`InjectorError`] returned by the factory, typically from resolving one
/// of its own dependencies, is passed through untouched. Any other error is
/// reported as [`InjectorError::ObjectConstruction`].
///
/// # Examples
///
/// ```rust
/// # use std::convert::Infallible;
/// # use injecta::provider::factory::FactoryProvider;
/// let provider = FactoryProvider::new(|_| Ok::<_, Infallible>(42));
/// ```
///
/// [`Provider`]: crate::provider::Provider
pub struct FactoryProvider<T, F, E>
where
    T: Managed,
    F: Fn(&dyn Injector) -> Result<T, E> + Send + Sync + 'static,
    E: Into<Box<dyn Error + Send + Sync>>,
{
    factory: F,
    _marker: PhantomData<fn() -> (T, E)>,
}

impl<T, F, E> FactoryProvider<T, F, E>
where
    T: Managed,
    F: Fn(&dyn Injector) -> Result<T, E> + Send + Sync + 'static,
    E: Into<Box<dyn Error + Send + Sync>>,
{
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            _marker: PhantomData,
        }
    }
}

impl<T, F, E> Debug for FactoryProvider<T, F, E>
where
    T: Managed,
    F: Fn(&dyn Injector) -> Result<T, E> + Send + Sync + 'static,
    E: Into<Box<dyn Error + Send + Sync>>,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FactoryProvider<T, F, E>")
            .finish_non_exhaustive()
    }
}

impl<T, F, E> TypedProvider for FactoryProvider<T, F, E>
where
    T: Managed,
    F: Fn(&dyn Injector) -> Result<T, E> + Send + Sync + 'static,
    E: Into<Box<dyn Error + Send + Sync>> + 'static,
{
    type Output = T;

    fn provide<I>(
        &self,
        injector: &I,
        context: &CallContext<'_>,
    ) -> Result<Arc<Self::Output>, InjectorError>
    where
        I: TypedInjector + ?Sized,
    {
        match (self.factory)(injector.upcast_dyn()) {
            Ok(obj) => Ok(Arc::new(obj)),
            Err(err) => {
                let err: Box<dyn Error + Send + Sync> = err.into();
                match err.downcast::<InjectorError>() {
                    Ok(err) => Err(*err),
                    Err(err) => Err(InjectorError::ObjectConstruction {
                        id: context.id().clone(),
                        source: Arc::from(err),
                    }),
                }
            }
        }
    }
}

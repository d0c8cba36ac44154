use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::container::injector::{InjectorError, TypedInjector};
use crate::container::Managed;
use crate::provider::{CallContext, TypedProvider};

/// A [`Provider`] of a value built before registration.
///
/// [`Provider`]: crate::provider::Provider
pub struct InstanceProvider<T>
where
    T: Managed,
{
    instance: Arc<T>,
}

impl<T> InstanceProvider<T>
where
    T: Managed,
{
    pub fn new(instance: T) -> Self {
        Self::shared(Arc::new(instance))
    }

    pub fn shared(instance: Arc<T>) -> Self {
        Self { instance }
    }
}

impl<T> Debug for InstanceProvider<T>
where
    T: Managed,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("InstanceProvider<T>")
            .finish_non_exhaustive()
    }
}

impl<T> TypedProvider for InstanceProvider<T>
where
    T: Managed,
{
    type Output = T;

    fn provide<I>(
        &self,
        _injector: &I,
        _context: &CallContext<'_>,
    ) -> Result<Arc<Self::Output>, InjectorError>
    where
        I: TypedInjector + ?Sized,
    {
        Ok(Arc::clone(&self.instance))
    }
}

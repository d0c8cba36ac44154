use std::any;
use std::error::Error;
use std::sync::Arc;

use snafu::prelude::*;

use crate::container::{Instance, Managed};
use crate::id::{ServiceId, ServiceRef};

/// Read access to the services of a container.
#[cfg_attr(test, mockall::automock)]
pub trait Injector: Send + Sync {
    /// Returns the singleton registered as `id`, constructing it on first
    /// access.
    fn dyn_get(&self, id: &ServiceId) -> Result<Instance, InjectorError>;

    /// Derives the identifier that `reference` stands for in this container.
    fn identify(&self, reference: &ServiceRef) -> ServiceId;
}

pub trait TypedInjector: Injector {
    fn get<T>(&self, id: impl Into<ServiceId>) -> Result<Arc<T>, InjectorError>
    where
        T: Managed,
    {
        let id = id.into();
        let object = self.dyn_get(&id)?;
        object.downcast::<T>().map_err(|_| InjectorError::TypeMismatch {
            id,
            expected: any::type_name::<T>(),
        })
    }

    /// Resolves a service either by identifier or by its type.
    fn resolve<T>(&self, reference: impl Into<ServiceRef>) -> Result<Arc<T>, InjectorError>
    where
        T: Managed,
    {
        let id = self.identify(&reference.into());
        self.get(id)
    }

    fn upcast_dyn(&self) -> &dyn Injector;
}

impl<T> TypedInjector for T
where
    T: Injector,
{
    fn upcast_dyn(&self) -> &dyn Injector {
        self
    }
}

impl TypedInjector for dyn Injector + '_ {
    fn upcast_dyn(&self) -> &dyn Injector {
        self
    }
}

#[derive(Debug, Clone, Snafu)]
#[non_exhaustive]
pub enum InjectorError {
    #[snafu(display("could not find any service registered as {id}"))]
    #[non_exhaustive]
    NotFound { id: ServiceId },
    #[snafu(display("could not use the service {id} as a {expected}"))]
    #[non_exhaustive]
    TypeMismatch {
        id: ServiceId,
        expected: &'static str,
    },
    #[snafu(display("could not find constructor argument #{position} of {service}"))]
    #[non_exhaustive]
    MissingArgument {
        service: &'static str,
        position: usize,
    },
    #[snafu(display("could not use constructor argument #{position} of {service} as a {expected}"))]
    #[non_exhaustive]
    ArgumentMismatch {
        service: &'static str,
        position: usize,
        expected: &'static str,
    },
    #[snafu(display("could not construct the service {id} which depends on itself somehow"))]
    #[non_exhaustive]
    CyclicDependency { id: ServiceId },
    #[snafu(display("could not construct the service {id}"))]
    #[non_exhaustive]
    ObjectConstruction {
        id: ServiceId,
        source: Arc<dyn Error + Send + Sync>,
    },
}

impl InjectorError {
    /// Returns the identifier of the service which fails to be provided, if
    /// the error is bound to one.
    pub fn id(&self) -> Option<&ServiceId> {
        match self {
            Self::NotFound { id }
            | Self::TypeMismatch { id, .. }
            | Self::CyclicDependency { id }
            | Self::ObjectConstruction { id, .. } => Some(id),
            Self::MissingArgument { .. } | Self::ArgumentMismatch { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_injector_get_succeeds() {
        let mut injector = MockInjector::new();
        injector
            .expect_dyn_get()
            .returning(|_| Ok(Arc::new(42i32) as Instance));

        let value: Arc<i32> = injector.get("answer").unwrap();
        assert_eq!(*value, 42);
    }

    #[test]
    fn typed_injector_get_fails_when_type_mismatches() {
        let mut injector = MockInjector::new();
        injector
            .expect_dyn_get()
            .returning(|_| Ok(Arc::new("str") as Instance));

        let res = injector.get::<i32>("answer");
        assert!(matches!(res, Err(InjectorError::TypeMismatch { .. })));
        assert_eq!(res.unwrap_err().id().unwrap(), "answer");
    }

    #[test]
    fn typed_injector_resolve_goes_through_identify() {
        let mut injector = MockInjector::new();
        injector
            .expect_identify()
            .returning(|_| ServiceId::from("resolved"));
        injector
            .expect_dyn_get()
            .withf(|id| id == "resolved")
            .returning(|_| Ok(Arc::new(7u8) as Instance));

        let dyn_injector: &dyn Injector = &injector;
        let value: Arc<u8> = dyn_injector.resolve("alias").unwrap();
        assert_eq!(*value, 7);
    }
}

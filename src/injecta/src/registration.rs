//! Turns service types and values into registration records.

use std::any;
use std::error::Error;

use tracing::debug;

use crate::container::injector::{Injector, InjectorError};
use crate::container::registry::{Decorator, Registration};
use crate::container::{Container, Instance, Managed};
use crate::id::{ClassRef, ServiceId, ServiceRef};
use crate::injectable::{Arguments, Decorate, Hooks, Injectable};
use crate::provider::factory::FactoryProvider;
use crate::provider::injectable::InjectableProvider;
use crate::provider::instance::InstanceProvider;
use crate::provider::Provider;

/// Registers `C` under `id`, filling its leading constructor arguments with
/// `dependencies` in order. The decorator and factory declared by `C` are
/// kept, while its declared identifier and dependencies are not consulted.
pub fn register<C>(
    container: &Container,
    id: impl Into<ServiceId>,
    dependencies: impl IntoIterator<Item = ServiceRef>,
) -> ServiceId
where
    C: Injectable,
{
    let (_, _, hooks) = C::declaration().into_parts();
    register_declared::<C>(container, id.into(), dependencies.into_iter().collect(), hooks)
}

pub(crate) fn register_declared<C>(
    container: &Container,
    id: ServiceId,
    dependencies: Vec<ServiceRef>,
    hooks: Hooks<C>,
) -> ServiceId
where
    C: Injectable,
{
    let provider: Box<dyn Provider> = match hooks.factory {
        Some(factory) => Box::new(FactoryProvider::new(factory)),
        None => Box::new(InjectableProvider::<C>::new(dependencies.clone())),
    };

    debug!(
        service = %id,
        class = C::NAME,
        dependencies = dependencies.len(),
        decorated = hooks.decorator.is_some(),
        factory = hooks.factory.is_some(),
        "registering class",
    );

    let mut record = Registration::new(id.clone(), provider)
        .with_class(ClassRef::of::<C>())
        .with_dependencies(dependencies);
    if let Some(decorate) = hooks.decorator {
        record = record.with_decorator(erase_decorator(id.clone(), decorate));
    }
    container.insert(record);
    id
}

fn erase_decorator<C>(id: ServiceId, decorate: Decorate<C>) -> Decorator
where
    C: Injectable,
{
    Box::new(move |object: Instance| {
        let object = object
            .downcast::<C>()
            .map_err(|_| InjectorError::TypeMismatch {
                id: id.clone(),
                expected: any::type_name::<C>(),
            })?;
        let decorated: Instance = decorate(object);
        Ok(decorated)
    })
}

pub(crate) fn register_value<T>(container: &Container, id: impl Into<ServiceId>, value: T) -> ServiceId
where
    T: Managed,
{
    let id = id.into();
    debug!(service = %id, "registering value");
    let provider = InstanceProvider::new(value);
    container.insert(Registration::new(id.clone(), Box::new(provider)));
    id
}

pub(crate) fn register_factory<T, F, E>(
    container: &Container,
    id: impl Into<ServiceId>,
    factory: F,
) -> ServiceId
where
    T: Managed,
    F: Fn(&dyn Injector) -> Result<T, E> + Send + Sync + 'static,
    E: Into<Box<dyn Error + Send + Sync>> + 'static,
{
    let id = id.into();
    debug!(service = %id, "registering factory");
    let provider = FactoryProvider::new(factory);
    container.insert(Registration::new(id.clone(), Box::new(provider)));
    id
}

/// Runs the constructor path of `C` on `args` without touching the cache.
///
/// The dependencies come from the record `C` is registered with, or from its
/// declaration when the type was never registered.
pub(crate) fn instantiate<C>(container: &Container, args: Arguments) -> Result<C, InjectorError>
where
    C: Injectable,
{
    let class = ClassRef::of::<C>();
    let id = container.identify(&ServiceRef::Class(class));
    let dependencies = match container.registration(id.as_str()) {
        Some(record) if record.class() == Some(&class) => record.dependencies().to_vec(),
        _ => {
            let (_, dependencies, _) = C::declaration().into_parts();
            dependencies
        }
    };
    debug!(service = %id, class = C::NAME, "instantiating class outside the cache");
    InjectableProvider::<C>::new(dependencies).instantiate(args, container)
}

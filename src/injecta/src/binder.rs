//! Binding of single fields to container services.

use std::any;
use std::sync::Arc;

use snafu::prelude::*;
use tracing::trace;

use crate::annotation::{FieldAnnotation, FieldTarget};
use crate::container::injector::{Injector, InjectorError};
use crate::container::{Instance, Managed};
use crate::id::{ServiceId, ServiceRef};

/// An object whose fields can be assigned by name.
///
/// `#[service]` implements this for every struct it is applied to, covering
/// the named fields of type `Arc<T>` or `Inject<T>`.
pub trait FieldHost {
    fn host_name(&self) -> &'static str;

    /// Assigns `value` to `field`.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no such field or `value` has the wrong
    /// type for it.
    fn assign(&mut self, field: &str, value: Instance) -> Result<(), BindError>;
}

#[derive(Debug, Clone, Snafu)]
#[non_exhaustive]
pub enum BindError {
    #[snafu(display("could not find an injectable field {field} on {host}"))]
    #[non_exhaustive]
    UnknownField { host: &'static str, field: String },
    #[snafu(display("could not assign a value to field {field} of {host} which holds a {expected}"))]
    #[non_exhaustive]
    FieldType {
        host: &'static str,
        field: String,
        expected: &'static str,
    },
    #[snafu(display("could not resolve the service {id} for field {field} of {host}"))]
    #[non_exhaustive]
    Resolve {
        host: &'static str,
        field: String,
        id: ServiceId,
        source: InjectorError,
    },
}

impl BindError {
    pub fn unknown_field(host: &'static str, field: &str) -> Self {
        Self::UnknownField {
            host,
            field: field.to_owned(),
        }
    }
}

/// Downcasts a value assigned to a field of `host`.
///
/// # Errors
///
/// Returns [`BindError::FieldType`] if `value` is not a `T`.
pub fn downcast_field<T>(host: &'static str, field: &str, value: Instance) -> Result<Arc<T>, BindError>
where
    T: Managed,
{
    value.downcast::<T>().map_err(|_| BindError::FieldType {
        host,
        field: field.to_owned(),
        expected: any::type_name::<T>(),
    })
}

/// Binds `target` to the service `reference` stands for, or to the service
/// named like the field when there's no reference.
///
/// A legacy target is resolved and assigned right away. A descriptor target
/// only records the reference; it resolves when the owning type is
/// constructed.
///
/// # Errors
///
/// Returns an error if a legacy field can't be resolved or assigned.
pub fn bind_field<T>(
    injector: &dyn Injector,
    target: FieldTarget<'_, T>,
    reference: Option<ServiceRef>,
) -> Result<FieldAnnotation<T>, BindError>
where
    T: Managed,
{
    match target {
        FieldTarget::Legacy { host, field } => {
            let reference = reference.unwrap_or_else(|| ServiceRef::from(field));
            let id = injector.identify(&reference);
            let value = injector.dyn_get(&id).context(ResolveSnafu {
                host: host.host_name(),
                field,
                id: id.clone(),
            })?;
            host.assign(field, value)?;
            trace!(host = host.host_name(), field, service = %id, "bound field");
            Ok(FieldAnnotation::Bound(id))
        }
        FieldTarget::Descriptor(descriptor) => {
            let descriptor = match reference {
                Some(reference) => descriptor.resolving(reference),
                None => descriptor,
            };
            Ok(FieldAnnotation::Descriptor(descriptor))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::annotation::FieldDescriptor;
    use crate::container::injector::MockInjector;

    use super::*;

    struct Greeter {
        greeting: Arc<String>,
    }

    impl FieldHost for Greeter {
        fn host_name(&self) -> &'static str {
            "Greeter"
        }

        fn assign(&mut self, field: &str, value: Instance) -> Result<(), BindError> {
            match field {
                "greeting" => {
                    self.greeting = downcast_field(self.host_name(), field, value)?;
                    Ok(())
                }
                _ => Err(BindError::unknown_field(self.host_name(), field)),
            }
        }
    }

    fn greeter() -> Greeter {
        Greeter {
            greeting: Arc::new(String::from("unset")),
        }
    }

    fn mock_injector() -> MockInjector {
        let mut injector = MockInjector::new();
        injector
            .expect_identify()
            .returning(|reference| ServiceId::new(reference.to_string()));
        injector.expect_dyn_get().returning(|id| match id.as_str() {
            "greeting" => Ok(Arc::new(String::from("hello")) as Instance),
            "salutation" => Ok(Arc::new(String::from("hi")) as Instance),
            "number" => Ok(Arc::new(42u32) as Instance),
            _ => Err(InjectorError::NotFound { id: id.clone() }),
        });
        injector
    }

    #[test]
    fn bind_field_legacy_assigns_by_field_name() {
        let injector = mock_injector();
        let mut host = greeter();

        let target: FieldTarget<'_, String> = FieldTarget::Legacy {
            host: &mut host,
            field: "greeting",
        };
        let annotation = bind_field(&injector, target, None).unwrap();

        assert!(matches!(annotation, FieldAnnotation::Bound(id) if id == "greeting"));
        assert_eq!(host.greeting.as_str(), "hello");
    }

    #[test]
    fn bind_field_legacy_uses_override() {
        let injector = mock_injector();
        let mut host = greeter();

        let target: FieldTarget<'_, String> = FieldTarget::Legacy {
            host: &mut host,
            field: "greeting",
        };
        bind_field(&injector, target, Some(ServiceRef::from("salutation"))).unwrap();
        assert_eq!(host.greeting.as_str(), "hi");
    }

    #[test]
    fn bind_field_legacy_fails_on_malformed_binding() {
        let injector = mock_injector();
        let mut host = greeter();

        let target: FieldTarget<'_, String> = FieldTarget::Legacy {
            host: &mut host,
            field: "farewell",
        };
        let err = bind_field(&injector, target, Some(ServiceRef::from("greeting"))).unwrap_err();
        assert!(matches!(err, BindError::UnknownField { host: "Greeter", .. }));

        let target: FieldTarget<'_, String> = FieldTarget::Legacy {
            host: &mut host,
            field: "greeting",
        };
        let err = bind_field(&injector, target, Some(ServiceRef::from("number"))).unwrap_err();
        assert!(matches!(err, BindError::FieldType { .. }));

        let target: FieldTarget<'_, String> = FieldTarget::Legacy {
            host: &mut host,
            field: "greeting",
        };
        let err = bind_field(&injector, target, Some(ServiceRef::from("missing"))).unwrap_err();
        assert!(matches!(
            err,
            BindError::Resolve { source: InjectorError::NotFound { .. }, .. }
        ));
        assert_eq!(host.greeting.as_str(), "unset");
    }

    #[test]
    fn bind_field_descriptor_defers_resolution() {
        let injector = MockInjector::new();
        let target = FieldTarget::Descriptor(FieldDescriptor::<String>::new("greeting"));

        let annotation = bind_field(&injector, target, Some(ServiceRef::from("salutation"))).unwrap();
        let FieldAnnotation::Descriptor(descriptor) = annotation else {
            panic!("a descriptor target should stay a descriptor");
        };
        assert_eq!(descriptor.reference(), ServiceRef::from("salutation"));
    }
}

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::annotation::DescriptorKind;
use crate::binder::{self, BindError, FieldHost};
use crate::container::injector::{Injector, InjectorError, TypedInjector};
use crate::container::Managed;
use crate::id::{ServiceId, ServiceRef};

/// What a field marker is invoked with.
pub enum FieldArg<'a, T: Managed> {
    /// The parameterized shape, `#[inject("id")]` or `#[inject(Type)]`.
    Id(ServiceRef),
    /// The bare shape, `#[inject]`.
    Target(FieldTarget<'a, T>),
}

/// The field a marker is applied to.
pub enum FieldTarget<'a, T: Managed> {
    /// A field of an object that already exists, assigned in place.
    Legacy {
        host: &'a mut dyn FieldHost,
        field: &'static str,
    },
    /// An initializer evaluated whenever the owning type is constructed.
    Descriptor(FieldDescriptor<T>),
}

/// A field initializer resolving a container service.
///
/// Without an explicit reference the field resolves the service whose
/// identifier is the field name.
pub struct FieldDescriptor<T: Managed> {
    key: &'static str,
    reference: Option<ServiceRef>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Managed> FieldDescriptor<T> {
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            reference: None,
            _marker: PhantomData,
        }
    }

    pub fn resolving(mut self, reference: impl Into<ServiceRef>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn kind(&self) -> DescriptorKind {
        DescriptorKind::Field
    }

    /// Returns the reference this field resolves.
    pub fn reference(&self) -> ServiceRef {
        match &self.reference {
            Some(reference) => reference.clone(),
            None => ServiceRef::from(self.key),
        }
    }

    /// Resolves the field value. Called once per constructed instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the referenced service can't be provided as a `T`.
    pub fn initialize(&self, injector: &dyn Injector) -> Result<Arc<T>, InjectorError> {
        injector.resolve(self.reference())
    }
}

impl<T: Managed> Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FieldDescriptor")
            .field("key", &self.key)
            .field("reference", &self.reference)
            .finish()
    }
}

/// A parameterized field marker waiting for its field.
#[derive(Debug, Clone)]
pub struct FieldMarker {
    reference: ServiceRef,
}

impl FieldMarker {
    pub fn new(reference: impl Into<ServiceRef>) -> Self {
        Self {
            reference: reference.into(),
        }
    }

    pub fn reference(&self) -> &ServiceRef {
        &self.reference
    }

    /// Binds the field with the captured reference.
    ///
    /// # Errors
    ///
    /// Returns an error if a legacy field can't be resolved or assigned.
    pub fn apply<T>(
        self,
        injector: &dyn Injector,
        target: FieldTarget<'_, T>,
    ) -> Result<FieldAnnotation<T>, BindError>
    where
        T: Managed,
    {
        binder::bind_field(injector, target, Some(self.reference))
    }
}

/// The outcome of marking a field.
#[derive(Debug)]
pub enum FieldAnnotation<T: Managed> {
    /// A parameterized marker which has not seen its field yet.
    Marker(FieldMarker),
    /// An initializer to run during construction.
    Descriptor(FieldDescriptor<T>),
    /// A legacy field which has been assigned the service with this
    /// identifier.
    Bound(ServiceId),
}

/// Accepts a field marker in any shape.
///
/// # Errors
///
/// Returns an error if a legacy field can't be resolved or assigned.
pub fn declare_injected_field<T>(
    injector: &dyn Injector,
    arg: FieldArg<'_, T>,
) -> Result<FieldAnnotation<T>, BindError>
where
    T: Managed,
{
    match arg {
        FieldArg::Id(reference) => Ok(FieldAnnotation::Marker(FieldMarker::new(reference))),
        FieldArg::Target(target) => binder::bind_field(injector, target, None),
    }
}

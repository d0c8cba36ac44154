//! Normalization of the ways a service can be marked.
//!
//! A service marker comes in two shapes: bare, applied straight to its target,
//! and parameterized, which first captures an identifier and dependency list
//! and is applied to its target later. A target comes in two generations as
//! well: the type itself, registered on the spot, and a descriptor, which
//! registers once its `finish` step runs. All four combinations end up as the
//! same registration call.
//!
//! `#[service]` expands to the descriptor generation, so most code never
//! calls into this module directly.

mod field;

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::marker::PhantomData;

use tracing::trace;

use crate::container::Container;
use crate::id::{ServiceId, ServiceRef};
use crate::injectable::Injectable;
use crate::registration;

pub use field::{
    declare_injected_field, FieldAnnotation, FieldArg, FieldDescriptor, FieldMarker, FieldTarget,
};

/// The generation of a descriptor, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorKind {
    Class,
    Field,
}

impl Display for DescriptorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Class => f.write_str("class"),
            Self::Field => f.write_str("field"),
        }
    }
}

/// What a service marker is invoked with.
pub enum ServiceArg<C: Injectable> {
    /// The parameterized shape, `#[service("id", deps = [..])]`.
    Id(ServiceMarker),
    /// The bare shape, `#[service]`.
    Target(ClassTarget<C>),
}

/// The thing a service marker is applied to.
pub enum ClassTarget<C: Injectable> {
    /// The type itself. Registration happens when the marker is applied.
    Class(PhantomData<fn() -> C>),
    /// A descriptor whose [`ClassDescriptor::finish`] registers the type.
    Descriptor(ClassDescriptor<C>),
}

impl<C: Injectable> ClassTarget<C> {
    pub fn class() -> Self {
        Self::Class(PhantomData)
    }

    pub fn descriptor() -> Self {
        Self::Descriptor(ClassDescriptor::of())
    }
}

/// A deferred registration of `C`, possibly carrying an identifier and
/// dependency list that override what `C` declares.
pub struct ClassDescriptor<C: Injectable> {
    id: Option<ServiceId>,
    dependencies: Option<Vec<ServiceRef>>,
    _marker: PhantomData<fn() -> C>,
}

impl<C: Injectable> ClassDescriptor<C> {
    pub fn of() -> Self {
        Self {
            id: None,
            dependencies: None,
            _marker: PhantomData,
        }
    }

    pub fn kind(&self) -> DescriptorKind {
        DescriptorKind::Class
    }

    fn overridden(self, id: Option<ServiceId>, dependencies: Option<Vec<ServiceRef>>) -> Self {
        Self {
            id: id.or(self.id),
            dependencies: dependencies.or(self.dependencies),
            _marker: PhantomData,
        }
    }

    /// Registers `C` and returns the identifier it was registered under.
    pub fn finish(self, container: &Container) -> ServiceId {
        register_target::<C>(container, self.id, self.dependencies)
    }
}

/// A parameterized service marker waiting for its target.
#[derive(Debug, Clone)]
pub struct ServiceMarker {
    id: ServiceId,
    dependencies: Option<Vec<ServiceRef>>,
}

impl ServiceMarker {
    pub fn new(id: impl Into<ServiceId>) -> Self {
        Self {
            id: id.into(),
            dependencies: None,
        }
    }

    /// Sets the dependency list, replacing the one the target declares.
    pub fn depends_on(mut self, dependencies: impl IntoIterator<Item = ServiceRef>) -> Self {
        self.dependencies = Some(dependencies.into_iter().collect());
        self
    }

    pub fn id(&self) -> &ServiceId {
        &self.id
    }

    pub fn apply<C>(self, container: &Container, target: ClassTarget<C>) -> ServiceAnnotation<C>
    where
        C: Injectable,
    {
        annotate(container, target, Some(self.id), self.dependencies)
    }
}

/// The outcome of marking a service.
pub enum ServiceAnnotation<C: Injectable> {
    /// A parameterized marker which has not seen its target yet.
    Marker(ServiceMarker),
    /// A descriptor which has not been finished yet.
    Pending(ClassDescriptor<C>),
    /// The type has been registered under this identifier.
    Registered(ServiceId),
}

impl<C: Injectable> ServiceAnnotation<C> {
    /// Completes whatever is still pending and returns the registered
    /// identifier. A marker is applied to a descriptor of `C` first.
    pub fn finish(self, container: &Container) -> ServiceId {
        match self {
            Self::Marker(marker) => marker
                .apply::<C>(container, ClassTarget::descriptor())
                .finish(container),
            Self::Pending(descriptor) => descriptor.finish(container),
            Self::Registered(id) => id,
        }
    }

    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered(_))
    }
}

/// Accepts a service marker in any shape.
///
/// # Examples
///
/// ```rust
/// # use injecta::annotation::{declare_service, ClassTarget, ServiceArg, ServiceMarker};
/// # use injecta::prelude::*;
/// #[service]
/// struct Clock;
///
/// let container = Container::new();
///
/// let bare = declare_service::<Clock>(&container, ServiceArg::Target(ClassTarget::class()));
/// assert_eq!(bare.finish(&container), "Clock");
///
/// let marker = declare_service::<Clock>(&container, ServiceArg::Id(ServiceMarker::new("clock")));
/// assert_eq!(marker.finish(&container), "clock");
/// assert!(container.contains("Clock") && container.contains("clock"));
/// ```
pub fn declare_service<C>(container: &Container, arg: ServiceArg<C>) -> ServiceAnnotation<C>
where
    C: Injectable,
{
    match arg {
        ServiceArg::Id(marker) => ServiceAnnotation::Marker(marker),
        ServiceArg::Target(target) => annotate(container, target, None, None),
    }
}

fn annotate<C>(
    container: &Container,
    target: ClassTarget<C>,
    id: Option<ServiceId>,
    dependencies: Option<Vec<ServiceRef>>,
) -> ServiceAnnotation<C>
where
    C: Injectable,
{
    match target {
        ClassTarget::Class(_) => {
            ServiceAnnotation::Registered(register_target::<C>(container, id, dependencies))
        }
        ClassTarget::Descriptor(descriptor) => {
            trace!(class = C::NAME, kind = %descriptor.kind(), "deferring registration");
            ServiceAnnotation::Pending(descriptor.overridden(id, dependencies))
        }
    }
}

fn register_target<C>(
    container: &Container,
    id: Option<ServiceId>,
    dependencies: Option<Vec<ServiceRef>>,
) -> ServiceId
where
    C: Injectable,
{
    let (declared_id, declared_dependencies, hooks) = C::declaration().into_parts();
    let id = id
        .or(declared_id)
        .unwrap_or_else(|| ServiceId::from(C::NAME));
    let dependencies = dependencies.unwrap_or(declared_dependencies);
    registration::register_declared::<C>(container, id, dependencies, hooks)
}

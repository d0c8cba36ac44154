mod arguments;
mod inject;

use std::error::Error;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::container::injector::{Injector, InjectorError};
use crate::container::Managed;
use crate::id::{ServiceId, ServiceRef};

pub use arguments::Arguments;
pub use inject::Inject;

/// An error returned by a factory hook.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// A post-construction hook which receives the freshly constructed instance
/// and returns the instance to be cached, either the same one or a
/// replacement.
pub type Decorate<C> = fn(Arc<C>) -> Arc<C>;

/// A hook which builds the instance from the container instead of the
/// constructor.
pub type Factory<C> = fn(&dyn Injector) -> Result<C, BoxError>;

/// A type with a declared name.
///
/// The name is what a reference to the type resolves to when the type has
/// never been registered, and what a bare `#[service]` registers it as.
pub trait Service: Managed {
    const NAME: &'static str;
}

/// A type that can be instantiated by a container.
///
/// Usually you don't implement this trait by hand: `#[service]` generates
/// both [`Service`] and [`Injectable`] from the struct definition. A manual
/// implementation looks like this:
///
/// ```rust
/// # use std::sync::Arc;
/// # use injecta::prelude::*;
/// struct Mailer;
///
/// impl Service for Mailer {
///     const NAME: &'static str = "Mailer";
/// }
///
/// impl Injectable for Mailer {
///     fn construct(_args: &mut Arguments, _injector: &dyn Injector) -> Result<Self, InjectorError> {
///         Ok(Mailer)
///     }
/// }
///
/// struct Newsletter {
///     mailer: Arc<Mailer>,
/// }
///
/// impl Service for Newsletter {
///     const NAME: &'static str = "Newsletter";
/// }
///
/// impl Injectable for Newsletter {
///     fn declaration() -> Declaration<Self> {
///         Declaration::new()
///             .with_id("newsletter")
///             .depends_on(ServiceRef::class::<Mailer>())
///     }
///
///     fn construct(args: &mut Arguments, _injector: &dyn Injector) -> Result<Self, InjectorError> {
///         Ok(Newsletter {
///             mailer: args.take(Self::NAME, 0)?,
///         })
///     }
/// }
///
/// let container = Container::new();
/// container.declare::<Mailer>();
/// container.declare::<Newsletter>();
///
/// let newsletter: Arc<Newsletter> = container.get("newsletter").unwrap();
/// let mailer: Arc<Mailer> = container.resolve(ServiceRef::class::<Mailer>()).unwrap();
/// assert!(Arc::ptr_eq(&newsletter.mailer, &mailer));
/// ```
pub trait Injectable: Service + Sized {
    /// Returns what the type declares about its own registration.
    fn declaration() -> Declaration<Self> {
        Declaration::new()
    }

    /// Builds the instance from positional constructor arguments. Fields
    /// bound to the container are resolved through `injector`.
    ///
    /// # Errors
    ///
    /// Returns an error if an argument is missing or of the wrong type, or a
    /// bound field can't be resolved.
    fn construct(args: &mut Arguments, injector: &dyn Injector) -> Result<Self, InjectorError>;
}

/// The registration data a type declares: an optional identifier, the
/// ordered dependencies filling its constructor arguments, and the optional
/// decorator and factory hooks.
pub struct Declaration<C: Injectable> {
    id: Option<ServiceId>,
    dependencies: Vec<ServiceRef>,
    decorator: Option<Decorate<C>>,
    factory: Option<Factory<C>>,
}

impl<C: Injectable> Declaration<C> {
    pub fn new() -> Self {
        Self {
            id: None,
            dependencies: Vec::new(),
            decorator: None,
            factory: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<ServiceId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn depends_on(mut self, dependency: impl Into<ServiceRef>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    pub fn with_decorator(mut self, decorator: Decorate<C>) -> Self {
        self.decorator = Some(decorator);
        self
    }

    pub fn with_factory(mut self, factory: Factory<C>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn id(&self) -> Option<&ServiceId> {
        self.id.as_ref()
    }

    pub fn dependencies(&self) -> &[ServiceRef] {
        &self.dependencies
    }

    pub fn decorator(&self) -> Option<Decorate<C>> {
        self.decorator
    }

    pub fn factory(&self) -> Option<Factory<C>> {
        self.factory
    }

    pub(crate) fn into_parts(self) -> (Option<ServiceId>, Vec<ServiceRef>, Hooks<C>) {
        let hooks = Hooks {
            decorator: self.decorator,
            factory: self.factory,
        };
        (self.id, self.dependencies, hooks)
    }
}

impl<C: Injectable> Debug for Declaration<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Declaration")
            .field("service", &C::NAME)
            .field("id", &self.id)
            .field("dependencies", &self.dependencies)
            .field("decorator", &self.decorator.is_some())
            .field("factory", &self.factory.is_some())
            .finish()
    }
}

/// The hooks of a [`Declaration`], detached from its identifier and
/// dependencies.
pub(crate) struct Hooks<C: Injectable> {
    pub(crate) decorator: Option<Decorate<C>>,
    pub(crate) factory: Option<Factory<C>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Clock;

    impl Service for Clock {
        const NAME: &'static str = "Clock";
    }

    impl Injectable for Clock {
        fn construct(_args: &mut Arguments, _injector: &dyn Injector) -> Result<Self, InjectorError> {
            Ok(Clock)
        }
    }

    fn build(_injector: &dyn Injector) -> Result<Clock, BoxError> {
        Ok(Clock)
    }

    #[test]
    fn declaration_builder_succeeds() {
        let declaration = Declaration::<Clock>::new()
            .with_id("clock")
            .depends_on("timezone")
            .depends_on(ServiceRef::class::<Clock>())
            .with_decorator(|clock| clock)
            .with_factory(build);

        assert_eq!(declaration.id().unwrap(), "clock");
        assert_eq!(declaration.dependencies().len(), 2);
        assert!(declaration.decorator().is_some());
        assert!(declaration.factory().is_some());

        let (id, dependencies, hooks) = declaration.into_parts();
        assert_eq!(id.unwrap(), "clock");
        assert_eq!(dependencies[0], ServiceRef::from("timezone"));
        assert!(hooks.decorator.is_some() && hooks.factory.is_some());
    }

    #[test]
    fn declaration_default_is_empty() {
        let declaration = Clock::declaration();
        assert!(declaration.id().is_none());
        assert!(declaration.dependencies().is_empty());
        assert!(declaration.decorator().is_none());
        assert!(declaration.factory().is_none());
    }
}

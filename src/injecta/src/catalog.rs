//! The catalog of service types declared with `#[service]`.
//!
//! Every `#[service]` type submits an entry at link time, so types declared
//! in any module or crate linked into the binary can be registered with a
//! single [`Container::scan`].

use tracing::debug;

use crate::container::Container;
use crate::id::ServiceId;
use crate::injectable::Injectable;

/// A catalog entry for one service type.
pub struct Declared {
    name: &'static str,
    declare: fn(&Container) -> ServiceId,
}

inventory::collect!(Declared);

impl Declared {
    pub const fn new<C: Injectable>() -> Self {
        Self {
            name: C::NAME,
            declare: declare::<C>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Registers the type with `container` as its declaration describes.
    pub fn declare(&self, container: &Container) -> ServiceId {
        (self.declare)(container)
    }
}

fn declare<C: Injectable>(container: &Container) -> ServiceId {
    container.declare::<C>()
}

/// Iterates over every catalog entry linked into the binary, in no
/// particular order.
pub fn declared() -> impl Iterator<Item = &'static Declared> {
    inventory::iter::<Declared>.into_iter()
}

impl Container {
    /// Registers every type in the catalog and returns how many were
    /// registered.
    ///
    /// Scanning twice registers everything again, which replaces the records
    /// but keeps instances already cached.
    pub fn scan(&self) -> usize {
        let mut count = 0;
        for entry in declared() {
            let id = entry.declare(self);
            debug!(class = entry.name(), service = %id, "registered from catalog");
            count += 1;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::container::injector::{Injector, InjectorError, TypedInjector};
    use crate::id::ServiceRef;
    use crate::injectable::{Arguments, Declaration, Service};

    use super::*;

    struct Scheduler;

    impl Service for Scheduler {
        const NAME: &'static str = "Scheduler";
    }

    impl Injectable for Scheduler {
        fn declaration() -> Declaration<Self> {
            Declaration::new().with_id("catalog.scheduler")
        }

        fn construct(_args: &mut Arguments, _injector: &dyn Injector) -> Result<Self, InjectorError> {
            Ok(Scheduler)
        }
    }

    inventory::submit! {
        Declared::new::<Scheduler>()
    }

    #[test]
    fn declared_lists_submitted_types() {
        assert!(declared().any(|entry| entry.name() == "Scheduler"));
    }

    #[test]
    fn container_scan_registers_submitted_types() {
        let container = Container::new();
        assert!(container.scan() >= 1);

        let scheduler: Arc<Scheduler> = container.get("catalog.scheduler").unwrap();
        let by_class: Arc<Scheduler> = container.resolve(ServiceRef::class::<Scheduler>()).unwrap();
        assert!(Arc::ptr_eq(&scheduler, &by_class));
    }
}

use std::any::TypeId;
use std::collections::HashMap;

use crate::id::{ClassRef, ServiceId, ServiceRef};

/// The mapping from service types to the identifiers they were registered
/// under, keyed by type identity.
#[derive(Debug, Default)]
pub struct IdentityMap {
    classes: HashMap<TypeId, ServiceId>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self {
            classes: HashMap::new(),
        }
    }

    pub fn insert(&mut self, class: ClassRef, id: ServiceId) -> Option<ServiceId> {
        self.classes.insert(class.type_id(), id)
    }

    pub fn get(&self, class: &ClassRef) -> Option<&ServiceId> {
        self.classes.get(&class.type_id())
    }

    /// Derives the identifier a reference stands for.
    ///
    /// An identifier is returned as is. A type resolves to the identifier it
    /// was registered under, or to its declared name if it never was. This
    /// never fails: a reference to nothing yields a plausible guess, and the
    /// miss is reported when the container is actually read.
    pub fn resolve(&self, reference: &ServiceRef) -> ServiceId {
        match reference {
            ServiceRef::Id(id) => id.clone(),
            ServiceRef::Class(class) => self
                .get(class)
                .cloned()
                .unwrap_or_else(|| ServiceId::from(class.name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::injectable::Service;

    use super::*;

    struct Mailer;

    impl Service for Mailer {
        const NAME: &'static str = "Mailer";
    }

    struct Impostor;

    impl Service for Impostor {
        const NAME: &'static str = "Mailer";
    }

    #[test]
    fn identity_map_resolve_returns_id_unchanged() {
        let map = IdentityMap::new();
        assert_eq!(map.resolve(&ServiceRef::from("mailer")), "mailer");
    }

    #[test]
    fn identity_map_resolve_falls_back_to_declared_name() {
        let map = IdentityMap::new();
        assert_eq!(map.resolve(&ServiceRef::class::<Mailer>()), "Mailer");
    }

    #[test]
    fn identity_map_resolve_succeeds_when_class_registered() {
        let mut map = IdentityMap::new();
        map.insert(ClassRef::of::<Mailer>(), ServiceId::from("mailer"));

        let reference = ServiceRef::class::<Mailer>();
        assert_eq!(map.resolve(&reference), "mailer");
        assert_eq!(map.resolve(&reference), map.resolve(&reference));
        assert_eq!(map.resolve(&ServiceRef::class::<Impostor>()), "Mailer");
    }
}

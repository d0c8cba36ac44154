mod identity;

use std::any::TypeId;
use std::borrow::Borrow;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::injectable::Service;

pub use identity::IdentityMap;

/// The string key under which a service is registered and looked up.
///
/// A [`ServiceId`] is cheap to clone and can be borrowed as a `str`, so maps
/// keyed by it can be queried with plain string slices.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceId(Arc<str>);

impl ServiceId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ServiceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ServiceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ServiceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ServiceId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for ServiceId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl From<&str> for ServiceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ServiceId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl From<&String> for ServiceId {
    fn from(id: &String) -> Self {
        Self::new(id)
    }
}

impl From<&ServiceId> for ServiceId {
    fn from(id: &ServiceId) -> Self {
        id.clone()
    }
}

/// The identity of a service type.
///
/// Two [`ClassRef`]s are equal only if they refer to the very same type, no
/// matter whether their declared names coincide.
#[derive(Debug, Clone, Copy)]
pub struct ClassRef {
    type_id: TypeId,
    name: &'static str,
}

impl ClassRef {
    pub fn of<C: Service>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            name: C::NAME,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the declared name of the type, which is also the identifier
    /// it falls back to when it has never been registered.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ClassRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ClassRef {}

impl Hash for ClassRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl Display for ClassRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name)
    }
}

/// A reference to a service, either by its identifier or by its type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceRef {
    Id(ServiceId),
    Class(ClassRef),
}

impl ServiceRef {
    pub fn class<C: Service>() -> Self {
        Self::Class(ClassRef::of::<C>())
    }
}

impl Display for ServiceRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Class(class) => write!(f, "<{class}>"),
        }
    }
}

impl From<&str> for ServiceRef {
    fn from(id: &str) -> Self {
        Self::Id(id.into())
    }
}

impl From<String> for ServiceRef {
    fn from(id: String) -> Self {
        Self::Id(id.into())
    }
}

impl From<ServiceId> for ServiceRef {
    fn from(id: ServiceId) -> Self {
        Self::Id(id)
    }
}

impl From<&ServiceId> for ServiceRef {
    fn from(id: &ServiceId) -> Self {
        Self::Id(id.clone())
    }
}

impl From<ClassRef> for ServiceRef {
    fn from(class: ClassRef) -> Self {
        Self::Class(class)
    }
}

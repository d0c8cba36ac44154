use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use parking_lot::RwLock;

/// A field bound to a container service.
///
/// The value is resolved once, when the owning instance is constructed, and
/// can be overwritten afterwards through a shared reference. An overwritten
/// value sticks; it is never resolved again.
pub struct Inject<T: ?Sized> {
    value: RwLock<Arc<T>>,
}

impl<T: ?Sized> Inject<T> {
    pub fn new(value: Arc<T>) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    pub fn get(&self) -> Arc<T> {
        Arc::clone(&self.value.read())
    }

    pub fn set(&self, value: Arc<T>) {
        *self.value.write() = value;
    }

    /// Overwrites the value and returns the previous one.
    pub fn replace(&self, value: Arc<T>) -> Arc<T> {
        std::mem::replace(&mut *self.value.write(), value)
    }
}

impl<T: ?Sized> From<Arc<T>> for Inject<T> {
    fn from(value: Arc<T>) -> Self {
        Self::new(value)
    }
}

impl<T: Debug + ?Sized> Debug for Inject<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_tuple("Inject").field(&*self.value.read()).finish()
    }
}

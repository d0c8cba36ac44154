use std::any;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::container::injector::InjectorError;
use crate::container::{Instance, Managed};

/// Positional constructor arguments of an [`Injectable`].
///
/// A slot is either provided or left empty. When a container instantiates a
/// service, it only fills the empty slots covered by the declared
/// dependencies; whatever the caller provided is kept.
///
/// [`Injectable`]: crate::injectable::Injectable
#[derive(Clone, Default)]
pub struct Arguments {
    slots: Vec<Option<Instance>>,
}

impl Arguments {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Appends a provided argument.
    pub fn with<T: Managed>(self, value: T) -> Self {
        self.with_shared(Arc::new(value))
    }

    /// Appends a provided argument which is already shared.
    pub fn with_shared<T: Managed>(mut self, value: Arc<T>) -> Self {
        self.slots.push(Some(value));
        self
    }

    /// Appends an empty slot.
    pub fn skip(mut self) -> Self {
        self.slots.push(None);
        self
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_provided(&self, position: usize) -> bool {
        self.slots.get(position).is_some_and(Option::is_some)
    }

    /// Puts `value` into the slot at `position` unless that slot is already
    /// provided. Returns whether the value was used.
    pub(crate) fn fill(&mut self, position: usize, value: Instance) -> bool {
        if self.slots.len() <= position {
            self.slots.resize(position + 1, None);
        }
        let slot = &mut self.slots[position];
        if slot.is_some() {
            false
        } else {
            *slot = Some(value);
            true
        }
    }

    /// Moves the argument at `position` out as an `Arc<T>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot is empty or holds another type.
    pub fn take<T: Managed>(
        &mut self,
        service: &'static str,
        position: usize,
    ) -> Result<Arc<T>, InjectorError> {
        let Some(object) = self.slots.get_mut(position).and_then(Option::take) else {
            return Err(InjectorError::MissingArgument { service, position });
        };
        object
            .downcast::<T>()
            .map_err(|_| InjectorError::ArgumentMismatch {
                service,
                position,
                expected: any::type_name::<T>(),
            })
    }

    /// Moves the argument at `position` out as an owned `T`, cloning it out of
    /// its shared handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot is empty or holds another type.
    pub fn take_cloned<T: Managed + Clone>(
        &mut self,
        service: &'static str,
        position: usize,
    ) -> Result<T, InjectorError> {
        self.take::<T>(service, position)
            .map(|object| T::clone(&object))
    }
}

impl Debug for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let provided: Vec<bool> = self.slots.iter().map(Option::is_some).collect();
        f.debug_struct("Arguments")
            .field("provided", &provided)
            .finish()
    }
}

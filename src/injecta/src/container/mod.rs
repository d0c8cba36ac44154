pub mod injector;
pub mod registry;

mod core;
mod handle;

use std::any::Any;
use std::sync::Arc;

pub use handle::Container;

/// A type that can be stored in a container.
pub trait Managed: Any + Send + Sync + 'static {}

impl<T> Managed for T where T: Any + Send + Sync + 'static {}

/// A type-erased service instance as cached by a container.
pub type Instance = Arc<dyn Any + Send + Sync>;

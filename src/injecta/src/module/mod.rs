use std::any;
use std::error::Error;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use tracing::debug;

use crate::container::registry::Configurer;

/// A unit of container configuration.
///
/// # Examples
///
/// ```rust
/// # use std::error::Error;
/// # use injecta::prelude::*;
/// struct Settings;
///
/// impl Module for Settings {
///     fn configure(
///         &self,
///         configurer: &mut dyn Configurer,
///     ) -> Result<(), Box<dyn Error + Send + Sync>> {
///         configurer.value("port", 8080u16);
///         Ok(())
///     }
/// }
///
/// let container = Container::init(Settings).unwrap();
/// assert_eq!(*container.get::<u16>("port").unwrap(), 8080);
/// ```
pub trait Module: 'static {
    /// The name a failure of this module is reported under. Defaults to the
    /// type name.
    fn name(&self) -> &'static str {
        any::type_name::<Self>()
    }

    /// Runs [`Module::configure`] and hands a failure to the configurer
    /// instead of returning it, so that the remaining modules still run.
    fn setup(&self, configurer: &mut dyn Configurer) {
        debug!(module = self.name(), "configuring container");
        if let Err(err) = self.configure(configurer) {
            configurer.report_module_error(self.name(), err);
        }
    }

    fn configure(
        &self,
        configurer: &mut dyn Configurer,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// A list of modules set up one after another. A later module sees the
/// registrations of the earlier ones and may replace them.
#[derive(Default)]
pub struct Configuration {
    modules: Vec<Box<dyn Module>>,
}

impl Configuration {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with<M: Module>(mut self, module: M) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    /// Appends the modules of `other` after the current ones.
    pub fn compose(mut self, other: Configuration) -> Self {
        self.modules.extend(other.modules);
        self
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.modules.iter().map(|module| module.name())
    }
}

impl Debug for Configuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_list().entries(self.names()).finish()
    }
}

impl Module for Configuration {
    // Each member reports its own failure, so a composed configuration never
    // shows up as the failing module.
    fn setup(&self, configurer: &mut dyn Configurer) {
        for module in &self.modules {
            module.setup(configurer);
        }
    }

    fn configure(
        &self,
        configurer: &mut dyn Configurer,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.setup(configurer);
        Ok(())
    }
}

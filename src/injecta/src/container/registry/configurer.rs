use std::error::Error;

use crate::container::registry::{Configurer, RegistryError};
use crate::container::Container;

pub struct ConfigurerImpl {
    container: Container,
    errors: Vec<RegistryError>,
}

impl ConfigurerImpl {
    pub fn new(container: Container) -> Self {
        Self {
            container,
            errors: Vec::new(),
        }
    }

    pub fn finish(mut self) -> Result<Container, RegistryError> {
        match self.errors.len() {
            0 => Ok(self.container),
            1 => Err(self.errors.remove(0)),
            _ => Err(RegistryError::Aggregated {
                errors: self.errors,
            }),
        }
    }
}

impl Configurer for ConfigurerImpl {
    fn container(&self) -> &Container {
        &self.container
    }

    fn report_module_error(&mut self, module: &'static str, err: Box<dyn Error + Send + Sync>) {
        self.errors.push(RegistryError::ModuleInner {
            module,
            source: err,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::container::injector::TypedInjector;
    use crate::container::registry::TypedConfigurer;

    use super::*;

    #[test]
    fn configurer_impl_register_succeeds() {
        let mut configurer = ConfigurerImpl::new(Container::new());
        configurer.value("answer", 42i32);
        configurer.factory("question", |_| Ok::<_, RegistryError>("why?"));

        let container = configurer.finish().unwrap();
        assert_eq!(*container.get::<i32>("answer").unwrap(), 42);
        let question: Arc<&str> = container.get("question").unwrap();
        assert_eq!(*question, "why?");
    }

    #[test]
    fn configurer_impl_finish_fails_when_error_reported() {
        let mut configurer = ConfigurerImpl::new(Container::new());
        configurer.value("answer", 42i32);
        configurer.report_module_error("test", "whatever".into());

        let err = configurer.finish().unwrap_err();
        assert!(matches!(err, RegistryError::ModuleInner { module: "test", .. }));
    }

    #[test]
    fn configurer_impl_finish_aggregates_errors() {
        let mut configurer = ConfigurerImpl::new(Container::new());
        configurer.report_module_error("first", "whatever".into());
        configurer.report_module_error("second", "whatever".into());

        let err = configurer.finish().unwrap_err();
        let RegistryError::Aggregated { errors } = &err else {
            panic!("errors from two modules should be aggregated");
        };
        assert_eq!(errors.len(), 2);
        assert!(err.to_string().contains("module second"));
    }
}

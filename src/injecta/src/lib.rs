#![allow(clippy::new_without_default)]

pub mod annotation;
pub mod binder;
pub mod catalog;
pub mod container;
pub mod id;
pub mod injectable;
pub mod module;
pub mod provider;
pub mod registration;

pub use injecta_derive::service;

#[doc(hidden)]
pub use inventory;

pub mod prelude {
    pub use crate::container::injector::{Injector, InjectorError, TypedInjector};
    pub use crate::container::registry::{Configurer, RegistryError, TypedConfigurer};
    pub use crate::container::{Container, Instance};
    pub use crate::id::{ServiceId, ServiceRef};
    pub use crate::injectable::{Arguments, Declaration, Inject, Injectable, Service};
    pub use crate::module::{Configuration, Module};
    pub use crate::service;
}

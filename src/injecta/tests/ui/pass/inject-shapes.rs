use std::sync::Arc;

use injecta::prelude::*;

#[service]
pub struct Dependency;

#[service]
pub struct Fields {
    #[inject]
    pub dependency: Arc<Dependency>,
    #[inject("Dependency")]
    pub by_id: Inject<Dependency>,
    #[inject(Dependency)]
    pub by_class: Arc<Dependency>,
    pub plain: String,
}

#[service]
pub struct Tuple(#[inject("Dependency")] pub Arc<Dependency>, pub u32);

fn main() {}

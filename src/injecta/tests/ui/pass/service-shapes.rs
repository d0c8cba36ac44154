use std::sync::Arc;

use injecta::injectable::BoxError;
use injecta::prelude::*;

#[service]
pub struct Bare;

#[service("named")]
pub struct Named;

#[service("with-deps", deps = ["named", Bare])]
pub struct WithDeps {
    pub named: Arc<Named>,
    pub bare: Arc<Bare>,
}

#[service(deps = [Named])]
pub struct DepsOnly(pub Arc<Named>);

#[service("hooked", decorator = decorate, factory = build)]
pub struct Hooked {
    pub value: u8,
}

fn decorate(hooked: Arc<Hooked>) -> Arc<Hooked> {
    hooked
}

fn build(_injector: &dyn Injector) -> Result<Hooked, BoxError> {
    Ok(Hooked { value: 1 })
}

#[service("trailing", deps = ["named",],)]
pub struct Trailing {
    pub named: Arc<Named>,
}

#[service("overridable", deps = [Named])]
pub struct Overridable {
    pub named: Inject<Named>,
}

fn main() {}

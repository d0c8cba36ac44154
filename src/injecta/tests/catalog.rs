use std::sync::Arc;

use injecta::catalog;
use injecta::prelude::*;

mod storage {
    use std::sync::Arc;

    use injecta::prelude::*;

    #[service("storage.disk")]
    pub struct Disk;

    #[service("storage.index", deps = [Disk])]
    pub struct Index {
        pub disk: Arc<Disk>,
    }
}

#[service("reporter")]
pub struct Reporter {
    #[inject("storage.index")]
    index: Arc<storage::Index>,
}

#[test]
fn catalog_lists_every_declared_service() {
    let mut names: Vec<_> = catalog::declared().map(|entry| entry.name()).collect();
    names.sort_unstable();
    assert_eq!(names, ["Disk", "Index", "Reporter"]);
}

#[test]
fn scan_registers_services_from_every_module() {
    let container = Container::new();
    assert_eq!(container.scan(), 3);
    assert_eq!(
        container.ids(),
        vec![
            ServiceId::from("reporter"),
            ServiceId::from("storage.disk"),
            ServiceId::from("storage.index"),
        ]
    );

    let reporter: Arc<Reporter> = container.get("reporter").unwrap();
    let disk: Arc<storage::Disk> = container.resolve(ServiceRef::class::<storage::Disk>()).unwrap();
    assert!(Arc::ptr_eq(&reporter.index.disk, &disk));
}

use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use oneshot::{Receiver, Sender};
use parking_lot::{RwLock, RwLockWriteGuard};
use tracing::{debug, trace};

use crate::container::injector::{Injector, InjectorError};
use crate::container::registry::{ProviderMap, Registration};
use crate::container::Instance;
use crate::id::{ServiceId, ServiceRef};

pub struct ContainerCore {
    providers: RwLock<ProviderMap>,
    managed: RwLock<SharedManagedObjectData>,
}

impl ContainerCore {
    pub fn new() -> Self {
        Self {
            providers: RwLock::new(ProviderMap::new()),
            managed: RwLock::new(SharedManagedObjectData::new()),
        }
    }

    pub fn register(&self, record: Registration) {
        let id = record.id().clone();
        let replaced = self.providers.write().insert(record);
        if replaced.is_some() {
            debug!(service = %id, "replaced registration");
        } else {
            debug!(service = %id, "registered service");
        }
    }

    pub fn registration(&self, id: &str) -> Option<Arc<Registration>> {
        self.providers.read().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.providers.read().get(id).is_some()
    }

    pub fn ids(&self) -> Vec<ServiceId> {
        let mut ids: Vec<_> = self.providers.read().ids().cloned().collect();
        ids.sort();
        ids
    }

    /// Drops every cached singleton and returns how many were dropped.
    pub fn reset(&self) -> usize {
        let mut managed = self.managed.write();
        let count = managed.objects.len();
        managed.objects.clear();
        drop(managed);
        debug!(count, "reset cached services");
        count
    }

    fn get_object(&self, id: &ServiceId) -> Result<Instance, InjectorError> {
        if let Some(object) = self.try_get_constructed_object(id) {
            trace!(service = %id, "cache hit");
            return Ok(object);
        }

        let record = self
            .registration(id.as_str())
            .ok_or_else(|| InjectorError::NotFound { id: id.clone() })?;
        let managed = self.managed.write();

        // Another thread may have finished between the read above and now.
        if let Some(object) = managed.objects.get(id) {
            return Ok(Arc::clone(object));
        }

        if let Some(context) = managed.constructing.get(id) {
            if context.is_constructed_by_current_thread() {
                Err(self.stop_construction_on_cyclic_dependency(managed, id))
            } else {
                self.wait_for_constructed_object(managed, id)
            }
        } else {
            self.construct_shared_object(managed, &record)
        }
    }

    fn try_get_constructed_object(&self, id: &ServiceId) -> Option<Instance> {
        self.managed.read().objects.get(id).map(Arc::clone)
    }

    fn stop_construction_on_cyclic_dependency(
        &self,
        managed: RwLockWriteGuard<SharedManagedObjectData>,
        id: &ServiceId,
    ) -> InjectorError {
        let err = InjectorError::CyclicDependency { id: id.clone() };
        self.notify_waiters(managed, id, WaitResponse::Error(err.clone()));
        err
    }

    fn wait_for_constructed_object(
        &self,
        mut managed: RwLockWriteGuard<SharedManagedObjectData>,
        id: &ServiceId,
    ) -> Result<Instance, InjectorError> {
        let (sender, receiver) = oneshot::channel();
        if let Some(context) = managed.constructing.get_mut(id) {
            context.register_waiter(sender);
        }
        drop(managed);
        trace!(service = %id, "waiting for construction on another thread");
        self.get_object_on_response(receiver, id)
    }

    fn get_object_on_response(
        &self,
        receiver: Receiver<WaitResponse>,
        id: &ServiceId,
    ) -> Result<Instance, InjectorError> {
        match receiver.recv() {
            Ok(WaitResponse::Constructed(object)) => Ok(object),
            Ok(WaitResponse::Error(err)) => Err(err),
            // No answer means no construction is running any more.
            Err(_) => self.get_object(id),
        }
    }

    fn construct_shared_object(
        &self,
        mut managed: RwLockWriteGuard<SharedManagedObjectData>,
        record: &Registration,
    ) -> Result<Instance, InjectorError> {
        let id = record.id();
        let on_thread = thread::current().id();
        managed
            .constructing
            .insert(id.clone(), ConstructingObjectContext::new(on_thread));
        drop(managed);

        debug!(service = %id, "instantiating service");
        let mut guard = ConstructionGuard::new(self, id);
        let res = record.provide(self);
        guard.finished = true;
        match res {
            Ok(object) => {
                let mut managed = self.managed.write();
                managed.objects.insert(id.clone(), Arc::clone(&object));
                let response = WaitResponse::Constructed(Arc::clone(&object));
                self.notify_waiters(managed, id, response);
                Ok(object)
            }
            Err(err) => {
                let managed = self.managed.write();
                self.notify_waiters(managed, id, WaitResponse::Error(err.clone()));
                Err(err)
            }
        }
    }

    fn notify_waiters(
        &self,
        mut managed: RwLockWriteGuard<SharedManagedObjectData>,
        id: &ServiceId,
        response: WaitResponse,
    ) {
        if let Some(context) = managed.constructing.remove(id) {
            drop(managed);
            context.notify(response);
        }
    }
}

impl Injector for ContainerCore {
    fn dyn_get(&self, id: &ServiceId) -> Result<Instance, InjectorError> {
        self.get_object(id)
    }

    fn identify(&self, reference: &ServiceRef) -> ServiceId {
        self.providers.read().identify(reference)
    }
}

/// Clears the construction mark of a service if its provider unwinds, so
/// that waiters retry and the next access on this thread is not taken for a
/// cycle.
struct ConstructionGuard<'a> {
    core: &'a ContainerCore,
    id: &'a ServiceId,
    finished: bool,
}

impl<'a> ConstructionGuard<'a> {
    fn new(core: &'a ContainerCore, id: &'a ServiceId) -> Self {
        Self {
            core,
            id,
            finished: false,
        }
    }
}

impl Drop for ConstructionGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        // Dropping the senders wakes every waiter with a closed channel.
        let context = self.core.managed.write().constructing.remove(self.id);
        drop(context);
    }
}

struct SharedManagedObjectData {
    objects: HashMap<ServiceId, Instance>,
    constructing: HashMap<ServiceId, ConstructingObjectContext>,
}

impl SharedManagedObjectData {
    fn new() -> Self {
        Self {
            objects: HashMap::new(),
            constructing: HashMap::new(),
        }
    }
}

struct ConstructingObjectContext {
    on_thread: ThreadId,
    waiters: Vec<Sender<WaitResponse>>,
}

impl ConstructingObjectContext {
    fn new(on_thread: ThreadId) -> Self {
        Self {
            on_thread,
            waiters: Vec::new(),
        }
    }

    fn is_constructed_by_current_thread(&self) -> bool {
        thread::current().id() == self.on_thread
    }

    fn register_waiter(&mut self, sender: Sender<WaitResponse>) {
        self.waiters.push(sender);
    }

    fn notify(self, response: WaitResponse) {
        for sender in self.waiters {
            let _ = sender.send(response.clone());
        }
    }
}

#[derive(Clone)]
enum WaitResponse {
    Constructed(Instance),
    Error(InjectorError),
}

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::container::injector::TypedInjector;
    use crate::provider::factory::FactoryProvider;
    use crate::provider::instance::InstanceProvider;

    use super::*;

    struct Node {
        id: u32,
        sub_even: Option<Arc<Node>>,
        sub_odd: Option<Arc<Node>>,
    }

    fn node_id(id: u32) -> String {
        format!("node-{id}")
    }

    fn node_record(id: u32) -> Registration {
        let provider = FactoryProvider::new(move |injector: &dyn Injector| {
            let (sub_even, sub_odd) = match id {
                0 | 1 => (None, None),
                _ if id % 2 == 0 => (
                    Some(injector.get(node_id(id - 2))?),
                    Some(injector.get(node_id(id - 1))?),
                ),
                _ => (
                    Some(injector.get(node_id(id - 3))?),
                    Some(injector.get(node_id(id - 2))?),
                ),
            };
            Ok::<_, InjectorError>(Node {
                id,
                sub_even,
                sub_odd,
            })
        });
        Registration::new(node_id(id).into(), Box::new(provider))
    }

    #[test]
    fn container_core_get_returns_singleton() {
        let core = ContainerCore::new();
        core.register(node_record(0));

        let first: Arc<Node> = core.get(node_id(0)).unwrap();
        let second: Arc<Node> = core.get(node_id(0)).unwrap();
        assert_eq!(first.id, 0);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn container_core_get_succeeds_when_it_needs_complex_structure() {
        const NUM: u32 = 100;
        let core = Arc::new(ContainerCore::new());
        for i in 0..2 * NUM {
            core.register(node_record(i));
        }

        let mut handles = Vec::new();
        for i in (0..2 * NUM).rev() {
            let core = Arc::clone(&core);
            handles.push(thread::spawn(move || {
                let object: Arc<Node> = core.get(node_id(i)).unwrap();
                assert_eq!(object.id, i);
                assert_eq!(object.sub_even.is_some(), i > 1);
                assert_eq!(object.sub_odd.is_some(), i > 1);
            }));
        }

        handles
            .into_iter()
            .for_each(|h| h.join().expect("Each thread should not `panic!()`"));

        let even: Arc<Node> = core.get(node_id(4)).unwrap();
        let odd: Arc<Node> = core.get(node_id(5)).unwrap();
        let shared = even.sub_even.as_ref().unwrap();
        assert_eq!(shared.id, 2);
        assert!(Arc::ptr_eq(shared, odd.sub_even.as_ref().unwrap()));
    }

    #[test]
    fn container_core_constructs_once_under_contention() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let core = Arc::new(ContainerCore::new());
        let provider = FactoryProvider::new(|_: &dyn Injector| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            Ok::<_, InjectorError>(String::from("slow"))
        });
        core.register(Registration::new("slow".into(), Box::new(provider)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let core = Arc::clone(&core);
                thread::spawn(move || core.get::<String>("slow").unwrap())
            })
            .collect();
        let objects: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
        assert!(objects.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn container_core_get_fails_when_there_exists_cyclic_dependency() {
        let core = ContainerCore::new();
        let ping = FactoryProvider::new(|injector: &dyn Injector| {
            injector.get::<u8>("pong").map(|v| *v)
        });
        let pong = FactoryProvider::new(|injector: &dyn Injector| {
            injector.get::<u8>("ping").map(|v| *v)
        });
        core.register(Registration::new("ping".into(), Box::new(ping)));
        core.register(Registration::new("pong".into(), Box::new(pong)));

        assert!(matches!(
            core.get::<u8>("ping"),
            Err(InjectorError::CyclicDependency { id }) if id == "ping"
        ));
        // The failed attempt leaves nothing behind.
        assert!(core.managed.read().constructing.is_empty());
    }

    #[test]
    fn container_core_get_recovers_after_provider_panics() {
        static PANICKED: AtomicBool = AtomicBool::new(false);
        let core = Arc::new(ContainerCore::new());
        let provider = FactoryProvider::new(|_: &dyn Injector| {
            if !PANICKED.swap(true, Ordering::SeqCst) {
                panic!("flaky provider fails once");
            }
            Ok::<_, InjectorError>(1u8)
        });
        core.register(Registration::new("flaky".into(), Box::new(provider)));

        let res = panic::catch_unwind(AssertUnwindSafe(|| core.get::<u8>("flaky")));
        assert!(res.is_err());
        assert!(core.managed.read().constructing.is_empty());

        assert_eq!(*core.get::<u8>("flaky").unwrap(), 1);
    }

    #[test]
    fn container_core_waiter_retries_after_provider_panics() {
        static STARTED: AtomicBool = AtomicBool::new(false);
        static PANICKED: AtomicBool = AtomicBool::new(false);
        let core = Arc::new(ContainerCore::new());
        let provider = FactoryProvider::new(|_: &dyn Injector| {
            if !PANICKED.swap(true, Ordering::SeqCst) {
                STARTED.store(true, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(50));
                panic!("flaky provider fails once");
            }
            Ok::<_, InjectorError>(2u8)
        });
        core.register(Registration::new("flaky".into(), Box::new(provider)));

        let first = {
            let core = Arc::clone(&core);
            thread::spawn(move || core.get::<u8>("flaky").map(|v| *v))
        };
        while !STARTED.load(Ordering::SeqCst) {
            thread::yield_now();
        }
        let second = {
            let core = Arc::clone(&core);
            thread::spawn(move || core.get::<u8>("flaky").map(|v| *v))
        };

        assert!(first.join().is_err());
        assert_eq!(second.join().unwrap().unwrap(), 2);
    }

    #[test]
    fn container_core_get_fails_when_id_not_found() {
        let core = ContainerCore::new();
        assert!(matches!(
            core.get::<i32>("missing"),
            Err(InjectorError::NotFound { id }) if id == "missing"
        ));
    }

    #[test]
    fn container_core_reset_reinstantiates() {
        let core = ContainerCore::new();
        core.register(node_record(0));
        core.register(Registration::new(
            "answer".into(),
            Box::new(InstanceProvider::new(42)),
        ));

        let before: Arc<Node> = core.get(node_id(0)).unwrap();
        let _: Arc<i32> = core.get("answer").unwrap();
        assert_eq!(core.reset(), 2);

        let after: Arc<Node> = core.get(node_id(0)).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert!(core.contains(&node_id(0)));
    }

    #[test]
    fn container_core_replacement_applies_after_reset() {
        let core = ContainerCore::new();
        core.register(Registration::new("n".into(), Box::new(InstanceProvider::new(1))));
        assert_eq!(*core.get::<i32>("n").unwrap(), 1);

        core.register(Registration::new("n".into(), Box::new(InstanceProvider::new(2))));
        assert_eq!(*core.get::<i32>("n").unwrap(), 1);
        core.reset();
        assert_eq!(*core.get::<i32>("n").unwrap(), 2);
        assert_eq!(core.ids(), vec![ServiceId::from("n")]);
    }
}

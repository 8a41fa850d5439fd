//! 宿主容器的集成测试

use di_abstractions::{
    ComponentDefinition, ComponentLocator, ComponentLocatorExt, ComponentRegistry,
    ContainerConfig, DiContainer, MembersInjectable, StartupListener,
};
use di_impl::DiContainerImpl;
use infrastructure_common::{
    assignable, ComponentScope, DependencyError, DependencyResult, LifecycleState, Stage,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

struct EnglishGreeter;

impl Greeter for EnglishGreeter {
    fn greet(&self) -> String {
        "hello".to_string()
    }
}

assignable!(EnglishGreeter => dyn Greeter);

struct RecordingListener {
    seen: Arc<Mutex<Vec<usize>>>,
}

impl StartupListener for RecordingListener {
    fn on_startup(&self, locator: &dyn ComponentLocator) -> DependencyResult<()> {
        let greeters = locator.get_all::<dyn Greeter>()?;
        self.seen.lock().push(greeters.len());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

#[derive(Default)]
struct Client {
    greeting: Mutex<Option<String>>,
}

impl MembersInjectable for Client {
    fn inject_members(&self, locator: &dyn ComponentLocator) -> DependencyResult<()> {
        let greeter = locator.get::<dyn Greeter>()?;
        *self.greeting.lock() = Some(greeter.greet());
        Ok(())
    }
}

#[test]
fn test_trait_object_registration_and_resolution() -> anyhow::Result<()> {
    let container = DiContainerImpl::new();
    let greeter: Arc<dyn Greeter> = Arc::new(EnglishGreeter);
    container.register_definition(ComponentDefinition::of_instance(greeter.clone()))?;

    let resolved = container.get::<dyn Greeter>()?;
    assert!(Arc::ptr_eq(&greeter, &resolved));
    assert_eq!(resolved.greet(), "hello");
    Ok(())
}

#[test]
fn test_start_creates_eager_singletons_and_notifies_listeners() -> anyhow::Result<()> {
    let created = Arc::new(AtomicUsize::new(0));
    let counter = created.clone();
    let container = DiContainerImpl::new();
    container.register_definition(
        ComponentDefinition::from_fn::<dyn Greeter, _>(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(EnglishGreeter) as Arc<dyn Greeter>)
        })
        .with_scope(ComponentScope::EagerSingleton),
    )?;

    let seen = Arc::new(Mutex::new(Vec::new()));
    container.add_startup_listener(Arc::new(RecordingListener { seen: seen.clone() }));

    assert_eq!(created.load(Ordering::SeqCst), 0);
    container.start()?;

    assert_eq!(container.state(), LifecycleState::Running);
    assert_eq!(created.load(Ordering::SeqCst), 1);
    assert_eq!(*seen.lock(), vec![1]);
    assert_eq!(container.stats().created_singletons, 1);
    Ok(())
}

#[test]
fn test_member_injection_requires_running_container() -> anyhow::Result<()> {
    let container = DiContainerImpl::new();
    container.register_definition(ComponentDefinition::of_instance::<dyn Greeter>(Arc::new(
        EnglishGreeter,
    )))?;
    let client = Client::default();

    assert!(matches!(
        container.inject_members(&client),
        Err(DependencyError::ContainerNotRunning)
    ));

    container.start()?;
    container.inject_members(&client)?;
    assert_eq!(client.greeting.lock().as_deref(), Some("hello"));
    Ok(())
}

#[test]
fn test_stop_releases_singletons() -> anyhow::Result<()> {
    let container = DiContainerImpl::new();
    container.register_definition(
        ComponentDefinition::from_fn(|_| Ok(Arc::new(String::from("cached"))))
            .with_scope(ComponentScope::Singleton),
    )?;
    container.start()?;
    let before = container.get::<String>()?;

    container.stop()?;
    assert_eq!(container.state(), LifecycleState::Stopped);
    assert_eq!(container.stats().created_singletons, 0);

    container.start()?;
    let after = container.get::<String>()?;
    assert!(!Arc::ptr_eq(&before, &after));
    Ok(())
}

#[test]
fn test_environment_from_config() {
    let container =
        DiContainerImpl::with_config(ContainerConfig::new().with_environments(["test"]));

    assert!(container.environment().is_active("test"));
    assert_eq!(container.environment().stage(), Stage::Development);
}

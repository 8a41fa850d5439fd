//! 模块导入的端到端测试
use di_abstractions::{
    ComponentDefinition, ComponentLocator, ComponentLocatorExt, ComponentRegistry,
    MembersInjectable,
};
use di_binding::{Binder, Module};
use infrastructure_common::{
    assignable, named, BindingError, BindingResult, DependencyResult, InfrastructureError,
    ScopeMarker,
};
use infrastructure_composition::{BinderSettings, ImportedInfrastructure, ModuleImportBuilder};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

trait Notifier: Send + Sync {
    fn notify(&self, message: &str) -> String;
}

#[derive(Debug)]
struct EmailNotifier;

impl Notifier for EmailNotifier {
    fn notify(&self, message: &str) -> String {
        format!("email: {}", message)
    }
}

assignable!(EmailNotifier => dyn Notifier);

#[derive(Debug, PartialEq, Eq)]
struct Service(u32);

fn quiet() -> ModuleImportBuilder {
    ModuleImportBuilder::new().with_settings(BinderSettings {
        log_errors: false,
        ..BinderSettings::default()
    })
}

fn binding_failure(result: Result<ImportedInfrastructure, InfrastructureError>) -> BindingError {
    match result {
        Err(InfrastructureError::BindingError { source }) => source,
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("import should fail"),
    }
}

#[test]
fn test_instance_binding_resolves_by_identity() -> anyhow::Result<()> {
    struct InstanceModule(Arc<Service>);

    impl Module for InstanceModule {
        fn configure(&self, binder: &mut Binder) -> BindingResult<()> {
            binder.bind::<Service>().to_instance(self.0.clone())
        }
    }

    let service = Arc::new(Service(1));
    let infrastructure = ModuleImportBuilder::new()
        .add_module(InstanceModule(service.clone()))
        .build()?;
    infrastructure.start()?;

    for _ in 0..3 {
        let resolved = infrastructure.injector().get_instance::<Service>()?;
        assert!(Arc::ptr_eq(&service, &resolved));
    }
    Ok(())
}

#[test]
fn test_module_order_matches_input_order() -> anyhow::Result<()> {
    struct First;
    struct Second;
    struct Third;

    impl Module for First {
        fn configure(&self, _binder: &mut Binder) -> BindingResult<()> {
            Ok(())
        }
    }

    impl Module for Second {
        fn configure(&self, _binder: &mut Binder) -> BindingResult<()> {
            Ok(())
        }
    }

    impl Module for Third {
        fn configure(&self, _binder: &mut Binder) -> BindingResult<()> {
            Ok(())
        }
    }

    let infrastructure = ModuleImportBuilder::new()
        .add_module(Second)
        .add_module(Third)
        .add_module(First)
        .build()?;
    assert_eq!(infrastructure.import().modules(), ["Second", "Third", "First"]);

    let orders: Vec<_> = infrastructure
        .container()
        .find_definitions(std::any::TypeId::of::<dyn Module>())
        .into_iter()
        .map(|summary| summary.order)
        .collect();
    assert_eq!(orders, vec![Some(0), Some(1), Some(2)]);

    infrastructure.start()?;
    let modules = infrastructure.container().get_all::<dyn Module>()?;
    assert_eq!(modules.len(), 3);
    assert!(infrastructure.container().get::<Third>().is_ok());
    Ok(())
}

#[test]
fn test_repeated_injection_request_injects_once() -> anyhow::Result<()> {
    #[derive(Default)]
    struct Listener {
        passes: AtomicUsize,
        notifier: Mutex<Option<Arc<dyn Notifier>>>,
    }

    impl MembersInjectable for Listener {
        fn inject_members(&self, locator: &dyn ComponentLocator) -> DependencyResult<()> {
            self.passes.fetch_add(1, Ordering::SeqCst);
            *self.notifier.lock() = Some(locator.get::<dyn Notifier>()?);
            Ok(())
        }
    }

    struct ListenerModule(Arc<Listener>);

    impl Module for ListenerModule {
        fn configure(&self, binder: &mut Binder) -> BindingResult<()> {
            binder.bind::<dyn Notifier>().to::<EmailNotifier>()?;
            binder.request_injection(self.0.clone());
            binder.request_injection(self.0.clone());
            Ok(())
        }
    }

    let listener = Arc::new(Listener::default());
    let infrastructure = ModuleImportBuilder::new()
        .add_instance(Arc::new(EmailNotifier))
        .add_module(ListenerModule(listener.clone()))
        .build()?;
    assert_eq!(listener.passes.load(Ordering::SeqCst), 0);

    infrastructure.start()?;
    assert_eq!(listener.passes.load(Ordering::SeqCst), 1);
    let notifier = listener.notifier.lock().clone();
    assert_eq!(
        notifier.map(|n| n.notify("hi")).as_deref(),
        Some("email: hi")
    );
    Ok(())
}

#[test]
fn test_pinned_self_binding_survives_new_component() -> anyhow::Result<()> {
    struct SelfBindingModule;

    impl Module for SelfBindingModule {
        fn configure(&self, binder: &mut Binder) -> BindingResult<()> {
            binder.bind::<Service>();
            Ok(())
        }
    }

    let original = Arc::new(Service(1));
    let infrastructure = ModuleImportBuilder::new()
        .add_instance(original.clone())
        .add_module(SelfBindingModule)
        .build()?;

    infrastructure
        .container()
        .register_definition(ComponentDefinition::of_instance(Arc::new(Service(2))))?;
    infrastructure.start()?;

    let resolved = infrastructure.injector().get_instance::<Service>()?;
    assert!(Arc::ptr_eq(&original, &resolved));
    Ok(())
}

#[test]
fn test_interface_bound_to_implementation() -> anyhow::Result<()> {
    struct NotifierModule;

    impl Module for NotifierModule {
        fn configure(&self, binder: &mut Binder) -> BindingResult<()> {
            binder.bind::<dyn Notifier>().to::<EmailNotifier>()?;
            Ok(())
        }
    }

    let infrastructure = ModuleImportBuilder::new()
        .add_instance(Arc::new(EmailNotifier))
        .add_module(NotifierModule)
        .build()?;
    infrastructure.start()?;

    let notifier = infrastructure.injector().get_instance::<dyn Notifier>()?;
    assert_eq!(notifier.notify("ok"), "email: ok");
    Ok(())
}

#[test]
fn test_named_instance_is_only_visible_by_name() -> anyhow::Result<()> {
    struct NamedModule;

    impl Module for NamedModule {
        fn configure(&self, binder: &mut Binder) -> BindingResult<()> {
            binder
                .bind::<Service>()
                .annotated_with(named("x"))?
                .to_instance(Arc::new(Service(42)))
        }
    }

    let infrastructure = ModuleImportBuilder::new().add_module(NamedModule).build()?;
    infrastructure.start()?;
    let injector = infrastructure.injector();

    assert_eq!(*injector.get_named::<Service>("x")?, Service(42));
    match injector.get_instance::<Service>() {
        Err(BindingError::Dependency { source }) => assert!(source.is_missing_component()),
        other => panic!("expected missing component, got {:?}", other.map(|s| s.0)),
    }
    Ok(())
}

#[test]
fn test_ambiguous_untargeted_bindings_fail_the_whole_import() {
    struct FirstFoo;
    struct SecondFoo;

    impl Module for FirstFoo {
        fn configure(&self, binder: &mut Binder) -> BindingResult<()> {
            binder.bind::<Service>();
            Ok(())
        }
    }

    impl Module for SecondFoo {
        fn configure(&self, binder: &mut Binder) -> BindingResult<()> {
            binder.bind::<Service>();
            Ok(())
        }
    }

    let builder = quiet()
        .add_class(ComponentDefinition::of_instance(Arc::new(Service(1))))
        .add_class(
            ComponentDefinition::of_instance(Arc::new(Service(2)))
                .with_qualifier(infrastructure_common::Qualifier::named("second")),
        )
        .add_module(FirstFoo)
        .add_module(SecondFoo);

    let error = binding_failure(builder.build());
    let messages = error.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages
        .iter()
        .all(|m| m.message().contains("Ambiguous binding target")));
    assert_eq!(messages[0].source_name(), Some("FirstFoo"));
    assert_eq!(messages[1].source_name(), Some("SecondFoo"));
}

#[test]
fn test_custom_scope_aborts_only_its_module() {
    static LATER_MODULE_RAN: AtomicUsize = AtomicUsize::new(0);

    struct ScopedModule;

    impl Module for ScopedModule {
        fn configure(&self, binder: &mut Binder) -> BindingResult<()> {
            binder
                .bind::<Service>()
                .to_instance(Arc::new(Service(1)))?;
            binder
                .bind::<String>()
                .in_scope(ScopeMarker::custom("request"))?;
            binder.add_error("unreachable");
            Ok(())
        }
    }

    struct LaterModule;

    impl Module for LaterModule {
        fn configure(&self, _binder: &mut Binder) -> BindingResult<()> {
            LATER_MODULE_RAN.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    let error = binding_failure(
        quiet()
            .add_module(ScopedModule)
            .add_module(LaterModule)
            .build(),
    );
    assert_eq!(LATER_MODULE_RAN.load(Ordering::SeqCst), 1);

    let messages = error.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].source_name(), Some("ScopedModule"));
    assert!(messages[0].message().contains("request"));
}

#[test]
fn test_named_constant_resolves_by_name() -> anyhow::Result<()> {
    struct PortModule;

    impl Module for PortModule {
        fn configure(&self, binder: &mut Binder) -> BindingResult<()> {
            binder
                .bind_constant()
                .annotated_with(named("port"))?
                .to(8080);
            Ok(())
        }
    }

    let infrastructure = ModuleImportBuilder::new().add_module(PortModule).build()?;
    infrastructure.start()?;
    assert_eq!(*infrastructure.injector().get_named::<i32>("port")?, 8080);
    Ok(())
}

#[test]
fn test_every_binding_yields_one_definition() -> anyhow::Result<()> {
    struct ManyModule;

    impl Module for ManyModule {
        fn configure(&self, binder: &mut Binder) -> BindingResult<()> {
            binder.bind::<dyn Notifier>().to::<EmailNotifier>()?;
            binder
                .bind::<Service>()
                .annotated_with_name("a")?
                .to_instance(Arc::new(Service(1)))?;
            binder
                .bind::<Service>()
                .annotated_with_name("b")?
                .to_instance(Arc::new(Service(2)))?;
            binder.bind_constant().annotated_with_name("c")?.to(true);
            Ok(())
        }
    }

    let infrastructure = ModuleImportBuilder::new()
        .add_instance(Arc::new(EmailNotifier))
        .add_module(ManyModule)
        .build()?;
    assert_eq!(infrastructure.import().definitions().len(), 4);

    infrastructure.start()?;
    let injector = infrastructure.injector();
    assert!(injector.get_instance::<dyn Notifier>().is_ok());
    assert_eq!(*injector.get_named::<Service>("a")?, Service(1));
    assert_eq!(*injector.get_named::<Service>("b")?, Service(2));
    assert!(*injector.get_named::<bool>("c")?);
    Ok(())
}

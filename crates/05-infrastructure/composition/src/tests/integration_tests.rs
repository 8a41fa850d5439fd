//! 模块导入构建器集成测试

use super::super::builder::{LoggingConfig, ModuleImportBuilder};
use super::super::infrastructure::InfrastructureStatus;
use super::super::settings::BinderSettings;
use di_abstractions::{ComponentLocator, ComponentLocatorExt, MembersInjectable, Provider};
use di_binding::{Binder, Module, ProviderMethod};
use infrastructure_common::{
    assignable, BindingError, BindingResult, DependencyResult, InfrastructureError,
    LifecycleState, Stage,
};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use tempfile::Builder;

static INIT_LOGGER: Once = Once::new();

/// 初始化测试日志系统（只初始化一次）
fn init_test_logger() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .try_init()
            .ok();
    });
}

trait Repository: Send + Sync {
    fn find(&self, id: u32) -> String;
}

#[derive(Default)]
struct SqlRepository;

impl Repository for SqlRepository {
    fn find(&self, id: u32) -> String {
        format!("row-{}", id)
    }
}

assignable!(SqlRepository => dyn Repository);

struct DatabaseModule;

impl Module for DatabaseModule {
    fn configure(&self, binder: &mut Binder) -> BindingResult<()> {
        binder.bind::<dyn Repository>().to::<SqlRepository>()?;
        binder.bind_constant().annotated_with_name("pool_size")?.to(8);
        Ok(())
    }

    fn provider_methods(&self) -> Vec<ProviderMethod> {
        vec![ProviderMethod::new("dsn", |_| Ok(Arc::new("postgres://local".to_string())))
            .named("dsn")
            .singleton()]
    }
}

struct CloudModule;

impl Module for CloudModule {
    fn configure(&self, binder: &mut Binder) -> BindingResult<()> {
        binder
            .bind_constant()
            .annotated_with_name("region")?
            .to("eu-west");
        Ok(())
    }
}

struct StageModule(Arc<Mutex<Option<Stage>>>);

impl Module for StageModule {
    fn configure(&self, binder: &mut Binder) -> BindingResult<()> {
        *self.0.lock() = Some(binder.current_stage());
        Ok(())
    }
}

#[derive(Default)]
struct ReportJob {
    repository: Mutex<Option<Arc<dyn Repository>>>,
    passes: AtomicUsize,
}

impl MembersInjectable for ReportJob {
    fn inject_members(&self, locator: &dyn ComponentLocator) -> DependencyResult<()> {
        self.passes.fetch_add(1, Ordering::SeqCst);
        *self.repository.lock() = Some(locator.get::<dyn Repository>()?);
        Ok(())
    }
}

struct JobModule(Arc<ReportJob>);

impl Module for JobModule {
    fn configure(&self, binder: &mut Binder) -> BindingResult<()> {
        binder.request_injection(self.0.clone());
        Ok(())
    }
}

/// 测试完整的导入、启动与查找流程
#[test]
fn test_build_start_and_resolve() {
    init_test_logger();
    let job = Arc::new(ReportJob::default());

    let infrastructure = ModuleImportBuilder::new()
        .add_instance(Arc::new(SqlRepository))
        .add_module(DatabaseModule)
        .add_module(JobModule(job.clone()))
        .build()
        .expect("构建应该成功");
    assert_eq!(infrastructure.get_status(), InfrastructureStatus::Imported);
    assert_eq!(infrastructure.import().modules().len(), 2);

    infrastructure.start().expect("启动应该成功");
    assert_eq!(infrastructure.get_status(), InfrastructureStatus::Running);
    assert_eq!(infrastructure.lifecycle_state(), LifecycleState::Running);
    assert_eq!(job.passes.load(Ordering::SeqCst), 1);

    let injector = infrastructure.injector();
    let repository = injector.get_instance::<dyn Repository>().unwrap();
    assert_eq!(repository.find(7), "row-7");
    assert_eq!(*injector.get_named::<i32>("pool_size").unwrap(), 8);
    assert_eq!(*injector.get_named::<String>("dsn").unwrap(), "postgres://local");

    let metrics = infrastructure.get_metrics();
    assert_eq!(metrics.imported_modules_count, 2);
    assert_eq!(metrics.binding_definitions_count, 2);
    assert!(metrics.uptime().is_some());

    infrastructure.stop().expect("停止应该成功");
    assert_eq!(infrastructure.get_status(), InfrastructureStatus::Stopped);
    assert!(matches!(
        injector.get_instance::<dyn Repository>(),
        Err(BindingError::IllegalState { .. })
    ));
}

/// 测试环境限制的模块只在激活环境中导入
#[test]
fn test_environment_restricted_modules() {
    let infrastructure = ModuleImportBuilder::new()
        .with_environments(["test"])
        .add_module_in(CloudModule, ["cloud"])
        .build()
        .unwrap();
    assert!(infrastructure.import().modules().is_empty());

    let infrastructure = ModuleImportBuilder::new()
        .with_environments(["cloud"])
        .add_module_in(CloudModule, ["cloud"])
        .build()
        .unwrap();
    infrastructure.start().unwrap();
    assert_eq!(
        *infrastructure.injector().get_named::<String>("region").unwrap(),
        "eu-west"
    );
}

/// 测试运行阶段由激活环境推导，配置优先
#[test]
fn test_stage_follows_settings() {
    let seen = Arc::new(Mutex::new(None));
    ModuleImportBuilder::new()
        .with_environments(["dev"])
        .add_module(StageModule(seen.clone()))
        .build()
        .unwrap();
    assert_eq!(*seen.lock(), Some(Stage::Development));

    let settings = BinderSettings {
        active_environments: vec!["dev".to_string()],
        stage: Some(Stage::Production),
        ..BinderSettings::default()
    };
    ModuleImportBuilder::new()
        .with_settings(settings)
        .add_module(StageModule(seen.clone()))
        .build()
        .unwrap();
    assert_eq!(*seen.lock(), Some(Stage::Production));
}

/// 测试缺少伴随组件时导入失败并给出建议
#[test]
fn test_missing_companion_fails_import() {
    struct Untargeted;

    impl Module for Untargeted {
        fn configure(&self, binder: &mut Binder) -> BindingResult<()> {
            binder.bind::<SqlRepository>();
            Ok(())
        }
    }

    let result = ModuleImportBuilder::new()
        .with_settings(BinderSettings {
            log_errors: false,
            ..BinderSettings::default()
        })
        .add_module(Untargeted)
        .build();

    match result.err() {
        Some(InfrastructureError::BindingError {
            source: BindingError::Configuration { messages },
        }) => {
            assert_eq!(messages.len(), 1);
            assert!(messages[0].message().contains("classes of the module import"));
        }
        other => panic!("应该是聚合配置错误: {:?}", other.map(|e| e.to_string())),
    }
}

struct CounterProvider(Arc<AtomicUsize>);

impl Provider<u64> for CounterProvider {
    fn get(&self) -> DependencyResult<Arc<u64>> {
        Ok(Arc::new(self.0.fetch_add(1, Ordering::SeqCst) as u64))
    }
}

/// 测试通过类型约定解析未指定目标的绑定
#[test]
fn test_conventions_drive_untargeted_bindings() {
    struct ConventionModule;

    impl Module for ConventionModule {
        fn configure(&self, binder: &mut Binder) -> BindingResult<()> {
            binder.bind::<dyn Repository>();
            binder.bind::<u64>();
            binder.bind::<CounterProvider>().to_instance(Arc::new(CounterProvider(
                Arc::new(AtomicUsize::new(10)),
            )))
        }
    }

    let infrastructure = ModuleImportBuilder::new()
        .add_instance(Arc::new(SqlRepository))
        .with_conventions(|conventions| {
            conventions
                .implemented_by::<dyn Repository, SqlRepository>()
                .assignable::<SqlRepository, dyn Repository>()
                .provided_by::<u64, CounterProvider>();
        })
        .add_module(ConventionModule)
        .build()
        .unwrap();
    infrastructure.start().unwrap();

    let injector = infrastructure.injector();
    assert_eq!(injector.get_instance::<dyn Repository>().unwrap().find(1), "row-1");
    assert_eq!(*injector.get_instance::<u64>().unwrap(), 10);
    assert_eq!(*injector.get_instance::<u64>().unwrap(), 11);
}

/// 测试从配置文件加载引擎配置
#[test]
fn test_settings_from_file() {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "active_environments = [\"cloud\", \"test\"]\nlog_errors = false"
    )
    .unwrap();

    let settings = BinderSettings::load_from(file.path()).unwrap();
    assert_eq!(settings.active_environments, vec!["cloud", "test"]);
    assert!(!settings.log_errors);
    assert_eq!(settings.effective_stage(), Stage::Development);

    let config = settings.to_container_config();
    assert_eq!(config.stage, Some(Stage::Development));
}

/// 测试环境变量覆盖配置文件
#[test]
fn test_settings_env_override() {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "eager_init_singletons = true").unwrap();

    std::env::set_var("BINDER_EAGER_INIT_SINGLETONS", "false");
    let settings = BinderSettings::load_from(file.path());
    std::env::remove_var("BINDER_EAGER_INIT_SINGLETONS");

    assert!(!settings.unwrap().eager_init_singletons);
}

/// 测试配置文件不存在时的错误处理
#[test]
fn test_missing_settings_file_error_handling() {
    let result = BinderSettings::load_from("non_existent_binder.toml");
    match result.err() {
        Some(InfrastructureError::SettingsError { message }) => {
            assert!(message.contains("配置文件不存在"));
        }
        other => panic!("应该是 SettingsError 错误: {:?}", other.map(|e| e.to_string())),
    }
}

/// 测试日志初始化可以重复调用
#[test]
fn test_logging_init_is_idempotent() {
    init_test_logger();
    assert!(LoggingConfig::development().init().is_ok());
    assert!(LoggingConfig::production().init().is_ok());
}

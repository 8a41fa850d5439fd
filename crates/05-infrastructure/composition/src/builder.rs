//! 模块导入构建器

use crate::infrastructure::ImportedInfrastructure;
use crate::settings::BinderSettings;
use di_abstractions::{ComponentDefinition, ComponentRegistry, DiContainer, TypeConventions};
use di_binding::{Module, ModuleEntry, ModuleImporter};
use di_impl::DiContainerImpl;
use infrastructure_common::InfrastructureError;
use std::sync::Arc;
use tracing::{debug, info};

type ConventionSetup = Box<dyn FnOnce(&TypeConventions) + Send>;

/// 模块导入构建器
///
/// 使用建造者模式收集模块、伴随组件与类型约定，构建时完成前置注册并导入全部模块
pub struct ModuleImportBuilder {
    /// 待导入模块，按添加顺序
    modules: Vec<ModuleEntry>,
    /// 伴随组件
    classes: Vec<ComponentDefinition>,
    /// 类型约定注册
    conventions: Vec<ConventionSetup>,
    /// 引擎配置
    settings: BinderSettings,
    /// 是否启用日志初始化
    logging_enabled: bool,
    /// 日志配置
    logging_config: LoggingConfig,
}

impl ModuleImportBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
            classes: Vec::new(),
            conventions: Vec::new(),
            settings: BinderSettings::default(),
            logging_enabled: false, // 默认不初始化日志
            logging_config: LoggingConfig::default(),
        }
    }

    /// 使用指定的引擎配置
    pub fn with_settings(mut self, settings: BinderSettings) -> Self {
        self.settings = settings;
        self
    }

    /// 从默认位置加载引擎配置
    pub fn load_settings(mut self) -> Result<Self, InfrastructureError> {
        self.settings = BinderSettings::load()?;
        Ok(self)
    }

    /// 设置激活的环境
    pub fn with_environments<I, S>(mut self, environments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings.active_environments = environments.into_iter().map(Into::into).collect();
        self
    }

    /// 添加模块，导入顺序即添加顺序
    pub fn add_module<M: Module>(mut self, module: M) -> Self {
        let entry = ModuleEntry::new(module, self.modules.len());
        debug!("添加模块 {}", entry.name());
        self.modules.push(entry);
        self
    }

    /// 添加只在指定环境中导入的模块
    pub fn add_module_in<M, I, S>(mut self, module: M, environments: I) -> Self
    where
        M: Module,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = ModuleEntry::new(module, self.modules.len()).with_environments(environments);
        debug!("添加模块 {}，环境限制 {:?}", entry.name(), entry.environments());
        self.modules.push(entry);
        self
    }

    /// 添加伴随组件定义
    pub fn add_class(mut self, definition: ComponentDefinition) -> Self {
        debug!("添加伴随组件 {}", definition.exposed_type);
        self.classes.push(definition);
        self
    }

    /// 添加伴随组件实例
    pub fn add_instance<T>(self, instance: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.add_class(ComponentDefinition::of_instance(instance))
    }

    /// 注册类型约定（默认实现、默认提供者、可赋值关系）
    pub fn with_conventions<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&TypeConventions) + Send + 'static,
    {
        self.conventions.push(Box::new(setup));
        self
    }

    /// 配置日志
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = config;
        self.logging_enabled = true;
        self
    }

    /// 构建宿主容器并导入全部模块
    pub fn build(self) -> Result<ImportedInfrastructure, InfrastructureError> {
        if self.logging_enabled {
            self.logging_config.init()?;
        }
        info!("开始导入模块，共 {} 个", self.modules.len());

        let container = Arc::new(DiContainerImpl::with_config(
            self.settings.to_container_config(),
        ));
        for setup in self.conventions {
            setup(container.conventions());
        }

        let importer =
            ModuleImporter::new(container.clone()).with_error_logging(self.settings.log_errors);

        let mut prepared = self.classes;
        for entry in &self.modules {
            if !importer.is_active(entry) {
                continue;
            }
            prepared.extend(entry.component_definitions());
            prepared.extend(entry.provider_definitions());
        }
        debug!("前置注册 {} 个组件定义", prepared.len());
        container.register_definitions(prepared)?;

        let import = importer.import_modules(&self.modules)?;
        info!("模块导入完成: {:?}", import.modules());
        Ok(ImportedInfrastructure::new(container, import))
    }
}

impl Default for ModuleImportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: tracing::Level,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }

    /// 初始化全局日志订阅者，已经初始化过时忽略
    pub fn init(&self) -> Result<(), InfrastructureError> {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(self.level)
            .with_target(self.show_target)
            .with_thread_ids(self.show_thread_ids)
            .with_file(self.show_file)
            .with_line_number(self.show_line_number);

        let result = if self.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        };
        if let Err(e) = result {
            debug!("日志系统已初始化，跳过: {}", e);
            return Ok(());
        }

        info!("日志系统初始化完成");
        Ok(())
    }
}

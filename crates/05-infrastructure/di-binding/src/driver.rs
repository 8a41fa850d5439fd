//! 模块导入驱动
//!
//! 按输入顺序执行每个模块的配置回调，检查聚合错误，通过后交给终结器注册。

use crate::aggregator::log_messages;
use crate::binder::Binder;
use crate::finalizer::Finalizer;
use crate::injection::InjectionQueue;
use crate::module::ModuleEntry;
use di_abstractions::{DefinitionId, DiContainer};
use infrastructure_common::{BindingResult, ErrorMessage};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 一次成功导入的结果
#[derive(Clone)]
pub struct ModuleImport {
    definitions: Vec<DefinitionId>,
    modules: Vec<String>,
    injections: Arc<InjectionQueue>,
    injection_failures: Vec<ErrorMessage>,
}

impl ModuleImport {
    /// 注册的绑定定义
    pub fn definitions(&self) -> &[DefinitionId] {
        &self.definitions
    }

    /// 已配置的模块名称，按导入顺序
    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    /// 尚未执行的成员注入数量
    pub fn pending_injections(&self) -> usize {
        self.injections.len()
    }

    /// 容器已运行时立即执行的成员注入中失败的部分
    ///
    /// 注入失败不撤销已注册的绑定定义。
    pub fn injection_failures(&self) -> &[ErrorMessage] {
        &self.injection_failures
    }
}

impl std::fmt::Debug for ModuleImport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleImport")
            .field("definitions", &self.definitions)
            .field("modules", &self.modules)
            .field("pending_injections", &self.injections.len())
            .field("injection_failures", &self.injection_failures.len())
            .finish()
    }
}

/// 模块导入驱动
pub struct ModuleImporter {
    container: Arc<dyn DiContainer>,
    log_errors: bool,
}

impl ModuleImporter {
    /// 创建导入驱动
    pub fn new(container: Arc<dyn DiContainer>) -> Self {
        Self {
            container,
            log_errors: true,
        }
    }

    /// 设置是否逐条记录聚合错误
    pub fn with_error_logging(mut self, enabled: bool) -> Self {
        self.log_errors = enabled;
        self
    }

    /// 模块是否在当前环境中生效
    pub fn is_active(&self, entry: &ModuleEntry) -> bool {
        self.container
            .environment()
            .matches_any(entry.environments())
    }

    /// 导入模块
    ///
    /// 每个模块的配置回调恰好执行一次。存在任何配置错误时不注册任何定义。
    /// 容器已运行时立即执行成员注入，注入失败记录在结果中，已注册的定义保持生效。
    pub fn import_modules(&self, entries: &[ModuleEntry]) -> BindingResult<ModuleImport> {
        let injections = Arc::new(InjectionQueue::new());
        let mut binder = Binder::new(self.container.clone(), injections.clone());
        let mut modules = Vec::new();

        for entry in entries {
            if !self.is_active(entry) {
                debug!("模块 {} 不在激活环境中，跳过", entry.name());
                continue;
            }

            debug!("配置模块 {} (#{})", entry.name(), entry.index());
            binder.with_source(entry.name());
            if let Err(e) = entry.module().configure(&mut binder) {
                warn!("模块 {} 配置中止: {}", entry.name(), e);
                binder
                    .errors_mut()
                    .push(ErrorMessage::from_cause(e).with_source(entry.name()));
            }
            modules.push(entry.name().to_string());
        }

        let (declarations, errors) = binder.into_parts();
        if !errors.is_empty() {
            if self.log_errors {
                errors.log_all();
            }
            error!("Failed to import modules due to prior errors");
            return Err(errors.into_failure());
        }

        info!(
            "{} 个模块配置完成，共 {} 条绑定声明",
            modules.len(),
            declarations.len()
        );
        let definitions = match Finalizer::new(self.container.as_ref()).finalize(declarations) {
            Ok(definitions) => definitions,
            Err(e) => {
                if self.log_errors {
                    log_messages(e.messages());
                }
                error!("Failed to import modules: {}", e);
                return Err(e);
            }
        };

        let mut injection_failures = Vec::new();
        if self.container.is_running() {
            let outcome = injections.drain(self.container.as_locator());
            debug!("容器已运行，立即完成 {} 个对象的成员注入", outcome.injected);
            if !outcome.is_success() {
                error!(
                    "{} 个对象成员注入失败，已注册的绑定定义保持生效",
                    outcome.failures.len()
                );
                if self.log_errors {
                    log_messages(&outcome.failures);
                }
            }
            injection_failures = outcome.failures;
        } else {
            self.container.add_startup_listener(injections.clone());
        }

        Ok(ModuleImport {
            definitions,
            modules,
            injections,
            injection_failures,
        })
    }
}

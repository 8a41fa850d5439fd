//! 导入结果主入口

use crate::builder::ModuleImportBuilder;
use di_abstractions::{ComponentRegistry, DiContainer};
use di_binding::{Injector, ModuleImport};
use di_impl::DiContainerImpl;
use infrastructure_common::{InfrastructureError, LifecycleState};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// 已导入模块的宿主容器
///
/// 持有宿主容器、导入结果与注入器门面，负责启动与停止
pub struct ImportedInfrastructure {
    /// 宿主容器
    container: Arc<DiContainerImpl>,
    /// 注入器门面
    injector: Injector,
    /// 导入结果
    import: ModuleImport,
    /// 运行状态
    status: RwLock<InfrastructureStatus>,
    /// 统计信息
    metrics: RwLock<InfrastructureMetrics>,
}

impl ImportedInfrastructure {
    /// 创建构建器
    pub fn builder() -> ModuleImportBuilder {
        ModuleImportBuilder::new()
    }

    pub(crate) fn new(container: Arc<DiContainerImpl>, import: ModuleImport) -> Self {
        let metrics = InfrastructureMetrics {
            imported_modules_count: import.modules().len(),
            binding_definitions_count: import.definitions().len(),
            registered_definitions_count: container.definition_count(),
            ..InfrastructureMetrics::default()
        };
        Self {
            injector: Injector::new(container.clone()),
            container,
            import,
            status: RwLock::new(InfrastructureStatus::Imported),
            metrics: RwLock::new(metrics),
        }
    }

    /// 启动宿主容器，执行排队的成员注入
    pub fn start(&self) -> Result<(), InfrastructureError> {
        info!("启动宿主容器");
        *self.status.write() = InfrastructureStatus::Starting;

        if let Err(e) = self.container.start() {
            error!("宿主容器启动失败: {}", e);
            *self.status.write() = InfrastructureStatus::Failed;
            return Err(e.into());
        }

        {
            let mut metrics = self.metrics.write();
            metrics.start_time = Some(chrono::Utc::now());
            metrics.stop_time = None;
            metrics.created_singletons_count = self.container.stats().created_singletons;
        }
        *self.status.write() = InfrastructureStatus::Running;
        info!("宿主容器启动完成");
        Ok(())
    }

    /// 停止宿主容器
    pub fn stop(&self) -> Result<(), InfrastructureError> {
        info!("停止宿主容器");
        *self.status.write() = InfrastructureStatus::Stopping;

        self.container
            .stop()
            .map_err(|e| InfrastructureError::ShutdownFailed {
                message: e.to_string(),
            })?;

        *self.status.write() = InfrastructureStatus::Stopped;
        self.metrics.write().stop_time = Some(chrono::Utc::now());
        info!("宿主容器停止完成");
        Ok(())
    }

    /// 注入器门面
    pub fn injector(&self) -> &Injector {
        &self.injector
    }

    /// 导入结果
    pub fn import(&self) -> &ModuleImport {
        &self.import
    }

    /// 宿主容器
    pub fn container(&self) -> &Arc<DiContainerImpl> {
        &self.container
    }

    /// 宿主容器生命周期状态
    pub fn lifecycle_state(&self) -> LifecycleState {
        self.container.state()
    }

    /// 获取运行状态
    pub fn get_status(&self) -> InfrastructureStatus {
        *self.status.read()
    }

    /// 获取统计信息
    pub fn get_metrics(&self) -> InfrastructureMetrics {
        self.metrics.read().clone()
    }
}

/// 运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfrastructureStatus {
    /// 模块已导入
    Imported,
    /// 启动中
    Starting,
    /// 运行中
    Running,
    /// 停止中
    Stopping,
    /// 已停止
    Stopped,
    /// 失败
    Failed,
}

/// 统计信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InfrastructureMetrics {
    /// 启动时间
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    /// 停止时间
    pub stop_time: Option<chrono::DateTime<chrono::Utc>>,
    /// 已配置的模块数量
    pub imported_modules_count: usize,
    /// 绑定翻译出的定义数量
    pub binding_definitions_count: usize,
    /// 宿主容器中的定义总数
    pub registered_definitions_count: usize,
    /// 启动后已创建的单例数量
    pub created_singletons_count: usize,
}

impl InfrastructureMetrics {
    /// 计算运行时间
    pub fn uptime(&self) -> Option<chrono::Duration> {
        match (self.start_time, self.stop_time) {
            (Some(start), Some(stop)) => Some(stop - start),
            (Some(start), None) => Some(chrono::Utc::now() - start),
            _ => None,
        }
    }
}

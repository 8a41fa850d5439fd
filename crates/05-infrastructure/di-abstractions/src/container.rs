//! 依赖注入容器抽象接口
//!
//! 提供宿主容器的生命周期与就绪通知抽象

use crate::conventions::TypeConventions;
use crate::registry::ComponentRegistry;
use crate::resolver::ComponentLocator;
use infrastructure_common::{DependencyResult, LifecycleState, Stage};
use std::sync::Arc;

/// 容器就绪监听器
///
/// 容器进入运行状态后按注册顺序通知。
pub trait StartupListener: Send + Sync {
    /// 容器已就绪
    fn on_startup(&self, locator: &dyn ComponentLocator) -> DependencyResult<()>;

    /// 监听器名称
    fn name(&self) -> &str {
        "startup-listener"
    }
}

/// 依赖注入容器 trait
pub trait DiContainer: ComponentRegistry + ComponentLocator {
    /// 类型约定表
    fn conventions(&self) -> &TypeConventions;

    /// 容器运行环境
    fn environment(&self) -> &ContainerEnvironment;

    /// 添加就绪监听器
    fn add_startup_listener(&self, listener: Arc<dyn StartupListener>);

    /// 启动容器
    fn start(&self) -> DependencyResult<()>;

    /// 停止容器
    fn stop(&self) -> DependencyResult<()>;

    /// 当前生命周期状态
    fn state(&self) -> LifecycleState;

    /// 容器统计信息
    fn stats(&self) -> ContainerStats;

    /// 作为查找接口使用
    fn as_locator(&self) -> &dyn ComponentLocator;
}

/// 容器配置
#[derive(Debug, Clone, Default)]
pub struct ContainerConfig {
    /// 激活的环境
    pub active_environments: Vec<String>,
    /// 启动时是否创建预先初始化的单例
    pub eager_init_singletons: bool,
    /// 运行阶段，未设置时由激活环境推导
    pub stage: Option<Stage>,
}

impl ContainerConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self {
            eager_init_singletons: true,
            ..Self::default()
        }
    }

    /// 设置激活的环境
    pub fn with_environments<I, S>(mut self, environments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active_environments = environments.into_iter().map(Into::into).collect();
        self
    }

    /// 设置运行阶段
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// 设置是否创建预先初始化的单例
    pub fn with_eager_init(mut self, eager: bool) -> Self {
        self.eager_init_singletons = eager;
        self
    }
}

/// 容器运行环境
#[derive(Debug, Clone)]
pub struct ContainerEnvironment {
    active: Vec<String>,
    stage: Stage,
}

impl ContainerEnvironment {
    /// 由容器配置创建运行环境
    pub fn from_config(config: &ContainerConfig) -> Self {
        let stage = config
            .stage
            .unwrap_or_else(|| Stage::from_environments(&config.active_environments));
        Self {
            active: config.active_environments.clone(),
            stage,
        }
    }

    /// 激活的环境
    pub fn active_environments(&self) -> &[String] {
        &self.active
    }

    /// 环境是否激活
    pub fn is_active(&self, environment: &str) -> bool {
        self.active.iter().any(|name| name == environment)
    }

    /// 是否满足环境限制，空限制总是满足
    pub fn matches_any(&self, environments: &[String]) -> bool {
        environments.is_empty() || environments.iter().any(|name| self.is_active(name))
    }

    /// 运行阶段
    pub fn stage(&self) -> Stage {
        self.stage
    }
}

/// 容器统计信息
#[derive(Debug, Clone, Default)]
pub struct ContainerStats {
    /// 已注册定义数量
    pub registered_definitions: usize,
    /// 已创建单例数量
    pub created_singletons: usize,
    /// 就绪监听器数量
    pub startup_listeners: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_restriction_always_matches() {
        let environment = ContainerEnvironment::from_config(&ContainerConfig::new());
        assert!(environment.matches_any(&[]));
        assert!(!environment.matches_any(&["cloud".to_string()]));
        assert_eq!(environment.stage(), Stage::Production);
    }

    #[test]
    fn restriction_matches_any_active_environment() {
        let config = ContainerConfig::new().with_environments(["test", "cloud"]);
        let environment = ContainerEnvironment::from_config(&config);

        assert!(environment.matches_any(&["aws".to_string(), "cloud".to_string()]));
        assert!(environment.is_active("test"));
        assert_eq!(environment.stage(), Stage::Development);
    }

    #[test]
    fn explicit_stage_overrides_environments() {
        let config = ContainerConfig::new()
            .with_environments(["dev"])
            .with_stage(Stage::Production);
        assert_eq!(
            ContainerEnvironment::from_config(&config).stage(),
            Stage::Production
        );
    }
}

//! 组件生命周期管理

use serde::{Deserialize, Serialize};
use std::fmt;

/// 组件作用域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ComponentScope {
    /// 无作用域 - 每次请求都调用提供者
    #[default]
    NoScope,
    /// 单例 - 首次请求时创建，之后复用
    Singleton,
    /// 预先初始化的单例 - 容器启动时创建
    EagerSingleton,
}

impl ComponentScope {
    /// 是否为单例
    pub fn is_singleton(self) -> bool {
        matches!(self, Self::Singleton | Self::EagerSingleton)
    }

    /// 是否在容器启动时创建
    pub fn is_eager(self) -> bool {
        matches!(self, Self::EagerSingleton)
    }
}

/// 作用域标记
///
/// 绑定时通过 `in_scope` 传入，只接受无作用域与单例两种内置标记。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScopeMarker {
    /// 无作用域
    NoScope,
    /// 单例
    Singleton,
    /// 自定义作用域
    Custom(String),
}

impl ScopeMarker {
    /// 创建自定义作用域标记
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }

    /// 标记名称
    pub fn name(&self) -> &str {
        match self {
            Self::NoScope => "NoScope",
            Self::Singleton => "Singleton",
            Self::Custom(name) => name,
        }
    }

    /// 是否为内置标记
    pub fn is_builtin(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for ScopeMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 运行阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// 开发阶段
    Development,
    /// 生产阶段
    Production,
}

impl Stage {
    /// 根据激活的环境名称推导运行阶段
    pub fn from_environments<S: AsRef<str>>(environments: &[S]) -> Self {
        let development = environments.iter().any(|name| {
            matches!(
                name.as_ref().to_ascii_lowercase().as_str(),
                "dev" | "development" | "test"
            )
        });
        if development {
            Self::Development
        } else {
            Self::Production
        }
    }
}

/// 容器生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// 未初始化
    #[default]
    Uninitialized,
    /// 初始化中
    Initializing,
    /// 运行中
    Running,
    /// 停止中
    Stopping,
    /// 已停止
    Stopped,
    /// 错误状态
    Error,
}

impl LifecycleState {
    /// 是否可以启动
    pub fn can_start(self) -> bool {
        matches!(self, Self::Uninitialized | Self::Stopped)
    }

    /// 是否可以停止
    pub fn can_stop(self) -> bool {
        matches!(self, Self::Running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_follows_active_environments() {
        assert_eq!(Stage::from_environments(&["test"]), Stage::Development);
        assert_eq!(Stage::from_environments(&["cloud", "Dev"]), Stage::Development);
        assert_eq!(Stage::from_environments(&["prod"]), Stage::Production);
        assert_eq!(Stage::from_environments::<&str>(&[]), Stage::Production);
    }

    #[test]
    fn eager_singleton_is_a_singleton() {
        assert!(ComponentScope::EagerSingleton.is_singleton());
        assert!(ComponentScope::EagerSingleton.is_eager());
        assert!(!ComponentScope::NoScope.is_singleton());
    }

    #[test]
    fn custom_scope_marker_is_not_builtin() {
        assert!(ScopeMarker::Singleton.is_builtin());
        assert!(!ScopeMarker::custom("request").is_builtin());
        assert_eq!(ScopeMarker::custom("request").to_string(), "request");
    }
}

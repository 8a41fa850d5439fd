//! # 基础设施组合层
//!
//! 这个 crate 把宿主容器与模块绑定引擎组合成一个可运行的整体。
//!
//! ## 主要功能
//!
//! - **导入构建器**: 使用构建者模式收集模块、伴随组件与类型约定
//! - **引擎配置**: 从配置文件与环境变量加载激活环境、运行阶段等设置
//! - **日志初始化**: 开发与生产两套预设
//! - **生命周期管理**: 启动时执行排队的成员注入，停止时释放单例
//!
//! ## 基本使用
//!
//! ```rust,ignore
//! use infrastructure_composition::{LoggingConfig, ModuleImportBuilder};
//!
//! let infrastructure = ModuleImportBuilder::new()
//!     .with_logging(LoggingConfig::development())
//!     .add_instance(Arc::new(SqlRepository::default()))
//!     .add_module(DatabaseModule)
//!     .build()?;
//!
//! infrastructure.start()?;
//! let repository = infrastructure.injector().get_instance::<dyn Repository>()?;
//! infrastructure.stop()?;
//! ```

pub mod builder;
pub mod infrastructure;
pub mod settings;

#[cfg(test)]
mod tests;

pub use builder::{LoggingConfig, ModuleImportBuilder};
pub use infrastructure::{ImportedInfrastructure, InfrastructureMetrics, InfrastructureStatus};
pub use settings::BinderSettings;

// 重新导出错误类型
pub use infrastructure_common::InfrastructureError;

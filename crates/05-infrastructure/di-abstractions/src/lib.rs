//! # Dependency Injection Abstractions
//! 
//! 宿主容器抽象层，定义组件定义、注册与查找的核心接口。
//! 
//! ## 核心接口
//! 
//! - [`ComponentDefinition`] - 组件定义（暴露类型、提供者、作用域、限定符）
//! - [`ComponentRegistry`] - 组件注册表接口
//! - [`ComponentLocator`] - 按类型与限定符查找组件
//! - [`Provider`] - 组件提供者
//! - [`TypeConventions`] - 类型约定（默认实现、默认提供者、可赋值关系）
//! - [`DiContainer`] - 带生命周期的宿主容器

pub mod registry;
pub mod resolver;
pub mod factory;
pub mod conventions;
pub mod container;

pub use registry::*;
pub use resolver::*;
pub use factory::*;
pub use conventions::*;
pub use container::*;

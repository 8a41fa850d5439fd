//! # Infrastructure Common
//!
//! 这个 crate 提供了模块绑定引擎在各层之间共享的基础类型。
//!
//! ## 核心内容
//!
//! - [`TypeInfo`] - 运行时类型标识
//! - [`Qualifier`] - 组件限定符（名称 / 标记值 / 标记类型）
//! - [`ComponentScope`] - 组件作用域
//! - [`Assignable`] - 编译期可赋值关系（实现类型到声明类型的向上转换）
//! - [`BindingError`] / [`DependencyError`] - 错误类型
//!
//! ## 设计原则
//!
//! - 基于 Rust 类型系统表达可赋值关系，不依赖反射
//! - 所有标识都是值类型，按结构比较

pub mod component;
pub mod errors;
pub mod lifecycle;
pub mod metadata;
pub mod qualifier;

pub use component::*;
pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
pub use qualifier::*;

//! # DI Binding
//!
//! 模块绑定翻译引擎：模块通过 [`Binder`] 声明绑定，引擎把声明翻译为宿主容器的组件定义。
//!
//! ## 导入流程
//!
//! 1. [`ModuleImporter`] 按输入顺序执行每个模块的配置回调
//! 2. 配置期间的可恢复问题记录到 [`ErrorAggregator`]，所有模块执行完后统一检查
//! 3. 检查通过后 [`Finalizer`] 按记录顺序构建定义，并一次性注册
//! 4. 宿主容器就绪时执行排队的成员注入，之后可以通过 [`Injector`] 查找组件
//!
//! ## 示例
//!
//! ```rust,ignore
//! struct DatabaseModule;
//!
//! impl Module for DatabaseModule {
//!     fn configure(&self, binder: &mut Binder) -> BindingResult<()> {
//!         binder.bind::<dyn Repository>().to::<SqlRepository>()?;
//!         binder.bind_constant().annotated_with_name("pool_size")?.to(8);
//!         Ok(())
//!     }
//! }
//! ```

pub mod aggregator;
pub mod binder;
pub mod builder;
pub mod constant;
pub mod driver;
pub mod finalizer;
pub mod implicit;
pub mod injection;
pub mod injector;
pub mod key;
pub mod module;
pub mod provider;

pub use aggregator::{log_messages, ErrorAggregator};
pub use binder::{Binder, RecordedDeclarations};
pub use builder::{BindingDeclaration, BindingTarget, LinkedBindingBuilder};
pub use constant::{AnnotatedConstantBindingBuilder, ConstantDeclaration, ConstantValue};
pub use driver::{ModuleImport, ModuleImporter};
pub use finalizer::Finalizer;
pub use implicit::{ImplicitResolver, Resolution};
pub use injection::{InjectionOutcome, InjectionQueue};
pub use injector::Injector;
pub use key::{Key, TypeLiteral};
pub use module::{Module, ModuleEntry, ProviderMethod};
pub use provider::{LazyProvider, MembersInjector};

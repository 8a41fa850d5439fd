//! 组件实例与可赋值关系
//!
//! 容器中的实例统一以 `Arc<T>` 保存，再擦除为 [`ErasedInstance`]。
//! `T` 可以是 trait 对象，因此接口绑定不需要额外的包装。

use std::any::Any;
use std::sync::Arc;

/// 类型擦除后的组件实例，内部保存的是 `Arc<T>`
pub type ErasedInstance = Arc<dyn Any + Send + Sync>;

/// 擦除组件实例类型
pub fn erase<T>(instance: Arc<T>) -> ErasedInstance
where
    T: ?Sized + Send + Sync + 'static,
{
    Arc::new(instance)
}

/// 还原组件实例类型
pub fn downcast<T>(instance: &ErasedInstance) -> Option<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    instance.downcast_ref::<Arc<T>>().cloned()
}

/// 可赋值关系
///
/// `I: Assignable<T>` 表示 `I` 的实例可以作为 `T` 使用。每个类型都可以赋值给自身，
/// 实现类型到 trait 对象的关系通过 [`assignable!`](crate::assignable) 声明。
pub trait Assignable<T: ?Sized>: Send + Sync + 'static {
    /// 向上转换
    fn upcast(self: Arc<Self>) -> Arc<T>;
}

impl<T> Assignable<T> for T
where
    T: ?Sized + Send + Sync + 'static,
{
    fn upcast(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// 声明实现类型可以赋值给一个或多个 trait 对象
///
/// ```rust
/// use infrastructure_common::{assignable, Assignable};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct EnglishGreeter;
///
/// impl Greeter for EnglishGreeter {
///     fn greet(&self) -> String {
///         "hello".to_string()
///     }
/// }
///
/// assignable!(EnglishGreeter => dyn Greeter);
///
/// let greeter = Assignable::<dyn Greeter>::upcast(Arc::new(EnglishGreeter));
/// assert_eq!(greeter.greet(), "hello");
/// ```
#[macro_export]
macro_rules! assignable {
    ($implementation:ty => $($target:ty),+ $(,)?) => {
        $(
            impl $crate::Assignable<$target> for $implementation {
                fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$target> {
                    self
                }
            }
        )+
    };
}

//! 组件提供者与构造器抽象
//!
//! 提供者按需产出实例，构造器从容器取得依赖后创建实例

use crate::registry::ComponentSupplier;
use crate::resolver::ComponentLocator;
use infrastructure_common::{erase, DependencyError, DependencyResult, TypeInfo};
use std::error::Error as StdError;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;

/// 组件提供者 trait
pub trait Provider<T: ?Sized>: Send + Sync + 'static {
    /// 提供一个实例
    fn get(&self) -> DependencyResult<Arc<T>>;
}

/// 基于闭包的提供者
pub struct FnProvider<T: ?Sized, F> {
    factory: F,
    _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T, F> FnProvider<T, F>
where
    T: ?Sized + Send + Sync + 'static,
    F: Fn() -> DependencyResult<Arc<T>> + Send + Sync + 'static,
{
    /// 创建基于闭包的提供者
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            _marker: PhantomData,
        }
    }
}

impl<T, F> Provider<T> for FnProvider<T, F>
where
    T: ?Sized + Send + Sync + 'static,
    F: Fn() -> DependencyResult<Arc<T>> + Send + Sync + 'static,
{
    fn get(&self) -> DependencyResult<Arc<T>> {
        (self.factory)()
    }
}

/// 由闭包创建提供者
pub fn provider_fn<T, F>(factory: F) -> FnProvider<T, F>
where
    T: ?Sized + Send + Sync + 'static,
    F: Fn() -> DependencyResult<Arc<T>> + Send + Sync + 'static,
{
    FnProvider::new(factory)
}

/// 把提供者实例包装为组件提供函数
pub fn erase_provider<T, P>(provider: Arc<P>) -> ComponentSupplier
where
    T: ?Sized + Send + Sync + 'static,
    P: Provider<T>,
{
    Arc::new(move |_: &dyn ComponentLocator| <P as Provider<T>>::get(&provider).map(erase))
}

/// 构造器创建函数类型
pub type ConstructorFn<S> = Arc<
    dyn Fn(&dyn ComponentLocator) -> Result<S, Box<dyn StdError + Send + Sync>> + Send + Sync,
>;

/// 组件构造器
///
/// 以容器为参数创建实例，失败时统一包装为构造失败错误。
pub struct Constructor<S> {
    name: String,
    create: ConstructorFn<S>,
}

impl<S> Clone for Constructor<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            create: self.create.clone(),
        }
    }
}

impl<S: Send + Sync + 'static> Constructor<S> {
    /// 创建构造器
    pub fn new<F, E>(name: impl Into<String>, create: F) -> Self
    where
        F: Fn(&dyn ComponentLocator) -> Result<S, E> + Send + Sync + 'static,
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self {
            name: name.into(),
            create: Arc::new(move |locator: &dyn ComponentLocator| {
                create(locator).map_err(Into::into)
            }),
        }
    }

    /// 以类型名称命名的构造器
    pub fn of<F, E>(create: F) -> Self
    where
        F: Fn(&dyn ComponentLocator) -> Result<S, E> + Send + Sync + 'static,
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self::new(format!("{}::new", TypeInfo::of::<S>()), create)
    }

    /// 构造器名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 调用构造器
    pub fn invoke(&self, locator: &dyn ComponentLocator) -> DependencyResult<Arc<S>> {
        (self.create)(locator).map(Arc::new).map_err(|cause| {
            DependencyError::ComponentCreationFailed {
                type_name: TypeInfo::of::<S>().name,
                source: Box::new(ConstructorFailure {
                    constructor: self.name.clone(),
                    cause,
                }),
            }
        })
    }
}

impl<S> fmt::Debug for Constructor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor").field("name", &self.name).finish()
    }
}

/// 构造器调用失败
#[derive(Debug, Error)]
#[error("Unable to instance bean via constructor: {constructor}")]
pub struct ConstructorFailure {
    constructor: String,
    #[source]
    cause: Box<dyn StdError + Send + Sync>,
}

impl ConstructorFailure {
    /// 失败的构造器名称
    pub fn constructor(&self) -> &str {
        &self.constructor
    }
}

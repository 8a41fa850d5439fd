//! 延迟提供者与成员注入器

use crate::key::Key;
use di_abstractions::{typed, DiContainer, LookupRequest, MembersInjectable, Provider};
use infrastructure_common::{BindingError, BindingResult, DependencyResult};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// 延迟查找的提供者，每次调用 `get` 时才查询宿主容器
pub struct LazyProvider<T: ?Sized> {
    container: Arc<dyn DiContainer>,
    request: LookupRequest,
    _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T> LazyProvider<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    pub(crate) fn new(container: Arc<dyn DiContainer>, key: &Key) -> Self {
        Self {
            container,
            request: key.lookup_request(),
            _marker: PhantomData,
        }
    }

    /// 查找请求
    pub fn request(&self) -> &LookupRequest {
        &self.request
    }
}

impl<T> Provider<T> for LazyProvider<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    fn get(&self) -> DependencyResult<Arc<T>> {
        self.container.locate(&self.request).and_then(typed)
    }
}

impl<T: ?Sized> Clone for LazyProvider<T> {
    fn clone(&self) -> Self {
        Self {
            container: self.container.clone(),
            request: self.request.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized> fmt::Debug for LazyProvider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LazyProvider({})", self.request)
    }
}

/// 成员注入器，容器运行后才可使用
pub struct MembersInjector<T: ?Sized> {
    container: Arc<dyn DiContainer>,
    _marker: PhantomData<fn(&T)>,
}

impl<T> MembersInjector<T>
where
    T: MembersInjectable,
{
    pub(crate) fn new(container: Arc<dyn DiContainer>) -> Self {
        Self {
            container,
            _marker: PhantomData,
        }
    }

    /// 为实例注入成员
    pub fn inject_members(&self, instance: &T) -> BindingResult<()> {
        if !self.container.is_running() {
            return Err(BindingError::illegal_state("Injector not started"));
        }
        self.container
            .inject_members(instance as &dyn MembersInjectable)
            .map_err(BindingError::from)
    }
}

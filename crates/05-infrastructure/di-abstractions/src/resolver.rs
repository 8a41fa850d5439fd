//! 组件查找抽象接口
//!
//! 提供按类型与限定符查找组件实例的能力

use crate::registry::DefinitionId;
use infrastructure_common::{
    downcast, DependencyError, DependencyResult, ErasedInstance, Qualifier, TypeInfo,
};
use std::fmt;
use std::sync::Arc;

/// 组件查找请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    /// 请求的类型
    pub type_info: TypeInfo,
    /// 请求的限定符
    pub qualifier: Qualifier,
}

impl LookupRequest {
    /// 创建查找请求
    pub fn new(type_info: TypeInfo, qualifier: Qualifier) -> Self {
        Self {
            type_info,
            qualifier,
        }
    }

    /// 无限定符查找指定类型
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(TypeInfo::of::<T>(), Qualifier::None)
    }

    /// 设置限定符
    pub fn qualified(mut self, qualifier: Qualifier) -> Self {
        self.qualifier = qualifier;
        self
    }
}

impl fmt::Display for LookupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.type_info, self.qualifier)
    }
}

/// 可注入成员的对象
///
/// 已构造的对象通过此 trait 从容器中填充自己的依赖。
pub trait MembersInjectable: Send + Sync {
    /// 从容器中注入成员
    fn inject_members(&self, locator: &dyn ComponentLocator) -> DependencyResult<()>;
}

/// 组件查找 trait
///
/// 查找结果是擦除类型后的实例，通过 [`ComponentLocatorExt`] 获得类型化视图。
pub trait ComponentLocator: Send + Sync {
    /// 查找唯一匹配的组件
    ///
    /// 多个候选时选择唯一的首选组件，否则返回 `NonUniqueComponent`。
    fn locate(&self, request: &LookupRequest) -> DependencyResult<ErasedInstance>;

    /// 查找所有匹配的组件，按排序值排列
    fn locate_all(&self, request: &LookupRequest) -> DependencyResult<Vec<ErasedInstance>>;

    /// 通过定义标识直接获取组件
    fn locate_definition(&self, id: DefinitionId) -> DependencyResult<ErasedInstance>;

    /// 是否存在匹配的组件
    fn contains(&self, request: &LookupRequest) -> bool {
        self.locate(request).is_ok()
    }

    /// 容器是否处于运行状态
    fn is_running(&self) -> bool;

    /// 为已构造的对象注入成员
    fn inject_members(&self, target: &dyn MembersInjectable) -> DependencyResult<()>;
}

/// 把擦除类型的实例还原为具体类型
pub fn typed<T>(instance: ErasedInstance) -> DependencyResult<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    downcast::<T>(&instance).ok_or_else(|| DependencyError::TypeMismatch {
        expected: TypeInfo::of::<T>().name,
    })
}

/// 类型化查找扩展
pub trait ComponentLocatorExt: ComponentLocator {
    /// 查找指定类型的组件
    fn get<T>(&self) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.locate(&LookupRequest::of::<T>()).and_then(typed)
    }

    /// 按限定符查找指定类型的组件
    fn get_qualified<T>(&self, qualifier: Qualifier) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.locate(&LookupRequest::of::<T>().qualified(qualifier))
            .and_then(typed)
    }

    /// 查找指定类型的全部组件
    fn get_all<T>(&self) -> DependencyResult<Vec<Arc<T>>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.locate_all(&LookupRequest::of::<T>())?
            .into_iter()
            .map(typed)
            .collect()
    }
}

impl<L: ComponentLocator + ?Sized> ComponentLocatorExt for L {}

//! 类型约定
//!
//! 记录类型级别的约定：默认实现、默认提供者以及实现类型到声明类型的可赋值关系。
//! 未指定目标的绑定依靠这些约定推导目标。

use crate::factory::Provider;
use dashmap::DashMap;
use infrastructure_common::{
    downcast, erase, Assignable, DependencyError, DependencyResult, ErasedInstance, TypeInfo,
};
use std::any::TypeId;
use std::sync::Arc;
use tracing::debug;

/// 擦除类型后的向上转换函数
pub type ErasedCast = Arc<dyn Fn(&ErasedInstance) -> Option<ErasedInstance> + Send + Sync>;

/// 擦除类型后的提供者调用函数，参数为提供者实例
pub type ErasedProviderCall =
    Arc<dyn Fn(&ErasedInstance) -> DependencyResult<ErasedInstance> + Send + Sync>;

/// 生成从 `I` 到 `T` 的擦除转换函数
pub fn upcast_fn<I, T>() -> ErasedCast
where
    I: ?Sized + Assignable<T>,
    T: ?Sized + Send + Sync + 'static,
{
    Arc::new(|instance: &ErasedInstance| {
        downcast::<I>(instance).map(|value| erase(<I as Assignable<T>>::upcast(value)))
    })
}

/// 生成调用提供者 `P` 的擦除函数
pub fn provider_call<T, P>() -> ErasedProviderCall
where
    T: ?Sized + Send + Sync + 'static,
    P: Provider<T>,
{
    Arc::new(|instance: &ErasedInstance| {
        let provider = downcast::<P>(instance).ok_or_else(|| DependencyError::TypeMismatch {
            expected: TypeInfo::of::<P>().name,
        })?;
        <P as Provider<T>>::get(&provider).map(erase)
    })
}

/// 默认提供者约定
#[derive(Clone)]
pub struct ProviderConvention {
    /// 提供者类型
    pub provider: TypeInfo,
    /// 调用提供者
    pub call: ErasedProviderCall,
}

impl std::fmt::Debug for ProviderConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConvention")
            .field("provider", &self.provider)
            .finish()
    }
}

/// 类型约定表
#[derive(Default)]
pub struct TypeConventions {
    implementations: DashMap<TypeId, TypeInfo>,
    providers: DashMap<TypeId, ProviderConvention>,
    casts: DashMap<(TypeId, TypeId), ErasedCast>,
}

impl TypeConventions {
    /// 创建空的约定表
    pub fn new() -> Self {
        Self::default()
    }

    /// 声明 `T` 的默认实现为 `I`
    ///
    /// 不检查可赋值关系，绑定推导时才校验。
    pub fn implemented_by<T, I>(&self) -> &Self
    where
        T: ?Sized + 'static,
        I: ?Sized + 'static,
    {
        debug!(
            "约定默认实现: {} -> {}",
            TypeInfo::of::<T>(),
            TypeInfo::of::<I>()
        );
        self.implementations
            .insert(TypeId::of::<T>(), TypeInfo::of::<I>());
        self
    }

    /// 声明 `I` 的实例可以作为 `T` 使用
    pub fn assignable<I, T>(&self) -> &Self
    where
        I: ?Sized + Assignable<T>,
        T: ?Sized + Send + Sync + 'static,
    {
        self.casts
            .insert((TypeId::of::<I>(), TypeId::of::<T>()), upcast_fn::<I, T>());
        self
    }

    /// 声明 `T` 的默认提供者为 `P`
    pub fn provided_by<T, P>(&self) -> &Self
    where
        T: ?Sized + Send + Sync + 'static,
        P: Provider<T>,
    {
        debug!(
            "约定默认提供者: {} -> {}",
            TypeInfo::of::<T>(),
            TypeInfo::of::<P>()
        );
        self.providers.insert(
            TypeId::of::<T>(),
            ProviderConvention {
                provider: TypeInfo::of::<P>(),
                call: provider_call::<T, P>(),
            },
        );
        self
    }

    /// 查询默认实现
    pub fn default_implementation(&self, type_id: TypeId) -> Option<TypeInfo> {
        self.implementations
            .get(&type_id)
            .map(|entry| entry.value().clone())
    }

    /// 查询默认提供者
    pub fn provider_for(&self, type_id: TypeId) -> Option<ProviderConvention> {
        self.providers.get(&type_id).map(|entry| entry.value().clone())
    }

    /// 查询从 `from` 到 `to` 的转换，同一类型总是可以转换
    pub fn cast(&self, from: TypeId, to: TypeId) -> Option<ErasedCast> {
        if from == to {
            let identity: ErasedCast =
                Arc::new(|instance: &ErasedInstance| Some(instance.clone()));
            return Some(identity);
        }
        self.casts.get(&(from, to)).map(|entry| entry.value().clone())
    }
}

impl std::fmt::Debug for TypeConventions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeConventions")
            .field("implementations", &self.implementations.len())
            .field("providers", &self.providers.len())
            .field("casts", &self.casts.len())
            .finish()
    }
}

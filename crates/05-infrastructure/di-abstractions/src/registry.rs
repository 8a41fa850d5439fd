//! 组件注册表抽象接口

use crate::resolver::ComponentLocator;
use infrastructure_common::{
    erase, ComponentMetadata, ComponentScope, DependencyResult, ErasedInstance, Qualifier,
    TypeInfo,
};
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

/// 组件提供函数类型
///
/// 调用时由容器传入自身作为查找入口，提供函数不持有容器引用。
pub type ComponentSupplier =
    Arc<dyn Fn(&dyn ComponentLocator) -> DependencyResult<ErasedInstance> + Send + Sync>;

/// 组件定义标识
///
/// 注册时由容器分配，单调递增，可作为固定句柄引用某一个具体定义。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefinitionId(u64);

impl DefinitionId {
    /// 创建定义标识
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// 标识值
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 组件定义
#[derive(Clone)]
pub struct ComponentDefinition {
    /// 暴露类型
    pub exposed_type: TypeInfo,
    /// 限定符
    pub qualifier: Qualifier,
    /// 作用域
    pub scope: ComponentScope,
    /// 是否为首选组件
    pub primary: bool,
    /// 排序值，越小越靠前
    pub order: Option<i32>,
    /// 声明性元数据
    pub metadata: ComponentMetadata,
    /// 提供函数
    pub supplier: ComponentSupplier,
}

impl ComponentDefinition {
    /// 创建新的组件定义
    pub fn new(exposed_type: TypeInfo, supplier: ComponentSupplier) -> Self {
        Self {
            exposed_type,
            qualifier: Qualifier::None,
            scope: ComponentScope::NoScope,
            primary: false,
            order: None,
            metadata: ComponentMetadata::default(),
            supplier,
        }
    }

    /// 以固定实例创建组件定义，每次提供同一个实例
    pub fn of_instance<T>(instance: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let erased = erase(instance);
        Self::new(
            TypeInfo::of::<T>(),
            Arc::new(move |_: &dyn ComponentLocator| Ok(erased.clone())),
        )
    }

    /// 以工厂函数创建组件定义
    pub fn from_fn<T, F>(factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&dyn ComponentLocator) -> DependencyResult<Arc<T>> + Send + Sync + 'static,
    {
        Self::new(
            TypeInfo::of::<T>(),
            Arc::new(move |locator: &dyn ComponentLocator| factory(locator).map(erase)),
        )
    }

    /// 设置限定符
    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifier = qualifier;
        self
    }

    /// 设置作用域
    pub fn with_scope(mut self, scope: ComponentScope) -> Self {
        self.scope = scope;
        self
    }

    /// 设置为首选组件
    pub fn with_primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    /// 设置排序值
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    /// 设置元数据
    pub fn with_metadata(mut self, metadata: ComponentMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// 是否暴露指定类型
    pub fn exposes(&self, type_id: TypeId) -> bool {
        self.exposed_type.id == type_id
    }

    /// 是否为单例
    pub fn is_singleton(&self) -> bool {
        self.scope.is_singleton()
    }
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("exposed_type", &self.exposed_type.name)
            .field("qualifier", &self.qualifier)
            .field("scope", &self.scope)
            .field("primary", &self.primary)
            .field("order", &self.order)
            .field("metadata", &self.metadata)
            .field("supplier", &"<function>")
            .finish()
    }
}

/// 已注册组件定义的摘要
#[derive(Debug, Clone)]
pub struct DefinitionSummary {
    /// 定义标识
    pub id: DefinitionId,
    /// 暴露类型
    pub exposed_type: TypeInfo,
    /// 限定符
    pub qualifier: Qualifier,
    /// 作用域
    pub scope: ComponentScope,
    /// 是否为首选组件
    pub primary: bool,
    /// 排序值
    pub order: Option<i32>,
}

/// 组件注册表 trait
///
/// 注册表通过内部可变性修改，因此所有方法都只需要共享引用。
pub trait ComponentRegistry: Send + Sync {
    /// 注册单个组件定义
    fn register_definition(&self, definition: ComponentDefinition) -> DependencyResult<DefinitionId>;

    /// 批量注册组件定义
    ///
    /// 要么全部注册成功，要么一个都不注册。
    fn register_definitions(
        &self,
        definitions: Vec<ComponentDefinition>,
    ) -> DependencyResult<Vec<DefinitionId>>;

    /// 移除组件定义
    fn remove_definition(&self, id: DefinitionId) -> bool;

    /// 查找暴露指定类型的全部定义，按注册顺序返回
    fn find_definitions(&self, type_id: TypeId) -> Vec<DefinitionSummary>;

    /// 定义是否存在
    fn contains_definition(&self, id: DefinitionId) -> bool;

    /// 已注册定义数量
    fn definition_count(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;
    use infrastructure_common::downcast;

    struct Counter;

    impl ComponentLocator for Counter {
        fn locate(&self, request: &crate::LookupRequest) -> DependencyResult<ErasedInstance> {
            Err(infrastructure_common::DependencyError::ComponentNotRegistered {
                type_name: request.type_info.name.clone(),
                qualifier: request.qualifier.to_string(),
            })
        }

        fn locate_all(&self, _request: &crate::LookupRequest) -> DependencyResult<Vec<ErasedInstance>> {
            Ok(Vec::new())
        }

        fn locate_definition(&self, id: DefinitionId) -> DependencyResult<ErasedInstance> {
            Err(infrastructure_common::DependencyError::DefinitionNotFound {
                definition: id.to_string(),
            })
        }

        fn is_running(&self) -> bool {
            false
        }

        fn inject_members(&self, _target: &dyn crate::MembersInjectable) -> DependencyResult<()> {
            Ok(())
        }
    }

    #[test]
    fn instance_definition_supplies_the_same_instance() {
        let value = Arc::new(42_u32);
        let definition = ComponentDefinition::of_instance(value.clone())
            .with_qualifier(Qualifier::named("answer"))
            .with_scope(ComponentScope::Singleton);

        let first = (definition.supplier)(&Counter).unwrap();
        let restored = downcast::<u32>(&first).unwrap();
        assert!(Arc::ptr_eq(&value, &restored));
        assert!(definition.exposes(TypeId::of::<u32>()));
        assert!(definition.is_singleton());
    }

    #[test]
    fn factory_definition_propagates_lookup_failures() {
        let definition = ComponentDefinition::from_fn::<String, _>(|locator| {
            locator.locate(&crate::LookupRequest::of::<u8>())?;
            Ok(Arc::new("unreachable".to_string()))
        });

        assert!((definition.supplier)(&Counter).is_err());
        assert_eq!(definition.exposed_type, TypeInfo::of::<String>());
    }
}

//! 模块定义
//!
//! 模块在配置回调中通过 [`Binder`] 声明绑定，也可以声明提供者方法。

use crate::binder::Binder;
use di_abstractions::{ComponentDefinition, ComponentLocator, ComponentSupplier};
use infrastructure_common::{
    erase, BindingResult, ComponentMetadata, ComponentScope, DependencyResult, ErasedInstance,
    Marker, Qualifier, TypeInfo,
};
use std::fmt;
use std::sync::Arc;

/// 绑定模块 trait
pub trait Module: Send + Sync + 'static {
    /// 配置回调，声明绑定
    ///
    /// 返回错误时本模块剩余的配置被跳过，后续模块仍然执行。
    fn configure(&self, binder: &mut Binder) -> BindingResult<()>;

    /// 模块声明的提供者方法
    fn provider_methods(&self) -> Vec<ProviderMethod> {
        Vec::new()
    }
}

/// 提供者方法
///
/// 在模块配置之前以返回类型注册到宿主容器，并标记为首选组件。
#[derive(Clone)]
pub struct ProviderMethod {
    name: String,
    exposed_type: TypeInfo,
    qualifier: Qualifier,
    scope: ComponentScope,
    metadata: ComponentMetadata,
    supplier: ComponentSupplier,
}

impl ProviderMethod {
    /// 创建提供者方法
    pub fn new<T, F>(name: impl Into<String>, method: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&dyn ComponentLocator) -> DependencyResult<Arc<T>> + Send + Sync + 'static,
    {
        let name = name.into();
        Self {
            metadata: ComponentMetadata::new().with_name(name.clone()),
            name,
            exposed_type: TypeInfo::of::<T>(),
            qualifier: Qualifier::None,
            scope: ComponentScope::NoScope,
            supplier: Arc::new(move |locator: &dyn ComponentLocator| {
                method(locator).map(erase)
            }),
        }
    }

    /// 设置限定符
    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifier = qualifier;
        self
    }

    /// 以名称限定
    pub fn named(self, name: impl Into<String>) -> Self {
        self.with_qualifier(Qualifier::named(name))
    }

    /// 以标记实例限定
    pub fn annotated_with<M: Marker>(self, marker: M) -> Self {
        self.with_qualifier(Qualifier::marker(&marker))
    }

    /// 附加非限定性的元数据属性
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata = self.metadata.with_property(key, value);
        self
    }

    /// 设置为单例
    pub fn singleton(mut self) -> Self {
        self.scope = ComponentScope::Singleton;
        self
    }

    /// 方法名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 返回类型
    pub fn exposed_type(&self) -> &TypeInfo {
        &self.exposed_type
    }

    /// 限定符
    pub fn qualifier(&self) -> &Qualifier {
        &self.qualifier
    }

    /// 作用域
    pub fn scope(&self) -> ComponentScope {
        self.scope
    }

    pub(crate) fn supplier(&self) -> ComponentSupplier {
        self.supplier.clone()
    }

    /// 转换为首选组件定义
    pub fn to_definition(&self, module: &TypeInfo) -> ComponentDefinition {
        ComponentDefinition::new(self.exposed_type.clone(), self.supplier.clone())
            .with_qualifier(self.qualifier.clone())
            .with_scope(self.scope)
            .with_primary(true)
            .with_metadata(
                self.metadata
                    .clone()
                    .with_property("provider_method", self.name.clone())
                    .with_property("module", module.name.clone()),
            )
    }
}

impl fmt::Debug for ProviderMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderMethod")
            .field("name", &self.name)
            .field("exposed_type", &self.exposed_type.name)
            .field("qualifier", &self.qualifier)
            .field("scope", &self.scope)
            .finish()
    }
}

/// 待导入的模块条目
#[derive(Clone)]
pub struct ModuleEntry {
    module: Arc<dyn Module>,
    instance: ErasedInstance,
    type_info: TypeInfo,
    index: usize,
    environments: Vec<String>,
}

impl ModuleEntry {
    /// 创建模块条目
    pub fn new<M: Module>(module: M, index: usize) -> Self {
        let module = Arc::new(module);
        Self {
            instance: erase(module.clone()),
            module,
            type_info: TypeInfo::of::<M>(),
            index,
            environments: Vec::new(),
        }
    }

    /// 限定模块只在指定环境中导入
    pub fn with_environments<I, S>(mut self, environments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.environments = environments.into_iter().map(Into::into).collect();
        self
    }

    /// 模块实例
    pub fn module(&self) -> &Arc<dyn Module> {
        &self.module
    }

    /// 模块类型
    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    /// 模块名称
    pub fn name(&self) -> &str {
        &self.type_info.name
    }

    /// 导入顺序
    pub fn index(&self) -> usize {
        self.index
    }

    /// 环境限制
    pub fn environments(&self) -> &[String] {
        &self.environments
    }

    /// 模块实例的组件定义：按模块接口与具体类型各注册一次，携带导入顺序
    pub fn component_definitions(&self) -> Vec<ComponentDefinition> {
        let order = i32::try_from(self.index).unwrap_or(i32::MAX);
        let metadata = ComponentMetadata::new()
            .with_name(self.type_info.name.clone())
            .with_property("import_index", self.index.to_string());

        let module = erase(self.module.clone());
        let concrete = self.instance.clone();
        vec![
            ComponentDefinition::new(
                TypeInfo::of::<dyn Module>(),
                Arc::new(move |_: &dyn ComponentLocator| Ok(module.clone())),
            )
            .with_order(order)
            .with_metadata(metadata.clone()),
            ComponentDefinition::new(
                self.type_info.clone(),
                Arc::new(move |_: &dyn ComponentLocator| Ok(concrete.clone())),
            )
            .with_order(order)
            .with_metadata(metadata),
        ]
    }

    /// 提供者方法的组件定义
    pub fn provider_definitions(&self) -> Vec<ComponentDefinition> {
        self.module
            .provider_methods()
            .iter()
            .map(|method| method.to_definition(&self.type_info))
            .collect()
    }
}

impl fmt::Debug for ModuleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleEntry")
            .field("module", &self.type_info.name)
            .field("index", &self.index)
            .field("environments", &self.environments)
            .finish()
    }
}

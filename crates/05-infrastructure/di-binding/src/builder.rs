//! 绑定构建器
//!
//! 每次 `bind` 调用产生一条绑定声明，构建器负责设置目标、作用域与限定符。
//! 声明在模块全部配置完成后由 [`Finalizer`](crate::Finalizer) 转换为组件定义。

use crate::implicit::ImplicitResolver;
use crate::key::{ensure_binding_marker, marker_qualifier, Key, TypeLiteral};
use di_abstractions::{
    erase_provider, provider_call, upcast_fn, ComponentDefinition, ComponentLocator,
    ComponentSupplier, Constructor, DiContainer, ErasedCast, ErasedProviderCall, LookupRequest,
    Provider,
};
use infrastructure_common::{
    erase, Assignable, BindingError, BindingResult, ComponentMetadata, ComponentScope,
    DependencyError, ErasedInstance, ErrorMessage, Marker, Qualifier, ScopeMarker, TypeInfo,
};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// 绑定目标
#[derive(Clone)]
pub enum BindingTarget {
    /// 未指定目标，由隐式解析推导
    Unset,
    /// 固定实例
    Instance(ErasedInstance),
    /// 提供者实例
    ProviderInstance(ComponentSupplier),
    /// 提供者类型，实例从容器中获取
    ProviderType {
        provider: TypeInfo,
        call: ErasedProviderCall,
    },
    /// 实现类型，实例从容器中获取后转换为绑定类型
    ConcreteType {
        implementation: TypeInfo,
        qualifier: Qualifier,
        cast: ErasedCast,
    },
    /// 构造器
    Constructor {
        name: String,
        declared_type: Option<TypeLiteral>,
        create: ComponentSupplier,
    },
}

impl BindingTarget {
    /// 是否未指定目标
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// 目标种类名称
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unset => "untargetted",
            Self::Instance(_) => "instance",
            Self::ProviderInstance(_) => "provider instance",
            Self::ProviderType { .. } => "provider type",
            Self::ConcreteType { .. } => "linked type",
            Self::Constructor { .. } => "constructor",
        }
    }
}

impl fmt::Debug for BindingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderType { provider, .. } => write!(f, "ProviderType({})", provider),
            Self::ConcreteType {
                implementation,
                qualifier,
                ..
            } => write!(f, "ConcreteType({}{})", implementation, qualifier),
            Self::Constructor { name, .. } => write!(f, "Constructor({})", name),
            other => f.write_str(other.kind()),
        }
    }
}

/// 一条绑定声明
#[derive(Debug, Clone)]
pub struct BindingDeclaration {
    sequence: usize,
    key: Key,
    target: BindingTarget,
    scope: ComponentScope,
    source: Option<String>,
}

impl BindingDeclaration {
    pub(crate) fn new(sequence: usize, key: Key, source: Option<String>) -> Self {
        Self {
            sequence,
            key,
            target: BindingTarget::Unset,
            scope: ComponentScope::NoScope,
            source,
        }
    }

    /// 声明顺序
    pub fn sequence(&self) -> usize {
        self.sequence
    }

    /// 绑定键
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// 绑定目标
    pub fn target(&self) -> &BindingTarget {
        &self.target
    }

    /// 作用域
    pub fn scope(&self) -> ComponentScope {
        self.scope
    }

    /// 声明来源
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn set_target(&mut self, target: BindingTarget) -> BindingResult<()> {
        if !self.target.is_unset() {
            return Err(BindingError::illegal_state(format!(
                "Binding target for {} is already set to {}",
                self.key,
                self.target.kind()
            )));
        }
        self.target = target;
        Ok(())
    }

    /// 由已安装模块的提供者方法填充目标
    pub(crate) fn provided_by_method(&mut self, supplier: ComponentSupplier, scope: ComponentScope) {
        self.target = BindingTarget::ProviderInstance(supplier);
        self.scope = scope;
    }

    fn set_qualifier(&mut self, qualifier: Qualifier) {
        self.key = self.key.clone().with_qualifier(qualifier);
    }

    /// 转换为组件定义
    ///
    /// 未指定目标时先执行隐式解析。解析得到的自绑定在没有显式限定符时标记为首选组件。
    pub fn build(self, container: &dyn DiContainer) -> Result<ComponentDefinition, ErrorMessage> {
        let Self {
            key,
            target,
            scope,
            source,
            ..
        } = self;

        let (target, primary) = if target.is_unset() {
            let resolution = ImplicitResolver::new(container)
                .resolve(&key)
                .map_err(|message| attach_source(message, source.as_deref()))?;
            (resolution.target, resolution.primary)
        } else {
            (target, false)
        };

        let mut metadata = ComponentMetadata::new()
            .with_name(key.to_string())
            .with_property("target", target.kind());
        if let Some(source) = &source {
            metadata = metadata.with_property("source", source.clone());
        }
        if let BindingTarget::Constructor {
            declared_type: Some(declared),
            ..
        } = &target
        {
            metadata = metadata.with_property("declared_type", declared.to_string());
        }

        let supplier = target_supplier(&key, target)
            .map_err(|message| attach_source(message, source.as_deref()))?;

        debug!("绑定 {} 转换为组件定义 ({:?})", key, scope);
        Ok(ComponentDefinition::new(key.raw_type().clone(), translate_missing(&key, supplier))
            .with_qualifier(key.qualifier().clone())
            .with_scope(scope)
            .with_primary(primary && key.qualifier().is_none())
            .with_metadata(metadata))
    }
}

fn attach_source(message: ErrorMessage, source: Option<&str>) -> ErrorMessage {
    match (message.source_name(), source) {
        (None, Some(source)) => message.with_source(source),
        _ => message,
    }
}

/// 按目标种类组合提供函数
fn target_supplier(key: &Key, target: BindingTarget) -> Result<ComponentSupplier, ErrorMessage> {
    let supplier: ComponentSupplier = match target {
        BindingTarget::Unset => {
            return Err(ErrorMessage::new(format!("No binding target for {}", key)));
        }
        BindingTarget::Instance(instance) => {
            Arc::new(move |_: &dyn ComponentLocator| Ok(instance.clone()))
        }
        BindingTarget::ProviderInstance(supplier) => supplier,
        BindingTarget::ProviderType { provider, call } => {
            let request = LookupRequest::new(provider, Qualifier::None);
            Arc::new(move |locator: &dyn ComponentLocator| {
                let provider = locator.locate(&request)?;
                call(&provider)
            })
        }
        BindingTarget::ConcreteType {
            implementation,
            qualifier,
            cast,
        } => {
            if implementation.id == key.raw_type().id && &qualifier == key.qualifier() {
                return Err(ErrorMessage::new(format!(
                    "Binding points to itself: {}",
                    key
                )));
            }
            let expected = key.raw_type().name.clone();
            let request = LookupRequest::new(implementation, qualifier);
            Arc::new(move |locator: &dyn ComponentLocator| {
                let instance = locator.locate(&request)?;
                cast(&instance).ok_or_else(|| DependencyError::TypeMismatch {
                    expected: expected.clone(),
                })
            })
        }
        BindingTarget::Constructor { create, .. } => create,
    };
    Ok(supplier)
}

/// 把“组件不存在”翻译为说明缺失键的创建失败
fn translate_missing(key: &Key, inner: ComponentSupplier) -> ComponentSupplier {
    let key_text = key.to_string();
    let type_name = key.raw_type().name.clone();
    Arc::new(move |locator: &dyn ComponentLocator| {
        inner(locator).map_err(|e| {
            if !e.is_missing_component() {
                return e;
            }
            let detail = e.to_string();
            let creation = BindingError::creation(vec![
                ErrorMessage::new(format!(
                    "Binding to [{}] cannot be resolved since no component exists. \
                     Consider adding {} to the classes of the module import.",
                    key_text, type_name
                )),
                ErrorMessage::new(detail).with_cause(e),
            ]);
            DependencyError::ComponentCreationFailed {
                type_name: type_name.clone(),
                source: Box::new(creation),
            }
        })
    })
}

/// 链式绑定构建器
pub struct LinkedBindingBuilder<'a, T: ?Sized> {
    declaration: &'a mut BindingDeclaration,
    _marker: PhantomData<fn() -> Arc<T>>,
}

impl<'a, T> LinkedBindingBuilder<'a, T>
where
    T: ?Sized + Send + Sync + 'static,
{
    pub(crate) fn new(declaration: &'a mut BindingDeclaration) -> Self {
        Self {
            declaration,
            _marker: PhantomData,
        }
    }

    /// 正在构建的声明
    pub fn declaration(&self) -> &BindingDeclaration {
        self.declaration
    }

    /// 以标记实例限定，名称标记转为名称限定
    pub fn annotated_with<M: Marker>(self, marker: M) -> BindingResult<Self> {
        let qualifier = marker_qualifier(&marker)?;
        self.declaration.set_qualifier(qualifier);
        Ok(self)
    }

    /// 以标记类型限定
    pub fn annotated_with_marker_type<M: Marker>(self) -> BindingResult<Self> {
        ensure_binding_marker::<M>()?;
        self.declaration.set_qualifier(Qualifier::marker_type::<M>());
        Ok(self)
    }

    /// 以名称限定
    pub fn annotated_with_name(self, name: impl Into<String>) -> BindingResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(BindingError::illegal_argument("Name cannot be empty"));
        }
        self.declaration.set_qualifier(Qualifier::Named(name));
        Ok(self)
    }

    /// 绑定到实现类型，实例从容器中按实现类型查找
    pub fn to<I>(self) -> BindingResult<Self>
    where
        I: ?Sized + Assignable<T>,
    {
        self.declaration.set_target(BindingTarget::ConcreteType {
            implementation: TypeInfo::of::<I>(),
            qualifier: Qualifier::None,
            cast: upcast_fn::<I, T>(),
        })?;
        Ok(self)
    }

    /// 绑定到另一个键
    pub fn to_key<I>(self, target: Key) -> BindingResult<Self>
    where
        I: ?Sized + Assignable<T>,
    {
        if !target.is::<I>() {
            return Err(BindingError::illegal_argument(format!(
                "Target key {} does not match type {}",
                target,
                TypeInfo::of::<I>()
            )));
        }
        self.declaration.set_target(BindingTarget::ConcreteType {
            implementation: target.raw_type().clone(),
            qualifier: target.qualifier().clone(),
            cast: upcast_fn::<I, T>(),
        })?;
        Ok(self)
    }

    /// 绑定到固定实例
    pub fn to_instance<I>(self, instance: Arc<I>) -> BindingResult<()>
    where
        I: ?Sized + Assignable<T>,
    {
        let instance = erase(<I as Assignable<T>>::upcast(instance));
        self.declaration
            .set_target(BindingTarget::Instance(instance))
    }

    /// 绑定到提供者实例
    pub fn to_provider<P>(self, provider: P) -> BindingResult<Self>
    where
        P: Provider<T>,
    {
        self.declaration
            .set_target(BindingTarget::ProviderInstance(erase_provider::<T, P>(
                Arc::new(provider),
            )))?;
        Ok(self)
    }

    /// 绑定到提供者类型，提供者实例从容器中获取
    pub fn to_provider_type<P>(self) -> BindingResult<Self>
    where
        P: Provider<T>,
    {
        self.declaration.set_target(BindingTarget::ProviderType {
            provider: TypeInfo::of::<P>(),
            call: provider_call::<T, P>(),
        })?;
        Ok(self)
    }

    /// 绑定到构造器
    pub fn to_constructor<S>(self, constructor: Constructor<S>) -> BindingResult<Self>
    where
        S: Assignable<T>,
    {
        self.set_constructor(constructor, None)
    }

    /// 绑定到构造器，并声明构造结果的类型字面量
    pub fn to_constructor_with_type<S>(
        self,
        constructor: Constructor<S>,
        declared_type: TypeLiteral,
    ) -> BindingResult<Self>
    where
        S: Assignable<T>,
    {
        if declared_type.raw_type().id != TypeInfo::of::<S>().id {
            return Err(BindingError::illegal_argument(format!(
                "Declared type {} does not match constructor type {}",
                declared_type,
                TypeInfo::of::<S>()
            )));
        }
        self.set_constructor(constructor, Some(declared_type))
    }

    fn set_constructor<S>(
        self,
        constructor: Constructor<S>,
        declared_type: Option<TypeLiteral>,
    ) -> BindingResult<Self>
    where
        S: Assignable<T>,
    {
        let name = constructor.name().to_string();
        let create: ComponentSupplier = Arc::new(move |locator: &dyn ComponentLocator| {
            let instance = constructor.invoke(locator)?;
            Ok(erase(<S as Assignable<T>>::upcast(instance)))
        });
        self.declaration.set_target(BindingTarget::Constructor {
            name,
            declared_type,
            create,
        })?;
        Ok(self)
    }

    /// 设置作用域，只支持无作用域与单例
    pub fn in_scope(self, scope: ScopeMarker) -> BindingResult<()> {
        self.declaration.scope = match scope {
            ScopeMarker::NoScope => ComponentScope::NoScope,
            ScopeMarker::Singleton => ComponentScope::Singleton,
            ScopeMarker::Custom(name) => {
                return Err(BindingError::unsupported(format!(
                    "Custom scopes are not supported: {}",
                    name
                )));
            }
        };
        Ok(())
    }

    /// 设置为容器启动时创建的单例
    pub fn as_eager_singleton(self) {
        self.declaration.scope = ComponentScope::EagerSingleton;
    }
}

//! 绑定记录器
//!
//! 模块配置回调通过 [`Binder`] 声明绑定。可恢复的配置问题通过 `add_error` 记录，
//! 所有模块配置完成后统一检查；不支持的功能与非法调用立即返回错误。

use crate::aggregator::ErrorAggregator;
use crate::builder::{BindingDeclaration, LinkedBindingBuilder};
use crate::constant::{AnnotatedConstantBindingBuilder, ConstantDeclaration};
use crate::injection::InjectionQueue;
use crate::key::{Key, TypeLiteral};
use crate::module::{Module, ProviderMethod};
use crate::provider::{LazyProvider, MembersInjector};
use di_abstractions::{DiContainer, MembersInjectable};
use infrastructure_common::{
    BindingError, BindingResult, ErrorMessage, Marker, Qualifier, ScopeMarker, Stage, TypeInfo,
};
use std::sync::Arc;
use tracing::debug;

/// 一次导入中记录的全部声明
#[derive(Debug, Default)]
pub struct RecordedDeclarations {
    /// 链式绑定声明
    pub linked: Vec<BindingDeclaration>,
    /// 常量绑定声明
    pub constants: Vec<ConstantDeclaration>,
}

impl RecordedDeclarations {
    /// 声明总数
    pub fn len(&self) -> usize {
        self.linked.len() + self.constants.len()
    }

    /// 是否没有任何声明
    pub fn is_empty(&self) -> bool {
        self.linked.is_empty() && self.constants.is_empty()
    }
}

/// 绑定记录器
pub struct Binder {
    container: Arc<dyn DiContainer>,
    declarations: RecordedDeclarations,
    sequence: usize,
    errors: ErrorAggregator,
    injections: Arc<InjectionQueue>,
    source: Option<String>,
}

impl Binder {
    /// 创建绑定记录器
    pub fn new(container: Arc<dyn DiContainer>, injections: Arc<InjectionQueue>) -> Self {
        Self {
            container,
            declarations: RecordedDeclarations::default(),
            sequence: 0,
            errors: ErrorAggregator::new(),
            injections,
            source: None,
        }
    }

    fn next_sequence(&mut self) -> usize {
        let sequence = self.sequence;
        self.sequence += 1;
        sequence
    }

    fn push_linked(&mut self, key: Key) -> &mut BindingDeclaration {
        let sequence = self.next_sequence();
        debug!("记录绑定 #{}: {}", sequence, key);
        let index = self.declarations.linked.len();
        self.declarations
            .linked
            .push(BindingDeclaration::new(sequence, key, self.source.clone()));
        &mut self.declarations.linked[index]
    }

    /// 绑定类型
    pub fn bind<T>(&mut self) -> LinkedBindingBuilder<'_, T>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        LinkedBindingBuilder::new(self.push_linked(Key::of::<T>()))
    }

    /// 按类型字面量绑定
    pub fn bind_literal<T>(&mut self, literal: TypeLiteral) -> BindingResult<LinkedBindingBuilder<'_, T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.bind_key(Key::new(literal, Qualifier::None))
    }

    /// 按键绑定
    pub fn bind_key<T>(&mut self, key: Key) -> BindingResult<LinkedBindingBuilder<'_, T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        if !key.is::<T>() {
            return Err(BindingError::illegal_argument(format!(
                "Key {} does not match bound type {}",
                key,
                TypeInfo::of::<T>()
            )));
        }
        Ok(LinkedBindingBuilder::new(self.push_linked(key)))
    }

    /// 绑定常量
    pub fn bind_constant(&mut self) -> AnnotatedConstantBindingBuilder<'_> {
        let sequence = self.next_sequence();
        let index = self.declarations.constants.len();
        self.declarations
            .constants
            .push(ConstantDeclaration::new(sequence, self.source.clone()));
        AnnotatedConstantBindingBuilder::new(&mut self.declarations.constants[index])
    }

    /// 请求在容器就绪后注入成员，同一实例只注入一次
    pub fn request_injection(&mut self, instance: Arc<dyn MembersInjectable>) {
        if !self.injections.enqueue(instance) {
            debug!("忽略重复的成员注入请求");
        }
    }

    /// 安装另一个模块，立即使用当前记录器配置
    pub fn install<M: Module>(&mut self, module: M) -> BindingResult<()> {
        let previous = self.source.replace(TypeInfo::of::<M>().name);
        debug!("安装模块 {}", TypeInfo::of::<M>());
        for method in module.provider_methods() {
            self.record_provider_method(method);
        }
        let result = module.configure(self);
        self.source = previous;
        result
    }

    fn record_provider_method(&mut self, method: ProviderMethod) {
        let key = Key::new(
            TypeLiteral::from_info(method.exposed_type().clone()),
            method.qualifier().clone(),
        );
        let scope = method.scope();
        let declaration = self.push_linked(key);
        declaration.provided_by_method(method.supplier(), scope);
    }

    /// 当前运行阶段
    pub fn current_stage(&self) -> Stage {
        self.container.environment().stage()
    }

    /// 设置后续声明的来源
    pub fn with_source(&mut self, source: impl Into<String>) -> &mut Self {
        self.source = Some(source.into());
        self
    }

    /// 当前声明来源
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// 记录配置错误消息
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.add_error_message(ErrorMessage::new(message));
    }

    /// 记录配置错误原因
    pub fn add_error_cause<E>(&mut self, cause: E)
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.add_error_message(ErrorMessage::from_cause(cause));
    }

    /// 记录配置错误
    pub fn add_error_message(&mut self, message: ErrorMessage) {
        let message = match (message.source_name(), &self.source) {
            (None, Some(source)) => message.with_source(source.clone()),
            _ => message,
        };
        debug!("记录配置错误: {}", message);
        self.errors.push(message);
    }

    /// 获取延迟提供者
    pub fn get_provider<T>(&self) -> LazyProvider<T>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        LazyProvider::new(self.container.clone(), &Key::of::<T>())
    }

    /// 按键获取延迟提供者
    pub fn get_provider_for<T>(&self, key: &Key) -> BindingResult<LazyProvider<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        if !key.is::<T>() {
            return Err(BindingError::illegal_argument(format!(
                "Key {} does not match provided type {}",
                key,
                TypeInfo::of::<T>()
            )));
        }
        Ok(LazyProvider::new(self.container.clone(), key))
    }

    /// 获取成员注入器，容器运行前调用注入器会失败
    pub fn get_members_injector<T: MembersInjectable>(&self) -> MembersInjector<T> {
        MembersInjector::new(self.container.clone())
    }

    /// 绑定作用域，只接受无作用域与单例
    pub fn bind_scope<M: Marker>(&mut self, scope: ScopeMarker) -> BindingResult<()> {
        if scope.is_builtin() {
            Ok(())
        } else {
            Err(BindingError::unsupported(format!(
                "Custom scopes are not supported: {} for {}",
                scope,
                TypeInfo::of::<M>()
            )))
        }
    }

    /// 方法拦截不受支持
    pub fn bind_interceptor(&mut self) -> BindingResult<()> {
        Err(BindingError::unsupported("Interceptors are not supported"))
    }

    /// 静态注入不受支持
    pub fn request_static_injection(&mut self, _types: &[TypeInfo]) -> BindingResult<()> {
        Err(BindingError::unsupported("Static injection is not supported"))
    }

    /// 私有子模块不受支持
    pub fn new_private_binder(&mut self) -> BindingResult<()> {
        Err(BindingError::unsupported("Private bindings are not supported"))
    }

    /// 类型转换器不受支持
    pub fn convert_to_types(&mut self) -> BindingResult<()> {
        Err(BindingError::unsupported("Method convertToTypes is not supported"))
    }

    /// 类型监听器不受支持
    pub fn bind_listener(&mut self) -> BindingResult<()> {
        Err(BindingError::unsupported("Method bindListener is not supported"))
    }

    /// 供给监听器不受支持
    pub fn bind_provision_listener(&mut self) -> BindingResult<()> {
        Err(BindingError::unsupported(
            "Method bindListener for provision listeners is not supported",
        ))
    }

    /// 跳过来源不受支持
    pub fn skip_sources(&mut self, _sources: &[TypeInfo]) -> BindingResult<()> {
        Err(BindingError::unsupported("Method skipSources is not supported"))
    }

    /// 接受但不生效
    pub fn require_explicit_bindings(&mut self) {}

    /// 接受但不生效
    pub fn disable_circular_proxies(&mut self) {}

    /// 接受但不生效
    pub fn require_at_inject_on_constructors(&mut self) {}

    /// 接受但不生效
    pub fn require_exact_binding_annotations(&mut self) {}

    /// 接受但不生效，提供者方法由模块直接声明
    pub fn scan_modules_for_annotated_methods(&mut self) {}

    /// 已记录的声明
    pub fn declarations(&self) -> &RecordedDeclarations {
        &self.declarations
    }

    /// 已记录的错误
    pub fn errors(&self) -> &ErrorAggregator {
        &self.errors
    }

    pub(crate) fn errors_mut(&mut self) -> &mut ErrorAggregator {
        &mut self.errors
    }

    /// 结束记录，交出声明与错误
    pub fn into_parts(self) -> (RecordedDeclarations, ErrorAggregator) {
        (self.declarations, self.errors)
    }
}

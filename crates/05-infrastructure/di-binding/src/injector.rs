//! 注入器门面
//!
//! 容器就绪后的只读查找服务。图结构相关的查询返回空结果，
//! 绑定对象、子注入器等概念没有对应实现，调用时返回不支持错误。

use crate::key::Key;
use crate::module::ModuleEntry;
use crate::provider::{LazyProvider, MembersInjector};
use di_abstractions::{typed, DefinitionSummary, DiContainer, MembersInjectable};
use infrastructure_common::{BindingError, BindingResult, Marker, ScopeMarker, TypeInfo};
use std::sync::Arc;
use tracing::debug;

/// 注入器门面
#[derive(Clone)]
pub struct Injector {
    container: Arc<dyn DiContainer>,
}

impl Injector {
    /// 在宿主容器之上创建门面
    pub fn new(container: Arc<dyn DiContainer>) -> Self {
        Self { container }
    }

    /// 宿主容器
    pub fn container(&self) -> &Arc<dyn DiContainer> {
        &self.container
    }

    fn ensure_running(&self) -> BindingResult<()> {
        if self.container.is_running() {
            Ok(())
        } else {
            Err(BindingError::illegal_state("Injector not started"))
        }
    }

    fn ensure_key_type<T: ?Sized + 'static>(key: &Key) -> BindingResult<()> {
        if key.is::<T>() {
            Ok(())
        } else {
            Err(BindingError::illegal_argument(format!(
                "Key {} does not match requested type {}",
                key,
                TypeInfo::of::<T>()
            )))
        }
    }

    /// 按类型获取实例
    pub fn get_instance<T>(&self) -> BindingResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get_instance_by_key(&Key::of::<T>())
    }

    /// 按键获取实例
    pub fn get_instance_by_key<T>(&self, key: &Key) -> BindingResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.ensure_running()?;
        Self::ensure_key_type::<T>(key)?;
        debug!("查找 {}", key);
        self.container
            .locate(&key.lookup_request())
            .and_then(typed)
            .map_err(BindingError::from)
    }

    /// 按名称获取实例
    pub fn get_named<T>(&self, name: impl Into<String>) -> BindingResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get_instance_by_key(&Key::named::<T>(name)?)
    }

    /// 按标记实例获取实例，名称标记按名称查找
    pub fn get_annotated<T, M>(&self, marker: &M) -> BindingResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
        M: Marker,
    {
        self.get_instance_by_key(&Key::with_marker::<T, M>(marker)?)
    }

    /// 按标记类型获取实例，忽略成员值
    pub fn get_annotated_with_type<T, M>(&self) -> BindingResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
        M: Marker,
    {
        self.get_instance_by_key(&Key::with_marker_type::<T, M>()?)
    }

    /// 获取延迟提供者
    pub fn get_provider<T>(&self) -> LazyProvider<T>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        LazyProvider::new(self.container.clone(), &Key::of::<T>())
    }

    /// 按键获取延迟提供者
    pub fn get_provider_by_key<T>(&self, key: &Key) -> BindingResult<LazyProvider<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Self::ensure_key_type::<T>(key)?;
        Ok(LazyProvider::new(self.container.clone(), key))
    }

    /// 为已构造的对象注入成员
    pub fn inject_members(&self, instance: &dyn MembersInjectable) -> BindingResult<()> {
        self.ensure_running()?;
        self.container
            .inject_members(instance)
            .map_err(BindingError::from)
    }

    /// 获取成员注入器
    pub fn get_members_injector<T: MembersInjectable>(&self) -> MembersInjector<T> {
        MembersInjector::new(self.container.clone())
    }

    /// 父注入器，始终为空
    pub fn get_parent(&self) -> Option<&Injector> {
        None
    }

    /// 不支持绑定查询
    pub fn get_binding(&self, key: &Key) -> BindingResult<DefinitionSummary> {
        Err(BindingError::unsupported(format!(
            "Binding introspection is not supported: {}",
            key
        )))
    }

    /// 不支持绑定查询
    pub fn get_existing_binding(&self, key: &Key) -> BindingResult<DefinitionSummary> {
        Err(BindingError::unsupported(format!(
            "Binding introspection is not supported: {}",
            key
        )))
    }

    /// 不支持子注入器
    pub fn create_child_injector(&self, _modules: Vec<ModuleEntry>) -> BindingResult<Injector> {
        Err(BindingError::unsupported("Child injectors are not supported"))
    }

    /// 显式绑定，始终为空
    pub fn get_bindings(&self) -> Vec<DefinitionSummary> {
        Vec::new()
    }

    /// 全部绑定，始终为空
    pub fn get_all_bindings(&self) -> Vec<DefinitionSummary> {
        Vec::new()
    }

    /// 按类型查找绑定，始终为空
    pub fn find_bindings_by_type(&self, _type_info: &TypeInfo) -> Vec<DefinitionSummary> {
        Vec::new()
    }

    /// 作用域绑定，始终为空
    pub fn get_scope_bindings(&self) -> Vec<ScopeMarker> {
        Vec::new()
    }

    /// 类型转换器绑定，始终为空
    pub fn get_type_converter_bindings(&self) -> Vec<TypeInfo> {
        Vec::new()
    }

    /// 模块元素，始终为空
    pub fn get_elements(&self) -> Vec<Key> {
        Vec::new()
    }

    /// 成员注入点，始终为空
    pub fn get_all_members_injector_injection_points(&self) -> Vec<TypeInfo> {
        Vec::new()
    }
}

impl std::fmt::Debug for Injector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injector")
            .field("state", &self.container.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use di_abstractions::{ComponentDefinition, ComponentLocator, ComponentRegistry, Provider};
    use di_impl::DiContainerImpl;
    use infrastructure_common::{named, DependencyResult, MemberMap, Qualifier};
    use serde_json::json;

    struct Region(&'static str);

    impl Marker for Region {
        fn members(&self) -> MemberMap {
            let mut members = MemberMap::new();
            members.insert("value".to_string(), json!(self.0));
            members
        }
    }

    struct Nothing;

    impl MembersInjectable for Nothing {
        fn inject_members(&self, _locator: &dyn ComponentLocator) -> DependencyResult<()> {
            Ok(())
        }
    }

    fn injector() -> Injector {
        let container = DiContainerImpl::new();
        container
            .register_definition(ComponentDefinition::of_instance(Arc::new(7_u32)))
            .unwrap();
        container
            .register_definition(
                ComponentDefinition::of_instance(Arc::new("eu".to_string()))
                    .with_qualifier(Qualifier::marker(&Region("eu"))),
            )
            .unwrap();
        container
            .register_definition(
                ComponentDefinition::of_instance(Arc::new("main".to_string()))
                    .with_qualifier(Qualifier::named("db")),
            )
            .unwrap();
        Injector::new(Arc::new(container))
    }

    #[test]
    fn lookups_before_start_are_illegal_state() {
        let injector = injector();
        assert!(matches!(
            injector.get_instance::<u32>(),
            Err(BindingError::IllegalState { .. })
        ));
        assert!(matches!(
            injector.inject_members(&Nothing),
            Err(BindingError::IllegalState { .. })
        ));
    }

    #[test]
    fn qualifiers_select_the_matching_component() {
        let injector = injector();
        injector.container().start().unwrap();

        assert_eq!(*injector.get_instance::<u32>().unwrap(), 7);
        assert_eq!(*injector.get_named::<String>("db").unwrap(), "main");
        assert_eq!(*injector.get_annotated::<String, _>(&named("db")).unwrap(), "main");
        assert_eq!(*injector.get_annotated::<String, _>(&Region("eu")).unwrap(), "eu");
        assert!(injector.get_annotated::<String, _>(&Region("us")).is_err());
        assert_eq!(
            *injector.get_annotated_with_type::<String, Region>().unwrap(),
            "eu"
        );
        assert!(injector.get_instance::<String>().is_err());
        assert!(injector.inject_members(&Nothing).is_ok());
    }

    #[test]
    fn key_type_is_checked() {
        let injector = injector();
        injector.container().start().unwrap();
        let key = Key::of::<u32>();
        assert!(matches!(
            injector.get_instance_by_key::<String>(&key),
            Err(BindingError::IllegalArgument { .. })
        ));
        assert!(injector.get_provider_by_key::<String>(&key).is_err());
        assert_eq!(*injector.get_provider_by_key::<u32>(&key).unwrap().get().unwrap(), 7);
        assert_eq!(*injector.get_provider::<u32>().get().unwrap(), 7);
    }

    #[test]
    fn graph_introspection_is_empty_or_unsupported() {
        let injector = injector();
        assert!(injector.get_parent().is_none());
        assert!(injector.get_bindings().is_empty());
        assert!(injector.get_all_bindings().is_empty());
        assert!(injector.find_bindings_by_type(&TypeInfo::of::<u32>()).is_empty());
        assert!(injector.get_scope_bindings().is_empty());
        assert!(injector.get_type_converter_bindings().is_empty());
        assert!(injector.get_elements().is_empty());
        assert!(injector.get_all_members_injector_injection_points().is_empty());
        assert!(matches!(
            injector.get_binding(&Key::of::<u32>()),
            Err(BindingError::UnsupportedOperation { .. })
        ));
        assert!(injector.get_existing_binding(&Key::of::<u32>()).is_err());
        assert!(injector.create_child_injector(Vec::new()).is_err());
    }
}

//! # 依赖注入具体实现
//!
//! 提供内存中的宿主容器：组件定义注册、按类型与限定符查找、单例缓存与生命周期管理

use di_abstractions::{
    ComponentDefinition, ComponentLocator, ComponentRegistry, ContainerConfig,
    ContainerEnvironment, ContainerStats, DefinitionId, DefinitionSummary, DiContainer,
    LookupRequest, MembersInjectable, StartupListener, TypeConventions,
};
use infrastructure_common::{DependencyError, DependencyResult, ErasedInstance, LifecycleState};
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};
use std::any::TypeId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 组件注册信息
struct Registration {
    id: DefinitionId,
    definition: ComponentDefinition,
    /// 单例实例（如果已创建）
    instance: OnceCell<ErasedInstance>,
}

impl Registration {
    fn new(id: DefinitionId, definition: ComponentDefinition) -> Self {
        Self {
            id,
            definition,
            instance: OnceCell::new(),
        }
    }

    fn summary(&self) -> DefinitionSummary {
        DefinitionSummary {
            id: self.id,
            exposed_type: self.definition.exposed_type.clone(),
            qualifier: self.definition.qualifier.clone(),
            scope: self.definition.scope,
            primary: self.definition.primary,
            order: self.definition.order,
        }
    }

    fn matches(&self, request: &LookupRequest) -> bool {
        self.definition.exposes(request.type_info.id)
            && request.qualifier.matches(&self.definition.qualifier)
    }
}

/// 具体的依赖注入容器实现
pub struct DiContainerImpl {
    /// 组件注册信息，按注册顺序保存
    registrations: RwLock<Vec<Arc<Registration>>>,
    next_id: AtomicU64,
    conventions: TypeConventions,
    config: ContainerConfig,
    environment: ContainerEnvironment,
    listeners: Mutex<Vec<Arc<dyn StartupListener>>>,
    state: RwLock<LifecycleState>,
}

impl DiContainerImpl {
    /// 创建新的容器
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::new())
    }

    /// 使用指定配置创建容器
    pub fn with_config(config: ContainerConfig) -> Self {
        let environment = ContainerEnvironment::from_config(&config);
        Self {
            registrations: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            conventions: TypeConventions::new(),
            config,
            environment,
            listeners: Mutex::new(Vec::new()),
            state: RwLock::new(LifecycleState::Uninitialized),
        }
    }

    /// 容器配置
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    fn allocate_id(&self) -> DefinitionId {
        DefinitionId::new(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn candidates(&self, request: &LookupRequest) -> Vec<Arc<Registration>> {
        self.registrations
            .read()
            .iter()
            .filter(|registration| registration.matches(request))
            .cloned()
            .collect()
    }

    /// 选出唯一候选，多个候选时取唯一的首选组件
    fn select(&self, request: &LookupRequest) -> DependencyResult<Arc<Registration>> {
        let mut candidates = self.candidates(request);
        match candidates.len() {
            0 => Err(DependencyError::ComponentNotRegistered {
                type_name: request.type_info.name.clone(),
                qualifier: request.qualifier.to_string(),
            }),
            1 => Ok(candidates.remove(0)),
            count => {
                let mut primaries = candidates
                    .into_iter()
                    .filter(|registration| registration.definition.primary);
                match (primaries.next(), primaries.next()) {
                    (Some(primary), None) => Ok(primary),
                    _ => Err(DependencyError::NonUniqueComponent {
                        type_name: request.type_info.name.clone(),
                        qualifier: request.qualifier.to_string(),
                        candidates: count,
                    }),
                }
            }
        }
    }

    /// 取得注册项的实例，调用提供函数时不持有注册表锁
    fn instance_of(&self, registration: &Registration) -> DependencyResult<ErasedInstance> {
        let supplier = &registration.definition.supplier;
        if registration.definition.is_singleton() {
            registration
                .instance
                .get_or_try_init(|| {
                    debug!(
                        "创建单例组件: {}{}",
                        registration.definition.exposed_type, registration.definition.qualifier
                    );
                    supplier(self)
                })
                .cloned()
        } else {
            supplier(self)
        }
    }

    fn validate(&self, definitions: &[ComponentDefinition]) -> DependencyResult<()> {
        let state = *self.state.read();
        if matches!(state, LifecycleState::Stopping | LifecycleState::Error) {
            let type_name = definitions
                .first()
                .map(|definition| definition.exposed_type.name.clone())
                .unwrap_or_default();
            return Err(DependencyError::RegistrationError {
                type_name,
                message: format!("容器状态不允许注册: {:?}", state),
            });
        }
        Ok(())
    }

    fn set_state(&self, state: LifecycleState) {
        *self.state.write() = state;
    }

    fn initialize_eager_singletons(&self) -> DependencyResult<()> {
        if !self.config.eager_init_singletons {
            return Ok(());
        }
        let eager = self
            .registrations
            .read()
            .iter()
            .filter(|registration| registration.definition.scope.is_eager())
            .cloned()
            .collect::<Vec<_>>();
        for registration in eager {
            self.instance_of(&registration)?;
        }
        Ok(())
    }

    fn notify_listeners(&self) -> DependencyResult<()> {
        let listeners = self.listeners.lock().clone();
        for listener in listeners {
            debug!("通知就绪监听器: {}", listener.name());
            listener.on_startup(self)?;
        }
        Ok(())
    }
}

impl Default for DiContainerImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRegistry for DiContainerImpl {
    fn register_definition(&self, definition: ComponentDefinition) -> DependencyResult<DefinitionId> {
        let mut ids = self.register_definitions(vec![definition])?;
        ids.pop().ok_or_else(|| DependencyError::RegistrationError {
            type_name: String::new(),
            message: "注册结果为空".to_string(),
        })
    }

    fn register_definitions(
        &self,
        definitions: Vec<ComponentDefinition>,
    ) -> DependencyResult<Vec<DefinitionId>> {
        self.validate(&definitions)?;

        let mut registrations = self.registrations.write();
        let mut ids = Vec::with_capacity(definitions.len());
        for definition in definitions {
            let id = self.allocate_id();
            debug!(
                "注册组件定义 {}: {}{} ({:?})",
                id, definition.exposed_type, definition.qualifier, definition.scope
            );
            registrations.push(Arc::new(Registration::new(id, definition)));
            ids.push(id);
        }
        Ok(ids)
    }

    fn remove_definition(&self, id: DefinitionId) -> bool {
        let mut registrations = self.registrations.write();
        let before = registrations.len();
        registrations.retain(|registration| registration.id != id);
        let removed = registrations.len() != before;
        if removed {
            debug!("移除组件定义 {}", id);
        }
        removed
    }

    fn find_definitions(&self, type_id: TypeId) -> Vec<DefinitionSummary> {
        self.registrations
            .read()
            .iter()
            .filter(|registration| registration.definition.exposes(type_id))
            .map(|registration| registration.summary())
            .collect()
    }

    fn contains_definition(&self, id: DefinitionId) -> bool {
        self.registrations
            .read()
            .iter()
            .any(|registration| registration.id == id)
    }

    fn definition_count(&self) -> usize {
        self.registrations.read().len()
    }
}

impl ComponentLocator for DiContainerImpl {
    fn locate(&self, request: &LookupRequest) -> DependencyResult<ErasedInstance> {
        let registration = self.select(request)?;
        self.instance_of(&registration)
    }

    fn locate_all(&self, request: &LookupRequest) -> DependencyResult<Vec<ErasedInstance>> {
        let mut candidates = self.candidates(request);
        candidates.sort_by_key(|registration| registration.definition.order.unwrap_or(0));
        candidates
            .iter()
            .map(|registration| self.instance_of(registration))
            .collect()
    }

    fn locate_definition(&self, id: DefinitionId) -> DependencyResult<ErasedInstance> {
        let registration = self
            .registrations
            .read()
            .iter()
            .find(|registration| registration.id == id)
            .cloned()
            .ok_or_else(|| DependencyError::DefinitionNotFound {
                definition: id.to_string(),
            })?;
        self.instance_of(&registration)
    }

    fn contains(&self, request: &LookupRequest) -> bool {
        self.select(request).is_ok()
    }

    fn is_running(&self) -> bool {
        *self.state.read() == LifecycleState::Running
    }

    fn inject_members(&self, target: &dyn MembersInjectable) -> DependencyResult<()> {
        if !self.is_running() {
            return Err(DependencyError::ContainerNotRunning);
        }
        target.inject_members(self)
    }
}

impl DiContainer for DiContainerImpl {
    fn conventions(&self) -> &TypeConventions {
        &self.conventions
    }

    fn environment(&self) -> &ContainerEnvironment {
        &self.environment
    }

    fn add_startup_listener(&self, listener: Arc<dyn StartupListener>) {
        debug!("添加就绪监听器: {}", listener.name());
        self.listeners.lock().push(listener);
    }

    fn start(&self) -> DependencyResult<()> {
        let state = *self.state.read();
        if state == LifecycleState::Running {
            warn!("容器已在运行");
            return Ok(());
        }
        if !state.can_start() {
            return Err(DependencyError::RegistrationError {
                type_name: String::new(),
                message: format!("容器状态不允许启动: {:?}", state),
            });
        }

        info!("启动容器，激活环境: {:?}", self.environment.active_environments());
        self.set_state(LifecycleState::Initializing);

        if let Err(e) = self.initialize_eager_singletons() {
            error!("预先初始化单例失败: {}", e);
            self.set_state(LifecycleState::Error);
            return Err(e);
        }

        self.set_state(LifecycleState::Running);

        if let Err(e) = self.notify_listeners() {
            error!("就绪监听器执行失败: {}", e);
            self.set_state(LifecycleState::Error);
            return Err(e);
        }

        info!("容器已启动，组件定义数量: {}", self.definition_count());
        Ok(())
    }

    fn stop(&self) -> DependencyResult<()> {
        let state = *self.state.read();
        if !state.can_stop() {
            warn!("容器未在运行，忽略停止请求: {:?}", state);
            return Ok(());
        }

        info!("停止容器");
        self.set_state(LifecycleState::Stopping);
        {
            let mut registrations = self.registrations.write();
            let released = registrations
                .iter()
                .map(|registration| {
                    Arc::new(Registration::new(
                        registration.id,
                        registration.definition.clone(),
                    ))
                })
                .collect();
            *registrations = released;
        }
        self.set_state(LifecycleState::Stopped);
        Ok(())
    }

    fn state(&self) -> LifecycleState {
        *self.state.read()
    }

    fn stats(&self) -> ContainerStats {
        let registrations = self.registrations.read();
        ContainerStats {
            registered_definitions: registrations.len(),
            created_singletons: registrations
                .iter()
                .filter(|registration| registration.instance.get().is_some())
                .count(),
            startup_listeners: self.listeners.lock().len(),
        }
    }

    fn as_locator(&self) -> &dyn ComponentLocator {
        self
    }
}

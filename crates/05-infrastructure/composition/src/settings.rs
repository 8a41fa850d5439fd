//! 绑定引擎配置
//!
//! 依次读取可选的 `config/binder` 文件与 `BINDER_` 前缀的环境变量，后者覆盖前者。

use di_abstractions::ContainerConfig;
use infrastructure_common::{InfrastructureError, Stage};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, error};

/// 绑定引擎配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BinderSettings {
    /// 激活的环境
    pub active_environments: Vec<String>,
    /// 运行阶段，未设置时由激活环境推导
    pub stage: Option<Stage>,
    /// 导入失败时是否逐条记录配置错误
    pub log_errors: bool,
    /// 启动时是否创建预先初始化的单例
    pub eager_init_singletons: bool,
}

impl Default for BinderSettings {
    fn default() -> Self {
        Self {
            active_environments: Vec::new(),
            stage: None,
            log_errors: true,
            eager_init_singletons: true,
        }
    }
}

impl BinderSettings {
    /// 从默认位置加载
    pub fn load() -> Result<Self, InfrastructureError> {
        Self::build(config::Config::builder().add_source(
            config::File::with_name("config/binder").required(false),
        ))
    }

    /// 从指定文件加载，环境变量仍然生效
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, InfrastructureError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InfrastructureError::SettingsError {
                message: format!("配置文件不存在: {}", path.display()),
            });
        }
        Self::build(config::Config::builder().add_source(config::File::from(path)))
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, InfrastructureError> {
        let settings = builder
            .add_source(
                config::Environment::with_prefix("BINDER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("active_environments"),
            )
            .build()
            .and_then(|config| config.try_deserialize::<Self>())
            .map_err(|e| {
                error!("绑定引擎配置加载失败: {}", e);
                InfrastructureError::SettingsError {
                    message: e.to_string(),
                }
            })?;
        debug!("绑定引擎配置: {:?}", settings);
        Ok(settings)
    }

    /// 生效的运行阶段
    pub fn effective_stage(&self) -> Stage {
        self.stage
            .unwrap_or_else(|| Stage::from_environments(&self.active_environments))
    }

    /// 转换为宿主容器配置
    pub fn to_container_config(&self) -> ContainerConfig {
        ContainerConfig::new()
            .with_environments(self.active_environments.iter().cloned())
            .with_stage(self.effective_stage())
            .with_eager_init(self.eager_init_singletons)
    }
}

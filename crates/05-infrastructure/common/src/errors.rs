//! 错误类型定义

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// 可共享的错误原因
pub type SharedError = Arc<dyn StdError + Send + Sync>;

/// 单条配置诊断消息
///
/// 由模块配置回调通过 `add_error` 系列方法记录，或由绑定构建失败产生。
#[derive(Debug, Clone)]
pub struct ErrorMessage {
    message: String,
    source_name: Option<String>,
    cause: Option<SharedError>,
}

impl ErrorMessage {
    /// 创建新的诊断消息
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source_name: None,
            cause: None,
        }
    }

    /// 由错误原因创建诊断消息，消息文本取自错误本身
    pub fn from_cause<E>(cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: cause.to_string(),
            source_name: None,
            cause: Some(Arc::new(cause)),
        }
    }

    /// 附加错误原因
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.cause = Some(Arc::new(cause));
        self
    }

    /// 附加声明来源（通常是模块名称）
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source_name = Some(source.into());
        self
    }

    /// 消息文本
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 声明来源
    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    /// 错误原因
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source_name {
            Some(source) => write!(f, "[{}] {}", source, self.message),
            None => f.write_str(&self.message),
        }
    }
}

fn render_messages(messages: &[ErrorMessage]) -> String {
    messages
        .iter()
        .enumerate()
        .map(|(index, message)| format!("{}) {}", index + 1, message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// 宿主容器错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("组件未注册: {type_name}{qualifier}")]
    ComponentNotRegistered { type_name: String, qualifier: String },

    #[error("存在多个候选组件: {type_name}{qualifier}, 候选数量: {candidates}")]
    NonUniqueComponent {
        type_name: String,
        qualifier: String,
        candidates: usize,
    },

    #[error("组件定义不存在: {definition}")]
    DefinitionNotFound { definition: String },

    #[error("组件创建失败: {type_name}, 原因: {source}")]
    ComponentCreationFailed {
        type_name: String,
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("组件类型不匹配: 期望 {expected}")]
    TypeMismatch { expected: String },

    #[error("容器尚未启动")]
    ContainerNotRunning,

    #[error("组件注册失败: {type_name}, 原因: {message}")]
    RegistrationError { type_name: String, message: String },
}

impl DependencyError {
    /// 是否属于“组件不存在”一类的错误
    pub fn is_missing_component(&self) -> bool {
        matches!(
            self,
            Self::ComponentNotRegistered { .. } | Self::DefinitionNotFound { .. }
        )
    }
}

/// 绑定引擎错误类型
#[derive(Error, Debug)]
pub enum BindingError {
    #[error("模块导入失败，共 {} 个配置错误: {}", .messages.len(), render_messages(.messages))]
    Configuration { messages: Vec<ErrorMessage> },

    #[error("不支持的操作: {message}")]
    UnsupportedOperation { message: String },

    #[error("非法参数: {message}")]
    IllegalArgument { message: String },

    #[error("组件创建失败: {}", render_messages(.messages))]
    Creation { messages: Vec<ErrorMessage> },

    #[error("非法状态: {message}")]
    IllegalState { message: String },

    #[error("依赖解析失败: {source}")]
    Dependency {
        #[source]
        source: DependencyError,
    },
}

impl BindingError {
    /// 创建聚合配置错误
    pub fn configuration(messages: Vec<ErrorMessage>) -> Self {
        Self::Configuration { messages }
    }

    /// 创建不支持操作错误
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            message: message.into(),
        }
    }

    /// 创建非法参数错误
    pub fn illegal_argument(message: impl Into<String>) -> Self {
        Self::IllegalArgument {
            message: message.into(),
        }
    }

    /// 创建非法状态错误
    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState {
            message: message.into(),
        }
    }

    /// 创建组件创建错误
    pub fn creation(messages: Vec<ErrorMessage>) -> Self {
        Self::Creation { messages }
    }

    /// 聚合在错误中的诊断消息
    pub fn messages(&self) -> &[ErrorMessage] {
        match self {
            Self::Configuration { messages } | Self::Creation { messages } => messages,
            _ => &[],
        }
    }
}

impl From<DependencyError> for BindingError {
    fn from(error: DependencyError) -> Self {
        match error {
            DependencyError::ComponentCreationFailed { type_name, source } => {
                match source.downcast::<BindingError>() {
                    Ok(binding_error) => *binding_error,
                    Err(source) => Self::Dependency {
                        source: DependencyError::ComponentCreationFailed { type_name, source },
                    },
                }
            }
            other => Self::Dependency { source: other },
        }
    }
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("绑定错误: {source}")]
    BindingError {
        #[from]
        source: BindingError,
    },

    #[error("依赖注入错误: {source}")]
    DependencyError {
        #[from]
        source: DependencyError,
    },

    #[error("配置加载失败: {message}")]
    SettingsError { message: String },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },

    #[error("基础设施关闭失败: {message}")]
    ShutdownFailed { message: String },
}

/// 结果类型别名
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type BindingResult<T> = Result<T, BindingError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;

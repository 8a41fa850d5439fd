//! 配置错误聚合

use infrastructure_common::{BindingError, ErrorMessage};
use tracing::error;

/// 配置错误聚合器
///
/// 只追加、保持顺序；所有模块配置完成后统一检查一次。
#[derive(Debug, Default)]
pub struct ErrorAggregator {
    messages: Vec<ErrorMessage>,
}

impl ErrorAggregator {
    /// 创建空的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加诊断消息
    pub fn push(&mut self, message: ErrorMessage) {
        self.messages.push(message);
    }

    /// 是否没有错误
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// 错误数量
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// 已记录的消息
    pub fn messages(&self) -> &[ErrorMessage] {
        &self.messages
    }

    /// 逐条记录日志
    pub fn log_all(&self) {
        log_messages(&self.messages);
    }

    /// 转换为聚合配置错误
    pub fn into_failure(self) -> BindingError {
        BindingError::configuration(self.messages)
    }
}

/// 逐条记录配置错误，原因存在时一并输出
pub fn log_messages(messages: &[ErrorMessage]) {
    for message in messages {
        match message.cause() {
            Some(cause) => error!("模块配置错误: {}, 原因: {}", message, cause),
            None => error!("模块配置错误: {}", message),
        }
    }
}

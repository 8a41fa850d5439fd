//! 成员注入队列
//!
//! 模块配置期间请求注入的对象先进入队列，容器就绪后统一注入一次。

use di_abstractions::{ComponentLocator, MembersInjectable, StartupListener};
use infrastructure_common::{BindingError, DependencyError, DependencyResult, ErrorMessage};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 成员注入队列
///
/// 入队与出队共用一把互斥锁；同一个实例（按指针判断）只入队一次。
#[derive(Default)]
pub struct InjectionQueue {
    pending: Mutex<Vec<Arc<dyn MembersInjectable>>>,
}

impl InjectionQueue {
    /// 创建空队列
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求注入，重复请求同一实例不产生效果
    pub fn enqueue(&self, instance: Arc<dyn MembersInjectable>) -> bool {
        let mut pending = self.pending.lock();
        let address = Arc::as_ptr(&instance) as *const ();
        if pending
            .iter()
            .any(|queued| Arc::as_ptr(queued) as *const () == address)
        {
            return false;
        }
        pending.push(instance);
        true
    }

    /// 待注入数量
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// 队列是否为空
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// 取出全部待注入对象并逐个注入
    ///
    /// 单个对象注入失败不影响其余对象，全部执行完后返回成功数量与失败消息。
    pub fn drain(&self, locator: &dyn ComponentLocator) -> InjectionOutcome {
        let instances = std::mem::take(&mut *self.pending.lock());
        let mut outcome = InjectionOutcome::default();
        for (index, instance) in instances.into_iter().enumerate() {
            match instance.inject_members(locator) {
                Ok(()) => outcome.injected += 1,
                Err(e) => {
                    warn!("第 {} 个对象成员注入失败: {}", index + 1, e);
                    let message = format!("Failed to inject members of request #{}", index + 1);
                    outcome
                        .failures
                        .push(ErrorMessage::new(message).with_cause(e));
                }
            }
        }
        outcome
    }
}

/// 一次出队注入的结果
#[derive(Debug, Clone, Default)]
pub struct InjectionOutcome {
    /// 注入成功的对象数量
    pub injected: usize,
    /// 注入失败的诊断消息
    pub failures: Vec<ErrorMessage>,
}

impl InjectionOutcome {
    /// 是否全部成功
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// 有失败时转换为创建错误
    pub fn into_result(self) -> Result<usize, BindingError> {
        if self.failures.is_empty() {
            Ok(self.injected)
        } else {
            Err(BindingError::creation(self.failures))
        }
    }
}

impl StartupListener for InjectionQueue {
    fn on_startup(&self, locator: &dyn ComponentLocator) -> DependencyResult<()> {
        let count = self.drain(locator).into_result().map_err(|e| {
            DependencyError::ComponentCreationFailed {
                type_name: self.name().to_string(),
                source: Box::new(e),
            }
        })?;
        if count > 0 {
            info!("容器就绪，已完成 {} 个对象的成员注入", count);
        } else {
            debug!("容器就绪，没有待注入的对象");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "member-injection-queue"
    }
}

//! 隐式解析
//!
//! 未指定目标的绑定按以下顺序推导目标，第一个命中的约定生效：
//!
//! 1. 类型声明了默认实现：校验可赋值后绑定到该实现
//! 2. 类型声明了默认提供者：绑定到该提供者类型
//! 3. 宿主容器中恰好有一个暴露该类型的组件：固定引用该组件定义，并标记为首选
//! 4. 否则报告没有绑定目标

use crate::builder::BindingTarget;
use crate::key::Key;
use di_abstractions::{ComponentLocator, ComponentSupplier, DiContainer};
use infrastructure_common::{ErrorMessage, Qualifier};
use std::sync::Arc;
use tracing::debug;

/// 隐式解析结果
pub struct Resolution {
    /// 推导出的目标
    pub target: BindingTarget,
    /// 是否标记为首选组件
    pub primary: bool,
}

/// 隐式解析器
pub struct ImplicitResolver<'a> {
    container: &'a dyn DiContainer,
}

impl<'a> ImplicitResolver<'a> {
    /// 创建解析器
    pub fn new(container: &'a dyn DiContainer) -> Self {
        Self { container }
    }

    /// 为未指定目标的键推导目标
    pub fn resolve(&self, key: &Key) -> Result<Resolution, ErrorMessage> {
        let raw_type = key.raw_type();
        let conventions = self.container.conventions();

        if let Some(implementation) = conventions.default_implementation(raw_type.id) {
            let cast = conventions
                .cast(implementation.id, raw_type.id)
                .ok_or_else(|| {
                    ErrorMessage::new(format!(
                        "Default implementation {} of {} is an incompatible implementation: \
                         it does not implement the declaring type",
                        implementation, raw_type
                    ))
                })?;
            debug!("{} 使用默认实现 {}", key, implementation);
            return Ok(Resolution {
                target: BindingTarget::ConcreteType {
                    implementation,
                    qualifier: Qualifier::None,
                    cast,
                },
                primary: false,
            });
        }

        if let Some(convention) = conventions.provider_for(raw_type.id) {
            debug!("{} 使用默认提供者 {}", key, convention.provider);
            return Ok(Resolution {
                target: BindingTarget::ProviderType {
                    provider: convention.provider,
                    call: convention.call,
                },
                primary: false,
            });
        }

        let definitions = self.container.find_definitions(raw_type.id);
        match definitions.as_slice() {
            [existing] => {
                let id = existing.id;
                debug!("{} 固定引用已有组件定义 {}", key, id);
                let pinned: ComponentSupplier =
                    Arc::new(move |locator: &dyn ComponentLocator| locator.locate_definition(id));
                Ok(Resolution {
                    target: BindingTarget::ProviderInstance(pinned),
                    primary: true,
                })
            }
            [] => Err(ErrorMessage::new(format!(
                "No binding target for {}: cannot create untargetted binding to a type that is not \
                 itself declared a component. Consider adding {} to the classes of the module import.",
                key, raw_type
            ))),
            candidates => Err(ErrorMessage::new(format!(
                "Ambiguous binding target for {}: {} components expose this type. \
                 Bind it explicitly to one of them.",
                key,
                candidates.len()
            ))),
        }
    }
}

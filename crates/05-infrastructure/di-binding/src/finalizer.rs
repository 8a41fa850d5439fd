//! 声明终结器
//!
//! 按记录顺序把声明转换为组件定义，全部成功后一次性注册到宿主容器。

use crate::binder::RecordedDeclarations;
use crate::builder::BindingDeclaration;
use crate::constant::ConstantDeclaration;
use di_abstractions::{ComponentDefinition, DefinitionId, DiContainer};
use infrastructure_common::{BindingError, BindingResult, ErrorMessage};
use tracing::{debug, info};

enum Pending {
    Linked(BindingDeclaration),
    Constant(ConstantDeclaration),
}

impl Pending {
    fn sequence(&self) -> usize {
        match self {
            Self::Linked(declaration) => declaration.sequence(),
            Self::Constant(declaration) => declaration.sequence(),
        }
    }
}

/// 声明终结器
pub struct Finalizer<'a> {
    container: &'a dyn DiContainer,
}

impl<'a> Finalizer<'a> {
    /// 创建终结器
    pub fn new(container: &'a dyn DiContainer) -> Self {
        Self { container }
    }

    /// 构建全部声明，不注册
    ///
    /// 任何一条声明构建失败时收集全部失败消息，返回聚合配置错误。
    pub fn build_all(
        &self,
        declarations: RecordedDeclarations,
    ) -> BindingResult<Vec<ComponentDefinition>> {
        let mut pending: Vec<Pending> = declarations
            .linked
            .into_iter()
            .map(Pending::Linked)
            .chain(declarations.constants.into_iter().map(Pending::Constant))
            .collect();
        pending.sort_by_key(Pending::sequence);

        let mut definitions = Vec::with_capacity(pending.len());
        let mut failures: Vec<ErrorMessage> = Vec::new();
        for declaration in pending {
            let built = match declaration {
                Pending::Linked(declaration) => declaration.build(self.container),
                Pending::Constant(declaration) => declaration.build(),
            };
            match built {
                Ok(definition) => definitions.push(definition),
                Err(message) => failures.push(message),
            }
        }

        if failures.is_empty() {
            Ok(definitions)
        } else {
            Err(BindingError::configuration(failures))
        }
    }

    /// 构建并原子注册全部声明
    pub fn finalize(&self, declarations: RecordedDeclarations) -> BindingResult<Vec<DefinitionId>> {
        let definitions = self.build_all(declarations)?;
        debug!("注册 {} 个绑定定义", definitions.len());
        let ids = self
            .container
            .register_definitions(definitions)
            .map_err(BindingError::from)?;
        info!("绑定定义注册完成，共 {} 个", ids.len());
        Ok(ids)
    }
}

//! 常量绑定

use crate::key::{ensure_binding_marker, marker_qualifier};
use di_abstractions::{ComponentDefinition, ComponentLocator};
use infrastructure_common::{
    erase, BindingError, BindingResult, ComponentMetadata, ComponentScope, ErasedInstance,
    ErrorMessage, Marker, Qualifier, TypeInfo,
};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 常量值
#[derive(Clone)]
pub enum ConstantValue {
    String(String),
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Char(char),
    /// 类型字面量
    Type(TypeInfo),
    /// 枚举字面量
    Enum {
        type_info: TypeInfo,
        value: ErasedInstance,
        label: String,
    },
}

impl ConstantValue {
    /// 由枚举值创建常量
    pub fn enumeration<E>(value: E) -> Self
    where
        E: fmt::Debug + Send + Sync + 'static,
    {
        Self::Enum {
            type_info: TypeInfo::of::<E>(),
            label: format!("{:?}", value),
            value: erase(Arc::new(value)),
        }
    }

    /// 由类型创建类型字面量常量
    pub fn type_of<T: ?Sized + 'static>() -> Self {
        Self::Type(TypeInfo::of::<T>())
    }

    /// 常量暴露的类型
    pub fn exposed_type(&self) -> TypeInfo {
        match self {
            Self::String(_) => TypeInfo::of::<String>(),
            Self::Bool(_) => TypeInfo::of::<bool>(),
            Self::I8(_) => TypeInfo::of::<i8>(),
            Self::I16(_) => TypeInfo::of::<i16>(),
            Self::I32(_) => TypeInfo::of::<i32>(),
            Self::I64(_) => TypeInfo::of::<i64>(),
            Self::F32(_) => TypeInfo::of::<f32>(),
            Self::F64(_) => TypeInfo::of::<f64>(),
            Self::Char(_) => TypeInfo::of::<char>(),
            Self::Type(_) => TypeInfo::of::<TypeInfo>(),
            Self::Enum { type_info, .. } => type_info.clone(),
        }
    }

    /// 擦除类型后的实例
    pub fn to_instance(&self) -> ErasedInstance {
        match self {
            Self::String(value) => erase(Arc::new(value.clone())),
            Self::Bool(value) => erase(Arc::new(*value)),
            Self::I8(value) => erase(Arc::new(*value)),
            Self::I16(value) => erase(Arc::new(*value)),
            Self::I32(value) => erase(Arc::new(*value)),
            Self::I64(value) => erase(Arc::new(*value)),
            Self::F32(value) => erase(Arc::new(*value)),
            Self::F64(value) => erase(Arc::new(*value)),
            Self::Char(value) => erase(Arc::new(*value)),
            Self::Type(info) => erase(Arc::new(info.clone())),
            Self::Enum { value, .. } => value.clone(),
        }
    }
}

impl fmt::Debug for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) => write!(f, "{:?}", value),
            Self::Bool(value) => write!(f, "{}", value),
            Self::I8(value) => write!(f, "{}i8", value),
            Self::I16(value) => write!(f, "{}i16", value),
            Self::I32(value) => write!(f, "{}", value),
            Self::I64(value) => write!(f, "{}i64", value),
            Self::F32(value) => write!(f, "{}f32", value),
            Self::F64(value) => write!(f, "{}", value),
            Self::Char(value) => write!(f, "{:?}", value),
            Self::Type(info) => write!(f, "type {}", info),
            Self::Enum {
                type_info, label, ..
            } => write!(f, "{}::{}", type_info, label),
        }
    }
}

macro_rules! constant_from {
    ($($source:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$source> for ConstantValue {
                fn from(value: $source) -> Self {
                    Self::$variant(value)
                }
            }
        )+
    };
}

constant_from! {
    String => String,
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    char => Char,
    TypeInfo => Type,
}

impl From<&str> for ConstantValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// 一条常量绑定声明
#[derive(Debug, Clone)]
pub struct ConstantDeclaration {
    sequence: usize,
    qualifier: Qualifier,
    value: Option<ConstantValue>,
    source: Option<String>,
}

impl ConstantDeclaration {
    pub(crate) fn new(sequence: usize, source: Option<String>) -> Self {
        Self {
            sequence,
            qualifier: Qualifier::None,
            value: None,
            source,
        }
    }

    /// 声明顺序
    pub fn sequence(&self) -> usize {
        self.sequence
    }

    /// 限定符
    pub fn qualifier(&self) -> &Qualifier {
        &self.qualifier
    }

    /// 常量值
    pub fn value(&self) -> Option<&ConstantValue> {
        self.value.as_ref()
    }

    /// 转换为组件定义，没有设置常量值时失败
    pub fn build(self) -> Result<ComponentDefinition, ErrorMessage> {
        let Some(value) = self.value else {
            let message = ErrorMessage::new(
                "Binding constant cannot be empty, call `to(..)` on the constant binding",
            );
            return Err(match self.source {
                Some(source) => message.with_source(source),
                None => message,
            });
        };

        debug!("常量绑定 {:?}{}", value, self.qualifier);
        let instance = value.to_instance();
        let mut metadata = ComponentMetadata::new()
            .with_name(format!("{:?}", value))
            .with_property("target", "constant");
        if let Some(source) = self.source {
            metadata = metadata.with_property("source", source);
        }
        Ok(ComponentDefinition::new(
            value.exposed_type(),
            Arc::new(move |_: &dyn ComponentLocator| Ok(instance.clone())),
        )
        .with_qualifier(self.qualifier)
        .with_scope(ComponentScope::Singleton)
        .with_metadata(metadata))
    }
}

/// 常量绑定构建器
pub struct AnnotatedConstantBindingBuilder<'a> {
    declaration: &'a mut ConstantDeclaration,
}

impl<'a> AnnotatedConstantBindingBuilder<'a> {
    pub(crate) fn new(declaration: &'a mut ConstantDeclaration) -> Self {
        Self { declaration }
    }

    /// 以标记实例限定，名称标记转为名称限定
    pub fn annotated_with<M: Marker>(self, marker: M) -> BindingResult<Self> {
        self.declaration.qualifier = marker_qualifier(&marker)?;
        Ok(self)
    }

    /// 以标记类型限定
    pub fn annotated_with_marker_type<M: Marker>(self) -> BindingResult<Self> {
        ensure_binding_marker::<M>()?;
        self.declaration.qualifier = Qualifier::marker_type::<M>();
        Ok(self)
    }

    /// 以名称限定
    pub fn annotated_with_name(self, name: impl Into<String>) -> BindingResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(BindingError::illegal_argument("Name cannot be empty"));
        }
        self.declaration.qualifier = Qualifier::Named(name);
        Ok(self)
    }

    /// 设置常量值
    pub fn to(self, value: impl Into<ConstantValue>) {
        self.declaration.value = Some(value.into());
    }
}

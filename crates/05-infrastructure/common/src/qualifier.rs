//! 限定符模型
//!
//! 同一类型的多个组件通过限定符区分。限定符有三种形式：
//!
//! - 名称：[`Named`] 标记，按名称匹配
//! - 标记值：标记类型加成员值，按类型与成员值匹配
//! - 标记类型：只比较标记类型，忽略成员值

use crate::metadata::TypeInfo;
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

/// 标记成员值
pub type MemberMap = BTreeMap<String, Value>;

/// 限定标记 trait
///
/// 标记类型在绑定时用于区分同一类型的不同组件。
pub trait Marker: Any + Send + Sync {
    /// 标记类型是否可以作为绑定限定符使用
    const BINDING_QUALIFIER: bool = true;

    /// 标记实例的成员值
    fn members(&self) -> MemberMap {
        MemberMap::new()
    }
}

/// 内置名称标记
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Named(String);

impl Named {
    /// 创建名称标记
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// 名称
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl Marker for Named {
    fn members(&self) -> MemberMap {
        let mut members = MemberMap::new();
        members.insert("value".to_string(), Value::String(self.0.clone()));
        members
    }
}

/// 创建名称标记
pub fn named(value: impl Into<String>) -> Named {
    Named::new(value)
}

/// 标记类型
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkerType {
    info: TypeInfo,
    binding_qualifier: bool,
}

impl MarkerType {
    /// 获取标记类型
    pub fn of<M: Marker>() -> Self {
        Self {
            info: TypeInfo::of::<M>(),
            binding_qualifier: M::BINDING_QUALIFIER,
        }
    }

    /// 类型信息
    pub fn type_info(&self) -> &TypeInfo {
        &self.info
    }

    /// 是否具备限定符能力
    pub fn is_binding_qualifier(&self) -> bool {
        self.binding_qualifier
    }
}

impl fmt::Display for MarkerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.info)
    }
}

/// 标记值（标记类型 + 成员值）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerValue {
    marker: MarkerType,
    members: MemberMap,
}

impl MarkerValue {
    /// 从标记实例创建
    pub fn of<M: Marker>(marker: &M) -> Self {
        Self {
            marker: MarkerType::of::<M>(),
            members: marker.members(),
        }
    }

    /// 标记类型
    pub fn marker_type(&self) -> &MarkerType {
        &self.marker
    }

    /// 成员值
    pub fn members(&self) -> &MemberMap {
        &self.members
    }
}

impl fmt::Display for MarkerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.members.is_empty() {
            return write!(f, "{}", self.marker);
        }
        let members = self
            .members
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}({})", self.marker, members)
    }
}

/// 组件限定符
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Qualifier {
    /// 无限定符
    #[default]
    None,
    /// 按名称限定
    Named(String),
    /// 按标记值限定
    Marker(MarkerValue),
    /// 只按标记类型限定
    MarkerType(MarkerType),
}

impl Qualifier {
    /// 名称限定符
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// 由标记实例推导限定符，名称标记转为名称形式
    pub fn marker<M: Marker>(marker: &M) -> Self {
        match (marker as &dyn Any).downcast_ref::<Named>() {
            Some(named) => Self::Named(named.value().to_string()),
            None => Self::Marker(MarkerValue::of(marker)),
        }
    }

    /// 标记类型限定符
    pub fn marker_type<M: Marker>() -> Self {
        Self::MarkerType(MarkerType::of::<M>())
    }

    /// 是否无限定符
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// 限定符涉及的标记类型
    pub fn marker_type_ref(&self) -> Option<&MarkerType> {
        match self {
            Self::Marker(value) => Some(value.marker_type()),
            Self::MarkerType(marker) => Some(marker),
            _ => None,
        }
    }

    /// 判断组件声明的限定符是否满足本查询限定符
    ///
    /// 标记类型查询匹配任何声明了该标记的组件，不比较成员值；
    /// 标记值查询要求成员值完全一致，只声明标记类型的组件视为成员为空。
    pub fn matches(&self, declared: &Qualifier) -> bool {
        match (self, declared) {
            (Self::None, Self::None) => true,
            (Self::Named(requested), Self::Named(name)) => requested == name,
            (Self::Marker(requested), Self::Marker(value)) => requested == value,
            (Self::Marker(requested), Self::MarkerType(marker)) => {
                requested.marker_type() == marker && requested.members().is_empty()
            }
            (Self::MarkerType(requested), declared) => {
                declared.marker_type_ref() == Some(requested)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Named(name) => write!(f, " @Named(\"{}\")", name),
            Self::Marker(value) => write!(f, " {}", value),
            Self::MarkerType(marker) => write!(f, " {}", marker),
        }
    }
}

//! 绑定键
//!
//! 键由类型字面量与限定符组成，按结构比较。

use di_abstractions::LookupRequest;
use infrastructure_common::{BindingError, BindingResult, Marker, Qualifier, TypeInfo};
use std::fmt;

/// 类型字面量（原始类型 + 泛型参数）
///
/// Rust 的 `TypeId` 已经区分了泛型实例，泛型参数只用于结构比较与诊断输出。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeLiteral {
    raw_type: TypeInfo,
    generic_args: Vec<TypeLiteral>,
}

impl TypeLiteral {
    /// 由类型创建
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::from_info(TypeInfo::of::<T>())
    }

    /// 由类型信息创建
    pub fn from_info(raw_type: TypeInfo) -> Self {
        Self {
            raw_type,
            generic_args: Vec::new(),
        }
    }

    /// 追加泛型参数
    pub fn with_argument(mut self, argument: TypeLiteral) -> Self {
        self.generic_args.push(argument);
        self
    }

    /// 原始类型
    pub fn raw_type(&self) -> &TypeInfo {
        &self.raw_type
    }

    /// 泛型参数
    pub fn generic_args(&self) -> &[TypeLiteral] {
        &self.generic_args
    }
}

impl fmt::Display for TypeLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw_type)?;
        if !self.generic_args.is_empty() {
            let args = self
                .generic_args
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, " [{}]", args)?;
        }
        Ok(())
    }
}

/// 绑定键
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    literal: TypeLiteral,
    qualifier: Qualifier,
}

impl Key {
    /// 由类型字面量与限定符创建
    pub fn new(literal: TypeLiteral, qualifier: Qualifier) -> Self {
        Self { literal, qualifier }
    }

    /// 无限定符的键
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(TypeLiteral::of::<T>(), Qualifier::None)
    }

    /// 按名称限定的键
    pub fn named<T: ?Sized + 'static>(name: impl Into<String>) -> BindingResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(BindingError::illegal_argument("Name cannot be empty"));
        }
        Ok(Self::new(TypeLiteral::of::<T>(), Qualifier::Named(name)))
    }

    /// 按标记实例限定的键
    pub fn with_marker<T: ?Sized + 'static, M: Marker>(marker: &M) -> BindingResult<Self> {
        Ok(Self::new(TypeLiteral::of::<T>(), marker_qualifier(marker)?))
    }

    /// 按标记类型限定的键
    pub fn with_marker_type<T: ?Sized + 'static, M: Marker>() -> BindingResult<Self> {
        ensure_binding_marker::<M>()?;
        Ok(Self::new(TypeLiteral::of::<T>(), Qualifier::marker_type::<M>()))
    }

    /// 替换限定符
    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifier = qualifier;
        self
    }

    /// 类型字面量
    pub fn literal(&self) -> &TypeLiteral {
        &self.literal
    }

    /// 原始类型
    pub fn raw_type(&self) -> &TypeInfo {
        self.literal.raw_type()
    }

    /// 限定符
    pub fn qualifier(&self) -> &Qualifier {
        &self.qualifier
    }

    /// 键的原始类型是否为 `T`
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.literal.raw_type().is::<T>()
    }

    /// 转换为宿主容器的查找请求
    pub fn lookup_request(&self) -> LookupRequest {
        LookupRequest::new(self.raw_type().clone(), self.qualifier.clone())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.literal, self.qualifier)
    }
}

/// 校验标记类型具备限定符能力
/// 由标记实例推导限定符，名称标记的名称不能为空
pub(crate) fn marker_qualifier<M: Marker>(marker: &M) -> BindingResult<Qualifier> {
    ensure_binding_marker::<M>()?;
    match Qualifier::marker(marker) {
        Qualifier::Named(name) if name.is_empty() => {
            Err(BindingError::illegal_argument("Name cannot be empty"))
        }
        qualifier => Ok(qualifier),
    }
}

pub(crate) fn ensure_binding_marker<M: Marker>() -> BindingResult<()> {
    if M::BINDING_QUALIFIER {
        Ok(())
    } else {
        Err(BindingError::illegal_argument(format!(
            "Marker type {} must be declared as a binding qualifier",
            TypeInfo::of::<M>()
        )))
    }
}

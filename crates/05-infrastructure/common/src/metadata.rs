//! 元数据定义
//!
//! 提供组件和类型的元数据信息

use std::any::TypeId;
use std::collections::BTreeMap;
use std::fmt;

/// 类型信息
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// 类型名称（去除模块路径）
    pub name: String,
    /// 类型ID
    pub id: TypeId,
    /// 完整类型名称
    pub type_name: &'static str,
}

impl TypeInfo {
    /// 从类型获取类型信息
    pub fn of<T: ?Sized + 'static>() -> Self {
        let type_name = std::any::type_name::<T>();
        Self {
            name: strip_module_paths(type_name),
            id: TypeId::of::<T>(),
            type_name,
        }
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn short_name(&self) -> &str {
        &self.name
    }

    /// 是否为指定类型
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// 去掉类型名称中每一段路径前缀，保留泛型结构
fn strip_module_paths(type_name: &str) -> String {
    let mut output = String::with_capacity(type_name.len());
    let mut segment = String::new();

    for ch in type_name.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            segment.push(ch);
        } else {
            output.push_str(segment.rsplit("::").next().unwrap_or(&segment));
            segment.clear();
            output.push(ch);
        }
    }
    output.push_str(segment.rsplit("::").next().unwrap_or(&segment));
    output
}

/// 组件元数据
///
/// 记录组件定义上与限定符无关的声明性信息，例如提供者方法携带的属性。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentMetadata {
    /// 组件名称
    pub name: Option<String>,
    /// 组件描述
    pub description: Option<String>,
    /// 组件标签
    pub tags: Vec<String>,
    /// 自定义属性
    pub properties: BTreeMap<String, String>,
}

impl ComponentMetadata {
    /// 创建新的组件元数据
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置名称
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 设置描述
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// 添加标签
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// 添加属性
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// 读取属性
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

//! # 数据模型
//!
//! ## 设计思路
//!
//! - `RenderOptions`：最终落到 `<img>` 上的有序属性表，`class` 视为空格分隔的 token 集合，
//!   `data` 是嵌套映射，懒加载注入 `src` 时做合并而不是覆盖。
//! - `FormatSource`：一个备选格式（WebP / AVIF）及其 URL，按注册顺序输出。
//! - `BreakpointSource`：平板/桌面断点各至多一个，可附带同断点的格式 URL。

use std::borrow::Cow;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::TagError;

/// 仅供构建器内部使用、不会渲染到 `<img>` 上的选项 key。
pub(crate) const INTERNAL_KEYS: &[&str] = &["webp", "avif"];

/// 单个属性值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Flag(bool),
    Number(u64),
    Text(String),
    Data(IndexMap<String, String>),
}

impl AttrValue {
    /// 标量值的文本形式；`Data` 没有标量形式。
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Flag(flag) => Some(Cow::Owned(flag.to_string())),
            Self::Number(number) => Some(Cow::Owned(number.to_string())),
            Self::Text(text) => Some(Cow::Borrowed(text)),
            Self::Data(_) => None,
        }
    }

    /// 缺失语义：空白文本或 `false`。
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Flag(flag) => !flag,
            Self::Number(_) => false,
            Self::Text(text) => text.trim().is_empty(),
            Self::Data(map) => map.is_empty(),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<u32> for AttrValue {
    fn from(value: u32) -> Self {
        Self::Number(u64::from(value))
    }
}

impl From<u64> for AttrValue {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<IndexMap<String, String>> for AttrValue {
    fn from(value: IndexMap<String, String>) -> Self {
        Self::Data(value)
    }
}

/// 有序属性表。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderOptions(IndexMap<String, AttrValue>);

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 对象构建，例如 `{"alt": "logo", "class": "hero", "data": {"id": "1"}}`。
    pub fn from_json_str(json: &str) -> Result<Self, TagError> {
        serde_json::from_str(json).map_err(|e| TagError::InvalidFormat(format!("选项格式错误：{}", e)))
    }

    /// 链式设置属性。
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// 已存在的 key 保持原位置，仅替换值。
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.0.get(key)
    }

    /// key 是否存在（不看取值）。
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// 删除 key，保持其余 key 的顺序。
    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.0.shift_remove(key)
    }

    /// key 缺失或取值为空白。
    pub fn is_blank(&self, key: &str) -> bool {
        self.0.get(key).is_none_or(AttrValue::is_blank)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttrValue)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `class` 的文本形式（去首尾空白）；缺失或为空时返回 `None`。
    pub fn class(&self) -> Option<String> {
        let class = self.get("class")?.as_text()?;
        let class = class.trim();
        (!class.is_empty()).then(|| class.to_string())
    }

    /// 追加一个 class token。
    pub fn push_class(&mut self, token: &str) {
        let current = self.class().unwrap_or_default();
        let next = format!("{} {}", current, token).trim().to_string();
        self.insert("class", next);
    }

    /// 向 `data` 映射合并一项；`data` 不是映射时替换为新映射。
    pub fn merge_data(&mut self, key: &str, value: impl Into<String>) {
        let mut data = match self.remove_in_place("data") {
            Some(AttrValue::Data(map)) => map,
            _ => IndexMap::new(),
        };
        data.insert(key.to_string(), value.into());
        self.insert("data", data);
    }

    /// 去掉内部 key 后的副本，用于渲染 `<img>`。
    pub(crate) fn without_internal_keys(&self) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(key, _)| !INTERNAL_KEYS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }

    /// 取出值但保留 key 的位置，后续 `insert` 写回原处。
    fn remove_in_place(&mut self, key: &str) -> Option<AttrValue> {
        self.0
            .get_mut(key)
            .map(|value| std::mem::replace(value, AttrValue::Flag(false)))
    }
}

impl<K, V> FromIterator<(K, V)> for RenderOptions
where
    K: Into<String>,
    V: Into<AttrValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// 备选图片格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Avif,
    Webp,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Avif => "avif",
            Self::Webp => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Avif => "image/avif",
            Self::Webp => "image/webp",
        }
    }

    /// 选项简写 key 对应的格式。
    pub(crate) fn from_option_key(key: &str) -> Option<Self> {
        match key {
            "avif" => Some(Self::Avif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

/// 一个全局备选格式来源。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSource {
    pub format: ImageFormat,
    pub url: String,
}

/// 响应式断点档位。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Tablet,
    Desktop,
}

/// 断点下的格式 URL，输出顺序固定为 AVIF、WebP。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreakpointFormats {
    pub avif: Option<String>,
    pub webp: Option<String>,
}

impl BreakpointFormats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_avif(mut self, url: impl Into<String>) -> Self {
        self.avif = Some(url.into());
        self
    }

    pub fn with_webp(mut self, url: impl Into<String>) -> Self {
        self.webp = Some(url.into());
        self
    }

    /// 按输出顺序列出已声明的格式。
    pub fn entries(&self) -> impl Iterator<Item = (ImageFormat, &str)> {
        [
            (ImageFormat::Avif, self.avif.as_deref()),
            (ImageFormat::Webp, self.webp.as_deref()),
        ]
        .into_iter()
        .filter_map(|(format, url)| url.filter(|url| !url.is_empty()).map(|url| (format, url)))
    }
}

/// 一个断点来源。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointSource {
    pub tier: Tier,
    pub base_url: String,
    pub formats: BreakpointFormats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_position_of_existing_keys() {
        let mut options = RenderOptions::new().with("class", "a").with("alt", "x");
        options.push_class("lazyload");

        let keys: Vec<&str> = options.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, vec!["class", "alt"]);
        assert_eq!(options.class().as_deref(), Some("a lazyload"));
    }

    #[test]
    fn merge_data_preserves_existing_entries() {
        let mut data = IndexMap::new();
        data.insert("id".to_string(), "7".to_string());
        let mut options = RenderOptions::new().with("data", data).with("alt", "x");

        options.merge_data("src", "/assets/1x1.gif");

        match options.get("data") {
            Some(AttrValue::Data(map)) => {
                assert_eq!(map.get("id").map(String::as_str), Some("7"));
                assert_eq!(map.get("src").map(String::as_str), Some("/assets/1x1.gif"));
            }
            other => panic!("unexpected data value: {:?}", other),
        }
        let keys: Vec<&str> = options.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, vec!["data", "alt"]);
    }

    #[test]
    fn blank_semantics() {
        let options = RenderOptions::new()
            .with("alt", "  ")
            .with("width", 0u32)
            .with("hidden", false);

        assert!(options.is_blank("alt"));
        assert!(options.is_blank("missing"));
        assert!(options.is_blank("hidden"));
        assert!(!options.is_blank("width"));
        assert!(options.contains("width"));
    }

    #[test]
    fn options_deserialize_from_json() {
        let options = RenderOptions::from_json_str(
            r#"{"alt": "logo", "width": 10, "webp": true, "data": {"controller": "img"}}"#,
        )
        .expect("options should parse");

        assert_eq!(options.get("alt"), Some(&AttrValue::Text("logo".into())));
        assert_eq!(options.get("width"), Some(&AttrValue::Number(10)));
        assert_eq!(options.get("webp"), Some(&AttrValue::Flag(true)));
        assert!(matches!(options.get("data"), Some(AttrValue::Data(_))));
        assert!(!options.without_internal_keys().contains("webp"));
    }

    #[test]
    fn breakpoint_formats_list_avif_first() {
        let formats = BreakpointFormats::new()
            .with_webp("hero.webp")
            .with_avif("hero.avif");

        let listed: Vec<_> = formats.entries().collect();
        assert_eq!(
            listed,
            vec![(ImageFormat::Avif, "hero.avif"), (ImageFormat::Webp, "hero.webp")]
        );
    }
}

//! # SVG 属性注入
//!
//! ## 设计思路
//!
//! 内联后的 SVG 原文直接输出到页面，不做 XML 解析。只改写根标签 `<svg`：
//! 一次正则匹配，把 `class`、`data-*`、`width`、`height` 拼成一段插入到标签名之后。
//! 缺失的属性直接跳过，其余选项（如 `alt`）对 SVG 没有意义，忽略。

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

use super::markup::{data_attr_name, escape_attr};
use super::options::{AttrValue, RenderOptions};

static SVG_OPEN_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<svg\b").expect("SVG 根标签正则无效"));

/// 向 SVG 根标签注入属性，返回新的 SVG 文本。
///
/// # 示例
/// ```rust
/// use better_image_tag::RenderOptions;
/// use better_image_tag::image_tag::inject_svg_attributes;
///
/// let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"></svg>"#;
/// let options = RenderOptions::new().with("class", "icon").with("width", 24u32);
/// assert_eq!(
///     inject_svg_attributes(svg, &options),
///     r#"<svg class="icon" width="24" xmlns="http://www.w3.org/2000/svg"></svg>"#
/// );
/// ```
pub fn inject_svg_attributes(svg: &str, options: &RenderOptions) -> String {
    let mut injected = String::new();

    if let Some(class) = options.class() {
        push_attr(&mut injected, "class", &class);
    }
    if let Some(AttrValue::Data(map)) = options.get("data") {
        for (key, value) in map {
            push_attr(&mut injected, &data_attr_name(key), value);
        }
    }
    for name in ["width", "height"] {
        if let Some(value) = options.get(name).and_then(AttrValue::as_text) {
            push_attr(&mut injected, name, &value);
        }
    }

    if injected.is_empty() {
        return svg.to_string();
    }
    if !SVG_OPEN_TAG.is_match(svg) {
        log::warn!("⚠️ 内容中没有 <svg 根标签，跳过属性注入");
        return svg.to_string();
    }

    let replacement = format!("<svg{}", injected);
    SVG_OPEN_TAG
        .replace(svg, NoExpand(&replacement))
        .into_owned()
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_attr(value));
    out.push('"');
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;

    const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 1 1"></svg>"#;

    #[test]
    fn injects_data_attributes() {
        let mut data = IndexMap::new();
        data.insert("custom_key".to_string(), "value".to_string());
        data.insert("another_key".to_string(), "another value".to_string());
        let options = RenderOptions::new().with("data", data);

        assert_eq!(
            inject_svg_attributes(SVG, &options),
            r#"<svg data-custom-key="value" data-another-key="another value" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 1 1"></svg>"#
        );
    }

    #[test]
    fn injects_every_attribute_once() {
        let options = RenderOptions::new()
            .with("height", 10u32)
            .with("width", 20u32)
            .with("class", "icon lazyload")
            .with("alt", "ignored");

        let out = inject_svg_attributes(SVG, &options);

        assert!(out.starts_with(r#"<svg class="icon lazyload" width="20" height="10" xmlns="#));
        assert_eq!(out.matches("<svg").count(), 1);
        assert!(!out.contains("alt="));
    }

    #[test]
    fn only_the_root_tag_is_rewritten() {
        let nested = r#"<svg><svg id="inner"></svg></svg>"#;
        let options = RenderOptions::new().with("class", "outer");

        assert_eq!(
            inject_svg_attributes(nested, &options),
            r#"<svg class="outer"><svg id="inner"></svg></svg>"#
        );
    }

    #[test]
    fn no_attributes_leaves_svg_untouched() {
        assert_eq!(inject_svg_attributes(SVG, &RenderOptions::new()), SVG);
    }

    #[test]
    fn replacement_text_is_not_expanded() {
        let options = RenderOptions::new().with("class", "$1 price");

        assert!(inject_svg_attributes(SVG, &options).starts_with(r#"<svg class="$1 price""#));
    }
}

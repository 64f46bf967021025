//! HTML 片段拼装：属性转义与 `<img>` / `<source>` 标签。

use super::options::{AttrValue, RenderOptions};

/// 转义属性值中的 HTML 特殊字符。
pub fn escape_attr(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// `data` 映射的 key 转为 `data-*` 属性名（下划线变连字符）。
pub(crate) fn data_attr_name(key: &str) -> String {
    format!("data-{}", key.replace('_', "-"))
}

/// 按插入顺序展开属性表为 `name="value"` 列表。
///
/// `data` 映射就地展开；`true` 写作 `name="name"`，`false` 省略。
pub(crate) fn attribute_pairs(options: &RenderOptions) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    for (name, value) in options.iter() {
        match value {
            AttrValue::Data(map) if name == "data" => {
                for (key, value) in map {
                    pairs.push((data_attr_name(key), value.clone()));
                }
            }
            AttrValue::Data(_) => {
                log::debug!("忽略非 data 的映射属性：{}", name);
            }
            AttrValue::Flag(false) => {}
            AttrValue::Flag(true) => pairs.push((name.clone(), name.clone())),
            AttrValue::Number(number) => pairs.push((name.clone(), number.to_string())),
            AttrValue::Text(text) => pairs.push((name.clone(), text.clone())),
        }
    }

    pairs
}

fn write_attributes(out: &mut String, pairs: &[(String, String)]) {
    for (name, value) in pairs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
}

/// 渲染自闭合 `<img>`，`src` 固定放在最后。
pub fn img_tag(src: &str, options: &RenderOptions) -> String {
    let mut pairs: Vec<_> = attribute_pairs(options)
        .into_iter()
        .filter(|(name, _)| name != "src")
        .collect();
    pairs.push(("src".to_string(), src.to_string()));

    let mut out = String::from("<img");
    write_attributes(&mut out, &pairs);
    out.push_str(" />");
    out
}

/// 渲染 `<source>`。
pub(crate) fn source_tag(pairs: &[(String, String)]) -> String {
    let mut out = String::from("<source");
    write_attributes(&mut out, pairs);
    out.push('>');
    out
}

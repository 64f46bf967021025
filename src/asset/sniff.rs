//! # 内容类型嗅探
//!
//! 只看字节内容，不看文件名。
//! SVG 是文本格式，没有二进制魔数，用一张文本签名表识别；
//! 位图格式交给 `infer` 的魔数表。

/// SVG 的 MIME 类型。
pub const SVG_MIME: &str = "image/svg+xml";
/// 无法识别时的兜底类型。
pub const UNKNOWN_MIME: &str = "application/octet-stream";

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
/// 文本前缀签名：`(前缀, 还需在探测窗口内出现的片段)`，前缀不区分大小写。
///
/// 编辑器导出的 SVG 常以 XML 声明、注释或 `<!DOCTYPE svg ...>` 开头，
/// 这类序言之后必须紧跟（窗口内出现）`<svg` 才算 SVG，避免把内嵌 SVG 的 HTML 认错。
const SVG_SIGNATURES: &[(&[u8], &[u8])] = &[
    (b"<svg", b""),
    (b"<!DOCTYPE svg", b""),
    (b"<?xml", b"<svg"),
    (b"<!--", b"<svg"),
];
/// 序言之后最多向后查找的字节数。
const SVG_PROBE_BYTES: usize = 1024;

/// 按魔数判断 MIME 类型。
pub fn sniff(bytes: &[u8]) -> &'static str {
    if is_svg(bytes) {
        return SVG_MIME;
    }

    infer::get(bytes)
        .map(|kind| kind.mime_type())
        .unwrap_or(UNKNOWN_MIME)
}

/// 判断字节内容是否为 SVG 文本。
pub fn is_svg(bytes: &[u8]) -> bool {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let start = body
        .iter()
        .position(|byte| !byte.is_ascii_whitespace())
        .unwrap_or(body.len());
    let body = &body[start..];
    let window = &body[..body.len().min(SVG_PROBE_BYTES)];

    SVG_SIGNATURES.iter().any(|(prefix, needle)| {
        if !starts_with_ignore_case(body, prefix) {
            return false;
        }
        needle.is_empty() || window.windows(needle.len()).any(|chunk| chunk == *needle)
    })
}

fn starts_with_ignore_case(body: &[u8], prefix: &[u8]) -> bool {
    body.len() >= prefix.len() && body[..prefix.len()].eq_ignore_ascii_case(prefix)
}

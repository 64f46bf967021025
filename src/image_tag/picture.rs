//! # `<picture>` 组装
//!
//! ## 设计思路
//!
//! 给定已解析好的 URL，按固定顺序输出 `<source>`，最后放回退 `<img>`：
//!
//! ```text
//! <picture class="hero--picture lazyload">
//!   <!--[if IE 9]><video style="display: none;"><![endif]-->
//!   平板断点的格式 source（avif → webp）
//!   桌面断点的格式 source（avif → webp）
//!   平板断点的普通 source
//!   桌面断点的普通 source
//!   全局格式 source（注册顺序）
//!   <!--[if IE 9]></video><![endif]-->
//!   回退 <img>
//! </picture>
//! ```
//!
//! ## 实现思路
//!
//! - 懒加载时使用 `data-srcset`，由前端脚本替换为 `srcset`。
//! - 断点 source 带 `media="(min-width: <断点>)"`，格式 source 带 `type`。
//! - 组装器不做任何 I/O，也不读取配置；断点宽度由调用方传入。

use super::markup::{escape_attr, source_tag};
use super::options::{ImageFormat, Tier};

const IE9_OPEN: &str = r#"<!--[if IE 9]><video style="display: none;"><![endif]-->"#;
const IE9_CLOSE: &str = "<!--[if IE 9]></video><![endif]-->";
const LAZYLOAD_CLASS: &str = "lazyload";

/// 由回退标签的 class 推导 `<picture>` 的 class。
///
/// 每个 token 追加 `--picture` 后缀，`lazyload` 原样保留。
///
/// ```rust
/// use better_image_tag::image_tag::picture_class;
///
/// assert_eq!(picture_class("first second lazyload"), "first--picture second--picture lazyload");
/// ```
pub fn picture_class(class: &str) -> String {
    class
        .split_whitespace()
        .map(|token| {
            if token == LAZYLOAD_CLASS {
                token.to_string()
            } else {
                format!("{}--picture", token)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone)]
struct TierSources {
    media: String,
    base_url: Option<String>,
    formats: Vec<(ImageFormat, String)>,
}

/// `<picture>` 组装器。
#[derive(Debug, Clone, Default)]
pub struct PictureAssembler {
    lazy: bool,
    class: Option<String>,
    tablet: Option<TierSources>,
    desktop: Option<TierSources>,
    formats: Vec<(ImageFormat, String)>,
}

impl PictureAssembler {
    /// `lazy` 为真时 source 使用 `data-srcset`。
    pub fn new(lazy: bool) -> Self {
        Self {
            lazy,
            ..Self::default()
        }
    }

    /// 回退标签的 class（非空时推导为 `<picture>` 的 class）。
    pub fn class(mut self, class: Option<String>) -> Self {
        self.class = class
            .map(|class| picture_class(&class))
            .filter(|class| !class.is_empty());
        self
    }

    /// 声明一个断点；空的 `base_url` 视为未声明普通 source。
    pub fn breakpoint(
        mut self,
        tier: Tier,
        min_width: &str,
        base_url: &str,
        formats: Vec<(ImageFormat, String)>,
    ) -> Self {
        let sources = TierSources {
            media: format!("(min-width: {})", min_width),
            base_url: (!base_url.is_empty()).then(|| base_url.to_string()),
            formats,
        };
        match tier {
            Tier::Tablet => self.tablet = Some(sources),
            Tier::Desktop => self.desktop = Some(sources),
        }
        self
    }

    /// 追加一个全局格式 source。
    pub fn format(mut self, format: ImageFormat, url: impl Into<String>) -> Self {
        self.formats.push((format, url.into()));
        self
    }

    /// 输出完整的 `<picture>` 片段。
    pub fn assemble(&self, fallback: &str) -> String {
        let srcset = if self.lazy { "data-srcset" } else { "srcset" };
        let tiers = [self.tablet.as_ref(), self.desktop.as_ref()];
        let mut lines = vec![IE9_OPEN.to_string()];

        for tier in tiers.iter().flatten() {
            for (format, url) in &tier.formats {
                lines.push(source_tag(&[
                    (srcset.to_string(), url.clone()),
                    ("media".to_string(), tier.media.clone()),
                    ("type".to_string(), format.mime_type().to_string()),
                ]));
            }
        }
        for tier in tiers.iter().flatten() {
            if let Some(url) = &tier.base_url {
                lines.push(source_tag(&[
                    (srcset.to_string(), url.clone()),
                    ("media".to_string(), tier.media.clone()),
                ]));
            }
        }
        for (format, url) in &self.formats {
            lines.push(source_tag(&[
                (srcset.to_string(), url.clone()),
                ("type".to_string(), format.mime_type().to_string()),
            ]));
        }

        lines.push(IE9_CLOSE.to_string());
        lines.push(fallback.to_string());

        let open = match &self.class {
            Some(class) => format!(r#"<picture class="{}">"#, escape_attr(class)),
            None => "<picture>".to_string(),
        };
        let body: Vec<String> = lines.into_iter().map(|line| format!("  {}", line)).collect();

        format!("{}\n{}\n</picture>", open, body.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FALLBACK: &str = r#"<img src="/assets/hero.jpg" />"#;

    #[test]
    fn picture_class_suffixes_every_token_but_lazyload() {
        assert_eq!(picture_class("my-class"), "my-class--picture");
        assert_eq!(
            picture_class("  first   lazyload second "),
            "first--picture lazyload second--picture"
        );
        assert_eq!(picture_class(""), "");
    }

    #[test]
    fn single_global_format() {
        let html = PictureAssembler::new(false)
            .format(ImageFormat::Webp, "/assets/hero.webp")
            .assemble(FALLBACK);

        assert_eq!(
            html,
            [
                "<picture>",
                r#"  <!--[if IE 9]><video style="display: none;"><![endif]-->"#,
                r#"  <source srcset="/assets/hero.webp" type="image/webp">"#,
                "  <!--[if IE 9]></video><![endif]-->",
                r#"  <img src="/assets/hero.jpg" />"#,
                "</picture>",
            ]
            .join("\n")
        );
    }

    #[test]
    fn full_source_ordering() {
        let html = PictureAssembler::new(false)
            .class(Some("hero".to_string()))
            .format(ImageFormat::Avif, "/g.avif")
            .format(ImageFormat::Webp, "/g.webp")
            .breakpoint(
                Tier::Desktop,
                "1024px",
                "/d.jpg",
                vec![(ImageFormat::Avif, "/d.avif".into()), (ImageFormat::Webp, "/d.webp".into())],
            )
            .breakpoint(
                Tier::Tablet,
                "768px",
                "/t.jpg",
                vec![(ImageFormat::Webp, "/t.webp".into())],
            )
            .assemble(FALLBACK);

        let order = ["/t.webp", "/d.avif", "/d.webp", "/t.jpg", "/d.jpg", "/g.avif", "/g.webp"];
        let positions: Vec<usize> = order
            .iter()
            .map(|url| html.find(&format!("\"{}\"", url)).expect("source missing"))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", html);

        assert!(html.starts_with(r#"<picture class="hero--picture">"#));
        assert!(html.contains(r#"<source srcset="/t.webp" media="(min-width: 768px)" type="image/webp">"#));
        assert!(html.contains(r#"<source srcset="/d.jpg" media="(min-width: 1024px)">"#));
        assert!(html.contains(r#"<source srcset="/g.avif" type="image/avif">"#));
        assert_eq!(html.lines().nth(10), Some(r#"  <img src="/assets/hero.jpg" />"#));
    }

    #[test]
    fn lazy_sources_use_data_srcset() {
        let html = PictureAssembler::new(true)
            .format(ImageFormat::Webp, "/assets/hero.webp")
            .assemble(FALLBACK);

        assert!(html.contains(r#"<source data-srcset="/assets/hero.webp" type="image/webp">"#));
        assert!(!html.contains(" srcset="));
    }

    #[test]
    fn empty_breakpoint_base_url_only_emits_format_sources() {
        let assembler = PictureAssembler::new(false).breakpoint(
            Tier::Tablet,
            "768px",
            "",
            vec![(ImageFormat::Avif, "/t.avif".into())],
        );

        let html = assembler.assemble(FALLBACK);
        assert_eq!(html.matches("<source").count(), 1);
    }

    #[test]
    fn zero_sources_still_wraps_fallback() {
        let html = PictureAssembler::new(false).assemble(FALLBACK);

        assert!(html.starts_with("<picture>\n"));
        assert!(html.ends_with("\n</picture>"));
        assert!(!html.contains("<source"));
    }
}

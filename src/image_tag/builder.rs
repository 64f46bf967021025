//! # 图片标签构建器
//!
//! ## 设计思路
//!
//! 一次 `<img>` 调用对应一个 `ImageBuilder`：链式方法累积渲染意图（尺寸、懒加载、备选格式、
//! 断点、内联），最后由 `render` 一次性输出 HTML。构建器只借用 `ImageTagContext`，
//! 不读写任何全局状态。
//!
//! ## 实现思路
//!
//! 1. 构造时规范化协议相对地址（`//host` → `https://host`），检查 alt，登记选项简写的格式
//! 2. `lazy_load` 把当前图片替换成透明 GIF；此后再登记格式或断点返回 `EarlyLazyLoad`
//! 3. `with_size` / `inline` 涉及 I/O，为 async；传输失败就地降级，不中断渲染
//! 4. 渲染优先级：SVG 原文 → 普通 `<img>` → `<picture>`
//!
//! ```text
//! ImageBuilder::new ─► with_size ─► webp/avif/tablet_up/desktop_up ─► lazy_load ─► render
//!                                                                                 │
//!                          ┌──────────────────────┬───────────────────────────────┤
//!                          ▼                      ▼                               ▼
//!                  inject_svg_attributes       img_tag                    PictureAssembler
//! ```

use std::fmt;

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

use super::markup::img_tag;
use super::options::{
    AttrValue, BreakpointFormats, BreakpointSource, FormatSource, ImageFormat, RenderOptions, Tier,
};
use super::picture::PictureAssembler;
use super::svg::inject_svg_attributes;
use crate::asset::{is_inline_content, is_remote, is_svg};
use crate::context::ImageTagContext;
use crate::error::TagError;

/// 懒加载占位图：1×1 透明 GIF。
pub const TRANSPARENT_GIF: &str =
    "data:image/gif;base64,R0lGODlhAQABAAAAACH5BAEKAAEALAAAAAABAAEAAAICTAEAOw==";

const LAZYLOAD_CLASS: &str = "lazyload";

static FILE_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.[a-z0-9]{2,}$").expect("扩展名正则无效"));

/// 把引用的扩展名替换为目标格式；没有扩展名时直接追加。
///
/// 只改写路径的最后一段，query 与 fragment 原样保留；远程地址的主机名不参与匹配。
pub(crate) fn derive_format_url(reference: &str, format: ImageFormat) -> String {
    if is_remote(reference) {
        if let Ok(mut url) = reqwest::Url::parse(reference) {
            let path = replace_extension(url.path(), format);
            url.set_path(&path);
            return url.to_string();
        }
    }

    let split = reference
        .find(|c| c == '?' || c == '#')
        .unwrap_or(reference.len());
    let (path, suffix) = reference.split_at(split);
    format!("{}{}", replace_extension(path, format), suffix)
}

fn replace_extension(path: &str, format: ImageFormat) -> String {
    let extension = format!(".{}", format.extension());
    if FILE_EXTENSION.is_match(path) {
        FILE_EXTENSION
            .replace(path, NoExpand(&extension))
            .into_owned()
    } else {
        format!("{}{}", path, extension)
    }
}

fn normalize_reference(reference: String) -> String {
    match reference.strip_prefix("//") {
        Some(rest) => format!("https://{}", rest),
        None => reference,
    }
}

/// 单次渲染的图片标签构建器。
///
/// # 示例
/// ```rust
/// use better_image_tag::{ImageTagContext, RenderOptions, TagConfig};
///
/// let ctx = ImageTagContext::with_dev_assets(TagConfig::default())?;
/// let mut builder = ctx.image_builder("hero.jpg", RenderOptions::new().with("alt", "Hero"))?;
/// builder.webp()?.lazy_load();
///
/// let html = builder.render();
/// assert!(html.contains(r#"<source data-srcset="/assets/hero.webp" type="image/webp">"#));
/// # Ok::<(), better_image_tag::TagError>(())
/// ```
#[derive(Clone)]
pub struct ImageBuilder<'a> {
    ctx: &'a ImageTagContext,
    /// 规范化后的原始引用，尺寸探测始终基于它。
    source: String,
    /// 当前图片，懒加载与内联会改写它。
    image: String,
    options: RenderOptions,
    formats: Vec<FormatSource>,
    tablet: Option<BreakpointSource>,
    desktop: Option<BreakpointSource>,
}

impl<'a> ImageBuilder<'a> {
    pub fn new(
        ctx: &'a ImageTagContext,
        reference: impl Into<String>,
        options: RenderOptions,
    ) -> Result<Self, TagError> {
        let source = normalize_reference(reference.into());

        if ctx.config().require_alt_tags && options.is_blank("alt") {
            return Err(TagError::MissingAltTag(format!("{} is missing an alt tag", source)));
        }

        let mut builder = Self {
            ctx,
            image: source.clone(),
            source,
            options,
            formats: Vec::new(),
            tablet: None,
            desktop: None,
        };
        builder.register_shorthand_formats()?;

        Ok(builder)
    }

    /// 选项中的 `webp` / `avif` 简写：`true` 推导 URL，字符串为显式 URL，`false` 跳过。
    fn register_shorthand_formats(&mut self) -> Result<(), TagError> {
        let shorthand: Vec<(ImageFormat, AttrValue)> = self
            .options
            .iter()
            .filter_map(|(key, value)| {
                ImageFormat::from_option_key(key).map(|format| (format, value.clone()))
            })
            .collect();

        for (format, value) in shorthand {
            match value {
                AttrValue::Flag(true) => {
                    self.push_format(format, None)?;
                }
                AttrValue::Text(url) if !url.trim().is_empty() => {
                    self.push_format(format, Some(url))?;
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// 探测并写入 `width` / `height`。
    ///
    /// 任一 key 已存在（包括取值为 0）或关闭了尺寸探测时不做任何事；探测失败时保持不变。
    pub async fn with_size(&mut self) -> &mut Self {
        if self.options.contains("width") || self.options.contains("height") {
            return self;
        }
        if !self.ctx.config().sizing_enabled {
            return self;
        }

        if let Some(dimensions) = self.ctx.dimensions(&self.source).await {
            log::debug!(
                "📐 {} 尺寸 {}x{}",
                self.source,
                dimensions.width,
                dimensions.height
            );
            self.options.insert("width", dimensions.width);
            self.options.insert("height", dimensions.height);
        }

        self
    }

    /// 开启懒加载：追加 `lazyload` class，`data-src` 指向原路径，`src` 换成透明 GIF。
    ///
    /// 已经是占位图时不重复处理。
    pub fn lazy_load(&mut self) -> &mut Self {
        if self.is_lazy() {
            return self;
        }

        let original = self.ctx.resolver().image_path(&self.image);
        self.options.push_class(LAZYLOAD_CLASS);
        self.options.merge_data("src", original);
        self.image = TRANSPARENT_GIF.to_string();

        self
    }

    /// `enabled` 为 `false` 时等同于不调用。
    pub fn lazy_load_when(&mut self, enabled: bool) -> &mut Self {
        if enabled {
            self.lazy_load();
        }
        self
    }

    /// 追加 WebP source，URL 由当前图片替换扩展名得到。
    pub fn webp(&mut self) -> Result<&mut Self, TagError> {
        self.push_format(ImageFormat::Webp, None)
    }

    /// 追加 WebP source，使用显式 URL。
    pub fn webp_at(&mut self, url: impl Into<String>) -> Result<&mut Self, TagError> {
        self.push_format(ImageFormat::Webp, Some(url.into()))
    }

    /// 追加 AVIF source，URL 由当前图片替换扩展名得到。
    pub fn avif(&mut self) -> Result<&mut Self, TagError> {
        self.push_format(ImageFormat::Avif, None)
    }

    /// 追加 AVIF source，使用显式 URL。
    pub fn avif_at(&mut self, url: impl Into<String>) -> Result<&mut Self, TagError> {
        self.push_format(ImageFormat::Avif, Some(url.into()))
    }

    /// 平板及以上宽度的断点 source。
    pub fn tablet_up(
        &mut self,
        base_url: impl Into<String>,
        formats: BreakpointFormats,
    ) -> Result<&mut Self, TagError> {
        self.push_breakpoint(Tier::Tablet, base_url.into(), formats)
    }

    /// 桌面及以上宽度的断点 source。
    pub fn desktop_up(
        &mut self,
        base_url: impl Into<String>,
        formats: BreakpointFormats,
    ) -> Result<&mut Self, TagError> {
        self.push_breakpoint(Tier::Desktop, base_url.into(), formats)
    }

    /// 把当前图片替换为内联内容（data URI 或 SVG 原文）。
    ///
    /// 远程传输失败时保持原引用；资源缺失时返回 `FileNotFound`。
    pub async fn inline(&mut self) -> Result<&mut Self, TagError> {
        self.image = self.ctx.inline_data(&self.image).await?;
        Ok(self)
    }

    /// 输出最终 HTML。可重复调用，结果一致。
    pub fn render(&self) -> String {
        if is_svg(self.image.as_bytes()) {
            return inject_svg_attributes(&self.image, &self.options);
        }

        if !self.has_sources() {
            let src = self.ctx.resolver().image_path(&self.image);
            return img_tag(&src, &self.options.without_internal_keys());
        }

        self.to_picture_tag()
    }

    /// 强制输出 `<picture>`，即便没有任何额外 source。
    pub fn to_picture_tag(&self) -> String {
        let resolver = self.ctx.resolver();
        let config = self.ctx.config();
        let fallback_options = self.options.without_internal_keys();
        let fallback = img_tag(&resolver.image_path(&self.image), &fallback_options);

        let mut assembler = PictureAssembler::new(self.is_lazy()).class(fallback_options.class());

        for breakpoint in [&self.tablet, &self.desktop].into_iter().flatten() {
            let min_width = match breakpoint.tier {
                Tier::Tablet => &config.tablet_breakpoint,
                Tier::Desktop => &config.desktop_breakpoint,
            };
            let base_url = if breakpoint.base_url.is_empty() {
                String::new()
            } else {
                resolver.image_path(&breakpoint.base_url)
            };
            let formats = breakpoint
                .formats
                .entries()
                .map(|(format, url)| (format, resolver.image_path(url)))
                .collect();

            assembler = assembler.breakpoint(breakpoint.tier, min_width, &base_url, formats);
        }

        for source in &self.formats {
            assembler = assembler.format(source.format, resolver.image_path(&source.url));
        }

        assembler.assemble(&fallback)
    }

    /// 当前图片是否为懒加载占位图。
    pub fn is_lazy(&self) -> bool {
        self.image == TRANSPARENT_GIF
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn formats(&self) -> &[FormatSource] {
        &self.formats
    }

    pub fn breakpoint(&self, tier: Tier) -> Option<&BreakpointSource> {
        match tier {
            Tier::Tablet => self.tablet.as_ref(),
            Tier::Desktop => self.desktop.as_ref(),
        }
    }

    fn has_sources(&self) -> bool {
        !self.formats.is_empty() || self.tablet.is_some() || self.desktop.is_some()
    }

    /// 当前图片已是内联内容时，无法再从文件名推导任何 URL。
    fn ensure_not_inlined(&self, method: &str) -> Result<(), TagError> {
        if is_inline_content(&self.image) {
            return Err(TagError::EarlyLazyLoad(format!(
                "Run lazy_load as the last method in chain（{} 调用时图片已被替换）",
                method
            )));
        }
        Ok(())
    }

    fn push_format(&mut self, format: ImageFormat, url: Option<String>) -> Result<&mut Self, TagError> {
        self.ensure_not_inlined(format.extension())?;

        let url = url.unwrap_or_else(|| derive_format_url(&self.image, format));
        self.formats.push(FormatSource { format, url });

        Ok(self)
    }

    fn push_breakpoint(
        &mut self,
        tier: Tier,
        base_url: String,
        formats: BreakpointFormats,
    ) -> Result<&mut Self, TagError> {
        let method = match tier {
            Tier::Tablet => "tablet_up",
            Tier::Desktop => "desktop_up",
        };
        self.ensure_not_inlined(method)?;

        let source = Some(BreakpointSource {
            tier,
            base_url,
            formats,
        });
        match tier {
            Tier::Tablet => self.tablet = source,
            Tier::Desktop => self.desktop = source,
        }

        Ok(self)
    }
}

impl fmt::Display for ImageBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl fmt::Debug for ImageBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBuilder")
            .field("source", &self.source)
            .field("image", &self.image)
            .field("options", &self.options)
            .field("formats", &self.formats)
            .field("tablet", &self.tablet)
            .field("desktop", &self.desktop)
            .finish()
    }
}

//! # 模板入口
//!
//! ## 设计思路
//!
//! 模板只和 `ImageTagFacade` 打交道。门面根据 `TagGate` 一次性决定走增强构建器
//! 还是宿主的普通 `<img>`，两者都包装成 `ImageTag`，对外暴露同一组链式方法，
//! 调用点无需关心当前是否启用了增强渲染。
//!
//! ## 实现思路
//!
//! - `TagGate` 的判定顺序固定为 `disabled` → `unless` → `if`，第一个声明了的条件说了算。
//! - 普通分支的链式方法全部是空操作，`render` 直接输出 `<img>`（去掉内部选项）。

use std::fmt;

use super::builder::ImageBuilder;
use super::markup::img_tag;
use super::options::{BreakpointFormats, RenderOptions};
use crate::context::ImageTagContext;
use crate::error::TagError;

/// 增强渲染的开关条件。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagGate {
    /// 为真时总是关闭增强渲染，优先级最高。
    pub disabled: bool,
    /// 声明后，取值为真时关闭增强渲染。
    pub unless: Option<bool>,
    /// 声明后，取值为真时才开启增强渲染。
    pub only_if: Option<bool>,
}

impl TagGate {
    /// 是否允许增强渲染。
    pub fn allows(&self) -> bool {
        if self.disabled {
            return false;
        }
        if let Some(unless) = self.unless {
            return !unless;
        }
        if let Some(only_if) = self.only_if {
            return only_if;
        }
        true
    }
}

/// 宿主自带的普通 `<img>` 渲染。
#[derive(Debug, Clone)]
pub struct PlainImageTag<'a> {
    ctx: &'a ImageTagContext,
    image: String,
    options: RenderOptions,
}

impl<'a> PlainImageTag<'a> {
    pub fn new(ctx: &'a ImageTagContext, reference: impl Into<String>, options: RenderOptions) -> Self {
        Self {
            ctx,
            image: reference.into(),
            options,
        }
    }

    pub fn render(&self) -> String {
        let src = self.ctx.resolver().image_path(&self.image);
        img_tag(&src, &self.options.without_internal_keys())
    }
}

impl fmt::Display for PlainImageTag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// 门面返回的标签：增强构建器或普通 `<img>`。
#[derive(Debug, Clone)]
pub enum ImageTag<'a> {
    Better(ImageBuilder<'a>),
    Plain(PlainImageTag<'a>),
}

impl<'a> ImageTag<'a> {
    pub fn is_better(&self) -> bool {
        matches!(self, Self::Better(_))
    }

    pub async fn with_size(&mut self) -> &mut Self {
        if let Self::Better(builder) = self {
            builder.with_size().await;
        }
        self
    }

    pub fn lazy_load(&mut self) -> &mut Self {
        self.lazy_load_when(true)
    }

    pub fn lazy_load_when(&mut self, enabled: bool) -> &mut Self {
        if let Self::Better(builder) = self {
            builder.lazy_load_when(enabled);
        }
        self
    }

    pub fn webp(&mut self) -> Result<&mut Self, TagError> {
        if let Self::Better(builder) = self {
            builder.webp()?;
        }
        Ok(self)
    }

    pub fn webp_at(&mut self, url: impl Into<String>) -> Result<&mut Self, TagError> {
        if let Self::Better(builder) = self {
            builder.webp_at(url)?;
        }
        Ok(self)
    }

    pub fn avif(&mut self) -> Result<&mut Self, TagError> {
        if let Self::Better(builder) = self {
            builder.avif()?;
        }
        Ok(self)
    }

    pub fn avif_at(&mut self, url: impl Into<String>) -> Result<&mut Self, TagError> {
        if let Self::Better(builder) = self {
            builder.avif_at(url)?;
        }
        Ok(self)
    }

    pub fn tablet_up(
        &mut self,
        base_url: impl Into<String>,
        formats: BreakpointFormats,
    ) -> Result<&mut Self, TagError> {
        if let Self::Better(builder) = self {
            builder.tablet_up(base_url, formats)?;
        }
        Ok(self)
    }

    pub fn desktop_up(
        &mut self,
        base_url: impl Into<String>,
        formats: BreakpointFormats,
    ) -> Result<&mut Self, TagError> {
        if let Self::Better(builder) = self {
            builder.desktop_up(base_url, formats)?;
        }
        Ok(self)
    }

    pub async fn inline(&mut self) -> Result<&mut Self, TagError> {
        if let Self::Better(builder) = self {
            builder.inline().await?;
        }
        Ok(self)
    }

    pub fn render(&self) -> String {
        match self {
            Self::Better(builder) => builder.render(),
            Self::Plain(plain) => plain.render(),
        }
    }
}

impl fmt::Display for ImageTag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// 模板侧入口。
///
/// # 示例
/// ```rust
/// use better_image_tag::{ImageTagContext, ImageTagFacade, RenderOptions, TagConfig, TagGate};
///
/// let ctx = ImageTagContext::with_dev_assets(TagConfig::default())?;
/// let facade = ImageTagFacade::new(ctx, TagGate { disabled: true, ..TagGate::default() });
///
/// let mut tag = facade.image_tag("logo.png", RenderOptions::new())?;
/// tag.lazy_load().webp()?;
/// assert_eq!(tag.render(), r#"<img src="/assets/logo.png" />"#);
/// # Ok::<(), better_image_tag::TagError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ImageTagFacade {
    ctx: ImageTagContext,
    gate: TagGate,
}

impl ImageTagFacade {
    pub fn new(ctx: ImageTagContext, gate: TagGate) -> Self {
        log::debug!("🧩 图片标签门面已创建，增强渲染：{}", gate.allows());
        Self { ctx, gate }
    }

    /// 进程级配置 + 默认门控（总是允许）。
    pub fn from_global() -> Result<Self, TagError> {
        Ok(Self::new(ImageTagContext::from_global()?, TagGate::default()))
    }

    pub fn context(&self) -> &ImageTagContext {
        &self.ctx
    }

    pub fn gate(&self) -> TagGate {
        self.gate
    }

    /// 按门控条件创建标签。
    pub fn image_tag(
        &self,
        reference: impl Into<String>,
        options: RenderOptions,
    ) -> Result<ImageTag<'_>, TagError> {
        if self.gate.allows() {
            Ok(ImageTag::Better(self.ctx.image_builder(reference, options)?))
        } else {
            Ok(ImageTag::Plain(PlainImageTag::new(&self.ctx, reference, options)))
        }
    }

    /// 直接输出 `<picture>`；门控关闭时退化为普通 `<img>`。
    pub fn picture_tag(&self, reference: impl Into<String>, options: RenderOptions) -> Result<String, TagError> {
        match self.image_tag(reference, options)? {
            ImageTag::Better(builder) => Ok(builder.to_picture_tag()),
            ImageTag::Plain(plain) => Ok(plain.render()),
        }
    }

    /// 绕过增强渲染，直接输出宿主的普通 `<img>`。
    pub fn plain_tag(&self, reference: impl Into<String>, options: RenderOptions) -> String {
        PlainImageTag::new(&self.ctx, reference, options).render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TagConfig;
    use crate::context::test_support::fixture_context;

    #[test]
    fn gate_precedence_is_disabled_then_unless_then_if() {
        assert!(TagGate::default().allows());
        assert!(
            !TagGate {
                disabled: true,
                unless: Some(false),
                only_if: Some(true),
            }
            .allows()
        );
        assert!(
            TagGate {
                disabled: false,
                unless: Some(false),
                only_if: Some(false),
            }
            .allows()
        );
        assert!(
            !TagGate {
                disabled: false,
                unless: Some(true),
                only_if: Some(true),
            }
            .allows()
        );
        assert!(
            !TagGate {
                only_if: Some(false),
                ..TagGate::default()
            }
            .allows()
        );
    }

    #[test]
    fn allowed_gate_routes_through_builder() {
        let (ctx, _dir) = fixture_context(TagConfig::default());
        let facade = ImageTagFacade::new(ctx, TagGate::default());

        let mut tag = facade
            .image_tag("1x1.gif", RenderOptions::new())
            .expect("image_tag failed");
        tag.webp().expect("webp failed");

        assert!(tag.is_better());
        assert!(tag.render().contains(r#"<source srcset="/assets/1x1.webp" type="image/webp">"#));
    }

    #[tokio::test]
    async fn blocked_gate_renders_plain_tag_and_ignores_chain() {
        let (ctx, _dir) = fixture_context(TagConfig::default());
        let facade = ImageTagFacade::new(
            ctx,
            TagGate {
                unless: Some(true),
                ..TagGate::default()
            },
        );

        let mut tag = facade
            .image_tag("1x1.gif", RenderOptions::new().with("webp", true).with("alt", "dot"))
            .expect("image_tag failed");
        tag.with_size().await.lazy_load().avif().expect("avif failed");
        tag.inline().await.expect("inline failed");

        assert!(!tag.is_better());
        assert_eq!(tag.to_string(), r#"<img alt="dot" src="/assets/1x1.gif" />"#);
    }

    #[test]
    fn picture_tag_forces_picture_markup() {
        let (ctx, _dir) = fixture_context(TagConfig::default());
        let facade = ImageTagFacade::new(ctx, TagGate::default());

        let html = facade
            .picture_tag("1x1.gif", RenderOptions::new().with("class", "thumb"))
            .expect("picture_tag failed");

        assert!(html.starts_with(r#"<picture class="thumb--picture">"#));
        assert!(html.contains(r#"<img class="thumb" src="/assets/1x1.gif" />"#));
    }

    #[test]
    fn plain_tag_bypasses_gate_and_alt_requirement() {
        let config = TagConfig {
            require_alt_tags: true,
            ..TagConfig::default()
        };
        let (ctx, _dir) = fixture_context(config);
        let facade = ImageTagFacade::new(ctx, TagGate::default());

        assert!(matches!(
            facade.image_tag("1x1.gif", RenderOptions::new()),
            Err(TagError::MissingAltTag(_))
        ));
        assert_eq!(
            facade.plain_tag("1x1.gif", RenderOptions::new()),
            r#"<img src="/assets/1x1.gif" />"#
        );
    }
}

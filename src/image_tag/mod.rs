//! # 图片标签核心（image_tag）
//!
//! 模块划分：
//!
//! ```text
//! facade.rs   ── 门控 + ImageTag（增强 / 普通两种变体）
//!   │
//! builder.rs  ── ImageBuilder：链式累积状态，render 选择输出路径
//!   ├─ svg.rs      SVG 根标签属性注入
//!   ├─ markup.rs   <img> / <source> 拼装与转义
//!   └─ picture.rs  <picture> 组装与 source 排序
//! options.rs  ── RenderOptions / FormatSource / BreakpointSource
//! ```
//!
//! 资源解析、尺寸探测、内联等 I/O 都在 `crate::asset`，这里只负责状态与标记。

mod builder;
mod facade;
mod markup;
mod options;
mod picture;
mod svg;

pub use builder::{ImageBuilder, TRANSPARENT_GIF};
pub use facade::{ImageTag, ImageTagFacade, PlainImageTag, TagGate};
pub use markup::{escape_attr, img_tag};
pub use options::{
    AttrValue, BreakpointFormats, BreakpointSource, FormatSource, ImageFormat, RenderOptions, Tier,
};
pub use picture::{PictureAssembler, picture_class};
pub use svg::inject_svg_attributes;

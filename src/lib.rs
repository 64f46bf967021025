//! # 增强图片标签：库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   模板 / 视图层                          │
//! │                                                          │
//! │  facade.image_tag("hero.jpg", options)?                  │
//! │        .webp()?.lazy_load().render()                     │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ Result<String, TagError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            后端 (Rust)                           │
//! │                                                          │
//! │  ┌─ error ────── TagError (统一错误类型)                  │
//! │  ├─ config ───── TagConfig + 进程级配置快照               │
//! │  ├─ context ──── ImageTagContext (配置 + 解析器 + 缓存)   │
//! │  │                                                       │
//! │  ├─ image_tag ── 构建器 / <picture> 组装 / SVG 注入 / 门面 │
//! │  │                                                       │
//! │  ├─ asset ────── 资源解析 · 远程下载 · 嗅探 · 尺寸 · 内联 │
//! │  └─ cache ────── 记忆化查找 (lru)                         │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `TagError` |
//! | [`config`] | 配置项、默认值、校验与进程级 `configure` |
//! | [`context`] | 一次渲染所需的可注入状态 |
//! | [`image_tag`] | `ImageBuilder`、`PictureAssembler`、SVG 属性注入、模板门面 |
//! | [`asset`] | 引用解析（远程 / 开发目录 / 编译清单）、内容嗅探、尺寸探测、内联 |
//! | [`cache`] | 可替换后端的记忆化缓存，尺寸与内联结果共用 |

pub mod asset;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod image_tag;

pub use config::{TagConfig, configuration, configure};
pub use context::ImageTagContext;
pub use error::TagError;
pub use image_tag::{
    BreakpointFormats, ImageBuilder, ImageTag, ImageTagFacade, RenderOptions, TRANSPARENT_GIF,
    TagGate,
};

//! # 资源模块（asset）
//!
//! 负责“引用 → 字节 / 位置 → 类型 / 尺寸 / 内联内容”这一侧的全部 I/O：
//!
//! ```text
//! ImageBuilder::with_size ─┐            ┌─ store.rs   （开发目录 / 编译清单）
//!                          ├─ resolver ─┤
//! ImageBuilder::inline ────┘            └─ fetch.rs   （远程 HTTP）
//!                              │
//!                              ├─ sniff.rs   （魔数嗅探）
//!                              ├─ probe.rs   （头部尺寸探测）
//!                              └─ inline.rs  （data URI / SVG 原文）
//! ```

mod fetch;
mod inline;
mod probe;
mod resolver;
mod sniff;
mod store;

pub use fetch::RemoteFetcher;
pub use probe::{Dimensions, probe_dimensions};
pub use resolver::{AssetLocation, AssetResolver, is_data_uri, is_inline_content, is_remote};
pub use sniff::{SVG_MIME, UNKNOWN_MIME, is_svg, sniff};
pub use store::{AssetStore, DevAssetStore, ManifestAssetStore};

#[cfg(test)]
pub(crate) use fetch::test_server;

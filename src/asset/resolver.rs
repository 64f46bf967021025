//! # 资源解析
//!
//! ## 设计思路
//!
//! 把“图片引用”统一解析为字节或位置，屏蔽三种后端：
//! 远程 URL（走 HTTP）、未编译资源目录、编译资源清单（后两者由 `AssetStore` 提供）。
//!
//! ## 实现思路
//!
//! - 引用分类只看前缀：`http://` / `https://` 为远程，`data:` 为内联数据，`/` 开头为绝对路径。
//! - `image_path` 对应宿主的同名 helper：远程、内联、绝对路径原样返回，逻辑名交给 store。

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;

use super::fetch::RemoteFetcher;
use super::store::AssetStore;
use super::sniff;
use crate::error::TagError;

/// 引用解析结果：远程地址或本地文件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLocation {
    Remote(String),
    Local(PathBuf),
}

/// 是否为远程 URL。
pub fn is_remote(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// 是否为 data URI。
pub fn is_data_uri(reference: &str) -> bool {
    reference.starts_with("data:")
}

/// 是否已经是内联内容（data URI 或 SVG 原文），不再指向任何资源。
pub fn is_inline_content(reference: &str) -> bool {
    is_data_uri(reference) || sniff::is_svg(reference.as_bytes())
}

/// 资源解析器。
#[derive(Clone)]
pub struct AssetResolver {
    store: Arc<dyn AssetStore>,
    fetcher: RemoteFetcher,
}

impl AssetResolver {
    pub fn new(store: Arc<dyn AssetStore>, fetcher: RemoteFetcher) -> Self {
        Self { store, fetcher }
    }

    /// 引用在页面中的公开路径。
    pub fn image_path(&self, reference: &str) -> String {
        if is_remote(reference) || is_inline_content(reference) || reference.starts_with('/') {
            return reference.to_string();
        }

        self.store.public_path(reference)
    }

    /// 引用指向的位置。
    pub fn location(&self, reference: &str) -> Result<AssetLocation, TagError> {
        if is_remote(reference) {
            return Ok(AssetLocation::Remote(reference.to_string()));
        }
        if is_inline_content(reference) {
            return Err(TagError::InvalidFormat("内联内容没有对应的资源位置".to_string()));
        }

        self.store.lookup(reference).map(AssetLocation::Local)
    }

    /// 读取引用对应的全部字节。
    pub async fn bytes(&self, reference: &str) -> Result<Bytes, TagError> {
        match self.location(reference)? {
            AssetLocation::Remote(url) => self.fetcher.fetch(&url).await,
            AssetLocation::Local(path) => {
                let bytes = tokio::fs::read(&path).await.map_err(|e| {
                    TagError::FileSystem(format!("无法读取图片文件 {}：{}", path.display(), e))
                })?;
                Ok(Bytes::from(bytes))
            }
        }
    }

    /// 读取引用内容直到 `parse` 得出结果。
    ///
    /// 远程资源只下载到能解析为止；本地文件整体读取后解析一次。
    pub async fn read_until<T, F>(&self, reference: &str, mut parse: F) -> Result<Option<T>, TagError>
    where
        F: FnMut(&[u8]) -> Option<T>,
    {
        match self.location(reference)? {
            AssetLocation::Remote(url) => self.fetcher.fetch_prefix(&url, parse).await,
            AssetLocation::Local(_) => {
                let bytes = self.bytes(reference).await?;
                Ok(parse(&bytes))
            }
        }
    }
}

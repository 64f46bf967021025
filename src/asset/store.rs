//! # 资源存储适配
//!
//! ## 设计思路
//!
//! 逻辑资源名（如 `1x1.gif`）到磁盘文件、到对外 URL 的映射属于宿主的资源管线。
//! 这里用 `AssetStore` 抽象出两种后端：
//! - `DevAssetStore`：开发/测试环境，资源未编译，直接在图片目录下按名字查找。
//! - `ManifestAssetStore`：生产环境，按编译清单把逻辑名映射到带摘要的文件名。
//!
//! ## 实现思路
//!
//! 逻辑名只允许普通路径分量，拒绝绝对路径与 `..`，避免读到资源目录之外的文件。

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use crate::error::TagError;

/// 宿主资源管线接口。
pub trait AssetStore: Send + Sync {
    /// 逻辑名 → 本地文件路径。
    fn lookup(&self, name: &str) -> Result<PathBuf, TagError>;

    /// 逻辑名 → 页面中引用的公开路径。
    fn public_path(&self, name: &str) -> String;
}

fn is_plain_relative(name: &str) -> bool {
    !name.is_empty()
        && Path::new(name)
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

fn join_prefix(prefix: &str, name: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), name.trim_start_matches('/'))
}

/// 未编译资源目录。
#[derive(Debug, Clone)]
pub struct DevAssetStore {
    images_path: PathBuf,
    prefix: String,
}

impl DevAssetStore {
    pub fn new(images_path: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            images_path: images_path.into(),
            prefix: prefix.into(),
        }
    }
}

impl AssetStore for DevAssetStore {
    fn lookup(&self, name: &str) -> Result<PathBuf, TagError> {
        if !is_plain_relative(name) {
            return Err(TagError::FileNotFound(format!("非法资源名：{}", name)));
        }

        let path = self.images_path.join(name);
        if !path.is_file() {
            return Err(TagError::FileNotFound(format!(
                "Not found in asset path: {}",
                name
            )));
        }

        Ok(path)
    }

    fn public_path(&self, name: &str) -> String {
        join_prefix(&self.prefix, name)
    }
}

#[derive(Debug, Deserialize)]
struct ManifestFile {
    #[serde(default)]
    assets: HashMap<String, String>,
}

/// 编译资源清单。
#[derive(Debug, Clone)]
pub struct ManifestAssetStore {
    directory: PathBuf,
    assets: HashMap<String, String>,
    prefix: String,
}

impl ManifestAssetStore {
    pub fn new(
        directory: impl Into<PathBuf>,
        assets: HashMap<String, String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            directory: directory.into(),
            assets,
            prefix: prefix.into(),
        }
    }

    /// 读取清单 JSON（`{"assets": {"logical": "digested"}}`），目录取清单所在目录。
    pub fn load(manifest_path: impl AsRef<Path>, prefix: impl Into<String>) -> Result<Self, TagError> {
        let manifest_path = manifest_path.as_ref();
        let content = fs::read_to_string(manifest_path).map_err(|e| {
            TagError::FileSystem(format!("无法读取资源清单 {}：{}", manifest_path.display(), e))
        })?;
        let manifest: ManifestFile = serde_json::from_str(&content)
            .map_err(|e| TagError::Config(format!("资源清单格式错误：{}", e)))?;

        let directory = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        log::info!(
            "📦 已加载资源清单 - {} 项，目录: {}",
            manifest.assets.len(),
            directory.display()
        );

        Ok(Self::new(directory, manifest.assets, prefix))
    }
}

impl AssetStore for ManifestAssetStore {
    fn lookup(&self, name: &str) -> Result<PathBuf, TagError> {
        let file = self.assets.get(name).ok_or_else(|| {
            TagError::FileNotFound(format!("Not found in asset manifest: {}", name))
        })?;

        Ok(self.directory.join(file))
    }

    fn public_path(&self, name: &str) -> String {
        let file = self.assets.get(name).map(String::as_str).unwrap_or(name);
        join_prefix(&self.prefix, file)
    }
}

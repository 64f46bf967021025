//! # 渲染上下文（可注入状态）
//!
//! ## 设计思路
//!
//! `ImageTagContext` 把一次渲染需要的协作者打包在一起：配置快照、资源解析器、缓存。
//! 构建器只借用上下文，不持有全局状态，测试可以创建彼此隔离的实例。
//!
//! ## 实现思路
//!
//! - `from_global` 读取进程级配置快照，适合普通调用点。
//! - `with_dev_assets` / `with_manifest` 对应未编译与已编译两种资源后端。
//! - 这三个构造函数都挂在进程级共享缓存上；需要隔离的缓存时用 `new` 传入。
//! - 尺寸探测（`probe.rs`）与内联（`inline.rs`）以 `impl ImageTagContext` 的形式就近实现。

use std::path::Path;
use std::sync::Arc;

use crate::asset::{AssetResolver, AssetStore, DevAssetStore, ManifestAssetStore, RemoteFetcher};
use crate::cache::Cache;
use crate::config::{self, TagConfig};
use crate::error::TagError;
use crate::image_tag::{ImageBuilder, RenderOptions};

/// 图片标签渲染上下文。
#[derive(Clone)]
pub struct ImageTagContext {
    config: TagConfig,
    resolver: AssetResolver,
    cache: Cache,
}

impl ImageTagContext {
    /// 使用自定义资源后端与缓存创建上下文。
    pub fn new(config: TagConfig, store: Arc<dyn AssetStore>, cache: Cache) -> Result<Self, TagError> {
        config.validate()?;
        let fetcher = RemoteFetcher::new(&config)?;

        Ok(Self {
            resolver: AssetResolver::new(store, fetcher),
            config,
            cache,
        })
    }

    /// 未编译资源目录 + 进程级共享缓存。
    ///
    /// # 示例
    /// ```rust
    /// use better_image_tag::{ImageTagContext, RenderOptions, TagConfig};
    ///
    /// let ctx = ImageTagContext::with_dev_assets(TagConfig::default())?;
    /// let html = ctx.image_builder("1x1.gif", RenderOptions::new())?.render();
    /// assert_eq!(html, r#"<img src="/assets/1x1.gif" />"#);
    /// # Ok::<(), better_image_tag::TagError>(())
    /// ```
    pub fn with_dev_assets(config: TagConfig) -> Result<Self, TagError> {
        let store = DevAssetStore::new(&config.images_path, &config.asset_prefix);
        Self::new(config, Arc::new(store), Cache::shared())
    }

    /// 编译资源清单 + 进程级共享缓存。
    pub fn with_manifest(config: TagConfig, manifest_path: impl AsRef<Path>) -> Result<Self, TagError> {
        let store = ManifestAssetStore::load(manifest_path, &config.asset_prefix)?;
        Self::new(config, Arc::new(store), Cache::shared())
    }

    /// 使用进程级配置快照。
    pub fn from_global() -> Result<Self, TagError> {
        Self::with_dev_assets(config::configuration())
    }

    pub fn config(&self) -> &TagConfig {
        &self.config
    }

    pub fn resolver(&self) -> &AssetResolver {
        &self.resolver
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// 为一次 `<img>` 调用创建构建器。
    pub fn image_builder(
        &self,
        reference: impl Into<String>,
        options: RenderOptions,
    ) -> Result<ImageBuilder<'_>, TagError> {
        ImageBuilder::new(self, reference, options)
    }
}

impl std::fmt::Debug for ImageTagContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageTagContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

//! # 配置模块
//!
//! ## 设计思路
//!
//! 所有可调策略集中在 `TagConfig`：功能开关（alt 校验 / 内联 / 尺寸探测）、缓存开关、
//! 资源目录、响应式断点，以及远程抓取的超时与体积上限。
//!
//! ## 实现思路
//!
//! - `Default` 提供开箱即用的配置。
//! - 进程级实例放在 `Lazy<RwLock<TagConfig>>` 中，`configure` 先校验再整体替换，
//!   `configuration` 返回快照；构建器只读取快照，永不修改配置。
//! - 支持从 JSON 加载（缺省字段回落到默认值），方便宿主从设置文件注入。

use std::sync::RwLock;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::TagError;

/// 图片标签配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagConfig {
    /// 是否强制要求 alt 属性。
    pub require_alt_tags: bool,
    /// 是否允许 `inline()` 真正执行内联。
    pub inlining_enabled: bool,
    /// 是否允许 `with_size()` 探测尺寸。
    pub sizing_enabled: bool,
    /// 尺寸探测结果是否写入缓存。
    pub cache_sizing_enabled: bool,
    /// 内联结果是否写入缓存。
    pub cache_inlining_enabled: bool,
    /// 未编译资源所在目录。
    pub images_path: String,
    /// 资源对外访问前缀（对应宿主的 `image_path`）。
    pub asset_prefix: String,
    /// 平板断点（`min-width` 取值）。
    pub tablet_breakpoint: String,
    /// 桌面断点（`min-width` 取值）。
    pub desktop_breakpoint: String,
    /// 远程抓取总超时（秒）。
    pub download_timeout: u64,
    /// 建立连接超时（秒）。
    pub connect_timeout: u64,
    /// 单个资源允许的最大体积（字节）。
    pub max_file_size: u64,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            require_alt_tags: false,
            inlining_enabled: true,
            sizing_enabled: true,
            cache_sizing_enabled: false,
            cache_inlining_enabled: false,
            images_path: "app/assets/images".to_string(),
            asset_prefix: "/assets".to_string(),
            tablet_breakpoint: "768px".to_string(),
            desktop_breakpoint: "1024px".to_string(),
            download_timeout: 30,
            connect_timeout: 8,
            max_file_size: 10 * 1024 * 1024,
        }
    }
}

impl TagConfig {
    /// 从 JSON 文本加载配置，缺省字段使用默认值。
    ///
    /// # 示例
    /// ```rust
    /// use better_image_tag::TagConfig;
    ///
    /// let config = TagConfig::from_json_str(r#"{ "require_alt_tags": true }"#)?;
    /// assert!(config.require_alt_tags);
    /// assert!(config.inlining_enabled);
    /// # Ok::<(), better_image_tag::TagError>(())
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, TagError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 校验取值范围。
    pub fn validate(&self) -> Result<(), TagError> {
        if self.tablet_breakpoint.trim().is_empty() || self.desktop_breakpoint.trim().is_empty() {
            return Err(TagError::Config("断点不能为空".to_string()));
        }
        if self.download_timeout == 0 || self.connect_timeout == 0 {
            return Err(TagError::Config("超时时间必须大于 0".to_string()));
        }
        if self.max_file_size == 0 {
            return Err(TagError::Config("max_file_size 必须大于 0".to_string()));
        }
        Ok(())
    }
}

static CONFIGURATION: Lazy<RwLock<TagConfig>> = Lazy::new(|| RwLock::new(TagConfig::default()));

/// 读取进程级配置快照。
///
/// 锁中毒时回落到默认配置，渲染不因此中断。
pub fn configuration() -> TagConfig {
    match CONFIGURATION.read() {
        Ok(guard) => guard.clone(),
        Err(_) => {
            log::warn!("⚠️ 配置读取锁已中毒，使用默认配置");
            TagConfig::default()
        }
    }
}

/// 修改进程级配置。
///
/// 整个读改写过程持有写锁：闭包作用在副本上，校验通过后才整体替换，
/// 并发调用不会互相覆盖。
///
/// # 示例
/// ```rust
/// better_image_tag::configure(|config| config.cache_sizing_enabled = true)?;
/// assert!(better_image_tag::configuration().cache_sizing_enabled);
/// # better_image_tag::configure(|config| config.cache_sizing_enabled = false)?;
/// # Ok::<(), better_image_tag::TagError>(())
/// ```
pub fn configure<F>(update: F) -> Result<(), TagError>
where
    F: FnOnce(&mut TagConfig),
{
    let mut guard = CONFIGURATION
        .write()
        .map_err(|_| TagError::Config("配置写入锁已中毒".to_string()))?;

    let mut next = guard.clone();
    update(&mut next);
    next.validate()?;
    *guard = next;

    log::info!(
        "⚙️ 已更新图片标签配置（require_alt={}, inline={}, sizing={}, cache_sizing={}, cache_inline={}）",
        guard.require_alt_tags,
        guard.inlining_enabled,
        guard.sizing_enabled,
        guard.cache_sizing_enabled,
        guard.cache_inlining_enabled
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = TagConfig::default();

        assert!(!config.require_alt_tags);
        assert!(config.inlining_enabled);
        assert!(config.sizing_enabled);
        assert!(!config.cache_sizing_enabled);
        assert!(!config.cache_inlining_enabled);
        assert_eq!(config.tablet_breakpoint, "768px");
        assert_eq!(config.desktop_breakpoint, "1024px");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = TagConfig::from_json_str(r#"{ "desktop_breakpoint": "1200px" }"#)
            .expect("partial config should load");

        assert_eq!(config.desktop_breakpoint, "1200px");
        assert_eq!(config.tablet_breakpoint, "768px");
        assert_eq!(config.asset_prefix, "/assets");
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            TagConfig::from_json_str(r#"{ "tablet_breakpoint": " " }"#),
            Err(TagError::Config(_))
        ));
        assert!(matches!(
            TagConfig::from_json_str(r#"{ "connect_timeout": 0 }"#),
            Err(TagError::Config(_))
        ));
        assert!(matches!(
            TagConfig::from_json_str("not json"),
            Err(TagError::Config(_))
        ));
    }

    #[test]
    fn configure_rejects_invalid_update_and_keeps_previous() {
        let before = configuration();

        let result = configure(|config| config.max_file_size = 0);

        assert!(matches!(result, Err(TagError::Config(_))));
        assert_eq!(configuration().max_file_size, before.max_file_size);
    }

    #[test]
    fn concurrent_configure_calls_are_not_lost() {
        let before = configuration().download_timeout;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| {
                    for _ in 0..25 {
                        configure(|config| config.download_timeout += 1).expect("configure failed");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("configure thread panicked");
        }

        assert_eq!(configuration().download_timeout, before + 200);
        configure(|config| config.download_timeout = before).expect("reset failed");
    }
}

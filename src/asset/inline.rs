//! # 内联模块
//!
//! ## 设计思路
//!
//! 把图片内容直接嵌进页面：位图编码为 `data:<mime>;base64,...`，SVG 返回原文，
//! 以便后续由 `svg` 模块注入属性。
//!
//! ## 实现思路
//!
//! 1. 未开启内联：原样返回引用，不做任何 I/O
//! 2. 已经是内联内容：原样返回
//! 3. 以 `inlineData:<引用>` 为 key 记忆化
//! 4. 传输类失败（连接、TLS、超时、非 2xx、体积超限）回退到原始引用；清单缺失等错误向上返回

use base64::{Engine as _, engine::general_purpose};

use super::resolver::is_inline_content;
use super::sniff;
use crate::cache::INLINE_CACHE_PREFIX;
use crate::context::ImageTagContext;
use crate::error::TagError;

impl ImageTagContext {
    /// 返回引用的内联形式。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use better_image_tag::{ImageTagContext, TagConfig};
    ///
    /// # async fn demo() -> Result<(), better_image_tag::TagError> {
    /// let ctx = ImageTagContext::with_dev_assets(TagConfig::default())?;
    /// let data = ctx.inline_data("1x1.gif").await?;
    /// assert!(data.starts_with("data:image/gif;base64,"));
    /// # Ok(())
    /// # }
    /// ```
    pub async fn inline_data(&self, reference: &str) -> Result<String, TagError> {
        if !self.config().inlining_enabled || is_inline_content(reference) {
            return Ok(reference.to_string());
        }

        let key = format!("{}{}", INLINE_CACHE_PREFIX, reference);
        let result = self
            .cache()
            .fetch(&key, self.config().cache_inlining_enabled, || self.encode_inline(reference))
            .await;

        match result {
            Ok(data) => Ok(data),
            Err(err) if err.is_transport() || matches!(err, TagError::ResourceLimit(_)) => {
                log::warn!("⚠️ 内联失败，回退原始引用：{}", err);
                Ok(reference.to_string())
            }
            Err(err) => Err(err),
        }
    }

    /// 清空所有内联缓存，返回被删除的 key。
    pub fn clear_inline_cache(&self) -> Vec<String> {
        let deleted = self.cache().delete_prefixed(INLINE_CACHE_PREFIX);
        log::info!("🧹 已清理内联缓存 {} 项", deleted.len());
        deleted
    }

    async fn encode_inline(&self, reference: &str) -> Result<String, TagError> {
        let bytes = self.resolver().bytes(reference).await?;
        let content_type = sniff::sniff(&bytes);

        if content_type == sniff::SVG_MIME {
            return Ok(String::from_utf8_lossy(&bytes).into_owned());
        }

        Ok(format!(
            "data:{};base64,{}",
            content_type,
            general_purpose::STANDARD.encode(&bytes)
        ))
    }
}

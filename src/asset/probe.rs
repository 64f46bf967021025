//! # 尺寸探测
//!
//! 只解析图片头部拿到宽高，不做完整解码，也从不重新编码像素。
//! 远程图片边下载边尝试解析，拿到宽高即断开，不受内联体积上限约束。

use std::io::Cursor;

use image::ImageReader;
use serde::{Deserialize, Serialize};

use crate::cache::SIZE_CACHE_PREFIX;
use crate::context::ImageTagContext;

/// 图片像素尺寸。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// 从内存字节读取图片宽高。
///
/// 格式无法识别（含 SVG）或头部损坏时返回 `None`。
pub fn probe_dimensions(bytes: &[u8]) -> Option<Dimensions> {
    match header_dimensions(bytes) {
        Ok(dimensions) => dimensions,
        Err(err) => {
            log::debug!("无法读取图片尺寸：{}", err);
            None
        }
    }
}

/// 头部不完整时也只返回 `None`，供流式探测反复调用。
fn header_dimensions(bytes: &[u8]) -> Result<Option<Dimensions>, image::ImageError> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    if reader.format().is_none() {
        return Ok(None);
    }

    let (width, height) = reader.into_dimensions()?;
    Ok(Some(Dimensions { width, height }))
}

impl ImageTagContext {
    /// 探测引用对应图片的宽高。
    ///
    /// 以 `imageTag:withSize:<引用>` 为 key 记忆化；任何失败（远程不可达、清单缺失、
    /// 格式无法识别）都视为“没有尺寸”，不会中断渲染。
    pub async fn dimensions(&self, reference: &str) -> Option<Dimensions> {
        let key = format!("{}{}", SIZE_CACHE_PREFIX, reference);
        let result = self
            .cache()
            .fetch(&key, self.config().cache_sizing_enabled, || async {
                self.resolver()
                    .read_until(reference, |bytes| header_dimensions(bytes).ok().flatten())
                    .await
            })
            .await;

        match result {
            Ok(dimensions) => dimensions,
            Err(err) => {
                log::warn!("⚠️ 尺寸探测失败，跳过 width/height：{}", err);
                None
            }
        }
    }
}

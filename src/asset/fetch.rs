//! # 远程抓取模块
//!
//! ## 设计思路
//!
//! 远程图片只在两个地方用到：尺寸探测与内联。前者只需要文件头，后者需要完整内容，
//! 分别对应 `fetch_prefix` 与 `fetch`。两者都要求“失败可降级”，
//! 因此这里把所有 reqwest 错误统一映射为 `TagError::Network` / `TagError::Timeout`，
//! 由上层按 `is_transport` 判断是否回退到原始引用。
//!
//! ## 实现思路
//!
//! - 复用一个 `reqwest::Client`，超时参数取自配置快照。
//! - `fetch` 先看 `Content-Length` 尽早拒绝超大资源，再流式读取并累计体积。
//! - `fetch_prefix` 每收到一块就尝试解析，成功即断开连接；不受 `max_file_size` 约束，
//!   只用独立的头部预算 `HEADER_PROBE_LIMIT` 兜底。
//! - 日志中的 URL 去掉 query 与 fragment。

use std::time::Duration;

use bytes::Bytes;

use crate::config::TagConfig;
use crate::error::TagError;

const BUFFER_INITIAL_CAPACITY: usize = 16 * 1024;
const MAX_REDIRECTS: usize = 5;
/// 头部探测最多读取的字节数（JPEG 的 EXIF / ICC 段可能较大）。
const HEADER_PROBE_LIMIT: usize = 4 * 1024 * 1024;

/// 远程资源抓取器。
#[derive(Debug, Clone)]
pub struct RemoteFetcher {
    client: reqwest::Client,
    download_timeout: u64,
    max_file_size: u64,
}

impl RemoteFetcher {
    pub fn new(config: &TagConfig) -> Result<Self, TagError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.download_timeout))
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| TagError::Network(format!("无法创建 HTTP 客户端：{}", e)))?;

        Ok(Self {
            client,
            download_timeout: config.download_timeout,
            max_file_size: config.max_file_size,
        })
    }

    /// 下载远程资源的全部字节。
    pub async fn fetch(&self, url: &str) -> Result<Bytes, TagError> {
        let mut response = self.send(url).await?;

        let total_len = response.content_length();
        if let Some(size) = total_len {
            if size > self.max_file_size {
                return Err(TagError::ResourceLimit(format!(
                    "文件过大：{:.2} MB（限制：{:.2} MB）",
                    size as f64 / 1024.0 / 1024.0,
                    self.max_file_size as f64 / 1024.0 / 1024.0
                )));
            }
        }

        let initial_capacity = total_len
            .map(|len| len.min(self.max_file_size) as usize)
            .filter(|len| *len > 0)
            .unwrap_or(BUFFER_INITIAL_CAPACITY);
        let mut buffer = Vec::with_capacity(initial_capacity);

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.map_reqwest_error(e, url))?
        {
            if (buffer.len() + chunk.len()) as u64 > self.max_file_size {
                return Err(TagError::ResourceLimit("下载后文件超过大小限制".to_string()));
            }
            buffer.extend_from_slice(&chunk);
        }

        log::debug!("✅ 下载完成 - {} bytes", buffer.len());
        Ok(Bytes::from(buffer))
    }

    /// 边下载边解析，`parse` 返回 `Some` 时立即停止读取。
    ///
    /// 读完全部内容仍无法解析时返回 `Ok(None)`。
    pub async fn fetch_prefix<T, F>(&self, url: &str, mut parse: F) -> Result<Option<T>, TagError>
    where
        F: FnMut(&[u8]) -> Option<T>,
    {
        let mut response = self.send(url).await?;
        let mut buffer = Vec::with_capacity(BUFFER_INITIAL_CAPACITY);

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.map_reqwest_error(e, url))?
        {
            buffer.extend_from_slice(&chunk);
            if let Some(value) = parse(&buffer) {
                log::debug!("✅ 头部解析完成 - 已读取 {} bytes", buffer.len());
                return Ok(Some(value));
            }
            if buffer.len() >= HEADER_PROBE_LIMIT {
                return Err(TagError::ResourceLimit(format!(
                    "前 {} bytes 内未能解析文件头",
                    HEADER_PROBE_LIMIT
                )));
            }
        }

        Ok(None)
    }

    /// 校验 URL、发出请求并检查状态码。
    async fn send(&self, url: &str) -> Result<reqwest::Response, TagError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| TagError::InvalidFormat(format!("URL 格式错误：{}", e)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(TagError::InvalidFormat("仅支持 HTTP/HTTPS".to_string()));
        }

        log::debug!("🌐 开始下载图片 - URL: {}", redact_url_for_log(url));

        let response = self
            .client
            .get(parsed)
            .header(
                reqwest::header::ACCEPT,
                "image/avif,image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8",
            )
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e, url))?;

        if !response.status().is_success() {
            return Err(TagError::Network(format!(
                "HTTP {}: {}",
                response.status().as_u16(),
                status_message(response.status().as_u16())
            )));
        }

        Ok(response)
    }

    /// 统一映射 reqwest 错误。
    fn map_reqwest_error(&self, e: reqwest::Error, url: &str) -> TagError {
        let err_msg = e.to_string().replace(url, &redact_url_for_log(url));

        if e.is_timeout() {
            TagError::Timeout(format!("下载超时（{}秒）", self.download_timeout))
        } else if e.is_connect() {
            TagError::Network(format!("无法连接：{}", err_msg))
        } else {
            TagError::Network(format!("请求失败：{}", err_msg))
        }
    }
}

/// 去掉 query 与 fragment，避免把签名参数写进日志。
pub(crate) fn redact_url_for_log(url: &str) -> String {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return "<invalid-url>".to_string();
    };

    let host = parsed.host_str().unwrap_or("<unknown-host>");
    let port = parsed.port().map(|p| format!(":{}", p)).unwrap_or_default();

    format!("{}://{}{}{}", parsed.scheme(), host, port, parsed.path())
}

fn status_message(code: u16) -> &'static str {
    match code {
        404 => "未找到",
        403 => "访问被拒绝",
        500..=599 => "服务器错误",
        _ => "请求失败",
    }
}

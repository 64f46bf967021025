//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 图片标签链路只有两类失败：
//! - **开发者错误**（缺少 alt、调用顺序错误、清单中找不到资源）：立即返回，交给模板层暴露。
//! - **传输错误**（连接失败、TLS、超时、非 2xx 响应）：在 `with_size` / `inline` 内部就地降级，
//!   绝不让一张远程图片拖垮整页渲染。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息，调用侧按分支匹配。
//! - `is_transport` 给降级逻辑一个统一判断入口，避免各处重复 `matches!`。

/// 图片标签统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    /// `require_alt_tags` 开启时未提供 alt。
    #[error("缺少 alt 属性：{0}")]
    MissingAltTag(String),

    /// 懒加载已把图片替换为占位图后，又尝试注册格式或断点。
    #[error("懒加载调用过早：{0}")]
    EarlyLazyLoad(String),

    /// 编译清单或开发资源目录中找不到该资源。
    #[error("资源不存在：{0}")]
    FileNotFound(String),

    #[error("网络错误：{0}")]
    Network(String),

    #[error("超时错误：{0}")]
    Timeout(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("配置错误：{0}")]
    Config(String),
}

impl TagError {
    /// 是否属于可就地降级的传输类错误。
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }
}

impl From<std::io::Error> for TagError {
    fn from(error: std::io::Error) -> Self {
        Self::FileSystem(error.to_string())
    }
}

impl From<serde_json::Error> for TagError {
    fn from(error: serde_json::Error) -> Self {
        Self::Config(error.to_string())
    }
}

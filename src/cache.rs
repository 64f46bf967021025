//! # 缓存模块
//!
//! ## 设计思路
//!
//! 尺寸探测与内联都可能触发网络或磁盘 I/O，结果对同一 key 是确定的，因此可以记忆化。
//! 真正的存储属于宿主（对应 Web 框架的缓存服务），这里只定义 `CacheStore` 接缝，
//! 并提供一个进程内实现 `MemoryCache`。
//!
//! ## 实现思路
//!
//! - 值统一序列化为 JSON 文本，任何 `Serialize + DeserializeOwned` 类型都能缓存。
//! - 并发渲染可能同时填充同一个 key：值是幂等计算结果，后写覆盖即可，不额外加锁。
//! - 计算失败不落缓存，下一次渲染会重新尝试。
//! - 尺寸与内联缓存是进程级共享存储：`Cache::shared()` 返回同一个 `MemoryCache` 的句柄，
//!   各上下文之间的命中与 `clear_inline_cache` 都作用在这一份数据上。

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;
use once_cell::sync::Lazy;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::TagError;

/// 尺寸探测缓存 key 前缀。
pub const SIZE_CACHE_PREFIX: &str = "imageTag:withSize:";
/// 内联数据缓存 key 前缀。
pub const INLINE_CACHE_PREFIX: &str = "inlineData:";

static SHARED_CACHE: Lazy<Cache> = Lazy::new(Cache::in_memory);

/// 宿主缓存服务的最小接口。
pub trait CacheStore: Send + Sync {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: String);
    /// 删除成功返回 `true`。
    fn delete(&self, key: &str) -> bool;
    fn keys(&self) -> Vec<String>;
}

/// 进程内缓存实现。
///
/// 默认不淘汰；宿主需要控制内存时可用 `bounded` 设定容量（按最近最少使用淘汰）。
pub struct MemoryCache {
    entries: Mutex<LruCache<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(LruCache::unbounded()),
        }
    }

    /// 创建带容量上限的缓存，`capacity` 为 0 时按 1 处理。
    pub fn bounded(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for MemoryCache {
    fn read(&self, key: &str) -> Option<String> {
        let mut cache = self.entries.lock().ok()?;
        cache.get(key).cloned()
    }

    fn write(&self, key: &str, value: String) {
        match self.entries.lock() {
            Ok(mut cache) => {
                cache.put(key.to_string(), value);
            }
            Err(_) => log::warn!("⚠️ 缓存锁已中毒，跳过写入：{}", key),
        }
    }

    fn delete(&self, key: &str) -> bool {
        match self.entries.lock() {
            Ok(mut cache) => cache.pop(key).is_some(),
            Err(_) => false,
        }
    }

    fn keys(&self) -> Vec<String> {
        match self.entries.lock() {
            Ok(cache) => cache.iter().map(|(key, _)| key.clone()).collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// 记忆化查找门面。
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn CacheStore>,
}

impl Cache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// 新建一份独立的进程内无淘汰缓存。
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCache::new()))
    }

    /// 进程级共享缓存。
    pub fn shared() -> Self {
        SHARED_CACHE.clone()
    }

    /// 两个句柄是否指向同一份存储。
    pub fn same_store(&self, other: &Cache) -> bool {
        Arc::ptr_eq(&self.store, &other.store)
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// 命中则直接返回，未命中则计算并写入。
    ///
    /// `enabled` 为 `false` 时每次都重新计算，不读也不写缓存。
    pub async fn fetch<T, F, Fut>(&self, key: &str, enabled: bool, compute: F) -> Result<T, TagError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, TagError>>,
    {
        if !enabled {
            return compute().await;
        }

        if let Some(raw) = self.store.read(key) {
            match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    log::debug!("♻️ 命中缓存：{}", key);
                    return Ok(value);
                }
                Err(err) => log::warn!("⚠️ 缓存值无法解析，重新计算：{}（{}）", key, err),
            }
        }

        let value = compute().await?;
        match serde_json::to_string(&value) {
            Ok(raw) => self.store.write(key, raw),
            Err(err) => log::warn!("⚠️ 缓存值序列化失败：{}（{}）", key, err),
        }

        Ok(value)
    }

    /// 删除指定前缀的所有 key，返回被删除的 key。
    pub fn delete_prefixed(&self, prefix: &str) -> Vec<String> {
        self.store
            .keys()
            .into_iter()
            .filter(|key| key.starts_with(prefix))
            .filter(|key| self.store.delete(key))
            .collect()
    }
}

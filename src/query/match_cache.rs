//! 编译结果缓存
//!
//! 以查询文本为键缓存解析、编译、规划的结果。编译结果不可变，
//! 多个执行可以共享同一份。

use std::num::NonZeroUsize;
use std::sync::Arc;

use log::debug;
use lru::LruCache;
use parking_lot::Mutex;

use crate::core::error::{DBError, DBResult};
use crate::query::match_engine::CompiledMatch;

/// 缓存统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchCacheStats {
    /// 命中次数
    pub hits: u64,
    /// 未命中次数
    pub misses: u64,
    /// 插入次数
    pub inserts: u64,
    /// 淘汰次数
    pub evictions: u64,
}

impl MatchCacheStats {
    /// 总查询次数
    pub fn total_queries(&self) -> u64 {
        self.hits + self.misses
    }

    /// 命中率
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_queries();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// 编译结果的 LRU 缓存
#[derive(Debug)]
pub struct MatchCache {
    cache: Mutex<LruCache<String, Arc<CompiledMatch>>>,
    stats: Mutex<MatchCacheStats>,
    capacity: usize,
}

impl MatchCache {
    pub fn new(capacity: usize) -> DBResult<Self> {
        let size = NonZeroUsize::new(capacity)
            .ok_or_else(|| DBError::Config("编译缓存容量必须大于0".to_string()))?;
        Ok(Self {
            cache: Mutex::new(LruCache::new(size)),
            stats: Mutex::new(MatchCacheStats::default()),
            capacity,
        })
    }

    pub fn get(&self, query: &str) -> Option<Arc<CompiledMatch>> {
        let hit = self.cache.lock().get(query).cloned();
        let mut stats = self.stats.lock();
        match hit {
            Some(compiled) => {
                stats.hits += 1;
                Some(compiled)
            }
            None => {
                stats.misses += 1;
                None
            }
        }
    }

    pub fn insert(&self, query: &str, compiled: Arc<CompiledMatch>) {
        let evicted = {
            let mut cache = self.cache.lock();
            let full = cache.len() >= self.capacity && !cache.contains(query);
            cache.put(query.to_string(), compiled);
            full
        };
        let mut stats = self.stats.lock();
        stats.inserts += 1;
        if evicted {
            stats.evictions += 1;
            debug!("编译缓存已满，淘汰最久未使用的条目");
        }
    }

    /// 命中则返回缓存，否则编译后插入
    pub fn get_or_compile<F>(&self, query: &str, compile: F) -> DBResult<Arc<CompiledMatch>>
    where
        F: FnOnce() -> DBResult<CompiledMatch>,
    {
        if let Some(compiled) = self.get(query) {
            return Ok(compiled);
        }
        let compiled = Arc::new(compile()?);
        self.insert(query, Arc::clone(&compiled));
        Ok(compiled)
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
        *self.stats.lock() = MatchCacheStats::default();
    }

    pub fn stats(&self) -> MatchCacheStats {
        self.stats.lock().clone()
    }
}

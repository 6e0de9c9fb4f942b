use std::sync::atomic::{AtomicU64, Ordering};

use crate::bitmap::ReloadEpoch;

/// 缓存统计信息
///
/// 计数器是整个生命周期累计值；`glyphs` / `memory_bytes` 只反映当前 epoch。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub epoch: ReloadEpoch,
    pub glyphs: usize,
    pub memory_bytes: usize,
    pub hits: u64,
    pub misses: u64,
    pub failures: u64,
    pub rasterizations: u64,
    pub reloads: u64,
    pub failed_reloads: u64,
}

impl CacheStats {
    /// 命中率（无查询时为 0）
    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.misses;
        if total > 0 {
            self.hits as f32 / total as f32
        } else {
            0.0
        }
    }
}

/// 累计计数器（Relaxed 原子操作，只用于统计）
#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    failures: AtomicU64,
    rasterizations: AtomicU64,
    reloads: AtomicU64,
    failed_reloads: AtomicU64,
}

impl CacheCounters {
    #[inline]
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_rasterization(&self) {
        self.rasterizations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_reload(&self) {
        self.reloads.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_failed_reload(&self) {
        self.failed_reloads.fetch_add(1, Ordering::Relaxed);
    }

    /// 计数器快照（epoch / glyphs / memory_bytes 由调用方填充）
    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            rasterizations: self.rasterizations.load(Ordering::Relaxed),
            reloads: self.reloads.load(Ordering::Relaxed),
            failed_reloads: self.failed_reloads.load(Ordering::Relaxed),
            ..CacheStats::default()
        }
    }
}

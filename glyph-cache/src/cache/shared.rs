//! SharedGlyphCache - 线程安全的字形缓存
//!
//! 锁结构：
//! - **rasterizer: Mutex** - 光栅化器同一时间只被一个线程调用；
//!   reload 全程持有，未命中的光栅化也持有
//! - **state: RwLock** - 当前 epoch 的映射；命中只需读锁
//!
//! 加锁顺序固定为 rasterizer → state。
//! reload 只在替换 epoch 时短暂持有写锁，`initialize` 期间读者继续拿到旧 epoch 的数据。

use parking_lot::{Mutex, RwLock};

use super::epoch::{self, EpochState};
use super::stats::{CacheCounters, CacheStats};
use crate::bitmap::{GlyphBitmap, GlyphMetrics, ReloadEpoch};
use crate::config::CacheConfig;
use crate::error::{GlyphCacheError, InitializationError};
use crate::rasterizer::GlyphRasterizer;

/// 线程安全的字形缓存
pub struct SharedGlyphCache<R> {
    rasterizer: Mutex<R>,
    state: RwLock<EpochState>,
    config: CacheConfig,
    counters: CacheCounters,
}

impl<R: GlyphRasterizer + Send> SharedGlyphCache<R> {
    /// 创建缓存并执行第一次 reload（epoch 0）
    pub fn new(rasterizer: R) -> Result<Self, InitializationError> {
        Self::with_config(rasterizer, CacheConfig::default())
    }

    pub fn with_config(mut rasterizer: R, config: CacheConfig) -> Result<Self, InitializationError> {
        let metrics = epoch::initialize(&mut rasterizer)
            .map_err(|failure| failure.error)
            .inspect_err(|err| {
                tracing::error!("shared glyph cache initialization failed: {}", err.reason);
            })?;

        let counters = CacheCounters::default();
        counters.record_reload();

        let cache = Self {
            rasterizer: Mutex::new(rasterizer),
            state: RwLock::new(EpochState::new(
                ReloadEpoch::INITIAL,
                metrics,
                config.initial_capacity,
            )),
            config,
            counters,
        };
        tracing::info!(
            "shared glyph cache ready: epoch {}, glyph {}x{}",
            ReloadEpoch::INITIAL,
            metrics.glyph_width,
            metrics.glyph_height
        );

        let mut rasterizer = cache.rasterizer.lock();
        cache.preload_configured(&mut rasterizer);
        drop(rasterizer);

        Ok(cache)
    }

    /// 资源重载（原子：要么推进 epoch，要么保持原状）
    ///
    /// 光栅化器初始化成功但度量被拒绝时，当前 epoch 只提供已缓存的字形。
    pub fn reload(&self) -> Result<(), InitializationError> {
        let mut rasterizer = self.rasterizer.lock();

        let metrics = match epoch::initialize(&mut *rasterizer) {
            Ok(metrics) => metrics,
            Err(failure) => {
                self.counters.record_failed_reload();
                let (epoch, detached) = {
                    let mut state = self.state.write();
                    state.detached |= failure.detached;
                    (state.epoch, state.detached)
                };
                tracing::error!(
                    "shared glyph cache reload failed, keeping epoch {} (detached: {}): {}",
                    epoch,
                    detached,
                    failure.error.reason
                );
                return Err(failure.error);
            }
        };

        let (epoch, dropped) = {
            let mut state = self.state.write();
            let dropped = state.glyphs.len();
            *state = state.advance(metrics, self.config.initial_capacity);
            (state.epoch, dropped)
        };
        self.counters.record_reload();
        tracing::info!(
            "shared glyph cache reloaded: epoch {}, glyph {}x{}, dropped {} glyphs",
            epoch,
            metrics.glyph_width,
            metrics.glyph_height,
            dropped
        );

        self.preload_configured(&mut rasterizer);
        Ok(())
    }

    /// 获取字形
    ///
    /// 命中只持有读锁；未命中时获取光栅化器锁后再检查一次，
    /// 保证同一 epoch 内同一字符最多光栅化一次。
    pub fn glyph(&self, char_code: u32) -> Result<GlyphBitmap, GlyphCacheError> {
        if let Some(bitmap) = self.cached(char_code) {
            return Ok(bitmap);
        }

        let mut rasterizer = self.rasterizer.lock();
        self.glyph_locked(&mut rasterizer, char_code)
    }

    /// 批量预光栅化，返回失败的字符及其错误
    pub fn preload<I>(&self, char_codes: I) -> Vec<GlyphCacheError>
    where
        I: IntoIterator<Item = u32>,
    {
        let mut rasterizer = self.rasterizer.lock();
        self.preload_locked(&mut rasterizer, char_codes)
    }

    fn cached(&self, char_code: u32) -> Option<GlyphBitmap> {
        let state = self.state.read();
        let bitmap = state.glyphs.get(&char_code)?.clone();
        self.counters.record_hit();
        Some(bitmap)
    }

    /// 调用方必须持有光栅化器锁
    fn glyph_locked(&self, rasterizer: &mut R, char_code: u32) -> Result<GlyphBitmap, GlyphCacheError> {
        // 等锁期间可能已被其它线程光栅化
        if let Some(bitmap) = self.cached(char_code) {
            return Ok(bitmap);
        }
        self.counters.record_miss();

        // reload 需要光栅化器锁，这里 epoch 不会变化
        let bitmap = {
            let state = self.state.read();
            epoch::rasterize(
                rasterizer,
                char_code,
                &state,
                self.config.validate_bitmaps,
                &self.counters,
            )?
        };

        self.state.write().glyphs.insert(char_code, bitmap.clone());
        Ok(bitmap)
    }

    fn preload_locked<I>(&self, rasterizer: &mut R, char_codes: I) -> Vec<GlyphCacheError>
    where
        I: IntoIterator<Item = u32>,
    {
        char_codes
            .into_iter()
            .filter_map(|char_code| self.glyph_locked(rasterizer, char_code).err())
            .collect()
    }

    fn preload_configured(&self, rasterizer: &mut R) {
        if self.config.preload.is_empty() {
            return;
        }
        let failures = self.preload_locked(rasterizer, self.config.preload.iter().copied());
        for err in &failures {
            tracing::warn!("glyph preload failed in epoch {}: {}", self.epoch(), err);
        }
    }

    pub fn glyph_width(&self) -> u32 {
        self.state.read().metrics.glyph_width
    }

    pub fn glyph_height(&self) -> u32 {
        self.state.read().metrics.glyph_height
    }

    /// 度量与 epoch 在同一把读锁下读取，二者一致
    pub fn metrics(&self) -> GlyphMetrics {
        self.state.read().metrics
    }

    pub fn epoch(&self) -> ReloadEpoch {
        self.state.read().epoch
    }

    /// 当前 epoch 及其度量
    pub fn snapshot(&self) -> (ReloadEpoch, GlyphMetrics) {
        let state = self.state.read();
        (state.epoch, state.metrics)
    }

    /// 位图是否属于当前 epoch
    pub fn is_current(&self, bitmap: &GlyphBitmap) -> bool {
        bitmap.epoch() == self.epoch()
    }

    /// 当前 epoch 是否已缓存（不会触发光栅化）
    pub fn contains(&self, char_code: u32) -> bool {
        self.state.read().glyphs.contains_key(&char_code)
    }

    /// 光栅化器是否已离开当前 epoch（只能提供已缓存的字形）
    pub fn is_detached(&self) -> bool {
        self.state.read().detached
    }

    pub fn glyph_count(&self) -> usize {
        self.state.read().glyphs.len()
    }

    pub fn memory_bytes(&self) -> usize {
        self.state.read().memory_bytes()
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.read();
        CacheStats {
            epoch: state.epoch,
            glyphs: state.glyphs.len(),
            memory_bytes: state.memory_bytes(),
            ..self.counters.snapshot()
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn into_rasterizer(self) -> R {
        self.rasterizer.into_inner()
    }
}

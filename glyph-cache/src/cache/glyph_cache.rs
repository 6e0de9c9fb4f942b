//! GlyphCache - 字形缓存（单线程版本）
//!
//! 每个字符在一个 epoch 内只光栅化一次；reload 整体清空并推进 epoch。
//! 通过 `&mut self` 静态保证 reload 与查询不会交错。

use super::epoch::{self, EpochState};
use super::stats::{CacheCounters, CacheStats};
use crate::bitmap::{GlyphBitmap, GlyphMetrics, ReloadEpoch};
use crate::config::CacheConfig;
use crate::error::{GlyphCacheError, InitializationError};
use crate::rasterizer::GlyphRasterizer;

/// 字形缓存
pub struct GlyphCache<R> {
    rasterizer: R,
    config: CacheConfig,
    state: EpochState,
    counters: CacheCounters,
}

impl<R: GlyphRasterizer> GlyphCache<R> {
    /// 创建缓存并执行第一次 reload（epoch 0）
    pub fn new(rasterizer: R) -> Result<Self, InitializationError> {
        Self::with_config(rasterizer, CacheConfig::default())
    }

    pub fn with_config(mut rasterizer: R, config: CacheConfig) -> Result<Self, InitializationError> {
        let metrics = epoch::initialize(&mut rasterizer)
            .map_err(|failure| failure.error)
            .inspect_err(|err| {
                tracing::error!("glyph cache initialization failed: {}", err.reason);
            })?;

        let counters = CacheCounters::default();
        counters.record_reload();

        let mut cache = Self {
            rasterizer,
            state: EpochState::new(ReloadEpoch::INITIAL, metrics, config.initial_capacity),
            config,
            counters,
        };
        tracing::info!(
            "glyph cache ready: epoch {}, glyph {}x{}",
            cache.state.epoch,
            metrics.glyph_width,
            metrics.glyph_height
        );

        cache.preload_configured();
        Ok(cache)
    }

    /// 资源重载
    ///
    /// 先初始化光栅化器，成功后才清空缓存、更新度量并推进 epoch。
    /// 失败时缓存保持上一个 epoch 的全部数据。若光栅化器初始化成功但度量被拒绝，
    /// 之后的未命中返回 [`GlyphCacheError::Detached`]，直到下一次成功的 reload。
    pub fn reload(&mut self) -> Result<(), InitializationError> {
        let metrics = match epoch::initialize(&mut self.rasterizer) {
            Ok(metrics) => metrics,
            Err(failure) => {
                self.counters.record_failed_reload();
                self.state.detached |= failure.detached;
                tracing::error!(
                    "glyph cache reload failed, keeping epoch {} (detached: {}): {}",
                    self.state.epoch,
                    self.state.detached,
                    failure.error.reason
                );
                return Err(failure.error);
            }
        };

        let dropped = self.state.glyphs.len();
        self.state = self.state.advance(metrics, self.config.initial_capacity);
        self.counters.record_reload();
        tracing::info!(
            "glyph cache reloaded: epoch {}, glyph {}x{}, dropped {} glyphs",
            self.state.epoch,
            metrics.glyph_width,
            metrics.glyph_height,
            dropped
        );

        self.preload_configured();
        Ok(())
    }

    /// 获取字形（未命中时光栅化并缓存）
    ///
    /// 光栅化失败不会缓存任何内容，之后可以重试。
    pub fn glyph(&mut self, char_code: u32) -> Result<GlyphBitmap, GlyphCacheError> {
        if let Some(bitmap) = self.state.glyphs.get(&char_code) {
            self.counters.record_hit();
            return Ok(bitmap.clone());
        }

        self.counters.record_miss();
        let bitmap = epoch::rasterize(
            &mut self.rasterizer,
            char_code,
            &self.state,
            self.config.validate_bitmaps,
            &self.counters,
        )?;
        self.state.glyphs.insert(char_code, bitmap.clone());
        Ok(bitmap)
    }

    /// 批量预光栅化，返回失败的字符及其错误
    pub fn preload<I>(&mut self, char_codes: I) -> Vec<GlyphCacheError>
    where
        I: IntoIterator<Item = u32>,
    {
        char_codes
            .into_iter()
            .filter_map(|char_code| self.glyph(char_code).err())
            .collect()
    }

    fn preload_configured(&mut self) {
        if self.config.preload.is_empty() {
            return;
        }
        let codes = std::mem::take(&mut self.config.preload);
        let failures = self.preload(codes.iter().copied());
        self.config.preload = codes;

        for err in &failures {
            tracing::warn!("glyph preload failed in epoch {}: {}", self.state.epoch, err);
        }
    }

    pub fn glyph_width(&self) -> u32 {
        self.state.metrics.glyph_width
    }

    pub fn glyph_height(&self) -> u32 {
        self.state.metrics.glyph_height
    }

    pub fn metrics(&self) -> GlyphMetrics {
        self.state.metrics
    }

    pub fn epoch(&self) -> ReloadEpoch {
        self.state.epoch
    }

    /// 位图是否属于当前 epoch
    pub fn is_current(&self, bitmap: &GlyphBitmap) -> bool {
        bitmap.epoch() == self.state.epoch
    }

    /// 当前 epoch 是否已缓存（不会触发光栅化）
    pub fn contains(&self, char_code: u32) -> bool {
        self.state.glyphs.contains_key(&char_code)
    }

    /// 光栅化器是否已离开当前 epoch（只能提供已缓存的字形）
    pub fn is_detached(&self) -> bool {
        self.state.detached
    }

    pub fn glyph_count(&self) -> usize {
        self.state.glyphs.len()
    }

    /// 当前缓存的像素字节数
    pub fn memory_bytes(&self) -> usize {
        self.state.memory_bytes()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            epoch: self.state.epoch,
            glyphs: self.state.glyphs.len(),
            memory_bytes: self.state.memory_bytes(),
            ..self.counters.snapshot()
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    pub fn into_rasterizer(self) -> R {
        self.rasterizer
    }
}

// ============================================================================
// Tests
// ============================================================================

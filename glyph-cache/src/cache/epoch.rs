//! 单个 epoch 的缓存状态，以及两种缓存共用的 reload / 光栅化步骤

use rustc_hash::FxHashMap;

use super::stats::CacheCounters;
use crate::bitmap::{GlyphBitmap, GlyphMetrics, ReloadEpoch};
use crate::error::{GlyphCacheError, InitializationError};
use crate::rasterizer::GlyphRasterizer;

/// 一个 epoch 的全部缓存数据
///
/// reload 时整体替换，因此 key 只需要字符码。
pub(crate) struct EpochState {
    pub epoch: ReloadEpoch,
    pub metrics: GlyphMetrics,
    pub glyphs: FxHashMap<u32, GlyphBitmap>,
    /// 光栅化器已离开本 epoch 的资源，未命中不再调用它
    pub detached: bool,
}

impl EpochState {
    pub fn new(epoch: ReloadEpoch, metrics: GlyphMetrics, capacity: usize) -> Self {
        let mut glyphs = FxHashMap::default();
        glyphs.reserve(capacity);
        Self {
            epoch,
            metrics,
            glyphs,
            detached: false,
        }
    }

    /// 下一个 epoch 的空状态
    pub fn advance(&self, metrics: GlyphMetrics, capacity: usize) -> Self {
        Self::new(self.epoch.next(), metrics, capacity)
    }

    /// 当前缓存的像素字节数
    pub fn memory_bytes(&self) -> usize {
        self.glyphs.values().map(|bitmap| bitmap.len()).sum()
    }
}

/// reload 失败
#[derive(Debug)]
pub(crate) struct ReloadFailure {
    pub error: InitializationError,
    /// `initialize` 已成功，光栅化器不再对应当前 epoch
    pub detached: bool,
}

/// 初始化光栅化器并读取新的度量
///
/// 度量为零或 `width * height * 4` 溢出时视为初始化失败。
pub(crate) fn initialize<R>(rasterizer: &mut R) -> Result<GlyphMetrics, ReloadFailure>
where
    R: GlyphRasterizer + ?Sized,
{
    rasterizer.initialize().map_err(|error| ReloadFailure {
        error,
        detached: false,
    })?;

    let metrics = GlyphMetrics::new(rasterizer.glyph_width(), rasterizer.glyph_height());
    check_metrics(metrics).map_err(|error| ReloadFailure {
        error,
        detached: true,
    })
}

fn check_metrics(metrics: GlyphMetrics) -> Result<GlyphMetrics, InitializationError> {
    if metrics.glyph_width == 0 || metrics.glyph_height == 0 {
        return Err(InitializationError::new(format!(
            "rasterizer reported empty glyph cell {}x{}",
            metrics.glyph_width, metrics.glyph_height
        )));
    }
    if metrics.checked_bitmap_len().is_none() {
        return Err(InitializationError::new(format!(
            "glyph cell {}x{} is too large",
            metrics.glyph_width, metrics.glyph_height
        )));
    }

    Ok(metrics)
}

/// 光栅化一个字符并校验长度
pub(crate) fn rasterize<R>(
    rasterizer: &mut R,
    char_code: u32,
    state: &EpochState,
    validate: bool,
    counters: &CacheCounters,
) -> Result<GlyphBitmap, GlyphCacheError>
where
    R: GlyphRasterizer + ?Sized,
{
    if state.detached {
        counters.record_failure();
        tracing::debug!("glyph U+{:04X} not cached in detached epoch {}", char_code, state.epoch);
        return Err(GlyphCacheError::Detached {
            char_code,
            epoch: state.epoch,
        });
    }

    counters.record_rasterization();

    let data = rasterizer.rasterize(char_code).map_err(|err| {
        counters.record_failure();
        tracing::debug!("glyph U+{:04X} unavailable in epoch {}: {}", char_code, state.epoch, err.reason);
        err
    })?;

    let expected = state.metrics.bitmap_len();
    if data.len() != expected {
        if validate {
            counters.record_failure();
            tracing::error!(
                "rasterizer broke the bitmap size contract for U+{:04X}: {} bytes, expected {}",
                char_code,
                data.len(),
                expected
            );
            return Err(GlyphCacheError::BitmapSize {
                char_code,
                expected,
                actual: data.len(),
            });
        }
        debug_assert_eq!(data.len(), expected, "bitmap size for U+{:04X}", char_code);
    }

    Ok(GlyphBitmap::new(char_code, state.metrics, state.epoch, data))
}

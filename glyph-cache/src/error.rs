//! Errors - 错误类型
//!
//! - **InitializationError** - reload 时光栅化器初始化失败（缓存保持上一个 epoch）
//! - **GlyphUnavailableError** - 单个字符无法光栅化（不影响其它条目）
//! - **GlyphCacheError** - `glyph()` / `preload()` 返回的错误

use thiserror::Error;

use crate::bitmap::ReloadEpoch;

/// 光栅化器初始化失败
///
/// 由 `reload()` 向调用方传播，缓存中的旧数据保持不变。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("glyph rasterizer initialization failed: {reason}")]
pub struct InitializationError {
    pub reason: String,
}

impl InitializationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// 指定字符无法光栅化（如不支持的码点）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("glyph U+{char_code:04X} unavailable: {reason}")]
pub struct GlyphUnavailableError {
    pub char_code: u32,
    pub reason: String,
}

impl GlyphUnavailableError {
    pub fn new(char_code: u32, reason: impl Into<String>) -> Self {
        Self {
            char_code,
            reason: reason.into(),
        }
    }
}

/// 查询字形时可能出现的错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GlyphCacheError {
    #[error(transparent)]
    Unavailable(#[from] GlyphUnavailableError),

    /// 光栅化器违反了 `width * height * 4` 的长度约定
    #[error("rasterizer returned {actual} bytes for U+{char_code:04X}, expected {expected}")]
    BitmapSize {
        char_code: u32,
        expected: usize,
        actual: usize,
    },

    /// 光栅化器已切换到新资源，但新度量被拒绝；当前 epoch 只能提供已缓存的字形
    #[error("glyph U+{char_code:04X} is not cached in epoch {epoch} and the rasterizer no longer matches it")]
    Detached { char_code: u32, epoch: ReloadEpoch },
}

impl GlyphCacheError {
    /// 出错的字符码
    pub fn char_code(&self) -> u32 {
        match self {
            GlyphCacheError::Unavailable(err) => err.char_code,
            GlyphCacheError::BitmapSize { char_code, .. } => *char_code,
            GlyphCacheError::Detached { char_code, .. } => *char_code,
        }
    }
}

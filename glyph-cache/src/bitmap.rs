//! Bitmap - 字形位图与度量
//!
//! 光栅化结果是不可变的 RGBA 快照（`Arc<[u8]>`），没有读写位置，
//! clone 只增加引用计数。reload 之后旧快照仍然可读，但已过期。

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

// ============================================================================
// ReloadEpoch - 重载代数
// ============================================================================

/// 字形数据的"代"
///
/// 第一次成功 reload 为 0，之后每次成功 reload 加一，失败不变。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ReloadEpoch(u64);

impl ReloadEpoch {
    pub const INITIAL: ReloadEpoch = ReloadEpoch(0);

    pub fn get(self) -> u64 {
        self.0
    }

    #[inline]
    pub(crate) fn next(self) -> ReloadEpoch {
        ReloadEpoch(self.0.wrapping_add(1))
    }
}

impl fmt::Display for ReloadEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// GlyphMetrics - 字形单元格尺寸
// ============================================================================

/// 一个 epoch 内固定的字形尺寸（像素）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphMetrics {
    pub glyph_width: u32,
    pub glyph_height: u32,
}

impl GlyphMetrics {
    pub const BYTES_PER_PIXEL: usize = 4;

    pub fn new(glyph_width: u32, glyph_height: u32) -> Self {
        Self {
            glyph_width,
            glyph_height,
        }
    }

    /// 单个字形位图的字节数：`width * height * 4`
    ///
    /// 溢出时返回 `None`（reload 会拒绝这样的度量）。
    pub fn checked_bitmap_len(&self) -> Option<usize> {
        (self.glyph_width as usize)
            .checked_mul(self.glyph_height as usize)?
            .checked_mul(Self::BYTES_PER_PIXEL)
    }

    /// 单个字形位图的字节数
    ///
    /// 只对已通过 reload 校验的度量调用。
    pub fn bitmap_len(&self) -> usize {
        self.checked_bitmap_len().unwrap_or(usize::MAX)
    }

    /// 每行字节数
    pub fn row_bytes(&self) -> usize {
        self.glyph_width as usize * Self::BYTES_PER_PIXEL
    }
}

// ============================================================================
// GlyphBitmap - 字形位图
// ============================================================================

/// 单个字符的光栅化结果
///
/// 行优先，每像素 4 字节（R, G, B, A）。
#[derive(Clone, PartialEq, Eq)]
pub struct GlyphBitmap {
    char_code: u32,
    width: u32,
    height: u32,
    epoch: ReloadEpoch,
    data: Arc<[u8]>,
}

impl GlyphBitmap {
    pub(crate) fn new(
        char_code: u32,
        metrics: GlyphMetrics,
        epoch: ReloadEpoch,
        data: Vec<u8>,
    ) -> Self {
        Self {
            char_code,
            width: metrics.glyph_width,
            height: metrics.glyph_height,
            epoch,
            data: data.into(),
        }
    }

    pub fn char_code(&self) -> u32 {
        self.char_code
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// 产生该位图时的 epoch
    pub fn epoch(&self) -> ReloadEpoch {
        self.epoch
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn row_bytes(&self) -> usize {
        self.width as usize * GlyphMetrics::BYTES_PER_PIXEL
    }

    /// 第 `y` 行像素（越界返回 `None`）
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let row_bytes = self.row_bytes();
        let start = y as usize * row_bytes;
        self.data.get(start..start + row_bytes)
    }

    /// `(x, y)` 处的 RGBA 像素
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width {
            return None;
        }
        let row = self.row(y)?;
        let start = x as usize * GlyphMetrics::BYTES_PER_PIXEL;
        let px = row.get(start..start + GlyphMetrics::BYTES_PER_PIXEL)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// 全透明（空格等）
    pub fn is_blank(&self) -> bool {
        self.data
            .chunks_exact(GlyphMetrics::BYTES_PER_PIXEL)
            .all(|px| px[3] == 0)
    }
}

impl Deref for GlyphBitmap {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl AsRef<[u8]> for GlyphBitmap {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Debug for GlyphBitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphBitmap")
            .field("char_code", &format_args!("U+{:04X}", self.char_code))
            .field("width", &self.width)
            .field("height", &self.height)
            .field("epoch", &self.epoch)
            .field("len", &self.data.len())
            .finish()
    }
}

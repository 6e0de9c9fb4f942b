//! Rasterizer Subsystem - 光栅化子系统
//!
//! - **GlyphRasterizer** - 缓存所消费的光栅化能力（trait）
//! - **fn_rasterizer** - 闭包适配器
//! - **mono** - 1-bit 字形表 → RGBA

mod fn_rasterizer;
mod mono;

pub use fn_rasterizer::FnRasterizer;
pub use mono::{MonoGlyphRasterizer, MonoGlyphTable};

use crate::error::{GlyphUnavailableError, InitializationError};

/// 字形光栅化器
///
/// 由外部提供，缓存只在 reload 时调用 `initialize`，不管理其生命周期。
/// 缓存保证不会从两个线程同时调用同一个光栅化器。
pub trait GlyphRasterizer {
    /// 从当前资源重新构建内部状态（资源重载时调用）
    fn initialize(&mut self) -> Result<(), InitializationError>;

    /// 光栅化单个字符
    ///
    /// 返回 `glyph_width() * glyph_height() * 4` 字节的 RGBA 数据，行优先。
    /// 同一 epoch 内对同一字符必须返回相同数据，缓存依赖这一点做 memoize。
    fn rasterize(&mut self, char_code: u32) -> Result<Vec<u8>, GlyphUnavailableError>;

    /// 单宽字形宽度（像素）
    fn glyph_width(&self) -> u32;

    /// 字形高度（像素）
    fn glyph_height(&self) -> u32;
}

impl<R: GlyphRasterizer + ?Sized> GlyphRasterizer for Box<R> {
    fn initialize(&mut self) -> Result<(), InitializationError> {
        (**self).initialize()
    }

    fn rasterize(&mut self, char_code: u32) -> Result<Vec<u8>, GlyphUnavailableError> {
        (**self).rasterize(char_code)
    }

    fn glyph_width(&self) -> u32 {
        (**self).glyph_width()
    }

    fn glyph_height(&self) -> u32 {
        (**self).glyph_height()
    }
}

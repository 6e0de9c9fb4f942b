use super::GlyphRasterizer;
use crate::bitmap::GlyphMetrics;
use crate::error::{GlyphUnavailableError, InitializationError};

/// 闭包光栅化器
///
/// 固定单元格尺寸 + 一个光栅化闭包，`initialize` 总是成功。
/// 适用于宿主已经有自己的光栅化函数的场景。
pub struct FnRasterizer<F> {
    metrics: GlyphMetrics,
    rasterize: F,
}

impl<F> FnRasterizer<F>
where
    F: FnMut(u32) -> Result<Vec<u8>, GlyphUnavailableError>,
{
    pub fn new(glyph_width: u32, glyph_height: u32, rasterize: F) -> Self {
        Self {
            metrics: GlyphMetrics::new(glyph_width, glyph_height),
            rasterize,
        }
    }
}

impl<F> GlyphRasterizer for FnRasterizer<F>
where
    F: FnMut(u32) -> Result<Vec<u8>, GlyphUnavailableError>,
{
    fn initialize(&mut self) -> Result<(), InitializationError> {
        Ok(())
    }

    fn rasterize(&mut self, char_code: u32) -> Result<Vec<u8>, GlyphUnavailableError> {
        (self.rasterize)(char_code)
    }

    fn glyph_width(&self) -> u32 {
        self.metrics.glyph_width
    }

    fn glyph_height(&self) -> u32 {
        self.metrics.glyph_height
    }
}

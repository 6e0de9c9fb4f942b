//! MonoGlyphRasterizer - 1-bit 字形表光栅化器
//!
//! 将每行按位打包的单色字形（最高位 = 最左像素）展开为 RGBA。
//! 字形表由外部 loader 提供（字体文件解析不在本 crate 范围内），
//! 每次 `initialize` 重新调用 loader。

use rustc_hash::FxHashMap;

use super::GlyphRasterizer;
use crate::error::{GlyphUnavailableError, InitializationError};

/// 已解码的单色字形表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonoGlyphTable {
    width: u32,
    height: u32,
    glyphs: FxHashMap<u32, Vec<u8>>,
}

impl MonoGlyphTable {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            glyphs: FxHashMap::default(),
        }
    }

    /// 每行字节数：`ceil(width / 8)`
    pub fn row_bytes(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    /// 单个字形的打包字节数
    pub fn glyph_bytes(&self) -> usize {
        self.row_bytes() * self.height as usize
    }

    pub fn insert(&mut self, char_code: u32, rows: Vec<u8>) {
        self.glyphs.insert(char_code, rows);
    }

    pub fn with_glyph(mut self, char_code: u32, rows: Vec<u8>) -> Self {
        self.insert(char_code, rows);
        self
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    fn validate(&self) -> Result<(), InitializationError> {
        if self.width == 0 || self.height == 0 {
            return Err(InitializationError::new(format!(
                "mono glyph table has empty cell {}x{}",
                self.width, self.height
            )));
        }
        let expected = self.glyph_bytes();
        if let Some((code, rows)) = self.glyphs.iter().find(|(_, rows)| rows.len() != expected) {
            return Err(InitializationError::new(format!(
                "mono glyph U+{:04X} has {} bytes, expected {}",
                code,
                rows.len(),
                expected
            )));
        }
        Ok(())
    }
}

/// 单色字形表光栅化器
pub struct MonoGlyphRasterizer<L> {
    loader: L,
    table: MonoGlyphTable,
    color: [u8; 4],
}

impl<L> MonoGlyphRasterizer<L>
where
    L: FnMut() -> Result<MonoGlyphTable, InitializationError>,
{
    /// 默认白色前景（实际颜色由宿主在组合时应用）
    pub const DEFAULT_COLOR: [u8; 4] = [255, 255, 255, 255];

    pub fn new(loader: L) -> Self {
        Self {
            loader,
            table: MonoGlyphTable::default(),
            color: Self::DEFAULT_COLOR,
        }
    }

    pub fn with_color(mut self, color: [u8; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn table(&self) -> &MonoGlyphTable {
        &self.table
    }
}

impl<L> GlyphRasterizer for MonoGlyphRasterizer<L>
where
    L: FnMut() -> Result<MonoGlyphTable, InitializationError>,
{
    fn initialize(&mut self) -> Result<(), InitializationError> {
        let table = (self.loader)()?;
        table.validate()?;
        self.table = table;
        Ok(())
    }

    fn rasterize(&mut self, char_code: u32) -> Result<Vec<u8>, GlyphUnavailableError> {
        let rows = self
            .table
            .glyphs
            .get(&char_code)
            .ok_or_else(|| GlyphUnavailableError::new(char_code, "not in mono glyph table"))?;

        let width = self.table.width as usize;
        let row_bytes = self.table.row_bytes();
        let mut data = Vec::with_capacity(width * self.table.height as usize * 4);

        for row in rows.chunks_exact(row_bytes) {
            for x in 0..width {
                let bit = row[x / 8] & (0x80 >> (x % 8));
                if bit != 0 {
                    data.extend_from_slice(&self.color);
                } else {
                    data.extend_from_slice(&[0, 0, 0, 0]);
                }
            }
        }

        Ok(data)
    }

    fn glyph_width(&self) -> u32 {
        self.table.width
    }

    fn glyph_height(&self) -> u32 {
        self.table.height
    }
}

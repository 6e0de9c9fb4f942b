//! glyph-cache - 字形位图缓存
//!
//! 位于渲染宿主与可插拔光栅化器之间：
//! - 每个字符在一个 reload epoch 内只光栅化一次
//! - 资源重载时整体失效，并重新读取固定的字形尺寸
//! - reload 是原子的：初始化失败时保留上一个 epoch 的全部数据
//!
//! ```ignore
//! let mut cache = GlyphCache::new(rasterizer)?;
//! let glyph = cache.glyph('A' as u32)?;
//! assert_eq!(glyph.len(), cache.glyph_width() as usize * cache.glyph_height() as usize * 4);
//!
//! // 资源重载
//! cache.reload()?;
//! ```

pub mod bitmap;
pub mod cache;
pub mod config;
pub mod error;
pub mod rasterizer;

#[cfg(test)]
mod testing;


pub use bitmap::{GlyphBitmap, GlyphMetrics, ReloadEpoch};
pub use cache::{CacheStats, GlyphCache, SharedGlyphCache};
pub use config::CacheConfig;
pub use error::{GlyphCacheError, GlyphUnavailableError, InitializationError};
pub use rasterizer::{FnRasterizer, GlyphRasterizer, MonoGlyphRasterizer, MonoGlyphTable};

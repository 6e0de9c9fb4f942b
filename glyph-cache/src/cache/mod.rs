//! Cache Subsystem - 缓存子系统
//!
//! - **glyph_cache** - 单线程缓存（`&mut self`）
//! - **shared** - 线程安全缓存（读写锁 + 光栅化器互斥锁）
//! - **stats** - 统计信息
//!
//! 两者语义相同：按字符码 memoize，reload 整体失效并推进 epoch。

mod epoch;
mod glyph_cache;
mod shared;
mod stats;

pub use glyph_cache::GlyphCache;
pub use shared::SharedGlyphCache;
pub use stats::CacheStats;

//! 测试用光栅化器
//!
//! `CountingRasterizer` 移入缓存后，测试通过 `RasterizerProbe` 继续控制它的行为
//! 并读取调用次数。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{GlyphUnavailableError, InitializationError};
use crate::rasterizer::GlyphRasterizer;

#[derive(Default)]
struct ProbeState {
    /// 下一次 initialize 生效的度量
    pending_metrics: (u32, u32),
    fail_next_initialize: Option<String>,
    unavailable: FxHashSet<u32>,
    short_bitmaps: FxHashMap<u32, usize>,
    initialize_calls: usize,
    rasterize_calls: FxHashMap<u32, usize>,
    delay: Option<Duration>,
}

#[derive(Clone, Default)]
pub(crate) struct RasterizerProbe {
    state: Arc<Mutex<ProbeState>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl RasterizerProbe {
    pub fn set_metrics(&self, width: u32, height: u32) {
        self.state.lock().pending_metrics = (width, height);
    }

    pub fn fail_next_initialize(&self, reason: &str) {
        self.state.lock().fail_next_initialize = Some(reason.to_string());
    }

    pub fn mark_unavailable(&self, char_code: u32) {
        self.state.lock().unavailable.insert(char_code);
    }

    pub fn mark_available(&self, char_code: u32) {
        self.state.lock().unavailable.remove(&char_code);
    }

    /// 让指定字符返回错误长度的位图
    pub fn set_short_bitmap(&self, char_code: u32, len: usize) {
        self.state.lock().short_bitmaps.insert(char_code, len);
    }

    /// 每次光栅化前休眠，放大并发窗口
    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().delay = Some(delay);
    }

    pub fn initialize_calls(&self) -> usize {
        self.state.lock().initialize_calls
    }

    pub fn rasterize_calls(&self, char_code: u32) -> usize {
        self.state
            .lock()
            .rasterize_calls
            .get(&char_code)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_rasterize_calls(&self) -> usize {
        self.state.lock().rasterize_calls.values().sum()
    }

    /// 同时进行中的光栅化调用的最大值
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// 记录调用次数的光栅化器
///
/// 位图内容由字符码和 initialize 次数决定，同一 epoch 内稳定。
pub(crate) struct CountingRasterizer {
    probe: RasterizerProbe,
    width: u32,
    height: u32,
    generation: usize,
}

impl CountingRasterizer {
    pub fn new(width: u32, height: u32) -> (Self, RasterizerProbe) {
        let probe = RasterizerProbe::default();
        probe.set_metrics(width, height);
        let rasterizer = Self {
            probe: probe.clone(),
            width: 0,
            height: 0,
            generation: 0,
        };
        (rasterizer, probe)
    }

    /// 期望的位图内容
    pub fn pattern(char_code: u32, generation: usize, len: usize) -> Vec<u8> {
        (0..len)
            .map(|i| (char_code as usize).wrapping_add(i).wrapping_add(generation) as u8)
            .collect()
    }
}

impl GlyphRasterizer for CountingRasterizer {
    fn initialize(&mut self) -> Result<(), InitializationError> {
        let mut state = self.probe.state.lock();
        state.initialize_calls += 1;
        if let Some(reason) = state.fail_next_initialize.take() {
            return Err(InitializationError::new(reason));
        }
        (self.width, self.height) = state.pending_metrics;
        self.generation = state.initialize_calls;
        Ok(())
    }

    fn rasterize(&mut self, char_code: u32) -> Result<Vec<u8>, GlyphUnavailableError> {
        let in_flight = self.probe.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.probe.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        let (delay, unavailable, short) = {
            let mut state = self.probe.state.lock();
            *state.rasterize_calls.entry(char_code).or_insert(0) += 1;
            (
                state.delay,
                state.unavailable.contains(&char_code),
                state.short_bitmaps.get(&char_code).copied(),
            )
        };
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        let result = if unavailable {
            Err(GlyphUnavailableError::new(char_code, "unsupported"))
        } else {
            let len = short.unwrap_or(self.width as usize * self.height as usize * 4);
            Ok(Self::pattern(char_code, self.generation, len))
        };

        self.probe.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn glyph_width(&self) -> u32 {
        self.width
    }

    fn glyph_height(&self) -> u32 {
        self.height
    }
}

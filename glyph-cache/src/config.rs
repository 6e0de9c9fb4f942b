use serde::{Deserialize, Serialize};

/// 缓存配置（不可变值对象）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// 每个 epoch 预留的条目容量
    pub initial_capacity: usize,
    /// 校验光栅化结果长度（`width * height * 4`）
    ///
    /// 关闭后只在 debug 构建中 assert。
    pub validate_bitmaps: bool,
    /// 每次 reload 成功后预先光栅化的字符
    pub preload: Vec<u32>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 256,
            validate_bitmaps: true,
            preload: Vec::new(),
        }
    }
}

impl CacheConfig {
    /// 预加载可打印 ASCII（0x20..=0x7E）
    pub fn with_ascii_preload(mut self) -> Self {
        self.preload = (0x20..=0x7E).collect();
        self
    }

    /// 从 TOML 读取（缺省字段使用默认值）
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}

//! 全局配置管理,存储所有可配置项

use std::path::PathBuf;

/// 全局配置
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    // 并发任务上限
    pub concurrency: usize,
    // 单次请求超时（单位：秒）
    pub timeout_secs: u64,
    // 可选代理URL（http/https/socks5）
    pub proxy: Option<String>,
    // 指纹规则文件路径
    pub finger_path: PathBuf,
    // 输出目录名称（csv/json/html同名落在该目录下）
    pub output: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            concurrency: 20,
            timeout_secs: 8,
            proxy: None,
            finger_path: PathBuf::from("fingers.json"),
            output: "output".to_string(),
        }
    }
}

/// 配置管理器（单例）
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> GlobalConfig {
        GlobalConfig::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: GlobalConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: GlobalConfig::default(),
        }
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        // 并发数必须为正整数，0按默认值处理
        self.config.concurrency = if concurrency == 0 { 20 } else { concurrency };
        self
    }

    pub fn timeout_secs(mut self, timeout: u64) -> Self {
        self.config.timeout_secs = timeout;
        self
    }

    pub fn proxy(mut self, proxy: Option<String>) -> Self {
        self.config.proxy = proxy.filter(|p| !p.is_empty());
        self
    }

    pub fn finger_path(mut self, path: PathBuf) -> Self {
        self.config.finger_path = path;
        self
    }

    pub fn output(mut self, output: String) -> Self {
        self.config.output = output;
        self
    }

    pub fn build(self) -> GlobalConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = ConfigManager::custom().build();
        assert_eq!(config.concurrency, 20);
        assert_eq!(config.timeout_secs, 8);
        assert!(config.proxy.is_none());
    }

    #[test]
    fn test_builder_zero_concurrency_falls_back() {
        let config = ConfigManager::custom().concurrency(0).build();
        assert_eq!(config.concurrency, 20);
    }

    #[test]
    fn test_builder_empty_proxy_treated_as_none() {
        let config = ConfigManager::custom().proxy(Some(String::new())).build();
        assert!(config.proxy.is_none());
    }
}

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{DBError, DBResult};

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub log: LogConfig,
    pub query: QueryConfig,
}

/// 日志配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// flexi_logger 级别描述，如 `info` 或 `graphdb_match=debug`
    pub level: String,
    pub dir: String,
    pub file: String,
    pub max_file_size: u64,
    pub max_files: usize,
    /// 同时输出到标准错误
    pub to_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "logs".to_string(),
            file: "graphdb-match".to_string(),
            max_file_size: 100 * 1024 * 1024, // 100MB
            max_files: 5,
            to_stderr: false,
        }
    }
}

/// 查询执行配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct QueryConfig {
    /// 单次匹配的超时时间（毫秒），0 表示不设上限
    pub timeout_ms: u64,
    /// 已编译语句缓存容量
    pub pattern_cache_capacity: usize,
    /// 单次查询最多返回的行数，0 表示不限制
    pub max_result_rows: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            pattern_cache_capacity: 256,
            max_result_rows: 0,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> DBResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> DBResult<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// 校验配置取值
    pub fn validate(&self) -> DBResult<()> {
        if self.log.level.trim().is_empty() {
            return Err(DBError::Config("日志级别不能为空".to_string()));
        }
        if self.query.pattern_cache_capacity == 0 {
            return Err(DBError::Config("模式缓存容量必须大于0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.log.level, "info");
        assert_eq!(config.query.timeout_ms, 30_000);
        assert_eq!(config.query.pattern_cache_capacity, 256);
    }

    #[test]
    fn test_config_load_save() {
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");

        let mut config = Config::default();
        config.query.timeout_ms = 500;
        config.log.to_stderr = true;
        config.save(temp_file.path()).expect("Failed to save config");

        let loaded_config =
            Config::load(temp_file.path()).expect("Failed to load config from temporary file");
        assert_eq!(config, loaded_config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        temp_file
            .write_all(b"[query]\ntimeout_ms = 10\n")
            .expect("Failed to write TOML content to temporary file");

        let config = Config::load(temp_file.path()).expect("Failed to load partial config");
        assert_eq!(config.query.timeout_ms, 10);
        assert_eq!(config.query.pattern_cache_capacity, 256);
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn test_zero_cache_capacity_rejected() {
        let mut config = Config::default();
        config.query.pattern_cache_capacity = 0;
        assert!(matches!(config.validate(), Err(DBError::Config(_))));
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        temp_file
            .write_all(b"[query\ntimeout_ms = ")
            .expect("Failed to write TOML content to temporary file");
        assert!(matches!(Config::load(temp_file.path()), Err(DBError::Config(_))));
    }
}

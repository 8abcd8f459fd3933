// crates/og_config/src/overlay_config.rs

//! OverlayConfig - 叠加图层工具配置
//!
//! 定义投影分带、CSV 采集与日志的配置参数，使用 JSON 文件持久化。
//! 量化步长、比例常数和参数记录标记键是固定常量，不在配置中。

use og_geo::{Ellipsoid, LatLon, ZonedTransverseMercator};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// 叠加图层工具配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OverlayConfig {
    /// 投影配置
    #[serde(default)]
    pub projection: ProjectionConfig,

    /// CSV 采集配置
    #[serde(default)]
    pub capture: CaptureConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 投影配置
///
/// 参考坐标决定数据集统一使用的分带。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// 参考纬度（度）
    #[serde(default)]
    pub reference_lat: f64,

    /// 参考经度（度）
    #[serde(default)]
    pub reference_lon: f64,

    /// 椭球体
    #[serde(default)]
    pub ellipsoid: Ellipsoid,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            reference_lat: 0.0,
            reference_lon: 0.0,
            ellipsoid: Ellipsoid::WGS84,
        }
    }
}

impl ProjectionConfig {
    /// 参考坐标
    pub fn reference(&self) -> LatLon {
        LatLon::new(self.reference_lat, self.reference_lon)
    }

    /// 构建数据集投影
    pub fn build(&self) -> ZonedTransverseMercator {
        ZonedTransverseMercator::for_reference(self.ellipsoid, self.reference())
    }
}

/// CSV 采集配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// 首行是否为表头
    #[serde(default = "default_has_header")]
    pub has_header: bool,

    /// 字段分隔符
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// 目标点朝向线段长度（投影单位）
    #[serde(default = "default_goal_heading_length")]
    pub goal_heading_length: f64,
}

fn default_has_header() -> bool { true }
fn default_delimiter() -> char { ',' }
fn default_goal_heading_length() -> f64 { 2.8 }

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            has_header: default_has_header(),
            delimiter: default_delimiter(),
            goal_heading_length: default_goal_heading_length(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别 (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String { "info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl OverlayConfig {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(ConfigError::Io)?;

        let config: OverlayConfig = serde_json::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.projection;
        if !(-90.0..=90.0).contains(&p.reference_lat) {
            return Err(ConfigError::InvalidValue {
                key: "projection.reference_lat".to_string(),
                value: p.reference_lat.to_string(),
                reason: "纬度必须在 [-90, 90] 范围内".to_string(),
            });
        }
        if !(-180.0..=180.0).contains(&p.reference_lon) {
            return Err(ConfigError::InvalidValue {
                key: "projection.reference_lon".to_string(),
                value: p.reference_lon.to_string(),
                reason: "经度必须在 [-180, 180] 范围内".to_string(),
            });
        }
        if !p.ellipsoid.is_valid() {
            return Err(ConfigError::InvalidValue {
                key: "projection.ellipsoid".to_string(),
                value: p.ellipsoid.to_string(),
                reason: "长半轴必须为正且扁率在 [0, 1) 内".to_string(),
            });
        }

        let c = &self.capture;
        if !(c.goal_heading_length.is_finite() && c.goal_heading_length > 0.0) {
            return Err(ConfigError::InvalidValue {
                key: "capture.goal_heading_length".to_string(),
                value: c.goal_heading_length.to_string(),
                reason: "朝向线段长度必须为正".to_string(),
            });
        }
        if !c.delimiter.is_ascii() {
            return Err(ConfigError::InvalidValue {
                key: "capture.delimiter".to_string(),
                value: c.delimiter.to_string(),
                reason: "分隔符必须是 ASCII 字符".to_string(),
            });
        }

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                value: self.logging.level.clone(),
                reason: format!("可选值: {}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }
}

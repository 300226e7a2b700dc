//! 驱动层配置模块
//!
//! 提供 TOML 配置加载，覆盖几何参数与 Pipeline 行为。
//! 所有字段都有默认值，空文件等价于默认配置；未知字段直接报错，
//! 避免拼写错误被静默忽略。

use std::path::Path;

use digitizer_kinematics::ArmGeometry;

use crate::error::DriverError;
use crate::pipeline::PipelineConfig;

/// 数位臂驱动配置（TOML 根结构）
///
/// # Example
///
/// ```
/// use digitizer_driver::DigitizerConfig;
///
/// let text = r#"
///     [geometry]
///     steps_per_revolution = 400
///     needle_length = 120.5
///
///     [pipeline]
///     receive_timeout_ms = 5
/// "#;
/// let config = DigitizerConfig::from_toml_str(text).unwrap();
/// assert_eq!(config.geometry.steps_per_revolution, 400);
/// assert_eq!(config.pipeline.receive_timeout_ms, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DigitizerConfig {
    /// 机械臂几何参数
    pub geometry: ArmGeometry,
    /// IO 线程行为配置
    pub pipeline: PipelineConfig,
}

impl DigitizerConfig {
    /// 从 TOML 文本解析配置（解析后立即校验）
    pub fn from_toml_str(text: &str) -> Result<Self, DriverError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件加载配置
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DriverError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// 校验所有字段取值
    ///
    /// 构造期一次性检查，解算路径上不再做任何校验。
    pub fn validate(&self) -> Result<(), DriverError> {
        validate_geometry(&self.geometry)?;
        validate_pipeline(&self.pipeline)?;
        Ok(())
    }
}

/// 校验几何参数
///
/// `steps_per_revolution` 为 0 会导致除零；负的或非有限的连杆长度
/// 没有物理意义，且会让解算结果变成 NaN 污染下游。
pub(crate) fn validate_geometry(geometry: &ArmGeometry) -> Result<(), DriverError> {
    if geometry.steps_per_revolution == 0 {
        return Err(DriverError::InvalidConfig(
            "steps_per_revolution must be > 0".to_string(),
        ));
    }

    let lengths = [
        ("base_height", geometry.base_height),
        ("first_link_length", geometry.first_link_length),
        ("second_link_length", geometry.second_link_length),
        ("needle_length", geometry.needle_length),
    ];
    for (name, value) in lengths {
        if !value.is_finite() || value < 0.0 {
            return Err(DriverError::InvalidConfig(format!(
                "{} must be finite and >= 0 (got {})",
                name, value
            )));
        }
    }

    Ok(())
}

/// 校验 Pipeline 配置
pub(crate) fn validate_pipeline(config: &PipelineConfig) -> Result<(), DriverError> {
    if config.receive_timeout_ms == 0 {
        return Err(DriverError::InvalidConfig(
            "receive_timeout_ms must be > 0".to_string(),
        ));
    }
    if config.read_chunk_size == 0 {
        return Err(DriverError::InvalidConfig(
            "read_chunk_size must be > 0".to_string(),
        ));
    }
    Ok(())
}

//! Builder 模式实现
//!
//! 提供链式构造 `Digitizer` 实例的便捷方式。

use digitizer_kinematics::ArmGeometry;
use digitizer_stream::ByteSource;

use crate::config::DigitizerConfig;
use crate::digitizer::Digitizer;
use crate::error::DriverError;
use crate::pipeline::PipelineConfig;

/// Digitizer Builder（链式构造）
///
/// 使用 Builder 模式创建 `Digitizer` 实例，支持链式调用。
/// 字节源在 `build()` 时传入：串口/socket 的打开与生命周期由调用方负责，
/// 驱动只消费一个实现了 `ByteSource` 的读端。
///
/// # Example
///
/// ```
/// use digitizer_driver::{DigitizerBuilder, PipelineConfig};
/// use digitizer_kinematics::ArmGeometry;
/// use digitizer_stream::ReadSource;
/// use std::io::Cursor;
///
/// // 使用默认配置
/// let source = ReadSource::new(Cursor::new(Vec::new()));
/// let digitizer = DigitizerBuilder::new().build(source).unwrap();
///
/// // 自定义几何参数和 Pipeline 配置
/// let geometry = ArmGeometry {
///     steps_per_revolution: 400,
///     ..ArmGeometry::default()
/// };
/// let config = PipelineConfig {
///     receive_timeout_ms: 5,
///     read_chunk_size: 64,
/// };
/// let source = ReadSource::new(Cursor::new(Vec::new()));
/// let digitizer = DigitizerBuilder::new()
///     .geometry(geometry)
///     .pipeline_config(config)
///     .build(source)
///     .unwrap();
/// ```
pub struct DigitizerBuilder {
    /// 机械臂几何参数
    geometry: Option<ArmGeometry>,
    /// Pipeline 配置
    pipeline_config: Option<PipelineConfig>,
}

impl DigitizerBuilder {
    /// 创建新的 Builder
    ///
    /// # Example
    ///
    /// ```
    /// use digitizer_driver::DigitizerBuilder;
    ///
    /// let builder = DigitizerBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self {
            geometry: None,
            pipeline_config: None,
        }
    }

    /// 设置几何参数（可选，默认出厂参数）
    pub fn geometry(mut self, geometry: ArmGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// 设置 Pipeline 配置（可选）
    pub fn pipeline_config(mut self, config: PipelineConfig) -> Self {
        self.pipeline_config = Some(config);
        self
    }

    /// 一次性应用完整配置（通常来自 TOML 文件）
    ///
    /// 等价于依次调用 `geometry()` 和 `pipeline_config()`。
    ///
    /// # Example
    ///
    /// ```
    /// use digitizer_driver::{DigitizerBuilder, DigitizerConfig};
    /// use digitizer_stream::ReadSource;
    /// use std::io::Cursor;
    ///
    /// let config = DigitizerConfig::from_toml_str(r#"
    ///     [geometry]
    ///     steps_per_revolution = 720
    /// "#).unwrap();
    ///
    /// let source = ReadSource::new(Cursor::new(Vec::new()));
    /// let digitizer = DigitizerBuilder::new()
    ///     .config(config)
    ///     .build(source)
    ///     .unwrap();
    /// assert_eq!(digitizer.geometry().steps_per_revolution, 720);
    /// ```
    pub fn config(mut self, config: DigitizerConfig) -> Self {
        self.geometry = Some(config.geometry);
        self.pipeline_config = Some(config.pipeline);
        self
    }

    /// 构建 Digitizer 实例
    ///
    /// 创建并启动 `Digitizer` 实例，启动后台 IO 线程。
    ///
    /// # Errors
    /// - `DriverError::InvalidConfig`: 几何参数或 Pipeline 配置不合法
    pub fn build(self, source: impl ByteSource + Send + 'static) -> Result<Digitizer, DriverError> {
        if let Some(ref config) = self.pipeline_config {
            crate::config::validate_pipeline(config)?;
        }
        Digitizer::new(
            source,
            self.geometry.unwrap_or_default(),
            self.pipeline_config,
        )
    }
}

impl Default for DigitizerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

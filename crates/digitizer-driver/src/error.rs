//! 驱动层错误类型定义

use digitizer_stream::StreamError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 字节流错误
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    /// 注入通道已关闭（IO 线程退出）
    #[error("Injection channel closed")]
    ChannelClosed,

    /// 注入通道已满（缓冲区容量 10）
    #[error("Injection channel full (buffer size: 10)")]
    ChannelFull,

    /// 锁被毒化（线程 panic）
    #[error("Poisoned lock (thread panic)")]
    PoisonedLock,

    /// 操作超时
    #[error("Operation timeout")]
    Timeout,

    /// 配置不合法（字段取值超出允许范围）
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// 配置文件解析失败
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// 配置文件读取失败
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::DriverError;
    use digitizer_stream::StreamError;

    /// 测试 DriverError 的 Display 实现
    #[test]
    fn test_driver_error_display() {
        // 测试 Stream 错误
        let stream_error = StreamError::Timeout;
        let driver_error = DriverError::Stream(stream_error);
        let msg = format!("{}", driver_error);
        assert!(
            msg.contains("Read timeout") || msg.contains("Stream"),
            "Stream error message: {}",
            msg
        );

        // 测试 ChannelClosed
        let driver_error = DriverError::ChannelClosed;
        let msg = format!("{}", driver_error);
        assert_eq!(msg, "Injection channel closed");

        // 测试 ChannelFull
        let driver_error = DriverError::ChannelFull;
        let msg = format!("{}", driver_error);
        assert!(msg.contains("channel full") || msg.contains("ChannelFull"));

        // 测试 PoisonedLock
        let driver_error = DriverError::PoisonedLock;
        let msg = format!("{}", driver_error);
        assert!(msg.contains("Poisoned lock") || msg.contains("PoisonedLock"));

        // 测试 Timeout
        let driver_error = DriverError::Timeout;
        let msg = format!("{}", driver_error);
        assert_eq!(msg, "Operation timeout");

        // 测试 InvalidConfig
        let driver_error = DriverError::InvalidConfig("steps_per_revolution must be > 0".to_string());
        let msg = format!("{}", driver_error);
        assert!(msg.contains("Invalid config") && msg.contains("steps_per_revolution"));
    }

    /// 测试 From<StreamError> 转换
    #[test]
    fn test_from_stream_error() {
        let stream_error = StreamError::Disconnected;
        let driver_error: DriverError = stream_error.into();
        match driver_error {
            DriverError::Stream(e) => assert!(matches!(e, StreamError::Disconnected)),
            _ => panic!("Expected Stream variant"),
        }
    }

    /// 测试 From<toml::de::Error> 转换
    #[test]
    fn test_from_toml_error() {
        let toml_error = toml::from_str::<toml::Table>("not [ valid").unwrap_err();
        let driver_error: DriverError = toml_error.into();
        match driver_error {
            DriverError::Config(_) => {},
            _ => panic!("Expected Config variant"),
        }
    }
}

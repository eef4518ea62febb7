// crates/sw_config/src/error.rs

//! 配置层错误类型

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 解析错误
    #[error("Parse error: {0}")]
    Parse(String),

    /// 不支持的湍流类型
    #[error("Unsupported turbulence type '{value}' (expected 'laminar' or 'RAS')")]
    UnsupportedTurbulence {
        /// 输入值
        value: String,
    },

    /// 无效值
    #[error("Invalid value for '{key}': {value} - {reason}")]
    InvalidValue {
        /// 配置键
        key: String,
        /// 配置值
        value: String,
        /// 原因
        reason: String,
    },
}

impl ConfigError {
    /// 构造无效值错误
    pub fn invalid(key: impl Into<String>, value: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::invalid("n_proc", 0, "must be positive");
        let msg = err.to_string();
        assert!(msg.contains("n_proc"));
        assert!(msg.contains("must be positive"));
    }
}

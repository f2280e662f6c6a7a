//! Runtime-editable global configuration document.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::sites::WafMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    /// Mode applied to sites that do not pick one explicitly.
    pub default_mode: WafMode,
    #[validate(range(
        min = 1,
        max = 1_048_576,
        message = "requestBodyLimitKb must be between 1 and 1048576"
    ))]
    pub request_body_limit_kb: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LogSettings {
    #[validate(range(min = 1, max = 3650, message = "retentionDays must be between 1 and 3650"))]
    pub retention_days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct GlobalConfig {
    #[validate(nested)]
    pub engine: EngineSettings,
    #[validate(nested)]
    pub log: LogSettings,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            engine: EngineSettings {
                default_mode: WafMode::Protection,
                request_body_limit_kb: 13_107,
            },
            log: LogSettings { retention_days: 30 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(GlobalConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_retention_is_rejected() {
        let mut config = GlobalConfig::default();
        config.log.retention_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(GlobalConfig::default()).unwrap();
        assert_eq!(json["engine"]["defaultMode"], "protection");
        assert_eq!(json["log"]["retentionDays"], 30);
    }
}

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

/// System configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
}

/// Task scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Polling tick of the execution loop, in seconds
    pub poll_interval_seconds: u64,
    /// Pause after a failed loop iteration before the next tick, in seconds
    pub loop_error_backoff_seconds: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 1,
            loop_error_backoff_seconds: 1,
        }
    }
}

/// Workflow engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Staff mailbox receiving appointment notifications
    pub staff_email: String,
    /// Default reminder lead time, in hours
    pub default_reminder_hours: i64,
    /// Loyalty points granted per service type
    pub points_per_service: HashMap<String, u32>,
    /// Points granted for service types missing from the table
    pub default_points: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let points_per_service = [
            ("General Checkup", 10),
            ("Teeth Cleaning", 15),
            ("Teeth Whitening", 25),
            ("Dental Fillings", 20),
            ("Root Canal", 50),
            ("Dental Crown", 60),
            ("Dental Implants", 100),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            staff_email: "staff@makhanda-smiles.com".to_string(),
            default_reminder_hours: 24,
            points_per_service,
            default_points: 10,
        }
    }
}

/// Notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Practice name used in message signatures
    pub practice_name: String,
    /// Whether the SMS channel is wired at all
    pub sms_enabled: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            practice_name: "Makhanda Smiles Dental Practice".to_string(),
            sms_enabled: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from config file and environment variables
    ///
    /// Load order:
    /// 1. Default configuration
    /// 2. Config file (TOML format)
    /// 3. Environment variable overrides (prefix: AUTOMATION_)
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else {
            // Try to load default config files
            let default_paths = ["config/automation.toml", "automation.toml"];
            for path in &default_paths {
                if Path::new(path).exists() {
                    builder = builder.add_source(File::new(path, FileFormat::Toml));
                    break;
                }
            }
        }

        // Environment variable overrides - highest priority
        builder = builder.add_source(
            Environment::with_prefix("AUTOMATION")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }

    /// Validate configuration effectiveness
    pub fn validate(&self) -> Result<()> {
        if self.scheduler.poll_interval_seconds == 0 {
            return Err(anyhow::anyhow!("scheduler.poll_interval_seconds 必须大于0"));
        }
        if self.engine.default_reminder_hours <= 0 {
            return Err(anyhow::anyhow!("engine.default_reminder_hours 必须大于0"));
        }
        if self.engine.staff_email.is_empty() || !self.engine.staff_email.contains('@') {
            return Err(anyhow::anyhow!(
                "engine.staff_email 不是有效的邮箱地址: {}",
                self.engine.staff_email
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scheduler.poll_interval_seconds, 1);
        assert_eq!(config.engine.default_reminder_hours, 24);
        assert_eq!(
            config.engine.points_per_service.get("Teeth Cleaning"),
            Some(&15)
        );
    }

    #[test]
    fn test_from_toml_partial_override() {
        let toml_str = r#"
            [scheduler]
            poll_interval_seconds = 5
            loop_error_backoff_seconds = 2
        "#;

        let config = AppConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.scheduler.poll_interval_seconds, 5);
        // 未出现的段落回落到默认值
        assert_eq!(config.engine.default_points, 10);
        assert!(config.notification.sms_enabled);
    }

    #[test]
    fn test_invalid_poll_interval_rejected() {
        let toml_str = r#"
            [scheduler]
            poll_interval_seconds = 0
            loop_error_backoff_seconds = 1
        "#;

        assert!(AppConfig::from_toml(toml_str).is_err());
    }

    #[test]
    fn test_invalid_staff_email_rejected() {
        let mut config = AppConfig::default();
        config.engine.staff_email = "not-an-email".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AppConfig::default();
        let serialized = config.to_toml().unwrap();
        let restored = AppConfig::from_toml(&serialized).unwrap();
        assert_eq!(
            restored.engine.staff_email,
            "staff@makhanda-smiles.com"
        );
    }
}

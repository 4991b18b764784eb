use std::collections::BTreeMap;

use iothub_service_core::time::{self, DateTime};

use crate::constants::DEFAULT_CONTENT_TYPE;

/// Desired-state payloads applied by a configuration.
///
/// Both values are JSON object text, sent to and received from the service verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationContent {
    /// Desired properties applied to device twins.
    pub device_content: String,
    /// Desired properties applied to module twins.
    pub modules_content: String,
}

/// Metric definitions and their latest results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationMetrics {
    /// Number of devices matched by each query, as last computed by the service.
    pub results: BTreeMap<String, i64>,
    /// Metric name to query.
    pub queries: BTreeMap<String, String>,
}

/// A device configuration as reported by the service.
///
/// Fields missing from the service response keep their zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    /// Schema version of the configuration document.
    pub schema_version: String,
    /// Unique id of the configuration within the hub.
    pub configuration_id: String,
    /// Query selecting the devices the configuration applies to.
    pub target_condition: String,
    /// Version marker assigned by the service.
    pub etag: String,
    /// Raw content type; see [`Configuration::content_type`].
    pub content_type: String,
    /// Creation time as reported, RFC 3339.
    pub created_time_utc: String,
    /// Last update time as reported, RFC 3339.
    pub last_updated_time_utc: String,
    /// Higher priority wins when several configurations target a device.
    pub priority: i32,
    /// Desired state applied to the targeted devices.
    pub content: ConfigurationContent,
    /// Free-form labels.
    pub labels: BTreeMap<String, String>,
    /// Metrics maintained by the service, such as `appliedCount`.
    pub system_metrics: ConfigurationMetrics,
    /// Custom metrics defined with the configuration.
    pub metrics: ConfigurationMetrics,
}

impl Configuration {
    /// Release every owned value and reset the configuration to its zero value.
    ///
    /// Calling it again on a cleared configuration does nothing.
    pub fn free_members(&mut self) {
        *self = Self::default();
    }

    /// The content type, `assignment` when the service didn't report one.
    pub fn content_type(&self) -> &str {
        if self.content_type.is_empty() {
            DEFAULT_CONTENT_TYPE
        } else {
            &self.content_type
        }
    }

    /// Creation time, if reported and well formed.
    pub fn created_time(&self) -> Option<DateTime> {
        time::parse_rfc3339(&self.created_time_utc).ok()
    }

    /// Last update time, if reported and well formed.
    pub fn last_updated_time(&self) -> Option<DateTime> {
        time::parse_rfc3339(&self.last_updated_time_utc).ok()
    }
}

/// Input of [`crate::DeviceConfigurationClient::add_configuration`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationAdd {
    /// Id of the new configuration. Must not be empty.
    pub configuration_id: String,
    /// Query selecting the target devices.
    pub target_condition: String,
    /// Desired state to apply.
    pub content: ConfigurationContent,
    /// Free-form labels.
    pub labels: BTreeMap<String, String>,
    /// Priority against other configurations.
    pub priority: i32,
    /// Custom metric name to query.
    pub metrics: BTreeMap<String, String>,
}

/// Input of [`crate::DeviceConfigurationClient::update_configuration`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationUpdate {
    /// Id of the configuration to replace. Must not be empty.
    pub configuration_id: String,
    /// Query selecting the target devices.
    pub target_condition: String,
    /// Desired state to apply.
    pub content: ConfigurationContent,
    /// Free-form labels.
    pub labels: BTreeMap<String, String>,
    /// Priority against other configurations.
    pub priority: i32,
    /// Custom metric name to query.
    pub metrics: BTreeMap<String, String>,
    /// Sent in the body when not empty. The request itself always carries `If-Match: '*'`.
    pub etag: String,
}

/// Input of [`crate::DeviceConfigurationClient::test_queries`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationQueriesTestInput {
    /// Target condition to validate.
    pub target_condition: String,
    /// Metric name to query, each one validated.
    pub custom_metric_queries: BTreeMap<String, String>,
}

/// Validation errors reported for a [`ConfigurationQueriesTestInput`].
///
/// Empty values mean the corresponding query is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationQueriesTestResponse {
    /// Error for the target condition.
    pub target_condition_error: String,
    /// Metric name to error.
    pub custom_metric_query_errors: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated() -> Configuration {
        Configuration {
            schema_version: "1.0".to_string(),
            configuration_id: "config-1".to_string(),
            target_condition: "tags.environment='test'".to_string(),
            etag: "MQ==".to_string(),
            content_type: "assignment".to_string(),
            created_time_utc: "2018-06-30T10:00:00.1234567Z".to_string(),
            last_updated_time_utc: "2018-07-01T10:00:00Z".to_string(),
            priority: 10,
            content: ConfigurationContent {
                device_content: "{}".to_string(),
                modules_content: "{}".to_string(),
            },
            labels: BTreeMap::from([("label1".to_string(), "value1".to_string())]),
            system_metrics: ConfigurationMetrics {
                results: BTreeMap::from([("appliedCount".to_string(), 3)]),
                queries: BTreeMap::new(),
            },
            metrics: ConfigurationMetrics::default(),
        }
    }

    #[test]
    fn test_free_members() {
        let mut config = populated();

        config.free_members();
        assert_eq!(config, Configuration::default());

        config.free_members();
        assert_eq!(config, Configuration::default());
    }

    #[test]
    fn test_content_type_default() {
        let mut config = populated();
        config.content_type = "custom".to_string();
        assert_eq!(config.content_type(), "custom");

        config.content_type.clear();
        assert_eq!(config.content_type(), "assignment");
    }

    #[test]
    fn test_times() {
        let config = populated();
        assert!(config.created_time().is_some());
        assert!(config.last_updated_time().is_some());
        assert!(Configuration::default().created_time().is_none());
    }
}

//! Conversion between configurations and their wire JSON representation.

use std::collections::BTreeMap;

use iothub_service_core::{Error, Result};
use log::debug;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;
use serde_json::Value;

use crate::constants::SCHEMA_VERSION;
use crate::{
    Configuration, ConfigurationAdd, ConfigurationContent, ConfigurationMetrics,
    ConfigurationQueriesTestInput, ConfigurationQueriesTestResponse, ConfigurationUpdate,
};

/// Scalar fields, labels and content of a wrong JSON type read as absent.
/// Only metric maps are strict.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigurationResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    schema_version: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    content_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    target_condition: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    created_time_utc: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    last_updated_time_utc: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    etag: Option<String>,
    priority: Option<Value>,
    #[serde(default, deserialize_with = "lenient_content")]
    content: Option<ContentResponse>,
    #[serde(default, deserialize_with = "lenient_labels")]
    labels: Option<BTreeMap<String, String>>,
    system_metrics: Option<MetricsResponse>,
    metrics: Option<MetricsResponse>,
}

fn lenient_string<'de, D>(d: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(d)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// Labels with a non-string value are skipped.
fn lenient_labels<'de, D>(d: D) -> std::result::Result<Option<BTreeMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(map) = Value::deserialize(d)? else {
        return Ok(None);
    };

    Ok(Some(
        map.into_iter()
            .filter_map(|(k, v)| match v {
                Value::String(v) => Some((k, v)),
                _ => None,
            })
            .collect(),
    ))
}

/// Content is read from its raw text so the embedded objects keep their exact source.
fn lenient_content<'de, D>(d: D) -> std::result::Result<Option<ContentResponse>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Box::<RawValue>::deserialize(d)?;
    Ok(serde_json::from_str(raw.get()).ok())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentResponse {
    device_content: Option<Box<RawValue>>,
    modules_content: Option<Box<RawValue>>,
}

#[derive(Deserialize)]
struct MetricsResponse {
    results: Option<BTreeMap<String, i64>>,
    queries: Option<BTreeMap<String, String>>,
}

impl From<ConfigurationResponse> for Configuration {
    fn from(v: ConfigurationResponse) -> Self {
        let content = v.content.map(|c| ConfigurationContent {
            device_content: raw_text(c.device_content),
            modules_content: raw_text(c.modules_content),
        });

        Configuration {
            schema_version: v.schema_version.unwrap_or_default(),
            configuration_id: v.id.unwrap_or_default(),
            target_condition: v.target_condition.unwrap_or_default(),
            etag: v.etag.unwrap_or_default(),
            content_type: v.content_type.unwrap_or_default(),
            created_time_utc: v.created_time_utc.unwrap_or_default(),
            last_updated_time_utc: v.last_updated_time_utc.unwrap_or_default(),
            priority: v.priority.as_ref().map(parse_priority).unwrap_or_default(),
            content: content.unwrap_or_default(),
            labels: v.labels.unwrap_or_default(),
            system_metrics: v.system_metrics.map(Into::into).unwrap_or_default(),
            metrics: v.metrics.map(Into::into).unwrap_or_default(),
        }
    }
}

impl From<MetricsResponse> for ConfigurationMetrics {
    fn from(v: MetricsResponse) -> Self {
        ConfigurationMetrics {
            results: v.results.unwrap_or_default(),
            queries: v.queries.unwrap_or_default(),
        }
    }
}

fn raw_text(v: Option<Box<RawValue>>) -> String {
    v.map(|raw| raw.get().to_string()).unwrap_or_default()
}

/// Priority is read the way `atoi` would read it: leading digits only, zero otherwise.
fn parse_priority(v: &Value) -> i32 {
    match v {
        Value::Number(n) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .unwrap_or_default(),
        Value::String(s) => {
            let s = s.trim_start();
            let sign = usize::from(s.starts_with(['-', '+']));
            let end = s[sign..]
                .find(|c: char| !c.is_ascii_digit())
                .map_or(s.len(), |i| sign + i);
            s[..end].parse::<i32>().unwrap_or_default()
        }
        _ => 0,
    }
}

/// Decode a configuration response body into `target`.
///
/// An empty body decodes to the zero configuration. On error `target` is
/// cleared with [`Configuration::free_members`] before returning, so no
/// partially decoded value is left behind.
pub fn decode_into(body: &[u8], target: &mut Configuration) -> Result<()> {
    match decode(body) {
        Ok(config) => {
            *target = config;
            Ok(())
        }
        Err(err) => {
            target.free_members();
            Err(err)
        }
    }
}

/// Decode a configuration response body.
pub fn decode(body: &[u8]) -> Result<Configuration> {
    if body.iter().all(u8::is_ascii_whitespace) {
        debug!("configuration response body is empty");
        return Ok(Configuration::default());
    }

    let resp: ConfigurationResponse = serde_json::from_slice(body)
        .map_err(|e| Error::json("failed to decode configuration").with_source(e))?;
    Ok(resp.into())
}

/// Decode a list response body: an array of configuration objects.
pub fn decode_list(body: &[u8]) -> Result<Vec<Configuration>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let resp: Vec<ConfigurationResponse> = serde_json::from_slice(body)
        .map_err(|e| Error::json("failed to decode configuration list").with_source(e))?;
    debug!("decoded {} configurations", resp.len());
    Ok(resp.into_iter().map(Into::into).collect())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentRequest {
    device_content: Box<RawValue>,
    modules_content: Box<RawValue>,
}

impl ContentRequest {
    fn new(content: &ConfigurationContent) -> Result<Self> {
        Ok(Self {
            device_content: raw_fragment(&content.device_content, "deviceContent")?,
            modules_content: raw_fragment(&content.modules_content, "modulesContent")?,
        })
    }
}

/// The caller's JSON text, embedded as is. Empty content is an empty object.
fn raw_fragment(s: &str, name: &str) -> Result<Box<RawValue>> {
    let s = if s.trim().is_empty() { "{}" } else { s };
    RawValue::from_string(s.to_string())
        .map_err(|e| Error::json(format!("{name} is not a JSON value")).with_source(e))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigurationRequest<'a> {
    id: &'a str,
    schema_version: &'a str,
    labels: &'a BTreeMap<String, String>,
    content: ContentRequest,
    target_condition: &'a str,
    priority: i32,
    metrics: MetricsRequest<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    etag: Option<&'a str>,
}

#[derive(Serialize)]
struct MetricsRequest<'a> {
    queries: &'a BTreeMap<String, String>,
}

/// Encode the content object: exactly `deviceContent` and `modulesContent`.
pub fn encode_content(content: &ConfigurationContent) -> Result<String> {
    Ok(serde_json::to_string(&ContentRequest::new(content)?)?)
}

/// Encode the request body of an add request.
pub fn encode_add(add: &ConfigurationAdd) -> Result<Vec<u8>> {
    let req = ConfigurationRequest {
        id: &add.configuration_id,
        schema_version: SCHEMA_VERSION,
        labels: &add.labels,
        content: ContentRequest::new(&add.content)?,
        target_condition: &add.target_condition,
        priority: add.priority,
        metrics: MetricsRequest {
            queries: &add.metrics,
        },
        etag: None,
    };
    Ok(serde_json::to_vec(&req)?)
}

/// Encode the request body of an update request.
pub fn encode_update(update: &ConfigurationUpdate) -> Result<Vec<u8>> {
    let req = ConfigurationRequest {
        id: &update.configuration_id,
        schema_version: SCHEMA_VERSION,
        labels: &update.labels,
        content: ContentRequest::new(&update.content)?,
        target_condition: &update.target_condition,
        priority: update.priority,
        metrics: MetricsRequest {
            queries: &update.metrics,
        },
        etag: Some(update.etag.as_str()).filter(|v| !v.is_empty()),
    };
    Ok(serde_json::to_vec(&req)?)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueriesTestRequest<'a> {
    target_condition: &'a str,
    custom_metric_queries: &'a BTreeMap<String, String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueriesTestResponse {
    target_condition_error: Option<String>,
    custom_metric_query_errors: Option<BTreeMap<String, String>>,
}

/// Encode the request body of a query test.
pub fn encode_test_queries(input: &ConfigurationQueriesTestInput) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&QueriesTestRequest {
        target_condition: &input.target_condition,
        custom_metric_queries: &input.custom_metric_queries,
    })?)
}

/// Decode the response body of a query test.
pub fn decode_test_queries(body: &[u8]) -> Result<ConfigurationQueriesTestResponse> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ConfigurationQueriesTestResponse::default());
    }

    let resp: QueriesTestResponse = serde_json::from_slice(body)
        .map_err(|e| Error::json("failed to decode query test response").with_source(e))?;
    Ok(ConfigurationQueriesTestResponse {
        target_condition_error: resp.target_condition_error.unwrap_or_default(),
        custom_metric_query_errors: resp.custom_metric_query_errors.unwrap_or_default(),
    })
}

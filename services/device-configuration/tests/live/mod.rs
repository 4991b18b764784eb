use std::collections::BTreeMap;
use std::env;

use anyhow::Result;
use iothub_device_configuration::{
    Config, ConfigurationAdd, ConfigurationContent, ConfigurationQueriesTestInput,
    ConfigurationUpdate, DeviceConfigurationClient,
};
use iothub_http_send_reqwest::ReqwestHttpSend;
use iothub_service_core::{Context, ErrorKind, OsEnv};
use log::warn;

fn init_client() -> Option<DeviceConfigurationClient> {
    let _ = env_logger::builder().is_test(true).try_init();

    if env::var("IOTHUB_DEVICE_CONFIGURATION_TEST").unwrap_or_default() != "on" {
        return None;
    }

    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let config = Config::default()
        .from_env(&ctx)
        .expect("env IOTHUB_CONNECTION_STRING must be valid");
    let client = DeviceConfigurationClient::new(ctx, &config)
        .expect("env IOTHUB_CONNECTION_STRING must be set");

    Some(client)
}

#[tokio::test]
async fn test_live_configuration_lifecycle() -> Result<()> {
    let Some(client) = init_client() else {
        warn!("IOTHUB_DEVICE_CONFIGURATION_TEST is not set, skipped");
        return Ok(());
    };

    let id = format!("iothub-rs-{}", uuid::Uuid::new_v4().simple());
    let created = client
        .add_configuration(&ConfigurationAdd {
            configuration_id: id.clone(),
            target_condition: "tags.environment='iothub-rs-test'".to_string(),
            content: ConfigurationContent {
                device_content: r#"{"properties.desired.settings":{"interval":30}}"#.to_string(),
                modules_content: String::new(),
            },
            labels: BTreeMap::from([("suite".to_string(), "live".to_string())]),
            priority: 1,
            metrics: BTreeMap::from([(
                "reported".to_string(),
                "SELECT deviceId FROM devices WHERE properties.reported.interval = 30"
                    .to_string(),
            )]),
        })
        .await?;
    assert_eq!(created.configuration_id, id);

    let fetched = client.get_configuration(&id).await?;
    assert_eq!(fetched.labels["suite"], "live");

    let updated = client
        .update_configuration(&ConfigurationUpdate {
            configuration_id: id.clone(),
            target_condition: fetched.target_condition.clone(),
            content: fetched.content.clone(),
            labels: BTreeMap::from([("suite".to_string(), "live-updated".to_string())]),
            priority: 2,
            metrics: fetched.metrics.queries.clone(),
            etag: fetched.etag.clone(),
        })
        .await?;
    assert_eq!(updated.priority, 2);

    let listed = client.get_configurations(100).await?;
    assert!(listed.iter().any(|c| c.configuration_id == id));

    let checked = client
        .test_queries(&ConfigurationQueriesTestInput {
            target_condition: "tags.environment='iothub-rs-test'".to_string(),
            custom_metric_queries: BTreeMap::new(),
        })
        .await?;
    assert!(checked.target_condition_error.is_empty());

    client.delete_configuration(&id).await?;

    let err = client.get_configuration(&id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigurationNotExist);

    Ok(())
}

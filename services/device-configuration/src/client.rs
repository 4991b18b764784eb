use bytes::Bytes;
use iothub_service_core::{Context, Error, Result};
use log::debug;

use crate::codec;
use crate::executor::Executor;
use crate::{
    Config, Configuration, ConfigurationAdd, ConfigurationQueriesTestInput,
    ConfigurationQueriesTestResponse, ConfigurationUpdate, Credential, OperationKind, Target,
};

/// DeviceConfigurationClient manages the device configurations of one IoT hub.
///
/// The client owns a copy of the hub hostname, key name and shared access key
/// and nothing else. Dropping it releases them.
///
/// ```no_run
/// use iothub_device_configuration::{Config, DeviceConfigurationClient};
/// use iothub_http_send_reqwest::ReqwestHttpSend;
/// use iothub_service_core::{Context, OsEnv};
///
/// # async fn example() -> iothub_service_core::Result<()> {
/// let ctx = Context::new()
///     .with_http_send(ReqwestHttpSend::default())
///     .with_env(OsEnv);
/// let config = Config::default().from_env(&ctx)?;
/// let client = DeviceConfigurationClient::new(ctx, &config)?;
///
/// let configs = client.get_configurations(20).await?;
/// for c in configs {
///     println!("{} (priority {})", c.configuration_id, c.priority);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DeviceConfigurationClient {
    executor: Executor,
}

impl DeviceConfigurationClient {
    /// Create a client for the hub described by `config`.
    ///
    /// Fails with `InvalidArg` if any of hostname, iothub name, iothub suffix,
    /// key name or shared access key is missing.
    pub fn new(ctx: Context, config: &Config) -> Result<Self> {
        let credential = Credential::from_config(config)?;
        Ok(Self::with_credential(ctx, credential))
    }

    /// Create a client from an already validated credential.
    pub fn with_credential(ctx: Context, credential: Credential) -> Self {
        Self {
            executor: Executor::new(ctx, credential),
        }
    }

    /// The credential this client signs requests with.
    pub fn credential(&self) -> &Credential {
        self.executor.credential()
    }

    /// Read the configuration `configuration_id`.
    ///
    /// A successful response without an id is reported as `ConfigurationNotExist`.
    pub async fn get_configuration(&self, configuration_id: &str) -> Result<Configuration> {
        if configuration_id.is_empty() {
            return Err(Error::invalid_arg("configuration id is required"));
        }

        let body = self
            .executor
            .execute(
                OperationKind::Get,
                Target::Configuration(configuration_id),
                Bytes::new(),
            )
            .await?;

        let mut config = Configuration::default();
        codec::decode_into(&body, &mut config)?;
        if config.configuration_id.is_empty() {
            debug!("configuration {configuration_id} response carries no id");
            config.free_members();
            return Err(Error::configuration_not_exist(format!(
                "configuration {configuration_id} does not exist"
            )));
        }

        Ok(config)
    }

    /// List up to `max_count` configurations.
    pub async fn get_configurations(&self, max_count: usize) -> Result<Vec<Configuration>> {
        if max_count == 0 {
            return Err(Error::invalid_arg("max count must be greater than zero"));
        }

        let body = self
            .executor
            .execute(
                OperationKind::GetList,
                Target::List { top: max_count },
                Bytes::new(),
            )
            .await?;

        codec::decode_list(&body)
    }

    /// Create a configuration and return it as stored by the service.
    pub async fn add_configuration(&self, add: &ConfigurationAdd) -> Result<Configuration> {
        if add.configuration_id.is_empty() {
            return Err(Error::invalid_arg("configuration id is required"));
        }

        let body = codec::encode_add(add)?;
        let resp = self
            .executor
            .execute(
                OperationKind::Add,
                Target::Configuration(&add.configuration_id),
                body.into(),
            )
            .await?;

        codec::decode(&resp)
    }

    /// Replace a configuration and return it as stored by the service.
    pub async fn update_configuration(
        &self,
        update: &ConfigurationUpdate,
    ) -> Result<Configuration> {
        if update.configuration_id.is_empty() {
            return Err(Error::invalid_arg("configuration id is required"));
        }

        let body = codec::encode_update(update)?;
        let resp = self
            .executor
            .execute(
                OperationKind::Update,
                Target::Configuration(&update.configuration_id),
                body.into(),
            )
            .await?;

        codec::decode(&resp)
    }

    /// Delete the configuration `configuration_id`.
    pub async fn delete_configuration(&self, configuration_id: &str) -> Result<()> {
        if configuration_id.is_empty() {
            return Err(Error::invalid_arg("configuration id is required"));
        }

        self.executor
            .execute(
                OperationKind::Delete,
                Target::Configuration(configuration_id),
                Bytes::new(),
            )
            .await?;
        Ok(())
    }

    /// Validate a target condition and custom metric queries without creating anything.
    pub async fn test_queries(
        &self,
        input: &ConfigurationQueriesTestInput,
    ) -> Result<ConfigurationQueriesTestResponse> {
        let body = codec::encode_test_queries(input)?;
        let resp = self
            .executor
            .execute(OperationKind::TestQueries, Target::TestQueries, body.into())
            .await?;

        codec::decode_test_queries(&resp)
    }
}

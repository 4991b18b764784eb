//! Azure IoT Hub device configuration client
//!
//! This crate manages the configurations an IoT hub applies to its devices:
//! - Read, list, create, replace and delete configurations
//! - Validate target conditions and custom metric queries
//! - Authenticate every request with a SAS token derived from a shared access policy
//!
//! # Example
//!
//! ```rust,no_run
//! use anyhow::Result;
//! use iothub_device_configuration::{
//!     Config, ConfigurationAdd, ConfigurationContent, DeviceConfigurationClient,
//! };
//! use iothub_http_send_reqwest::ReqwestHttpSend;
//! use iothub_service_core::Context;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new().with_http_send(ReqwestHttpSend::default());
//!
//!     let config = Config::try_from_connection_string(
//!         "HostName=myhub.azure-devices.net;SharedAccessKeyName=iothubowner;SharedAccessKey=c2VjcmV0",
//!     )?;
//!     let client = DeviceConfigurationClient::new(ctx, &config)?;
//!
//!     let created = client
//!         .add_configuration(&ConfigurationAdd {
//!             configuration_id: "firmware-update".to_string(),
//!             target_condition: "tags.environment='test'".to_string(),
//!             content: ConfigurationContent {
//!                 device_content: r#"{"properties.desired.firmware":{"version":"1.2"}}"#
//!                     .to_string(),
//!                 modules_content: String::new(),
//!             },
//!             priority: 10,
//!             ..Default::default()
//!         })
//!         .await?;
//!     println!("created {} with etag {}", created.configuration_id, created.etag);
//!
//!     client.delete_configuration("firmware-update").await?;
//!     Ok(())
//! }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

mod constants;

mod config;
pub use config::Config;

mod connection_string;

mod credential;
pub use credential::Credential;

mod sas;
pub use sas::SharedAccessSignature;

mod request;
pub use request::{OperationKind, RequestDescriptor, Target};

mod configuration;
pub use configuration::{
    Configuration, ConfigurationAdd, ConfigurationContent, ConfigurationMetrics,
    ConfigurationQueriesTestInput, ConfigurationQueriesTestResponse, ConfigurationUpdate,
};

pub mod codec;

mod executor;

mod client;
pub use client::DeviceConfigurationClient;

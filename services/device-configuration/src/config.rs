use std::fmt::{Debug, Formatter};

use iothub_service_core::utils::Redact;
use iothub_service_core::{Context, Result};

use crate::connection_string;
use crate::constants::*;

/// Config carries the service credential a [`crate::DeviceConfigurationClient`] is created from.
///
/// Every field is optional here; the client refuses to be created unless all
/// of them are present.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// `hostname` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - `HostName` of the connection string in [`IOTHUB_CONNECTION_STRING`]
    /// - env value: [`IOTHUB_HOSTNAME`]
    pub hostname: Option<String>,
    /// The IoT Hub name, the first label of `hostname`.
    pub iothub_name: Option<String>,
    /// The IoT Hub DNS suffix, `hostname` without its first label.
    pub iothub_suffix: Option<String>,
    /// `shared_access_key_name` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - `SharedAccessKeyName` of the connection string in [`IOTHUB_CONNECTION_STRING`]
    /// - env value: [`IOTHUB_SHARED_ACCESS_KEY_NAME`]
    pub shared_access_key_name: Option<String>,
    /// `shared_access_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - `SharedAccessKey` of the connection string in [`IOTHUB_CONNECTION_STRING`]
    /// - env value: [`IOTHUB_SHARED_ACCESS_KEY`]
    pub shared_access_key: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("hostname", &self.hostname)
            .field("iothub_name", &self.iothub_name)
            .field("iothub_suffix", &self.iothub_suffix)
            .field("shared_access_key_name", &self.shared_access_key_name)
            .field("shared_access_key", &Redact::from(&self.shared_access_key))
            .finish()
    }
}

impl Config {
    /// Load config from env.
    ///
    /// Fields already set are kept. The connection string is read first, the
    /// individual variables only fill what it left unset.
    pub fn from_env(mut self, ctx: &Context) -> Result<Self> {
        if let Some(conn_str) = ctx.env_var(IOTHUB_CONNECTION_STRING) {
            let parsed = connection_string::parse(&conn_str)?;
            self.hostname = self.hostname.or(parsed.hostname);
            self.iothub_name = self.iothub_name.or(parsed.iothub_name);
            self.iothub_suffix = self.iothub_suffix.or(parsed.iothub_suffix);
            self.shared_access_key_name = self
                .shared_access_key_name
                .or(parsed.shared_access_key_name);
            self.shared_access_key = self.shared_access_key.or(parsed.shared_access_key);
        }

        if self.hostname.is_none() {
            if let Some(v) = ctx.env_var(IOTHUB_HOSTNAME) {
                if let Some((name, suffix)) = v.split_once('.') {
                    self.iothub_name.get_or_insert_with(|| name.to_string());
                    self.iothub_suffix.get_or_insert_with(|| suffix.to_string());
                }
                self.hostname = Some(v);
            }
        }

        if self.shared_access_key_name.is_none() {
            self.shared_access_key_name = ctx.env_var(IOTHUB_SHARED_ACCESS_KEY_NAME);
        }

        if self.shared_access_key.is_none() {
            self.shared_access_key = ctx.env_var(IOTHUB_SHARED_ACCESS_KEY);
        }

        Ok(self)
    }

    /// Parses an IoT Hub service connection string into a configuration object.
    ///
    /// An example of a connection string looks like:
    ///
    /// ```txt
    /// HostName=myhub.azure-devices.net;
    /// SharedAccessKeyName=iothubowner;
    /// SharedAccessKey=c2VjcmV0LWtleQ==
    /// ```
    pub fn try_from_connection_string(conn_str: &str) -> Result<Self> {
        connection_string::parse(conn_str)
    }
}

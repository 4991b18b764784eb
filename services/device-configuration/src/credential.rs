use std::fmt::{Debug, Formatter};

use iothub_service_core::utils::Redact;
use iothub_service_core::{Error, Result, SigningCredential};

use crate::Config;

/// Credential is the authentication context every request is signed with.
///
/// It is copied out of a [`Config`] once and never changes afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    hostname: String,
    shared_access_key: String,
    key_name: String,
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("hostname", &self.hostname)
            .field("shared_access_key", &Redact::from(&self.shared_access_key))
            .field("key_name", &self.key_name)
            .finish()
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        !self.hostname.is_empty() && !self.shared_access_key.is_empty() && !self.key_name.is_empty()
    }
}

impl Credential {
    /// Create a credential from its three parts.
    pub fn new(hostname: &str, shared_access_key: &str, key_name: &str) -> Result<Self> {
        let cred = Self {
            hostname: hostname.to_string(),
            shared_access_key: shared_access_key.to_string(),
            key_name: key_name.to_string(),
        };
        if !cred.is_valid() {
            return Err(Error::invalid_arg(
                "hostname, shared access key and key name must not be empty",
            ));
        }

        Ok(cred)
    }

    /// Copy the credential out of a service config.
    ///
    /// `iothub_name` and `iothub_suffix` are not used for signing but must be
    /// present, so that a half-parsed connection string is rejected here.
    pub fn from_config(config: &Config) -> Result<Self> {
        let hostname = required(&config.hostname, "hostname")?;
        required(&config.iothub_name, "iothub_name")?;
        required(&config.iothub_suffix, "iothub_suffix")?;
        let key_name = required(&config.shared_access_key_name, "shared_access_key_name")?;
        let shared_access_key = required(&config.shared_access_key, "shared_access_key")?;

        Self::new(hostname, shared_access_key, key_name)
    }

    /// The IoT Hub hostname, for example `myhub.azure-devices.net`.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// The base64 encoded shared access key.
    pub fn shared_access_key(&self) -> &str {
        &self.shared_access_key
    }

    /// The shared access policy name.
    pub fn key_name(&self) -> &str {
        &self.key_name
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::invalid_arg(format!("{name} is required"))),
    }
}

use http::header::AUTHORIZATION;
use http::HeaderValue;
use iothub_service_core::hash;
use iothub_service_core::time::{self, DateTime};
use iothub_service_core::{Error, Result};

use crate::Credential;

/// SharedAccessSignature produces the token that authorizes a single service request.
///
/// - [Control access to IoT Hub using SAS tokens](https://learn.microsoft.com/en-us/azure/iot-hub/authenticate-authorize-sas)
pub struct SharedAccessSignature {
    key: Vec<u8>,
    resource_uri: String,
    key_name: String,
    expiry: DateTime,
}

impl SharedAccessSignature {
    /// Create a SAS signer scoped to `resource_uri`.
    ///
    /// Fails if the key is empty or not valid base64; the key is decoded once here.
    pub fn new(key: &str, resource_uri: &str, key_name: &str, expiry: DateTime) -> Result<Self> {
        if key.is_empty() || resource_uri.is_empty() || key_name.is_empty() {
            return Err(Error::http_api(
                "key, resource uri and key name are required to create a SAS signer",
            ));
        }
        let key = hash::base64_decode(key)
            .map_err(|e| Error::http_api("shared access key is not valid base64").with_source(e))?;

        Ok(Self {
            key,
            resource_uri: resource_uri.to_string(),
            key_name: key_name.to_string(),
            expiry,
        })
    }

    /// Create a SAS signer for the credential's hub.
    pub fn for_credential(cred: &Credential, expiry: DateTime) -> Result<Self> {
        Self::new(
            cred.shared_access_key(),
            cred.hostname(),
            cred.key_name(),
            expiry,
        )
    }

    /// Build the token value sent in the `Authorization` header.
    pub fn token(&self) -> String {
        let resource = urlencoded(&self.resource_uri);
        let expiry = time::unix_timestamp(self.expiry);
        let string_to_sign = format!("{resource}\n{expiry}");
        let signature = hash::base64_hmac_sha256(&self.key, string_to_sign.as_bytes());

        format!(
            "SharedAccessSignature sr={resource}&sig={}&se={expiry}&skn={}",
            urlencoded(&signature),
            urlencoded(&self.key_name),
        )
    }

    /// Set the `Authorization` header of the request to a fresh token.
    pub fn apply(&self, parts: &mut http::request::Parts) -> Result<()> {
        let mut value = HeaderValue::try_from(self.token())
            .map_err(|e| Error::http_api("failed to build authorization header").with_source(e))?;
        value.set_sensitive(true);
        parts.headers.insert(AUTHORIZATION, value);

        Ok(())
    }
}

fn urlencoded(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

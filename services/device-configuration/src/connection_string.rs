use std::collections::HashMap;

use iothub_service_core::{Error, Result};

use crate::constants::*;
use crate::Config;

/// Parses an IoT Hub service connection string.
///
/// ```txt
/// HostName=myhub.azure-devices.net;SharedAccessKeyName=iothubowner;SharedAccessKey=c2VjcmV0
/// ```
///
/// Missing fields are left unset; [`crate::DeviceConfigurationClient::new`] decides
/// which of them are required.
pub(crate) fn parse(conn_str: &str) -> Result<Config> {
    let key_values = parse_into_key_values(conn_str)?;

    let hostname = key_values.get(HOST_NAME).cloned();
    let (iothub_name, iothub_suffix) = match hostname.as_deref().and_then(|h| h.split_once('.')) {
        Some((name, suffix)) if !name.is_empty() && !suffix.is_empty() => {
            (Some(name.to_string()), Some(suffix.to_string()))
        }
        _ => (None, None),
    };

    Ok(Config {
        hostname,
        iothub_name,
        iothub_suffix,
        shared_access_key_name: key_values.get(SHARED_ACCESS_KEY_NAME).cloned(),
        shared_access_key: key_values.get(SHARED_ACCESS_KEY).cloned(),
    })
}

fn parse_into_key_values(conn_str: &str) -> Result<HashMap<String, String>> {
    conn_str
        .trim()
        .replace('\n', "")
        .split(';')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(|field| {
            // Keys are base64 and may end with `=`, so only split on the first one.
            let (key, value) = field.split_once('=').ok_or_else(|| {
                Error::invalid_arg(format!(
                    "invalid connection string, expected '=' in field: {field}"
                ))
            })?;
            Ok((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

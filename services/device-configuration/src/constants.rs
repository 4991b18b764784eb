use std::time::Duration;

use http::HeaderName;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

// Env values used to load the service connection.
pub const IOTHUB_CONNECTION_STRING: &str = "IOTHUB_CONNECTION_STRING";
pub const IOTHUB_HOSTNAME: &str = "IOTHUB_HOSTNAME";
pub const IOTHUB_SHARED_ACCESS_KEY_NAME: &str = "IOTHUB_SHARED_ACCESS_KEY_NAME";
pub const IOTHUB_SHARED_ACCESS_KEY: &str = "IOTHUB_SHARED_ACCESS_KEY";

// Connection string fields.
pub const HOST_NAME: &str = "HostName";
pub const SHARED_ACCESS_KEY_NAME: &str = "SharedAccessKeyName";
pub const SHARED_ACCESS_KEY: &str = "SharedAccessKey";

/// Query parameter sent with every request.
pub const API_VERSION: &str = "api-version=2018-06-30";

// Headers.
pub const REQUEST_ID: HeaderName = HeaderName::from_static("request-id");
pub const AUTHORIZATION_PLACEHOLDER: &str = " ";
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";
pub const IF_MATCH_ANY: &str = "'*'";
pub const USER_AGENT_VALUE: &str = concat!("iothubserviceclient-rs/", env!("CARGO_PKG_VERSION"));

/// Content type assumed when the service does not report one.
pub const DEFAULT_CONTENT_TYPE: &str = "assignment";
pub const SCHEMA_VERSION: &str = "1.0";

/// Lifetime of the SAS token generated for a single request.
pub const SAS_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// Configuration ids are placed in the path; everything but the unreserved set is escaped.
pub static PATH_SEGMENT_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

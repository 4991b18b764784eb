use std::fmt;

use http::header::{AUTHORIZATION, CONTENT_TYPE, IF_MATCH, USER_AGENT};
use http::{HeaderMap, HeaderValue, Method};
use iothub_service_core::{Error, Result};
use percent_encoding::utf8_percent_encode;

use crate::constants::*;

/// The kind of request sent to the configurations endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// List up to `top` configurations.
    GetList,
    /// Read a single configuration.
    Get,
    /// Create a configuration.
    Add,
    /// Replace a configuration.
    Update,
    /// Delete a configuration.
    Delete,
    /// Validate a target condition and custom metric queries.
    TestQueries,
}

impl OperationKind {
    /// The HTTP verb used for this kind.
    pub fn method(&self) -> Method {
        match self {
            OperationKind::GetList | OperationKind::Get => Method::GET,
            OperationKind::Add | OperationKind::Update => Method::PUT,
            OperationKind::Delete => Method::DELETE,
            OperationKind::TestQueries => Method::POST,
        }
    }

    /// Whether an unconditional `If-Match` precondition is attached.
    pub fn requires_if_match(&self) -> bool {
        matches!(
            self,
            OperationKind::Add | OperationKind::Update | OperationKind::Delete
        )
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::GetList => write!(f, "GET_LIST"),
            OperationKind::Get => write!(f, "GET"),
            OperationKind::Add => write!(f, "ADD"),
            OperationKind::Update => write!(f, "UPDATE"),
            OperationKind::Delete => write!(f, "DELETE"),
            OperationKind::TestQueries => write!(f, "TEST_QUERIES"),
        }
    }
}

/// Identifies the resource an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    /// The whole collection, limited to `top` entries.
    List {
        /// Maximum number of configurations to return.
        top: usize,
    },
    /// A single configuration by id.
    Configuration(&'a str),
    /// The query validation endpoint.
    TestQueries,
}

/// RequestDescriptor is everything needed to issue one request, except the host and body.
#[derive(Debug)]
pub struct RequestDescriptor {
    /// The path and query relative to the hub hostname.
    pub relative_path: String,
    /// HTTP method.
    pub method: Method,
    /// Request headers; `Authorization` holds a placeholder until the request is signed.
    pub headers: HeaderMap,
}

impl RequestDescriptor {
    /// Build the descriptor for `kind` against `target`.
    pub fn build(kind: OperationKind, target: Target<'_>) -> Result<Self> {
        let relative_path = relative_path(kind, target)?;
        let headers = build_headers(kind)?;

        Ok(Self {
            relative_path,
            method: kind.method(),
            headers,
        })
    }
}

/// Resolve the path and query for `kind`.
pub fn relative_path(kind: OperationKind, target: Target<'_>) -> Result<String> {
    match (kind, target) {
        (OperationKind::GetList, Target::List { top }) => {
            Ok(format!("/configurations/?top={top}&{API_VERSION}"))
        }
        (
            OperationKind::Get | OperationKind::Add | OperationKind::Update | OperationKind::Delete,
            Target::Configuration(id),
        ) => {
            if id.is_empty() {
                return Err(Error::unexpected("configuration id must not be empty"));
            }
            let id = utf8_percent_encode(id, &PATH_SEGMENT_ENCODE_SET);
            Ok(format!("/configurations/{id}?{API_VERSION}"))
        }
        (OperationKind::TestQueries, Target::TestQueries) => {
            Ok(format!("/configurationstestQueries?{API_VERSION}"))
        }
        (kind, target) => Err(Error::unexpected(format!(
            "operation {kind} can't be applied to {target:?}"
        ))),
    }
}

/// Build the header set for `kind`.
///
/// The map is only returned once every header has been inserted.
pub fn build_headers(kind: OperationKind) -> Result<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(5);

    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_static(AUTHORIZATION_PLACEHOLDER),
    );
    let request_id = uuid::Uuid::new_v4().to_string();
    headers.insert(REQUEST_ID, HeaderValue::try_from(request_id)?);
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));

    if kind.requires_if_match() {
        headers.insert(IF_MATCH, HeaderValue::from_static(IF_MATCH_ANY));
    }

    Ok(headers)
}

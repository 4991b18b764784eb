use bytes::Bytes;
use http::{StatusCode, Uri};
use iothub_service_core::time::{self, DateTime};
use iothub_service_core::{Context, Error, Result};
use log::{debug, warn};

use crate::constants::SAS_TOKEN_LIFETIME;
use crate::request::{build_headers, relative_path};
use crate::{Credential, OperationKind, SharedAccessSignature, Target};

/// Executor performs one SAS-authenticated round trip against the hub.
///
/// Every intermediate value is owned by the call frame and dropped on every
/// exit path, so a failure at any step leaves nothing behind.
#[derive(Debug, Clone)]
pub(crate) struct Executor {
    ctx: Context,
    credential: Credential,
    time: Option<DateTime>,
}

impl Executor {
    pub(crate) fn new(ctx: Context, credential: Credential) -> Self {
        Self {
            ctx,
            credential,
            time: None,
        }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub(crate) fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    pub(crate) fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Send `body` for `kind` against `target` and return the response body.
    pub(crate) async fn execute(
        &self,
        kind: OperationKind,
        target: Target<'_>,
        body: Bytes,
    ) -> Result<Bytes> {
        let headers = build_headers(kind).map_err(|e| {
            Error::unexpected(format!("failed to build headers for {kind}")).with_source(e)
        })?;

        let now = self.time.unwrap_or_else(time::now);
        let lifetime = chrono::TimeDelta::from_std(SAS_TOKEN_LIFETIME)
            .map_err(|e| Error::unexpected("invalid token lifetime").with_source(e))?;
        let expiry = now + lifetime;
        let sas = SharedAccessSignature::for_credential(&self.credential, expiry)?;

        let endpoint = endpoint(self.credential.hostname())?;

        let path = relative_path(kind, target)?;

        let uri: Uri = format!("{endpoint}{path}").parse().map_err(|e| {
            Error::http_api(format!("failed to build request uri for {kind}")).with_source(e)
        })?;

        let (mut parts, body) = http::Request::builder()
            .method(kind.method())
            .uri(uri)
            .body(body)?
            .into_parts();
        parts.headers = headers;
        sas.apply(&mut parts)?;

        debug!("sending {kind} request: {} {}", parts.method, parts.uri);
        let resp = self
            .ctx
            .http_send(http::Request::from_parts(parts, body))
            .await
            .map_err(|e| {
                Error::http_api(format!("failed to execute {kind} request")).with_source(e)
            })?;

        let status = resp.status();
        debug!("{kind} request finished with status {status}");
        check_status(kind, status)?;

        Ok(resp.into_body())
    }
}

/// The hub endpoint, validated before any request is issued.
fn endpoint(hostname: &str) -> Result<String> {
    let endpoint = format!("https://{hostname}");
    endpoint
        .parse::<Uri>()
        .map_err(|e| Error::http_api(format!("invalid hub hostname: {hostname}")).with_source(e))?;
    Ok(endpoint)
}

/// Map a response status to the result of `kind`.
pub(crate) fn check_status(kind: OperationKind, status: StatusCode) -> Result<()> {
    let success = match kind {
        OperationKind::GetList | OperationKind::Get | OperationKind::TestQueries => {
            status == StatusCode::OK
        }
        OperationKind::Add | OperationKind::Update | OperationKind::Delete => status.is_success(),
    };
    if success {
        return Ok(());
    }

    warn!("{kind} request failed with status {status}");
    let err = match (status, kind) {
        (StatusCode::NOT_FOUND, _) => Error::configuration_not_exist(format!(
            "{kind} request failed with status {status}"
        )),
        (StatusCode::CONFLICT, _) | (StatusCode::PRECONDITION_FAILED, OperationKind::Add) => {
            Error::configuration_exist(format!("{kind} request failed with status {status}"))
        }
        (StatusCode::PRECONDITION_FAILED, OperationKind::Update | OperationKind::Delete) => {
            Error::configuration_not_exist(format!(
                "{kind} request failed with status {status}"
            ))
        }
        _ => Error::unexpected(format!("{kind} request failed with status {status}")),
    };
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use iothub_service_core::{ErrorKind, HttpSend};
    use std::sync::{Arc, Mutex};
    use test_case::test_case;

    #[derive(Debug, Default)]
    struct Recorder {
        requests: Mutex<Vec<http::Request<Bytes>>>,
        status: u16,
    }

    #[derive(Debug, Clone)]
    struct RecordingHttpSend(Arc<Recorder>);

    #[async_trait]
    impl HttpSend for RecordingHttpSend {
        async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
            self.0.requests.lock().unwrap().push(req);
            Ok(http::Response::builder()
                .status(self.0.status)
                .body(Bytes::from_static(b"{}"))
                .unwrap())
        }
    }

    fn executor(hostname: &str, key: &str, status: u16) -> (Executor, Arc<Recorder>) {
        let recorder = Arc::new(Recorder {
            status,
            ..Default::default()
        });
        let ctx = Context::new().with_http_send(RecordingHttpSend(recorder.clone()));
        let cred = Credential::new(hostname, key, "iothubowner").unwrap();
        (Executor::new(ctx, cred), recorder)
    }

    #[tokio::test]
    async fn test_execute_signs_request() {
        let (executor, recorder) = executor("hub.azure-devices.net", "c2VjcmV0", 200);
        let now = time::parse_rfc3339("2022-03-01T08:12:34Z").unwrap();
        let executor = executor.with_time(now);

        let body = executor
            .execute(OperationKind::Get, Target::Configuration("config-1"), Bytes::new())
            .await
            .unwrap();
        assert_eq!(body, Bytes::from_static(b"{}"));

        let requests = recorder.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.method(), http::Method::GET);
        assert_eq!(
            req.uri().to_string(),
            "https://hub.azure-devices.net/configurations/config-1?api-version=2018-06-30"
        );
        let auth = req.headers()[http::header::AUTHORIZATION].to_str().unwrap();
        assert!(auth.starts_with("SharedAccessSignature sr=hub.azure-devices.net&sig="));
        assert!(auth.contains("&se=1646125954&"));
        assert!(auth.ends_with("&skn=iothubowner"));
        assert!(req.headers()[http::header::AUTHORIZATION].is_sensitive());
    }

    #[tokio::test]
    async fn test_invalid_key_fails_before_send() {
        let (executor, recorder) = executor("hub.azure-devices.net", "not base64!", 200);

        let err = executor
            .execute(OperationKind::Delete, Target::Configuration("config-1"), Bytes::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HttpApi);
        assert!(recorder.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_hostname_fails_before_send() {
        let (executor, recorder) = executor("bad host", "c2VjcmV0", 200);

        let err = executor
            .execute(OperationKind::Delete, Target::Configuration("config-1"), Bytes::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HttpApi);
        assert!(recorder.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_path_fails_before_send() {
        let (executor, recorder) = executor("hub.azure-devices.net", "c2VjcmV0", 200);

        let err = executor
            .execute(OperationKind::Delete, Target::TestQueries, Bytes::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unexpected);
        assert!(recorder.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let cred = Credential::new("hub.azure-devices.net", "c2VjcmV0", "iothubowner").unwrap();
        let executor = Executor::new(Context::new(), cred);

        let err = executor
            .execute(OperationKind::Get, Target::Configuration("config-1"), Bytes::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HttpApi);
    }

    #[test_case(OperationKind::Get, 200, None)]
    #[test_case(OperationKind::Get, 204, Some(ErrorKind::Unexpected))]
    #[test_case(OperationKind::GetList, 200, None)]
    #[test_case(OperationKind::TestQueries, 200, None)]
    #[test_case(OperationKind::Add, 200, None)]
    #[test_case(OperationKind::Add, 201, None)]
    #[test_case(OperationKind::Delete, 204, None)]
    #[test_case(OperationKind::Get, 404, Some(ErrorKind::ConfigurationNotExist))]
    #[test_case(OperationKind::Delete, 404, Some(ErrorKind::ConfigurationNotExist))]
    #[test_case(OperationKind::Add, 409, Some(ErrorKind::ConfigurationExist))]
    #[test_case(OperationKind::Add, 412, Some(ErrorKind::ConfigurationExist))]
    #[test_case(OperationKind::Update, 412, Some(ErrorKind::ConfigurationNotExist))]
    #[test_case(OperationKind::Delete, 412, Some(ErrorKind::ConfigurationNotExist))]
    #[test_case(OperationKind::Get, 412, Some(ErrorKind::Unexpected))]
    #[test_case(OperationKind::Update, 400, Some(ErrorKind::Unexpected))]
    #[test_case(OperationKind::Get, 500, Some(ErrorKind::Unexpected))]
    fn test_check_status(kind: OperationKind, status: u16, expected: Option<ErrorKind>) {
        let status = StatusCode::from_u16(status).unwrap();
        let actual = check_status(kind, status).err().map(|e| e.kind());
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_unmapped_status_in_message() {
        let err = check_status(OperationKind::Get, StatusCode::INTERNAL_SERVER_ERROR).unwrap_err();
        assert!(err.message().contains("500"));
    }
}

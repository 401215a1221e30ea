//! Executes core `HttpRequest`s with ureq on tokio's blocking pool.

use tasksync_core::{HttpMethod, HttpOutcome, HttpRequest, HttpResponse, TransportError};
use tracing::debug;

fn agent(req: &HttpRequest) -> ureq::Agent {
    let mut config = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(Some(req.timeout));
    if !req.verify_tls {
        config = config.tls_config(
            ureq::tls::TlsConfig::builder()
                .disable_verification(true)
                .build(),
        );
    }
    config.build().new_agent()
}

fn map_error(e: ureq::Error) -> TransportError {
    match e {
        ureq::Error::Timeout(_) => TransportError::Timeout,
        ureq::Error::Tls(msg) => TransportError::Tls(msg.to_string()),
        other => TransportError::Connect(other.to_string()),
    }
}

/// Blocking execution. Any HTTP status is a response; only failures to
/// complete the exchange are errors.
pub fn execute_blocking(req: &HttpRequest) -> HttpOutcome {
    let agent = agent(req);
    // ureq computes Content-Length from the body itself.
    let headers = req
        .headers
        .iter()
        .filter(|(k, _)| !k.eq_ignore_ascii_case("content-length"));

    debug!(method = req.method.as_str(), url = %req.url, "sending request");
    let result = match req.method {
        HttpMethod::Get => {
            let mut builder = agent.get(&req.url);
            for (k, v) in headers {
                builder = builder.header(k, v);
            }
            builder.call()
        }
        HttpMethod::Post => {
            let mut builder = agent.post(&req.url);
            for (k, v) in headers {
                builder = builder.header(k, v);
            }
            builder.send(req.body.as_deref().unwrap_or_default())
        }
    };

    let mut response = result.map_err(map_error)?;
    let status = response.status().as_u16();
    let body = response.body_mut().read_to_vec().map_err(map_error)?;
    Ok(HttpResponse::new(status, body))
}

pub async fn execute(req: HttpRequest) -> HttpOutcome {
    tokio::task::spawn_blocking(move || execute_blocking(&req))
        .await
        .unwrap_or_else(|e| Err(TransportError::Connect(e.to_string())))
}

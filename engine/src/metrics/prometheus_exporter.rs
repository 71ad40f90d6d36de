//! A minimal `/metrics` HTTP endpoint, the way the teacher's
//! `chain::metrics::prometheus` exporter is wired: a bare `hyper`
//! service rather than a full web framework, since this crate exposes
//! exactly one route.

use std::convert::Infallible;
use std::net::SocketAddr;

use bytes::Bytes;
use http_body_util::Full;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use prometheus::{Encoder, TextEncoder};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use super::EngineMetrics;

async fn handle(
    metrics: EngineMetrics,
    req: Request<hyper::body::Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    if req.uri().path() != "/metrics" {
        return Ok(Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Full::new(Bytes::new()))
            .expect("static response is well-formed"));
    }

    let families = metrics.registry.gather();
    let encoder = TextEncoder::new();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&families, &mut buf) {
        error!(error = %e, "failed to encode metrics");
        return Ok(Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .body(Full::new(Bytes::new()))
            .expect("static response is well-formed"));
    }

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("content-type", encoder.format_type())
        .body(Full::new(Bytes::from(buf)))
        .expect("static response is well-formed"))
}

/// Serves `/metrics` on `addr` until the process exits. Connection
/// errors are logged and dropped; they never bring down the exporter.
pub async fn serve(metrics: EngineMetrics, addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "metrics endpoint listening");

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let metrics = metrics.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req| handle(metrics.clone(), req));
            if let Err(e) = hyper::server::conn::http1::Builder::new()
                .serve_connection(io, service)
                .await
            {
                warn!(error = %e, "metrics connection error");
            }
        });
    }
}

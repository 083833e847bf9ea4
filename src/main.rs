use anyhow::{Context, bail};
use axum::extract::DefaultBodyLimit;
use docchat::{api, config, logging, session::ChatService, storage::InMemoryStore};
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Ports probed in order when `SERVER_PORT` is unset.
const FALLBACK_PORTS: RangeInclusive<u16> = 4100..=4199;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::init_config();
    logging::init_tracing(logging::Console::Stdout);
    let config = config::get_config();
    let service = Arc::new(ChatService::from_config(InMemoryStore::new(), config));
    let app = api::create_router(service).layer(DefaultBodyLimit::max(config.max_upload_bytes));

    let (listener, port) = bind_listener(config.server_port, FALLBACK_PORTS).await?;
    tracing::info!(port, max_upload_bytes = config.max_upload_bytes, "docchat listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Bind the configured port, or the first free port in `fallback` when none is configured.
async fn bind_listener(
    configured: Option<u16>,
    fallback: RangeInclusive<u16>,
) -> anyhow::Result<(TcpListener, u16)> {
    if let Some(port) = configured {
        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .with_context(|| format!("SERVER_PORT {port} could not be bound"))?;
        let port = listener.local_addr()?.port();
        return Ok((listener, port));
    }

    let (first, last) = (*fallback.start(), *fallback.end());
    for port in fallback {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => return Ok((listener, port)),
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port taken");
            }
            Err(err) => return Err(err).with_context(|| format!("failed to bind port {port}")),
        }
    }
    bail!("no free port between {first} and {last}")
}

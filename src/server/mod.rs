use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::catalog::CatalogStore;
use crate::config::Config;
use crate::data::sources::PayloadSource;

pub mod api;
pub mod request;
pub mod routes;

use request::{read_request, RequestError, MAX_REQUEST_BYTES};

/// Everything a request handler reads: the catalog slot, where profiles come from, and settings.
pub struct AppState {
    pub store: Arc<CatalogStore>,
    pub source: Arc<dyn PayloadSource>,
    pub config: Config,
}

pub async fn run_server(state: Arc<AppState>) -> std::io::Result<()> {
    let listener = TcpListener::bind(&state.config.bind).await?;
    info!(bind = %state.config.bind, "warframe-stats server listening");
    serve(listener, state).await
}

/// Accept loop over an already bound listener.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    if let Err(err) = handle_connection(stream, state).await {
                        warn!(%peer, error = %err, "request error");
                    }
                });
            }
            Err(err) => warn!(error = %err, "connection failed"),
        }
    }
}

async fn handle_connection(mut stream: TcpStream, state: Arc<AppState>) -> std::io::Result<()> {
    let request = match read_request(&mut stream, MAX_REQUEST_BYTES).await {
        Ok(Some(request)) => request,
        Ok(None) => return Ok(()),
        Err(RequestError::Io(err)) => return Err(err),
        Err(err) => {
            debug!(error = %err, "rejected request");
            let response = routes::rejected_request_response(&err).to_http_string();
            stream.write_all(response.as_bytes()).await?;
            return stream.flush().await;
        }
    };
    debug!(method = %request.method, path = %request.path, body_bytes = request.body.len(), "request");

    // Handlers may rebuild the catalog, which is blocking work.
    let response = tokio::task::spawn_blocking(move || {
        routes::route_request(&state, &request.method, &request.path, &request.body).to_http_string()
    })
    .await
    .map_err(std::io::Error::other)?;

    stream.write_all(response.as_bytes()).await?;
    stream.flush().await?;
    Ok(())
}

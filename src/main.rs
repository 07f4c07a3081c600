use std::sync::Arc;

use anyhow::Context;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

#[derive(Clone)]
struct AppState {
    registry: prometheus::Registry,
    session: Arc<lotwatch::Session>,
}

fn main() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::fmt().with_ansi(false).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.json".to_string());

    runtime.block_on(async move {
        let config = lotwatch::Config::load(&config_path)
            .await
            .with_context(|| format!("Loading config from {:?}", config_path))?;

        tracing::info!(?config, "Starting");

        let registry = prometheus::Registry::new();
        let metrics = lotwatch::Metrics::new(&registry).context("Registering metrics")?;

        let session = Arc::new(
            lotwatch::Session::from_config(&config, metrics).context("Creating HTTP client")?,
        );

        tokio::spawn(lotwatch::session::gather(session.clone()));

        let app = axum::Router::new()
            .route("/metrics", axum::routing::get(metrics_handler))
            .route("/lots", axum::routing::get(lots))
            .route("/refresh", axum::routing::post(refresh))
            .route(
                "/auto-refresh",
                axum::routing::get(get_auto_refresh).put(put_auto_refresh),
            )
            .with_state(AppState { registry, session });

        let addr: std::net::SocketAddr = config
            .listen
            .parse()
            .with_context(|| format!("Parsing listen address {:?}", config.listen))?;

        tracing::info!("Listening on {}", addr);

        axum::Server::bind(&addr)
            .serve(app.into_make_service())
            .with_graceful_shutdown(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Waiting for Ctrl-C {:?}", e);
                }
                tracing::info!("Shutting down");
            })
            .await?;

        Ok::<(), anyhow::Error>(())
    })
}

#[tracing::instrument(skip(state))]
async fn metrics_handler(State(state): State<AppState>) -> String {
    tracing::trace!("Getting metrics");

    let encoder = prometheus::TextEncoder::new();
    let metrics_families = state.registry.gather();
    match encoder.encode_to_string(&metrics_families) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Encoding Metrics {:?}", e);

            String::new()
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LotView<'l> {
    #[serde(flatten)]
    lot: &'l lotwatch::Listing,
    unit_price: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LotsView<'l> {
    region: &'l str,
    item_id: &'l str,
    count: usize,
    auto_refresh: bool,
    fetching: bool,
    lots: Vec<LotView<'l>>,
}

async fn lots(State(state): State<AppState>) -> Json<serde_json::Value> {
    let session = &state.session;
    let lots = session.lots();
    let target = session.target();

    let view = LotsView {
        region: &target.region,
        item_id: &target.item_id,
        count: lots.len(),
        auto_refresh: session.auto_refresh(),
        fetching: session.is_fetching(),
        lots: lots
            .iter()
            .map(|lot| LotView {
                lot,
                unit_price: lot.unit_price(),
            })
            .collect(),
    };

    match serde_json::to_value(&view) {
        Ok(v) => Json(v),
        Err(e) => {
            tracing::error!("Serializing Lots {:?}", e);
            Json(serde_json::Value::Null)
        }
    }
}

async fn refresh(State(state): State<AppState>) -> StatusCode {
    tracing::info!("Manual refresh requested");
    state.session.request_refresh();
    StatusCode::ACCEPTED
}

#[derive(Serialize, Deserialize)]
struct AutoRefresh {
    enabled: bool,
}

async fn get_auto_refresh(State(state): State<AppState>) -> Json<AutoRefresh> {
    Json(AutoRefresh {
        enabled: state.session.auto_refresh(),
    })
}

async fn put_auto_refresh(
    State(state): State<AppState>,
    Json(toggle): Json<AutoRefresh>,
) -> Json<AutoRefresh> {
    state.session.set_auto_refresh(toggle.enabled);
    get_auto_refresh(State(state)).await
}

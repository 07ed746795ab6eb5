use crate::AppState;

use axum::{Json, extract::State, response::Html};
use axum_macros::debug_handler;
use blockwatch_core::{PlayerData, ServerSnapshot};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

const INDEX: &str = r#"<html>
<head><title>Blockwatch</title></head>
<body>
<h1>Blockwatch</h1>
<p><a href="/snapshot">Snapshot</a></p>
</body>
</html>
"#;

#[derive(Serialize)]
pub(crate) struct SnapshotResponse {
    server: Option<ServerSnapshot>,
    players: BTreeMap<String, PlayerData>,
}

pub(crate) async fn index() -> Html<&'static str> {
    Html(INDEX)
}

/// Run one scrape. The save pass goes first so the rcon pass sees the
/// current server version.
#[debug_handler]
pub(crate) async fn snapshot(State(state): State<Arc<AppState>>) -> Json<SnapshotResponse> {
    let players = state.save.collect().await;

    let server = match &state.rcon {
        Some(rcon) => Some(rcon.collect().await),
        None => None,
    };

    tracing::debug!(
        players = players.len(),
        rcon = server.is_some(),
        "finished scrape"
    );
    Json(SnapshotResponse { server, players })
}

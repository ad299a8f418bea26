use aquamon_core::types::DbId;
use aquamon_db::repositories::ProjectRepo;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::ws::protocol::{parse_client_frame, ClientCommand, ServerFrame};

/// Query parameters for the upgrade request. Browsers cannot set headers
/// on a WebSocket handshake, so the access token rides in the query.
#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: String,
}

/// GET /api/v1/ws?token=... -- upgrade to the push channel.
///
/// The token is checked before the upgrade; an invalid one gets a plain
/// 401 response.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
) -> AppResult<impl IntoResponse> {
    let user = AuthUser::from_token(&params.token, &state.config.jwt)?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user)))
}

/// Manage a single WebSocket connection after upgrade.
///
/// A spawned sender task forwards manager-channel messages to the sink while
/// the current task processes inbound frames. The socket task ends when
/// either side closes, releasing its clone of the application state.
async fn handle_socket(socket: WebSocket, state: AppState, user: AuthUser) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, user_id = user.user_id, "WebSocket connected");

    let ws_manager = state.ws_manager.clone();
    let mut rx = ws_manager.add(conn_id.clone(), user.user_id).await;

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    loop {
        let result = tokio::select! {
            // The manager dropped this connection (server shutdown).
            _ = &mut send_task => break,
            next = stream.next() => match next {
                Some(result) => result,
                None => break,
            },
        };

        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Text(text)) => {
                let reply = match parse_client_frame(text.as_str()) {
                    Ok(command) => apply_command(&state, &conn_id, &user, command).await,
                    Err(msg) => ServerFrame::error(msg).to_text(),
                };
                ws_manager
                    .send_to(&conn_id, Message::Text(reply.into()))
                    .await;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

/// Apply a join/leave command and return the reply frame text.
async fn apply_command(
    state: &AppState,
    conn_id: &str,
    user: &AuthUser,
    command: ClientCommand,
) -> String {
    match command {
        ClientCommand::JoinProject(project_id) => match may_join(state, user, project_id).await {
            Ok(true) => {
                state.ws_manager.join(conn_id, project_id).await;
                tracing::debug!(conn_id, project_id, "Joined project channel");
                ServerFrame::joined(project_id).to_text()
            }
            Ok(false) => {
                ServerFrame::error(format!("No access to project {project_id}")).to_text()
            }
            Err(e) => {
                tracing::error!(conn_id, project_id, error = %e, "Project access check failed");
                ServerFrame::error("Could not join project").to_text()
            }
        },
        ClientCommand::LeaveProject(project_id) => {
            state.ws_manager.leave(conn_id, project_id).await;
            tracing::debug!(conn_id, project_id, "Left project channel");
            ServerFrame::left(project_id).to_text()
        }
    }
}

async fn may_join(
    state: &AppState,
    user: &AuthUser,
    project_id: DbId,
) -> Result<bool, sqlx::Error> {
    if user.is_superadmin() {
        return Ok(true);
    }
    ProjectRepo::has_access(&state.pool, project_id, user.user_id).await
}

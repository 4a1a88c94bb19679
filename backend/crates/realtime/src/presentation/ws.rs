//! WebSocket endpoint
//!
//! GET /api/realtime/ws

use axum::extract::State;
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code};
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};
use auth::{AuthContext, CheckSessionUseCase, IdentityDirectory, SessionRepository};

use crate::application::frames::{ClientFrame, ServerFrame};
use crate::application::handshake::{HandshakeInput, RealtimeHandshake, bind_confirmed};
use crate::application::relay::{BoundConnection, FanoutRelay};
use crate::domain::binding::ConnectionBinding;
use crate::domain::bus::FanoutBus;
use crate::presentation::state::RealtimeState;

/// Authenticate, then upgrade
///
/// A rejected handshake gets the same JSON error response an HTTP route
/// would; the socket is never opened.
pub async fn ws_handler<S, D, F>(
    State(state): State<RealtimeState<S, D, F>>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response
where
    S: SessionRepository + Send + Sync + 'static,
    D: IdentityDirectory + Send + Sync + 'static,
    F: FanoutBus + Send + Sync + 'static,
{
    let session_cookie =
        platform::cookie::extract_cookie(&headers, &state.auth.config.session_cookie_name);
    let origin = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok());

    let handshake = RealtimeHandshake::new(state.auth.check_session(), state.relay.config());
    let context = match handshake
        .authenticate(HandshakeInput {
            origin,
            session_cookie: session_cookie.as_deref(),
        })
        .await
    {
        Ok(context) => context,
        Err(e) => return e.into_response(),
    };

    let relay = state.relay.clone();
    let check = state.auth.check_session();
    ws.on_upgrade(move |socket| run_connection(relay, check, session_cookie, context, socket))
}

async fn run_connection<S, D, F>(
    relay: FanoutRelay<F>,
    check: CheckSessionUseCase<S, D>,
    session_cookie: Option<String>,
    context: AuthContext,
    mut socket: WebSocket,
) where
    S: SessionRepository + Send + Sync + 'static,
    D: IdentityDirectory + Send + Sync + 'static,
    F: FanoutBus + Send + Sync + 'static,
{
    let bound = bind_confirmed(&relay, &check, session_cookie.as_deref(), &context).await;
    let BoundConnection {
        binding,
        mut frames,
        mut closed,
    } = match bound {
        Ok(bound) => bound,
        Err(_) => {
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::POLICY,
                    reason: "session revoked".into(),
                })))
                .await;
            return;
        }
    };

    let ready = ServerFrame::Ready {
        connection_id: binding.connection_id,
        identity_id: binding.identity_id,
    };
    if socket.send(Message::Text(ready.to_text().into())).await.is_err() {
        relay.unbind(&binding.connection_id).await;
        return;
    }

    loop {
        tokio::select! {
            // Force-close wins over anything still queued
            biased;

            reason = &mut closed => {
                if let Ok(reason) = reason {
                    let _ = socket
                        .send(Message::Close(Some(CloseFrame {
                            code: close_code::POLICY,
                            reason: reason.into(),
                        })))
                        .await;
                }
                break;
            }
            frame = frames.recv() => {
                let Some(text) = frame else { break };
                if socket.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_client_frame(&relay, &binding, text.as_str()).await;
                        if socket.send(Message::Text(reply.to_text().into())).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    // Pings are answered by the protocol layer; binary is ignored
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, connection_id = %binding.connection_id, "Socket error");
                        break;
                    }
                }
            }
        }
    }

    relay.unbind(&binding.connection_id).await;
}

async fn handle_client_frame<F>(
    relay: &FanoutRelay<F>,
    binding: &ConnectionBinding,
    text: &str,
) -> ServerFrame
where
    F: FanoutBus + Send + Sync + 'static,
{
    let frame = match serde_json::from_str::<ClientFrame>(text) {
        Ok(frame) => frame,
        Err(_) => {
            return ServerFrame::Error {
                code: "BAD_FRAME".into(),
                message: "Unrecognized frame".into(),
            };
        }
    };

    match frame {
        ClientFrame::Join { room } => match relay.join_room(&binding.connection_id, &room).await {
            Ok(()) => ServerFrame::Joined { room },
            Err(e) => ServerFrame::Error {
                code: e.code().into(),
                message: e.to_string(),
            },
        },
        ClientFrame::Leave { room } => {
            relay.leave_room(&binding.connection_id, &room).await;
            ServerFrame::Left { room }
        }
        ClientFrame::Ping => ServerFrame::Pong,
    }
}

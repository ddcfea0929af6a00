//! Real-time WebSocket for kitchen displays and waiter tablets
//!
//! GET /api/live?restaurantId=<id>
//!
//! Protocol (JSON text frames, `{"event": ..., "data": ...}`):
//! - Client → Server: `join-restaurant-room` with the restaurant id
//! - Server → Client: `joined`, `error`, and every [`LiveEvent`] of the room

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use shared::tenant::{TenantQuery, parse_restaurant_id};
use tokio::sync::broadcast;
use tokio::time::Duration;

use crate::live::{LiveEvent, room_name};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
enum ClientMessage {
    JoinRestaurantRoom(serde_json::Value),
}

#[derive(Debug, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
enum ControlFrame {
    Joined { room: String },
    Error { message: String },
}

/// The room id a client asked for; numbers and numeric strings both work.
fn requested_room(data: &serde_json::Value) -> Result<i64, AppError> {
    let raw = match data {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    };
    parse_restaurant_id(raw.as_deref())
}

pub async fn handle_live_ws(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    // A room can also be joined after connecting
    let initial = match query.restaurant_id.as_deref() {
        Some(_) => Some(query.restaurant_id()?),
        None => None,
    };
    Ok(ws.on_upgrade(move |socket| live_session(socket, state, initial)))
}

async fn live_session(socket: WebSocket, state: AppState, initial: Option<i64>) {
    let (mut sink, mut stream) = socket.split();
    let mut room: Option<(i64, broadcast::Receiver<LiveEvent>)> = None;

    if let Some(restaurant_id) = initial {
        room = Some((restaurant_id, state.live.subscribe(restaurant_id)));
        if send_json(&mut sink, &joined(restaurant_id)).await.is_err() {
            return;
        }
    }

    let mut ping_interval = tokio::time::interval(Duration::from_secs(30));
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            event = next_event(&mut room) => {
                match event {
                    Ok(event) => {
                        if send_json(&mut sink, &event).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "Live subscriber lagged, frames skipped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let Ok(ClientMessage::JoinRestaurantRoom(data)) =
                            serde_json::from_str::<ClientMessage>(&text)
                        else {
                            continue;
                        };
                        let reply = match requested_room(&data) {
                            Ok(restaurant_id) => {
                                room = Some((restaurant_id, state.live.subscribe(restaurant_id)));
                                tracing::debug!(restaurant_id, "Live client joined room");
                                joined(restaurant_id)
                            }
                            Err(e) => ControlFrame::Error { message: e.message },
                        };
                        if send_json(&mut sink, &reply).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    if let Some((restaurant_id, _)) = room {
        tracing::debug!(restaurant_id, "Live client disconnected");
    }
}

fn joined(restaurant_id: i64) -> ControlFrame {
    ControlFrame::Joined {
        room: room_name(restaurant_id),
    }
}

/// Next event of the joined room; never resolves before a room is joined.
async fn next_event(
    room: &mut Option<(i64, broadcast::Receiver<LiveEvent>)>,
) -> Result<LiveEvent, broadcast::error::RecvError> {
    match room {
        Some((_, rx)) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn send_json<S, T>(sink: &mut S, value: &T) -> Result<(), ()>
where
    S: SinkExt<Message> + Unpin,
    T: Serialize,
{
    let json = serde_json::to_string(value).map_err(|_| ())?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_message_accepts_numbers_and_strings() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"event":"join-restaurant-room","data":1}"#).unwrap();
        let ClientMessage::JoinRestaurantRoom(data) = msg;
        assert_eq!(requested_room(&data).unwrap(), 1);

        let msg: ClientMessage =
            serde_json::from_str(r#"{"event":"join-restaurant-room","data":"12"}"#).unwrap();
        let ClientMessage::JoinRestaurantRoom(data) = msg;
        assert_eq!(requested_room(&data).unwrap(), 12);

        assert!(requested_room(&serde_json::json!("abc")).is_err());
        assert!(requested_room(&serde_json::json!(null)).is_err());
    }

    #[test]
    fn joined_frame_shape() {
        let json = serde_json::to_value(joined(1)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"event": "joined", "data": {"room": "restaurant-1"}})
        );
    }
}

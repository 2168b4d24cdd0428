//! Duplex WebSocket upgrade (§4.5, §6 `GET /ws`). Grounded on the teacher's
//! `wsroute.rs` actor shape, simplified for a per-user (not
//! per-conversation) hub: auth is already done by `JwtAuthMiddleware`
//! before this handler runs, so there is no separate token-verification or
//! membership-check step here.

use super::AppState;
use crate::realtime::{Envelope, SessionId, SessionReceiver};
use actix::{Actor, ActorContext, AsyncContext, Handler, Message as ActixMessage, StreamHandler};
use actix_middleware::UserId;
use actix_web::{get, web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use std::time::{Duration, Instant};
use uuid::Uuid;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(ActixMessage)]
#[rtype(result = "()")]
struct Push(Envelope);

struct WsSession {
    user_id: Uuid,
    session_id: SessionId,
    hub: crate::realtime::RealtimeHub,
    hb: Instant,
}

impl WsSession {
    fn heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.hb) > CLIENT_TIMEOUT {
                tracing::warn!(user_id = %act.user_id, "websocket heartbeat timed out");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!(user_id = %self.user_id, "websocket session started");
        self.heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!(user_id = %self.user_id, "websocket session stopped");
        let hub = self.hub.clone();
        let user_id = self.user_id;
        let session_id = self.session_id;
        actix::spawn(async move {
            hub.unregister(user_id, session_id).await;
        });
    }
}

impl Handler<Push> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: Push, ctx: &mut Self::Context) {
        match serde_json::to_string(&msg.0) {
            Ok(text) => ctx.text(text),
            Err(err) => tracing::error!(error = %err, "failed to serialize envelope"),
        }
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(bytes)) => {
                self.hb = Instant::now();
                ctx.pong(&bytes);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            // Inbound text frames carry no client-initiated actions in
            // this protocol (typing/read receipts go over the REST routes);
            // anything the client sends here is ignored.
            Ok(ws::Message::Text(_)) | Ok(ws::Message::Binary(_)) => {}
            _ => {}
        }
    }
}

#[get("/ws")]
pub async fn ws_handler(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
    user: UserId,
) -> Result<HttpResponse, Error> {
    let (session_id, rx) = state.hub.register(user.0).await;

    let session = WsSession {
        user_id: user.0,
        session_id,
        hub: state.hub.clone(),
        hb: Instant::now(),
    };

    let (addr, resp) = ws::start_with_addr(session, &req, stream)?;

    bridge(rx, addr);

    Ok(resp)
}

/// Forwards envelopes from the hub's per-session channel into the actor's
/// mailbox; ends on its own once the actor (and therefore `Push` delivery)
/// stops, since `do_send` to a dead actor is a silent no-op.
fn bridge(mut rx: SessionReceiver, addr: actix::Addr<WsSession>) {
    actix::spawn(async move {
        while let Some(envelope) = rx.recv().await {
            addr.do_send(Push(envelope));
        }
    });
}

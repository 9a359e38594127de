use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use navmapcore::ais::{filter_frame, FrameOutcome, Subscription};
use navmapcore::telemetry::{LogManager, MetricsRecorder};
use std::fmt;
use std::sync::Arc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as UpstreamMessage;
use warp::ws::{Message, WebSocket};

/// Which side ended a relay session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseCause {
    UpstreamClosed,
    UpstreamError(String),
    ClientClosed,
    ClientError(String),
}

impl fmt::Display for CloseCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseCause::UpstreamClosed => write!(f, "upstream closed"),
            CloseCause::UpstreamError(err) => write!(f, "upstream error: {err}"),
            CloseCause::ClientClosed => write!(f, "client disconnected"),
            CloseCause::ClientError(err) => write!(f, "client error: {err}"),
        }
    }
}

/// One client session: connect upstream, subscribe, then pump position
/// reports to the client until either side goes away. The other side is
/// closed in both cases.
pub async fn run_session(
    client: WebSocket,
    upstream_endpoint: String,
    subscription: Subscription,
    metrics: Arc<MetricsRecorder>,
) -> CloseCause {
    let logger = LogManager::new("relay");
    metrics.record_session();
    logger.record("client connected");

    let (mut client_tx, mut client_rx) = client.split();

    let upstream = match connect_async(upstream_endpoint.as_str()).await {
        Ok((stream, _)) => stream,
        Err(err) => {
            metrics.record_error();
            let cause = CloseCause::UpstreamError(err.to_string());
            logger.warn(&format!("session ended: {cause}"));
            let _ = client_tx.close().await;
            return cause;
        }
    };
    logger.record("connected to AIS upstream");
    let (mut upstream_tx, mut upstream_rx) = upstream.split();

    let handshake = match serde_json::to_string(&subscription) {
        Ok(text) => upstream_tx
            .send(UpstreamMessage::Text(text))
            .await
            .map_err(|err| err.to_string()),
        Err(err) => Err(err.to_string()),
    };
    if let Err(err) = handshake {
        metrics.record_error();
        let cause = CloseCause::UpstreamError(err);
        logger.warn(&format!("session ended: {cause}"));
        let _ = upstream_tx.close().await;
        let _ = client_tx.close().await;
        return cause;
    }
    logger.record("subscription sent");

    let downstream = async {
        while let Some(frame) = upstream_rx.next().await {
            let text = match frame {
                Ok(UpstreamMessage::Text(text)) => text,
                Ok(UpstreamMessage::Binary(bytes)) => match String::from_utf8(bytes) {
                    Ok(text) => text,
                    Err(err) => {
                        metrics.record_error();
                        warn!("binary upstream frame is not UTF-8: {}", err);
                        continue;
                    }
                },
                Ok(UpstreamMessage::Close(_)) => return CloseCause::UpstreamClosed,
                Ok(_) => continue,
                Err(err) => return CloseCause::UpstreamError(err.to_string()),
            };

            match filter_frame(&text) {
                Ok(FrameOutcome::Forward(ship)) => {
                    let payload = match serde_json::to_string(&ship) {
                        Ok(payload) => payload,
                        Err(err) => {
                            metrics.record_error();
                            warn!("could not encode ship {}: {}", ship.mmsi, err);
                            continue;
                        }
                    };
                    if let Err(err) = client_tx.send(Message::text(payload)).await {
                        return CloseCause::ClientError(err.to_string());
                    }
                    metrics.record_forwarded();
                }
                Ok(FrameOutcome::Drop(reason)) => {
                    debug!("dropped upstream frame: {:?}", reason);
                    metrics.record_dropped();
                }
                Err(err) => {
                    metrics.record_error();
                    warn!("error processing AIS frame: {}", err);
                }
            }
        }
        CloseCause::UpstreamClosed
    };

    let client_watch = async {
        while let Some(frame) = client_rx.next().await {
            match frame {
                Ok(message) if message.is_close() => return CloseCause::ClientClosed,
                Ok(_) => continue,
                Err(err) => return CloseCause::ClientError(err.to_string()),
            }
        }
        CloseCause::ClientClosed
    };

    let cause = tokio::select! {
        cause = downstream => cause,
        cause = client_watch => cause,
    };

    let _ = upstream_tx.close().await;
    let _ = client_tx.close().await;

    let totals = metrics.snapshot();
    info!(
        "relay session ended ({}); totals forwarded={} dropped={} errors={}",
        cause, totals.forwarded, totals.dropped, totals.errors
    );
    cause
}

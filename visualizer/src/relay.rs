use futures_util::StreamExt;
use iced::futures::channel::mpsc::Sender;
use iced::futures::{SinkExt, Stream};
use log::{info, warn};
use navmapcore::ais::{ReconnectPolicy, ShipPosition};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WireMessage;

pub const RELAY_URL_ENV: &str = "NAVMAP_RELAY_URL";
const DEFAULT_RELAY_URL: &str = "ws://127.0.0.1:9000/ais-stream";

#[derive(Debug, Clone)]
pub enum RelayEvent {
    Connected,
    Ship(ShipPosition),
    Disconnected(String),
}

pub fn relay_url() -> String {
    std::env::var(RELAY_URL_ENV)
        .ok()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_RELAY_URL.to_string())
}

/// Decodes one relay frame; anything that is not a ship position is ignored.
pub fn decode_frame(text: &str) -> Option<ShipPosition> {
    match serde_json::from_str::<ShipPosition>(text) {
        Ok(ship) if ship.coordinate().validate().is_ok() => Some(ship),
        Ok(ship) => {
            warn!("relay frame for {} has an invalid position", ship.mmsi);
            None
        }
        Err(err) => {
            warn!("unreadable relay frame: {}", err);
            None
        }
    }
}

/// Relay connection that never gives up: after every disconnect it waits for
/// the policy delay and dials again.
pub fn connect() -> impl Stream<Item = RelayEvent> {
    iced::stream::channel(100, |mut output: Sender<RelayEvent>| async move {
        let url = relay_url();
        let policy = ReconnectPolicy::default();
        let mut attempt: u32 = 0;
        loop {
            let reason = match connect_async(url.as_str()).await {
                Ok((mut socket, _)) => {
                    info!("relay connected at {}", url);
                    attempt = 0;
                    let _ = output.send(RelayEvent::Connected).await;
                    let mut reason = "relay closed the stream".to_string();
                    while let Some(frame) = socket.next().await {
                        match frame {
                            Ok(WireMessage::Text(text)) => {
                                if let Some(ship) = decode_frame(&text) {
                                    let _ = output.send(RelayEvent::Ship(ship)).await;
                                }
                            }
                            Ok(WireMessage::Close(_)) => break,
                            Ok(_) => {}
                            Err(err) => {
                                reason = err.to_string();
                                break;
                            }
                        }
                    }
                    reason
                }
                Err(err) => err.to_string(),
            };

            let delay = policy.delay_for(attempt);
            attempt = attempt.saturating_add(1);
            warn!("relay disconnected ({}); retrying in {:?}", reason, delay);
            let _ = output.send(RelayEvent::Disconnected(reason)).await;
            tokio::time::sleep(delay).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_frames_decode_into_ships() {
        let ship = decode_frame(
            r#"{"mmsi":403123456,"lat":15.2,"lon":42.7,"cog":182.5,"sog":11.3,"type":70,"name":"AL WAJH"}"#,
        )
        .unwrap();
        assert_eq!(ship.mmsi, 403123456);
        assert_eq!(ship.ship_type, Some(70));
    }

    #[test]
    fn garbage_frames_are_ignored() {
        assert!(decode_frame("{not json").is_none());
        assert!(decode_frame(r#"{"mmsi":1,"lat":91.0,"lon":181.0,"cog":0,"sog":0}"#).is_none());
    }
}

//! Notification formatting and webhook dispatch.
//!
//! Messages are formatted for a Slack-compatible webhook and delivered
//! best-effort: each spawn gets its own fire-and-forget task (reverse
//! geocode, then POST), failures are logged and never retried, and an
//! unconfigured webhook still logs the formatted message locally.

use crate::geo::ReverseGeocoder;
use crate::relevance::RarityTier;
use crate::spawn::EnrichedSpawn;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Attention marker prepended for rare-or-better spawns.
const ATTENTION_PREFIX: &str = "@here ";

/// Fixed rarity-to-color table for the webhook attachment sidebar.
pub fn color_hex(rarity: RarityTier) -> &'static str {
    match rarity {
        RarityTier::Common => "#19A643",
        RarityTier::Uncommon => "#1BC4B9",
        RarityTier::Rare => "#1E0BE6",
        RarityTier::UltraRare => "#E600FF",
    }
}

/// Render whole seconds as `m:ss` with zero-padded seconds.
fn format_as_time(seconds: i64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// The remaining-time clause, or `None` when the countdown is nonsense
/// (stale or invalid data yields negative values).
pub fn remaining_clause(time_till_hidden_ms: i64) -> Option<String> {
    let seconds = time_till_hidden_ms.div_euclid(1000);
    if seconds < 0 {
        return None;
    }
    Some(format!("{} remaining", format_as_time(seconds)))
}

/// Build the human-readable message body for one spawn.
pub fn format_message(spawn: &EnrichedSpawn, place: Option<&str>) -> String {
    let pre = if spawn.rarity.is_rare() {
        ATTENTION_PREFIX
    } else {
        ""
    };

    let position = spawn.candidate.position;
    let mut label = format!("{:.0}m {}", spawn.distance_m, spawn.bearing);
    if let Some(place) = place {
        label.push(' ');
        label.push_str(place);
    }
    let map_link = format!(
        "<https://maps.google.com/maps?z=12&t=h&q=loc:{}+{}|{}>",
        position.latitude, position.longitude, label
    );

    let mut message = format!(
        "{pre}A wild *{}* appeared!\n{map_link}",
        spawn.candidate.species.name
    );
    if let Some(remaining) = remaining_clause(spawn.candidate.time_till_hidden_ms) {
        message.push('\n');
        message.push_str(&remaining);
    }
    message
}

#[derive(Debug, Serialize)]
struct Attachment {
    fallback: String,
    color: String,
    thumb_url: String,
    text: String,
    unfurl_media: bool,
    mrkdwn_in: Vec<String>,
}

#[derive(Debug, Serialize)]
struct WebhookPayload {
    attachments: Vec<Attachment>,
}

impl WebhookPayload {
    fn for_spawn(spawn: &EnrichedSpawn, message: &str) -> Self {
        Self {
            attachments: vec![Attachment {
                fallback: message.to_string(),
                color: color_hex(spawn.rarity).to_string(),
                thumb_url: spawn.candidate.species.image_url.clone(),
                text: message.to_string(),
                unfurl_media: true,
                mrkdwn_in: vec!["text".to_string()],
            }],
        }
    }
}

/// Delivery seam for the scheduler. Implementations must not block the
/// poll cycle on network completion.
pub trait Notifier {
    fn dispatch_all(&self, spawns: Vec<EnrichedSpawn>);
}

/// Formats and delivers notifications. Dispatch for multiple spawns is
/// independent per spawn; one failure does not affect the others.
#[derive(Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
    webhook_url: Option<String>,
    geocoder: ReverseGeocoder,
}

impl Dispatcher {
    pub fn new(
        client: reqwest::Client,
        webhook_url: Option<String>,
        geocoder: ReverseGeocoder,
    ) -> Self {
        Self {
            client,
            webhook_url,
            geocoder,
        }
    }

    /// Fire-and-forget: reverse-geocode the spawn position, format the
    /// message, POST it if a webhook is configured, and log it either way.
    pub fn dispatch(&self, spawn: EnrichedSpawn) {
        let client = self.client.clone();
        let webhook_url = self.webhook_url.clone();
        let geocoder = self.geocoder.clone();

        tokio::spawn(async move {
            let place = geocoder.reverse(spawn.candidate.position).await;
            let message = format_message(&spawn, place.as_deref());

            if let Some(url) = webhook_url {
                let payload = WebhookPayload::for_spawn(&spawn, &message);
                match client.post(&url).json(&payload).send().await {
                    Ok(resp) if resp.status().is_success() => {
                        debug!(spawn_point = %spawn.candidate.spawn_point_id, "webhook delivered");
                    }
                    Ok(resp) => {
                        warn!(
                            status = %resp.status(),
                            spawn_point = %spawn.candidate.spawn_point_id,
                            "webhook delivery rejected"
                        );
                    }
                    Err(e) => {
                        warn!(
                            error = %e,
                            spawn_point = %spawn.candidate.spawn_point_id,
                            "webhook delivery failed"
                        );
                    }
                }
            }

            info!("POST: {message}");
        });
    }
}

impl Notifier for Dispatcher {
    fn dispatch_all(&self, spawns: Vec<EnrichedSpawn>) {
        for spawn in spawns {
            self.dispatch(spawn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{CompassDirection, LatLng};
    use crate::spawn::SpawnCandidate;
    use crate::species;

    fn spawn(species_id: u16, rarity: RarityTier, hidden_ms: i64) -> EnrichedSpawn {
        EnrichedSpawn {
            candidate: SpawnCandidate {
                spawn_point_id: "SP1".to_string(),
                species: species::lookup(species_id).unwrap(),
                position: LatLng::new(51.5074, -0.1278),
                time_till_hidden_ms: hidden_ms,
                raw: serde_json::Value::Null,
            },
            distance_m: 42.3,
            bearing: CompassDirection::NorthEast,
            rarity,
        }
    }

    #[test]
    fn test_time_formatting() {
        assert_eq!(remaining_clause(125_000).unwrap(), "2:05 remaining");
        assert_eq!(remaining_clause(5_000).unwrap(), "0:05 remaining");
        assert_eq!(remaining_clause(65_000).unwrap(), "1:05 remaining");
        assert_eq!(remaining_clause(0).unwrap(), "0:00 remaining");
        // Sub-second countdown floors to zero, still rendered
        assert_eq!(remaining_clause(900).unwrap(), "0:00 remaining");
        // Negative countdown is nonsense; the clause is omitted
        assert_eq!(remaining_clause(-3_000), None);
        assert_eq!(remaining_clause(-1), None);
    }

    #[test]
    fn test_color_table() {
        assert_eq!(color_hex(RarityTier::Common), "#19A643");
        assert_eq!(color_hex(RarityTier::Uncommon), "#1BC4B9");
        assert_eq!(color_hex(RarityTier::Rare), "#1E0BE6");
        assert_eq!(color_hex(RarityTier::UltraRare), "#E600FF");
    }

    #[test]
    fn test_rare_message_carries_attention_marker() {
        let message = format_message(&spawn(149, RarityTier::UltraRare, 65_000), None);
        assert!(message.starts_with("@here A wild *Dragonite* appeared!"));

        let message = format_message(&spawn(131, RarityTier::Rare, 65_000), None);
        assert!(message.starts_with("@here "));

        let message = format_message(&spawn(16, RarityTier::Common, 65_000), None);
        assert!(!message.contains("@here"));
    }

    #[test]
    fn test_message_body() {
        let message = format_message(&spawn(131, RarityTier::Rare, 65_000), Some("Hyde Park"));
        assert!(message.contains("A wild *Lapras* appeared!"));
        assert!(message.contains("https://maps.google.com/maps?z=12&t=h&q=loc:51.5074+-0.1278"));
        assert!(message.contains("|42m NE Hyde Park>"));
        assert!(message.ends_with("1:05 remaining"));
    }

    #[test]
    fn test_message_without_place_or_countdown() {
        let message = format_message(&spawn(16, RarityTier::Common, -3_000), None);
        assert!(message.contains("|42m NE>"));
        assert!(!message.contains("remaining"));
        assert!(!message.ends_with('\n'));
    }

    #[test]
    fn test_payload_shape() {
        let spawn = spawn(131, RarityTier::Rare, 65_000);
        let message = format_message(&spawn, None);
        let payload = serde_json::to_value(WebhookPayload::for_spawn(&spawn, &message)).unwrap();

        let attachment = &payload["attachments"][0];
        assert_eq!(attachment["color"], "#1E0BE6");
        assert_eq!(attachment["unfurl_media"], true);
        assert_eq!(attachment["mrkdwn_in"], serde_json::json!(["text"]));
        assert_eq!(attachment["fallback"], attachment["text"]);
        assert!(attachment["thumb_url"]
            .as_str()
            .unwrap()
            .ends_with("/131.png"));
    }
}

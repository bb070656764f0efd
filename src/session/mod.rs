//! Game-service session client.
//!
//! Thin REST client over the service's JSON API: session init, profile
//! fetch, location updates, and the heartbeat poll that yields a snapshot
//! of nearby map cells. The scheduler talks to it through the
//! [`SessionClient`] trait so cycles can be driven against a scripted
//! session in tests.

use crate::config::LocationSpec;
use crate::geo::LatLng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// One wild-spawn record as the service reports it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WildSpawnRecord {
    pub pokemon_id: u16,
    pub spawn_point_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub time_till_hidden_ms: i64,
    /// Everything else the service sends along; kept opaque.
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    #[serde(default)]
    pub wild_spawns: Vec<WildSpawnRecord>,
}

/// A heartbeat snapshot. A missing cell list marks the snapshot malformed;
/// the cycle handling treats that as a non-fatal abort.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub cells: Option<Vec<Cell>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub username: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionGrant {
    token: String,
    player: PlayerInfo,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InitRequest<'a> {
    username: &'a str,
    password: &'a str,
    provider: &'a str,
    location: InitLocation<'a>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum InitLocation<'a> {
    #[serde(rename = "name")]
    Named { name: &'a str },
    #[serde(rename = "coords")]
    Coords { latitude: f64, longitude: f64, altitude: f64 },
}

/// The subset of the session surface the poll scheduler depends on.
#[allow(async_fn_in_trait)]
pub trait SessionClient {
    /// Move the session to `coords`; returns the coordinates the service
    /// actually resolved to.
    async fn set_location(&mut self, coords: LatLng) -> Result<LatLng, SessionError>;

    /// Poll the service for a snapshot of nearby cells.
    async fn heartbeat(&mut self) -> Result<Snapshot, SessionError>;
}

/// reqwest-backed session client. Holds the bearer token issued at init.
pub struct GameClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GameClient {
    pub fn new(base_url: String, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url,
            token: None,
        }
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, SessionError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let message = resp.text().await.unwrap_or_default();
        Err(SessionError::Api { status, message })
    }

    /// Establish a session. The service resolves named locations itself and
    /// reports the player's effective position back.
    pub async fn init(
        &mut self,
        username: &str,
        password: &str,
        provider: &str,
        location: &LocationSpec,
    ) -> Result<PlayerInfo, SessionError> {
        let location = match location {
            LocationSpec::Named(name) => InitLocation::Named { name },
            LocationSpec::Coords {
                latitude,
                longitude,
            } => InitLocation::Coords {
                latitude: *latitude,
                longitude: *longitude,
                altitude: 0.0,
            },
        };
        let body = InitRequest {
            username,
            password,
            provider,
            location,
        };

        let resp = self
            .client
            .post(format!("{}/v1/session", self.base_url))
            .json(&body)
            .send()
            .await?;
        let grant: SessionGrant = Self::check(resp).await?.json().await?;
        debug!(location = %grant.player.location_name, "session granted");
        self.token = Some(grant.token);
        Ok(grant.player)
    }

    pub async fn get_profile(&self) -> Result<PlayerProfile, SessionError> {
        let resp = self
            .auth(self.client.get(format!("{}/v1/profile", self.base_url)))
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }
}

impl SessionClient for GameClient {
    async fn set_location(&mut self, coords: LatLng) -> Result<LatLng, SessionError> {
        let resp = self
            .auth(self.client.post(format!("{}/v1/location", self.base_url)))
            .json(&coords)
            .send()
            .await?;
        let resolved: LatLng = Self::check(resp).await?.json().await?;
        Ok(resolved)
    }

    async fn heartbeat(&mut self) -> Result<Snapshot, SessionError> {
        let resp = self
            .auth(self.client.get(format!("{}/v1/heartbeat", self.base_url)))
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_missing_cells_deserializes() {
        let snapshot: Snapshot = serde_json::from_str("{}").unwrap();
        assert!(snapshot.cells.is_none());

        let snapshot: Snapshot = serde_json::from_str(r#"{"cells": []}"#).unwrap();
        assert_eq!(snapshot.cells.unwrap().len(), 0);
    }

    #[test]
    fn test_wild_spawn_wire_names() {
        let json = r#"{
            "pokemonId": 16,
            "spawnPointId": "sp-1",
            "latitude": 51.5,
            "longitude": -0.12,
            "timeTillHiddenMs": 65000,
            "encounterId": "enc-9"
        }"#;
        let record: WildSpawnRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.pokemon_id, 16);
        assert_eq!(record.spawn_point_id, "sp-1");
        assert_eq!(record.time_till_hidden_ms, 65_000);
        // Unmodelled fields are retained opaquely
        assert_eq!(record.extra["encounterId"], "enc-9");
    }

    #[test]
    fn test_cell_defaults_empty_spawn_list() {
        let cell: Cell = serde_json::from_str("{}").unwrap();
        assert!(cell.wild_spawns.is_empty());
    }
}

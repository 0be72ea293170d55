use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use cubekin_core::events::EventSender;
use cubekin_core::jobs::JobSystem;
use reqwest::blocking::{Client, Response};
use serde::de::{self, DeserializeOwned, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_ID_HEADER: &str = "user-id";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorldType {
    #[default]
    Singleplayer,
    Multiplayer,
}

impl WorldType {
    pub fn as_str(self) -> &'static str {
        match self {
            WorldType::Singleplayer => "singleplayer",
            WorldType::Multiplayer => "multiplayer",
        }
    }
}

/// What the client writes. The seed travels as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorldMeta {
    pub name: String,
    pub world_type: WorldType,
    pub seed: String,
}

/// Row returned by the world service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub world_type: WorldType,
    #[serde(default, deserialize_with = "seed_text_serde::deserialize")]
    pub seed: String,
}

#[derive(Debug, Serialize)]
struct WorldUpdate<'a> {
    name: &'a str,
    seed: &'a str,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    success: bool,
    #[serde(default)]
    worlds: Vec<WorldRecord>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WorldResponse {
    success: bool,
    #[serde(default)]
    world: Option<WorldRecord>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("world service returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("world service rejected the request: {0}")]
    Rejected(String),
    #[error("world service response had no world record")]
    MissingWorld,
}

/// The account/world service as the game sees it.
pub trait WorldApi: Send + Sync {
    fn list_worlds(&self, world_type: WorldType) -> Result<Vec<WorldRecord>, ApiError>;
    fn create_world(&self, meta: &WorldMeta) -> Result<WorldRecord, ApiError>;
    fn update_world(&self, id: i64, meta: &WorldMeta) -> Result<WorldRecord, ApiError>;
}

pub struct HttpWorldApi {
    client: Client,
    base_url: String,
    user_id: String,
}

impl HttpWorldApi {
    pub fn new(base_url: &str, user_id: u64) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id: user_id.to_string(),
        })
    }

    fn worlds_url(&self) -> String {
        format!("{}/worlds", self.base_url)
    }

    fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| status.to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<T>()?)
    }

    fn unwrap_world(response: WorldResponse) -> Result<WorldRecord, ApiError> {
        if !response.success {
            return Err(ApiError::Rejected(response.message.unwrap_or_default()));
        }
        response.world.ok_or(ApiError::MissingWorld)
    }
}

impl WorldApi for HttpWorldApi {
    fn list_worlds(&self, world_type: WorldType) -> Result<Vec<WorldRecord>, ApiError> {
        let response = self
            .client
            .get(self.worlds_url())
            .query(&[("world_type", world_type.as_str())])
            .header(USER_ID_HEADER, &self.user_id)
            .send()?;
        let body: ListResponse = Self::decode(response)?;
        if !body.success {
            return Err(ApiError::Rejected(body.message.unwrap_or_default()));
        }
        Ok(body.worlds)
    }

    fn create_world(&self, meta: &WorldMeta) -> Result<WorldRecord, ApiError> {
        let response = self
            .client
            .post(self.worlds_url())
            .header(USER_ID_HEADER, &self.user_id)
            .json(meta)
            .send()?;
        Self::unwrap_world(Self::decode(response)?)
    }

    fn update_world(&self, id: i64, meta: &WorldMeta) -> Result<WorldRecord, ApiError> {
        let body = WorldUpdate {
            name: &meta.name,
            seed: &meta.seed,
        };
        let response = self
            .client
            .put(format!("{}/{id}", self.worlds_url()))
            .header(USER_ID_HEADER, &self.user_id)
            .json(&body)
            .send()?;
        Self::unwrap_world(Self::decode(response)?)
    }
}

pub fn find_world(
    api: &dyn WorldApi,
    name: &str,
    world_type: WorldType,
) -> Result<Option<WorldRecord>, ApiError> {
    Ok(api
        .list_worlds(world_type)?
        .into_iter()
        .find(|world| world.name == name))
}

/// Updates the caller's world with the same name, or creates one.
pub fn save_world(api: &dyn WorldApi, meta: &WorldMeta) -> Result<WorldRecord, ApiError> {
    match find_world(api, &meta.name, meta.world_type)? {
        Some(existing) => {
            debug!("Updating world {} ({})", existing.id, meta.name);
            api.update_world(existing.id, meta)
        }
        None => {
            debug!("Creating world {}", meta.name);
            api.create_world(meta)
        }
    }
}

#[derive(Debug)]
pub enum PersistenceEvent {
    Saved(WorldRecord),
    Failed {
        world_name: String,
        error: ApiError,
    },
}

/// Runs saves on the job pool and reports back over the event channel.
pub struct WorldSaver {
    api: Arc<dyn WorldApi>,
    jobs: Arc<JobSystem>,
    events: EventSender<PersistenceEvent>,
}

impl WorldSaver {
    pub fn new(
        api: Arc<dyn WorldApi>,
        jobs: Arc<JobSystem>,
        events: EventSender<PersistenceEvent>,
    ) -> Self {
        Self { api, jobs, events }
    }

    /// Fire-and-forget; the outcome arrives as a [`PersistenceEvent`].
    pub fn request_save(&self, meta: WorldMeta) {
        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        info!("Saving world '{}'", meta.name);
        self.jobs.spawn(move || {
            let event = match save_world(api.as_ref(), &meta) {
                Ok(record) => PersistenceEvent::Saved(record),
                Err(error) => PersistenceEvent::Failed {
                    world_name: meta.name,
                    error,
                },
            };
            events.send(event);
        });
    }
}

mod seed_text_serde {
    use super::*;

    /// Seeds come back as text, a bare number, or null depending on the row.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SeedVisitor;

        impl<'de> Visitor<'de> for SeedVisitor {
            type Value = String;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a world seed as string, integer or null")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(value.to_string())
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(value.to_string())
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(value.to_string())
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(String::new())
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(String::new())
            }
        }

        deserializer.deserialize_any(SeedVisitor)
    }
}

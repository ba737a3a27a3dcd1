use chrono::{DateTime, TimeDelta, Utc};

mod client;
mod config;
mod countdown;
mod driver;
mod error;
mod message;
mod widget;

#[cfg(test)]
mod testing;

pub use client::*;
pub use config::*;
pub use countdown::*;
pub use driver::*;
pub use error::*;
pub use message::*;
pub use widget::*;

/// Element identifiers the front end mounts the widget regions under.
pub mod ids {
    pub const STATUS: &str = "chall__status";
    pub const ENDPOINTS: &str = "chall__endpoints";
    pub const EXPIRY: &str = "chall__expiry";
    pub const ERROR: &str = "chall__error";
    pub const VERB: &str = "chall__verb";
    pub const CONFIG: &str = "chall-config";
}

/// What the server last told us about this page's challenge instance.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ChallengeStatus {
    #[default]
    None,
    Live(Instance),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub endpoints: Vec<Endpoint>,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub duration_seconds: u64,
    pub name: Option<String>,
    pub problem: Option<String>,
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub connection: String,
    pub name: Option<String>,
    pub protocol: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl Instance {
    /// The instant after which the instance is considered gone.
    pub fn expires_at(&self) -> DateTime<Utc> {
        i64::try_from(self.duration_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|lifetime| self.created_at.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_owned_by(&self, owner: &str) -> bool {
        self.owner == owner
    }
}

impl From<EndpointJson> for Endpoint {
    fn from(json: EndpointJson) -> Self {
        Self {
            connection: json.connection,
            name: json.name,
            protocol: json.protocol,
            host: json.host,
            port: json.port,
        }
    }
}

impl From<ChallengeJson> for Instance {
    fn from(json: ChallengeJson) -> Self {
        Self {
            endpoints: json.endpoints.into_iter().map(Endpoint::from).collect(),
            owner: json.instance.owner,
            created_at: json.time.created_at,
            duration_seconds: json.time.duration,
            name: json.instance.name,
            problem: json.instance.problem,
            id: json.instance.id,
        }
    }
}

impl From<Option<ChallengeJson>> for ChallengeStatus {
    fn from(json: Option<ChallengeJson>) -> Self {
        match json {
            Some(json) => Self::Live(json.into()),
            None => Self::None,
        }
    }
}

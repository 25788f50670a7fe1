use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub collaborators: CollaboratorConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// Database file path; `~` expands to the home directory
    pub path: String,
    /// Deadline for opening the database, in milliseconds
    pub open_timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct CollaboratorConfig {
    pub nats_url: String,
    /// Deadline for one collaborator round-trip, in seconds
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

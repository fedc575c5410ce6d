//! Configuration for seeding runs.
//!
//! Everything is read from environment variables. [`SeedConfig::from_lookup`]
//! takes the lookup as a function so tests can pass a map instead.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generators::{IdentityStrategy, WorkspaceGenConfig};
use crate::pipeline::{BatchPlan, FailurePolicy, RemainderPolicy};
use crate::sources::{ContentTargets, DEFAULT_MAX_PAGES};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid {var}={value}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
    #[error("Missing required variable {0}")]
    Missing(&'static str),
}

fn invalid(var: &'static str, value: impl Display, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Storage target of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Postgres,
    Couch,
    /// Counts writes without persisting anything.
    Memory,
}

impl FromStr for SinkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "couch" | "couchdb" => Ok(Self::Couch),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown sink '{other}'")),
        }
    }
}

/// Where content pools come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentMode {
    /// Cloudinary image URLs and Hipsum text.
    #[default]
    Remote,
    /// Offline generated content.
    Procedural,
}

impl FromStr for ContentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "remote" => Ok(Self::Remote),
            "procedural" | "offline" => Ok(Self::Procedural),
            other => Err(format!("unknown content mode '{other}'")),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::AbortOnError),
            "skip" => Ok(Self::SkipAndContinue),
            other => Err(format!("unknown failure policy '{other}'")),
        }
    }
}

impl FromStr for RemainderPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "short-batch" => Ok(Self::ShortFinalBatch),
            "truncate" => Ok(Self::Truncate),
            other => Err(format!("unknown remainder policy '{other}'")),
        }
    }
}

/// CouchDB connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchSettings {
    pub url: String,
    pub user: Option<String>,
    #[serde(skip_serializing, default)]
    pub password: Option<String>,
    pub database: String,
}

impl Default for CouchSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:5984".to_string(),
            user: None,
            password: None,
            database: "spaceworkphotos".to_string(),
        }
    }
}

/// Cloudinary Admin API credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudinarySettings {
    pub cloud_name: Option<String>,
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,
    #[serde(skip_serializing, default)]
    pub api_secret: Option<String>,
    pub prefix: String,
}

impl Default for CloudinarySettings {
    fn default() -> Self {
        Self {
            cloud_name: None,
            api_key: None,
            api_secret: None,
            prefix: "sdc-spacework".to_string(),
        }
    }
}

/// Configuration for seeding operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    pub sink: SinkKind,

    /// Target number of workspaces.
    pub total: u64,

    /// Workspaces per bulk write.
    pub batch_size: usize,

    /// Photos per workspace, inclusive.
    pub photos_min: usize,
    pub photos_max: usize,

    pub identity: IdentityStrategy,
    pub first_sequence: u64,
    pub failure_policy: FailurePolicy,
    pub remainder: RemainderPolicy,

    pub content: ContentMode,
    /// Page cap per content kind.
    pub max_pages: usize,
    pub word_target: usize,
    pub sentence_target: usize,

    /// Seed for reproducible runs; random when unset.
    pub rng_seed: Option<u64>,

    #[serde(skip_serializing, default)]
    pub database_url: Option<String>,
    pub couch: CouchSettings,
    pub cloudinary: CloudinarySettings,
    pub hipsum_url: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        let targets = ContentTargets::default();
        Self {
            sink: SinkKind::default(),
            total: 10_000_000,
            batch_size: 5000,
            photos_min: 4,
            photos_max: 7,
            identity: IdentityStrategy::Sequential,
            first_sequence: 1,
            failure_policy: FailurePolicy::default(),
            remainder: RemainderPolicy::default(),
            content: ContentMode::default(),
            max_pages: DEFAULT_MAX_PAGES,
            word_target: targets.words,
            sentence_target: targets.sentences,
            rng_seed: None,
            database_url: None,
            couch: CouchSettings::default(),
            cloudinary: CloudinarySettings::default(),
            hipsum_url: "https://hipsum.co".to_string(),
        }
    }
}

/// Reads `var` through `lookup`, parsing it or falling back to `default`.
fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(var) {
        Some(raw) => raw.trim().parse().map_err(|e| invalid(var, &raw, format!("{e}"))),
        None => Ok(default),
    }
}

impl SeedConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Loads configuration from an arbitrary variable lookup and validates it.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let identity = match lookup("SEED_IDENTITY").as_deref().map(str::trim) {
            None | Some("sequential") => IdentityStrategy::Sequential,
            Some("uuid") => IdentityStrategy::Uuid,
            Some("partitioned") => IdentityStrategy::Partitioned {
                partitions: parse_or(&lookup, "SEED_PARTITIONS", 1000)?,
            },
            Some(other) => {
                return Err(invalid(
                    "SEED_IDENTITY",
                    other,
                    "expected sequential, partitioned or uuid",
                ));
            }
        };

        let config = Self {
            sink: parse_or(&lookup, "SEED_SINK", defaults.sink)?,
            total: parse_or(&lookup, "SEED_TOTAL", defaults.total)?,
            batch_size: parse_or(&lookup, "SEED_BATCH_SIZE", defaults.batch_size)?,
            photos_min: parse_or(&lookup, "SEED_PHOTOS_MIN", defaults.photos_min)?,
            photos_max: parse_or(&lookup, "SEED_PHOTOS_MAX", defaults.photos_max)?,
            identity,
            first_sequence: parse_or(&lookup, "SEED_FIRST_SEQUENCE", defaults.first_sequence)?,
            failure_policy: parse_or(&lookup, "SEED_FAILURE_POLICY", defaults.failure_policy)?,
            remainder: parse_or(&lookup, "SEED_REMAINDER", defaults.remainder)?,
            content: parse_or(&lookup, "SEED_CONTENT", defaults.content)?,
            max_pages: parse_or(&lookup, "SEED_MAX_PAGES", defaults.max_pages)?,
            word_target: parse_or(&lookup, "SEED_WORD_TARGET", defaults.word_target)?,
            sentence_target: parse_or(&lookup, "SEED_SENTENCE_TARGET", defaults.sentence_target)?,
            rng_seed: lookup("SEED_RNG_SEED")
                .map(|raw| {
                    raw.trim()
                        .parse()
                        .map_err(|e| invalid("SEED_RNG_SEED", &raw, format!("{e}")))
                })
                .transpose()?,
            database_url: lookup("DATABASE_URL"),
            couch: CouchSettings {
                url: lookup("COUCHDB_URL").unwrap_or(defaults.couch.url),
                user: lookup("COUCHDB_USER"),
                password: lookup("COUCHDB_PASSWORD"),
                database: lookup("COUCHDB_DATABASE").unwrap_or(defaults.couch.database),
            },
            cloudinary: CloudinarySettings {
                cloud_name: lookup("CLOUDINARY_CLOUD_NAME"),
                api_key: lookup("CLOUDINARY_API_KEY"),
                api_secret: lookup("CLOUDINARY_API_SECRET"),
                prefix: lookup("CLOUDINARY_PREFIX").unwrap_or(defaults.cloudinary.prefix),
            },
            hipsum_url: lookup("HIPSUM_URL").unwrap_or(defaults.hipsum_url),
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges and that the chosen sink and content mode have what they need.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(invalid("SEED_BATCH_SIZE", 0, "must be at least 1"));
        }
        if self.photos_min == 0 {
            return Err(invalid("SEED_PHOTOS_MIN", 0, "must be at least 1"));
        }
        if self.photos_min > self.photos_max {
            return Err(invalid(
                "SEED_PHOTOS_MIN",
                self.photos_min,
                format!("greater than SEED_PHOTOS_MAX={}", self.photos_max),
            ));
        }
        if let IdentityStrategy::Partitioned { partitions: 0 } = self.identity {
            return Err(invalid("SEED_PARTITIONS", 0, "must be at least 1"));
        }
        if self.max_pages == 0 {
            return Err(invalid("SEED_MAX_PAGES", 0, "must be at least 1"));
        }

        if self.sink == SinkKind::Postgres && self.database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        if self.content == ContentMode::Remote {
            if self.cloudinary.cloud_name.is_none() {
                return Err(ConfigError::Missing("CLOUDINARY_CLOUD_NAME"));
            }
            if self.cloudinary.api_key.is_none() {
                return Err(ConfigError::Missing("CLOUDINARY_API_KEY"));
            }
            if self.cloudinary.api_secret.is_none() {
                return Err(ConfigError::Missing("CLOUDINARY_API_SECRET"));
            }
        }
        Ok(())
    }

    pub fn plan(&self) -> Result<BatchPlan, ConfigError> {
        BatchPlan::new(self.total, self.batch_size, self.remainder)
            .ok_or_else(|| invalid("SEED_BATCH_SIZE", self.batch_size, "must be at least 1"))
    }

    /// Generator settings; the last sequence is filled in by the seeder.
    pub fn generator_config(&self) -> WorkspaceGenConfig {
        WorkspaceGenConfig {
            photos_per_workspace: self.photos_min..=self.photos_max,
            identity: self.identity,
            first_sequence: self.first_sequence,
            last_sequence: self.first_sequence,
        }
    }

    pub fn content_targets(&self) -> ContentTargets {
        ContentTargets {
            words: self.word_target,
            sentences: self.sentence_target,
        }
    }
}

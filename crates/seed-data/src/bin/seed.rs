//! Seed script - bulk loads workspaces and photos
//!
//! Run with:
//! ```
//! SEED_SINK=postgres DATABASE_URL=postgres://... cargo run -p seed-data --bin seed
//! ```

use anyhow::Context;
use photos::couch::CouchClient;
use rand::{SeedableRng, rngs::StdRng};
use seed_data::config::{ContentMode, SeedConfig, SinkKind};
use seed_data::db::{CouchSink, MemorySink, PgSink, SeedSink};
use seed_data::pipeline::Seeder;
use seed_data::sources::{
    CloudinaryClient, ContentProvider, ContentSource, HipsumClient, ProceduralProvider,
    RemoteContentProvider,
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

fn content_provider(config: &SeedConfig, seed: u64) -> anyhow::Result<Box<dyn ContentProvider>> {
    Ok(match config.content {
        ContentMode::Procedural => Box::new(ProceduralProvider::new(seed)),
        ContentMode::Remote => {
            let cloudinary = &config.cloudinary;
            let images = CloudinaryClient::new(
                cloudinary.cloud_name.clone().context("CLOUDINARY_CLOUD_NAME")?,
                cloudinary.api_key.clone().context("CLOUDINARY_API_KEY")?,
                cloudinary.api_secret.clone().context("CLOUDINARY_API_SECRET")?,
            )
            .with_prefix(cloudinary.prefix.clone());
            let text = HipsumClient::new().with_base_url(config.hipsum_url.clone());
            Box::new(RemoteContentProvider::new(images, text))
        }
    })
}

async fn sink(config: &SeedConfig) -> anyhow::Result<Box<dyn SeedSink>> {
    Ok(match config.sink {
        SinkKind::Postgres => {
            let database_url = config.database_url.as_deref().context("DATABASE_URL")?;
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            tracing::info!("Connected to database");
            Box::new(PgSink::new(pool))
        }
        SinkKind::Couch => {
            let couch = &config.couch;
            let mut client = CouchClient::new(&couch.url)?;
            if let Some(user) = &couch.user {
                client = client.with_credentials(user.clone(), couch.password.clone());
            }
            tracing::info!(url = %couch.url, database = %couch.database, "Using CouchDB");
            Box::new(CouchSink::new(
                client.database(couch.database.clone()),
                config.identity.is_partitioned(),
            ))
        }
        SinkKind::Memory => Box::new(MemorySink::dry_run()),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = SeedConfig::from_env()?;
    tracing::info!("Configuration: {}", serde_json::to_string(&config)?);

    let seed = config.rng_seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "Seeding generator");
    let mut rng = StdRng::seed_from_u64(seed);

    let source = ContentSource::new(content_provider(&config, seed)?)
        .with_max_pages(config.max_pages);

    let seeder = Seeder::new(sink(&config).await?, config.plan()?)
        .with_failure_policy(config.failure_policy)
        .with_generator(config.generator_config())
        .with_content_targets(config.content_targets());

    seeder.run(&source, &mut rng).await?;

    Ok(())
}

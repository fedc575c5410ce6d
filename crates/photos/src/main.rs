use std::{env, path::PathBuf, sync::Arc};

use photos::{
    couch::CouchClient,
    database::Database,
    run_server,
    store::{CouchPhotoStore, SharedStore},
};
use sqlx::PgPool;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}

async fn connect_store() -> anyhow::Result<SharedStore> {
    let backend = env::var("PHOTOS_BACKEND").unwrap_or_else(|_| "postgres".to_string());

    match backend.as_str() {
        "postgres" => {
            let database_url = env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://postgres@localhost:5432/photos".to_string());
            tracing::info!("Connecting to PostgreSQL");
            let pool = PgPool::connect(&database_url).await?;
            Ok(Arc::new(Database::new(pool)))
        }
        "couch" => {
            let url = env::var("COUCHDB_URL").unwrap_or_else(|_| "http://localhost:5984".to_string());
            let name =
                env::var("COUCHDB_DATABASE").unwrap_or_else(|_| "spaceworkphotos".to_string());
            tracing::info!("Using CouchDB database {name} at {url}");

            let mut client = CouchClient::new(&url)?;
            if let Ok(user) = env::var("COUCHDB_USER") {
                client = client.with_credentials(user, env::var("COUCHDB_PASSWORD").ok());
            }
            Ok(Arc::new(CouchPhotoStore::new(client.database(name))))
        }
        other => anyhow::bail!("Unknown PHOTOS_BACKEND '{other}' (expected postgres or couch)"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let store = connect_store().await?;

    let static_dir = env::var("STATIC_DIR").ok().map(PathBuf::from);

    let port = env::var("PORT")
        .unwrap_or_else(|_| "6001".to_string())
        .parse::<u16>()
        .unwrap_or(6001);

    run_server(store, static_dir, port).await
}

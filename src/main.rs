use gifverse::{
    AppState,
    auth::MemoryAuth,
    config::{Config, StoreBackend},
    domain::DataStore,
    errors::AppError,
    models::User,
    routes, startup,
    store::{DynamoDbStore, MemoryStore},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "gifverse=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;

    let store: Arc<dyn DataStore> = match config.store_backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory data store (data is not persisted)");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::DynamoDb => {
            tracing::info!("Initializing DynamoDB data store...");
            let client = startup::create_dynamodb_client(&config).await;
            startup::init_tables(&client, &config.table_prefix).await?;
            Arc::new(DynamoDbStore::new(client, config.table_prefix.clone()))
        }
    };

    let auth = MemoryAuth::new();
    if let Some(token) = &config.dev_auth_token {
        tracing::warn!("DEV_AUTH_TOKEN is set; seeding a development user");
        auth.register(
            token,
            User {
                id: "dev-user".to_string(),
                email: "dev@localhost".to_string(),
                display_name: "Dev User".to_string(),
                avatar: None,
            },
        );
    }

    let state = Arc::new(AppState::new(store, Arc::new(auth)));
    let app = routes::create_router(state);

    tracing::info!("Server listening on http://{}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

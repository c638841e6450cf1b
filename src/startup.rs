use crate::config::Config;
use crate::domain::COLLECTIONS;
use crate::errors::AppError;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::{
    Client as DynamoDbClient,
    error::SdkError,
    types::{AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType},
};

/// Creates a DynamoDB client from application config. Uses the default
/// credential provider chain; the endpoint can be overridden for LocalStack.
pub async fn create_dynamodb_client(config: &Config) -> DynamoDbClient {
    tracing::info!(sdk_region = %config.aws_region, "Setting SDK region");
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()));

    if let Some(endpoint) = &config.aws_endpoint {
        tracing::info!("Using endpoint override: {}", endpoint);
        loader = loader.endpoint_url(endpoint);
    }

    DynamoDbClient::new(&loader.load().await)
}

/// Ensures one table per collection exists, keyed by `id`.
pub async fn init_tables(client: &DynamoDbClient, table_prefix: &str) -> Result<(), AppError> {
    tracing::info!("Startup: initializing DynamoDB tables...");
    for collection in COLLECTIONS {
        let table = format!("{table_prefix}{collection}");
        create_table_if_not_exists(client, &table).await?;
    }
    tracing::info!("Startup: DynamoDB table initialization complete.");
    Ok(())
}

async fn create_table_if_not_exists(
    client: &DynamoDbClient,
    table: &str,
) -> Result<(), AppError> {
    let result = client
        .create_table()
        .table_name(table)
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name("id")
                .attribute_type(ScalarAttributeType::S)
                .build()
                .map_err(|e| {
                    AppError::Init(format!("Failed to build attribute definition: {e}"))
                })?,
        )
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name("id")
                .key_type(KeyType::Hash)
                .build()
                .map_err(|e| AppError::Init(format!("Failed to build key schema: {e}")))?,
        )
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await;

    match result {
        Ok(_) => {
            tracing::info!("Startup: table '{}' created or setup initiated.", table);
            Ok(())
        }
        Err(e) => {
            if let SdkError::ServiceError(service_err) = &e {
                if service_err.err().is_resource_in_use_exception() {
                    tracing::info!("Startup: table '{}' already exists, no action needed.", table);
                    return Ok(());
                }
            }
            let context = format!("Startup: error creating DynamoDB table '{table}'");
            tracing::error!("{}: {}", context, e);
            Err(AppError::Init(format!("{context}: {e}")))
        }
    }
}

use std::net::TcpListener;

use redis::aio::ConnectionManager;
use sqlx::postgres::PgPoolOptions;

use learnhub::configuration::get_configuration;
use learnhub::email_client::EmailClient;
use learnhub::session::SessionStore;
use learnhub::startup::run;
use learnhub::tasks::spawn_notification_purge;
use learnhub::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&configuration.database.connection_string())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Database connection error")
        })?;
    tracing::info!("Database connection pool created");

    let redis_client = redis::Client::open(configuration.redis.uri.clone()).map_err(|e| {
        tracing::error!("Invalid redis uri: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Redis configuration error")
    })?;
    let redis_conn = ConnectionManager::new(redis_client).await.map_err(|e| {
        tracing::error!("Failed to connect to redis: {}", e);
        std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Redis connection error")
    })?;
    // Session entries live as long as the refresh tokens that can use them
    let sessions = SessionStore::new(redis_conn, configuration.jwt.refresh_token_expiry);
    tracing::info!("Session cache connected");

    let email_client = EmailClient::new(
        configuration.email.base_url.clone(),
        configuration.email.sender.clone(),
        reqwest::Client::new(),
    );

    spawn_notification_purge(pool.clone());

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on {}", address);

    let server = run(listener, pool, sessions, email_client, configuration)?;
    server.await
}

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use uptask::{
    config::Config,
    cors,
    mail::{ConsoleMailer, Mailer, SmtpMailer},
    routes,
    state::AppState,
    store::PgStore,
};

fn mailer(config: &Config) -> Arc<dyn Mailer> {
    match config.smtp.clone() {
        Some(smtp) => match SmtpMailer::new(smtp) {
            Ok(mailer) => Arc::new(mailer),
            Err(e) => {
                log::error!("{}; falling back to console mailer", e);
                Arc::new(ConsoleMailer::new())
            }
        },
        None => {
            log::warn!("SMTP is not configured; emails will only be logged");
            Arc::new(ConsoleMailer::new())
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            log::error!("Failed to connect to database: {}", e);
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e)
        })?;
    log::info!("Connected to database");

    let store = PgStore::new(pool);
    store
        .migrate()
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    let bind = (config.server_host.clone(), config.server_port);
    log::info!("Starting UpTask server at {}", config.server_url());

    let state = web::Data::new(AppState::new(Arc::new(store), mailer(&config), config));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(cors::cors(state.config.frontend_url.as_deref()))
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind(bind)?
    .run()
    .await
}

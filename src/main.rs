use std::process;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use tasktrack::auth::{PasswordHasher, TokenService};
use tasktrack::config::Config;
use tasktrack::deadline::Deadline;
use tasktrack::routes;
use tasktrack::state::AppState;
use tasktrack::store::{self, PgTaskStore, PgUserStore};

async fn build_state(config: &Config) -> Result<AppState, String> {
    let tokens = TokenService::new(&config.jwt_secret);
    let hasher = PasswordHasher::new(config.bcrypt_cost);

    let Some(database_url) = &config.database_url else {
        log::warn!("DATABASE_URL is not set; using the in-memory store, data will not survive a restart");
        return Ok(AppState::in_memory(tokens, hasher, config.request_timeout));
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(config.request_timeout)
        .connect(database_url)
        .await
        .map_err(|e| format!("Failed to connect to database: {}", e))?;
    store::postgres::run_migrations(&pool)
        .await
        .map_err(|e| format!("Failed to run migrations: {}", e))?;
    log::info!("Connected to Postgres, migrations applied");

    Ok(AppState::new(
        Arc::new(PgUserStore::new(pool.clone())),
        Arc::new(PgTaskStore::new(pool)),
        tokens,
        hasher,
        config.request_timeout,
    ))
}

fn cors(allowed_origin: Option<&str>) -> Cors {
    let cors = match allowed_origin {
        Some(origin) => Cors::default().allowed_origin(origin),
        None => Cors::default().allow_any_origin(),
    };
    cors.allow_any_method().allow_any_header().max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };

    let state = match build_state(&config).await {
        Ok(state) => state,
        Err(e) => {
            log::error!("{}", e);
            process::exit(1);
        }
    };

    if let Some(seed) = &config.admin_seed {
        let deadline = Deadline::after(config.request_timeout);
        if let Err(e) = state.users.seed_admin(seed, deadline).await {
            log::error!("Failed to seed administrator account: {}", e);
            process::exit(1);
        }
    }

    let state = web::Data::new(state);
    let allowed_origin = config.cors_allowed_origin.clone();

    log::info!("Starting server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .wrap(cors(allowed_origin.as_deref()))
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}

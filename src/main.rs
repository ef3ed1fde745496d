use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use listkeeper::auth::TokenService;
use listkeeper::config::Config;
use listkeeper::mail::Mailer;
use listkeeper::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    // Immutable per-process services; constructed once, shared across workers.
    let tokens = web::Data::new(TokenService::new(
        &config.secret_key,
        config.algorithm,
        config.token_ttl_minutes,
    ));
    let mailer =
        web::Data::new(Mailer::from_config(&config.mail).expect("Failed to build mail transport"));

    log::info!("Starting listkeeper server at {}", config.server_url());

    let bind_addr = (config.server_host.clone(), config.server_port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(tokens.clone())
            .app_data(mailer.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(routes::health::health)
            .service(web::scope("/api/v1").configure(routes::config))
    })
    .bind(bind_addr)?
    .run()
    .await
}

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::PgPool;
use std::io;
use std::sync::Arc;

use tasktrack::auth::{
    AuthMiddleware, BcryptHasher, CredentialStore, PasswordHasher, PgCredentialStore,
    RequestAuthenticator, RouteTable, TokenCodec, TokenIssuer,
};
use tasktrack::config::Config;
use tasktrack::routes::{self, health};

fn startup_error(e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;
    let pool = PgPool::connect(&config.database_url)
        .await
        .map_err(startup_error)?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(startup_error)?;

    let codec = TokenCodec::new(config.jwt_secret.as_bytes());
    let store: Arc<dyn CredentialStore> = Arc::new(PgCredentialStore::new(pool.clone()));
    let hasher: Arc<dyn PasswordHasher> = Arc::new(BcryptHasher::new(config.bcrypt_cost));
    let public_routes = RouteTable::new(config.public_routes.iter().map(String::as_str));

    let authenticator = Arc::new(RequestAuthenticator::new(
        codec.clone(),
        Arc::clone(&store),
        public_routes,
    ));
    let issuer = web::Data::new(TokenIssuer::new(
        codec,
        store,
        Arc::clone(&hasher),
        config.jwt_expiration,
    )
    .map_err(startup_error)?);
    let hasher = web::Data::from(hasher);
    let pool = web::Data::new(pool);

    log::info!("Starting tasktrack server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(issuer.clone())
            .app_data(hasher.clone())
            .wrap(AuthMiddleware::new(Arc::clone(&authenticator)))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(web::scope("/api").configure(routes::config))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}

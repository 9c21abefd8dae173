use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{AuthService, BcryptHasher, TokenCodec};
use crate::configuration::Settings;
use crate::error::AuthError;
use crate::logger::LoggerMiddleware;
use crate::middleware::JwtMiddleware;
use crate::routes::{
    auth_health, current_user, health_check, json_error_handler, refresh, sign_in, sign_out,
    sign_up,
};
use crate::store::{PgCredentialStore, PgProfileStore};

/// Assemble the auth service over the Postgres stores.
pub fn build_auth_service(settings: &Settings, pool: PgPool) -> Result<AuthService, AuthError> {
    AuthService::new(
        TokenCodec::new(&settings.jwt),
        Arc::new(PgCredentialStore::new(pool.clone())),
        Arc::new(PgProfileStore::new(pool)),
        Arc::new(BcryptHasher::new(settings.password.hash_cost)),
    )
}

pub fn run(listener: TcpListener, auth: Arc<AuthService>) -> Result<Server, std::io::Error> {
    let auth_data = web::Data::from(Arc::clone(&auth));

    let server = HttpServer::new(move || {
        App::new()
            .wrap(LoggerMiddleware)
            .app_data(auth_data.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            // Public routes (no authentication required)
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api/auth")
                    .route("/signin", web::post().to(sign_in))
                    .route("/signup", web::post().to(sign_up))
                    .route("/refresh", web::post().to(refresh))
                    .route("/signout", web::post().to(sign_out))
                    .route("/health", web::get().to(auth_health)),
            )
            // Everything else under /api requires a valid access token
            .service(
                web::scope("/api")
                    .wrap(JwtMiddleware::new(Arc::clone(&auth)))
                    .route("/me", web::get().to(current_user)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}

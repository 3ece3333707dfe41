use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;

use crate::auth::TokenIssuer;
use crate::configuration::Settings;
use crate::email_client::EmailClient;
use crate::middleware::{AuthGuard, RequestLogger, RoleGuard};
use crate::routes::{
    activate_user, current_user, delete_user, get_all_users, health_check, login, logout,
    refresh_session, register, social_auth, update_password, update_user_info, update_user_role,
};
use crate::session::SessionStore;

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    sessions: SessionStore,
    email_client: EmailClient,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let connection = web::Data::new(connection);
    let sessions = web::Data::new(sessions);
    let email_client = web::Data::new(email_client);
    let issuer = web::Data::new(TokenIssuer::new(settings.jwt.clone()));
    let application = web::Data::new(settings.application.clone());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(RequestLogger)
            // Shared state, constructed once at startup
            .app_data(connection.clone())
            .app_data(sessions.clone())
            .app_data(email_client.clone())
            .app_data(issuer.clone())
            .app_data(application.clone())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api/v1")
                    // Public endpoints
                    .route("/registration", web::post().to(register))
                    .route("/activate-user", web::post().to(activate_user))
                    .route("/login", web::post().to(login))
                    .route("/social-auth", web::post().to(social_auth))
                    // Token carried via cookie, no auth guard
                    .route("/refresh", web::get().to(refresh_session))
                    // Everything below requires a live session
                    .service(
                        web::scope("")
                            .wrap(AuthGuard)
                            .route("/logout", web::get().to(logout))
                            .route("/me", web::get().to(current_user))
                            .route("/update-user-info", web::put().to(update_user_info))
                            .route("/update-user-password", web::put().to(update_password))
                            .service(
                                web::resource("/users")
                                    .wrap(RoleGuard::admin())
                                    .route(web::get().to(get_all_users)),
                            )
                            .service(
                                web::resource("/update-user-role")
                                    .wrap(RoleGuard::admin())
                                    .route(web::put().to(update_user_role)),
                            )
                            .service(
                                web::resource("/delete-user/{id}")
                                    .wrap(RoleGuard::admin())
                                    .route(web::delete().to(delete_user)),
                            ),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}

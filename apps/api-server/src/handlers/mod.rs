//! HTTP handlers and route configuration.

mod accounts;
mod health;
mod posts;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        // Accounts
        .route("/register", web::post().to(accounts::register))
        .route("/login", web::post().to(accounts::login))
        .route("/profile", web::put().to(accounts::update_profile))
        // Posts
        .service(
            web::scope("/blogs")
                .route("", web::post().to(posts::create_post))
                .route("", web::get().to(posts::list_posts))
                .route("/{id}", web::put().to(posts::update_post))
                .route("/{id}", web::delete().to(posts::delete_post)),
        );
}

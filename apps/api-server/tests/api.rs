//! End-to-end handler tests against in-memory repositories.

use std::sync::Arc;

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, test, web};
use serde_json::{Value, json};

use api_server::handlers;
use api_server::state::AppState;
use scribe_core::ports::{PasswordService, TokenService};
use scribe_infra::auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

async fn spawn_app() -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>
{
    let state = AppState::in_memory();
    let token_service: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig {
        secret: "integration-test-secret".to_string(),
        expiration_hours: 1,
        issuer: "scribe-test".to_string(),
    }));
    let password_service: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .app_data(web::Data::new(token_service))
            .app_data(web::Data::new(password_service))
            .configure(handlers::configure_routes),
    )
    .await
}

async fn register<S>(app: &S, username: &str) -> ServiceResponse
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "first_name": "Test",
            "last_name": "Author",
            "password": "a strong password"
        }))
        .to_request();
    test::call_service(app, req).await
}

async fn register_and_login<S>(app: &S, username: &str) -> String
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let resp = register(app, username).await;
    assert_eq!(resp.status(), 201, "registration failed for {username}");

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "username": username, "password": "a strong password" }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 200, "login failed for {username}");

    let body: Value = test::read_body_json(resp).await;
    body["access_token"].as_str().unwrap().to_string()
}

async fn create_post<S>(app: &S, token: &str, title: &str, is_draft: bool) -> ServiceResponse
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/blogs")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({
            "title": title,
            "content": "Some content.",
            "category": "Technology",
            "is_draft": is_draft
        }))
        .to_request();
    test::call_service(app, req).await
}

async fn list_posts<S>(app: &S) -> Vec<Value>
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::get().uri("/blogs").to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 200);
    test::read_body_json(resp).await
}

#[actix_rt::test]
async fn registration_returns_the_public_projection() {
    let app = spawn_app().await;

    let resp = register(&app, "henry").await;
    assert_eq!(resp.status(), 201);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["username"], "henry");
    assert_eq!(body["email"], "henry@example.com");
    // The credential never appears in any form.
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[actix_rt::test]
async fn registering_a_taken_username_is_a_field_error() {
    let app = spawn_app().await;

    assert_eq!(register(&app, "henry").await.status(), 201);

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({
            "username": "henry",
            "email": "second@example.com",
            "password": "another password"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"]["username"][0], "username is already taken");

    // No account was created: logging in as the rejected registration fails.
    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "username": "henry", "password": "another password" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 401);
}

#[actix_rt::test]
async fn registration_trims_surrounding_whitespace() {
    let app = spawn_app().await;

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({
            "username": "  henry  ",
            "email": " henry@example.com ",
            "password": "a strong password"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["username"], "henry");
    assert_eq!(body["email"], "henry@example.com");

    // A padded variant of the same name is the same account, not a new one.
    let resp = register(&app, "henry").await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"]["username"][0], "username is already taken");

    // Logging in with the canonical name works.
    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "username": "henry", "password": "a strong password" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);
}

#[actix_rt::test]
async fn registration_validates_shape_before_anything_else() {
    let app = spawn_app().await;

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({ "username": "", "email": "not-an-email", "password": "short" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    for field in ["username", "email", "password"] {
        assert!(body["errors"][field].is_array(), "missing error for {field}");
    }
}

#[actix_rt::test]
async fn creating_a_post_requires_authentication() {
    let app = spawn_app().await;

    let req = test::TestRequest::post()
        .uri("/blogs")
        .set_json(json!({ "title": "Nope", "content": "Nope." }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    // Nothing reached persistence.
    assert!(list_posts(&app).await.is_empty());
}

#[actix_rt::test]
async fn publishing_stamps_the_slug_and_publish_date() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "u1").await;

    let resp = create_post(&app, &token, "My First Post", false).await;
    assert_eq!(resp.status(), 201);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["slug"], "my-first-post");
    assert!(body["publish_date"].is_string());
    assert_eq!(body["is_draft"], false);
    assert_eq!(body["author"]["username"], "u1");
}

#[actix_rt::test]
async fn a_duplicate_title_gets_a_distinct_suffixed_slug() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "u1").await;

    let resp = create_post(&app, &token, "My First Post", false).await;
    assert_eq!(resp.status(), 201);

    let resp = create_post(&app, &token, "My First Post", false).await;
    assert_eq!(resp.status(), 201);

    let body: Value = test::read_body_json(resp).await;
    let slug = body["slug"].as_str().unwrap();
    assert_ne!(slug, "my-first-post");
    assert!(slug.starts_with("my-first-post-"));
}

#[actix_rt::test]
async fn drafts_never_appear_in_the_public_listing() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "u1").await;

    assert_eq!(create_post(&app, &token, "Published", false).await.status(), 201);
    assert_eq!(create_post(&app, &token, "Hidden Draft", true).await.status(), 201);

    let listed = list_posts(&app).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["title"], "Published");

    let draft_resp: Value =
        test::read_body_json(create_post(&app, &token, "Another Draft", true).await).await;
    assert!(draft_resp["publish_date"].is_null());
}

#[actix_rt::test]
async fn only_the_owner_may_edit_a_post() {
    let app = spawn_app().await;
    let owner = register_and_login(&app, "u1").await;
    let intruder = register_and_login(&app, "u2").await;

    let created: Value =
        test::read_body_json(create_post(&app, &owner, "My First Post", false).await).await;
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/blogs/{id}"))
        .insert_header(("Authorization", format!("Bearer {intruder}")))
        .set_json(json!({ "title": "Hijacked", "content": "Mine now." }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    // Post unchanged.
    let listed = list_posts(&app).await;
    assert_eq!(listed[0]["title"], "My First Post");
}

#[actix_rt::test]
async fn updating_keeps_the_slug_and_publish_date_stable() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "u1").await;

    let created: Value =
        test::read_body_json(create_post(&app, &token, "My First Post", false).await).await;
    let id = created["id"].as_str().unwrap().to_string();
    let original_publish_date = created["publish_date"].clone();

    // Full-replace update with the same title.
    let req = test::TestRequest::put()
        .uri(&format!("/blogs/{id}"))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({
            "title": "My First Post",
            "content": "Edited content.",
            "is_draft": false
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 202);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["content"], "Edited content.");
    // Unchanged unique title keeps its slug; the stamp never moves.
    assert_eq!(body["slug"], "my-first-post");
    assert_eq!(body["publish_date"], original_publish_date);
}

#[actix_rt::test]
async fn a_title_edit_rederives_the_slug() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "u1").await;

    let created: Value =
        test::read_body_json(create_post(&app, &token, "My First Post", false).await).await;
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/blogs/{id}"))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({
            "title": "A Better Title",
            "content": "Same content.",
            "is_draft": false
        }))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["slug"], "a-better-title");
}

#[actix_rt::test]
async fn updating_an_unknown_post_is_a_clean_not_found() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "u1").await;

    let req = test::TestRequest::put()
        .uri(&format!("/blogs/{}", uuid::Uuid::new_v4()))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({ "title": "Ghost", "content": "Ghost." }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}

#[actix_rt::test]
async fn an_unknown_category_is_a_field_error() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "u1").await;

    let req = test::TestRequest::post()
        .uri("/blogs")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({
            "title": "Categorized",
            "content": "Body.",
            "category": "Lifestyle"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["errors"]["category"][0]
        .as_str()
        .unwrap()
        .contains("Technology"));
}

#[actix_rt::test]
async fn only_the_owner_may_delete_and_deletion_is_permanent() {
    let app = spawn_app().await;
    let owner = register_and_login(&app, "u1").await;
    let intruder = register_and_login(&app, "u2").await;

    let created: Value =
        test::read_body_json(create_post(&app, &owner, "Short Lived", false).await).await;
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::delete()
        .uri(&format!("/blogs/{id}"))
        .insert_header(("Authorization", format!("Bearer {intruder}")))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 403);

    let req = test::TestRequest::delete()
        .uri(&format!("/blogs/{id}"))
        .insert_header(("Authorization", format!("Bearer {owner}")))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 202);

    assert!(list_posts(&app).await.is_empty());

    // A second delete of the same id is a clean 404.
    let req = test::TestRequest::delete()
        .uri(&format!("/blogs/{id}"))
        .insert_header(("Authorization", format!("Bearer {owner}")))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}

#[actix_rt::test]
async fn profile_update_changes_only_the_provided_fields() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "u1").await;

    let req = test::TestRequest::put()
        .uri("/profile")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({ "bio": "I write about Rust.", "twitter": "https://twitter.com/u1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 202);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["bio"], "I write about Rust.");
    assert_eq!(body["twitter"], "https://twitter.com/u1");
    // Untouched fields survive.
    assert_eq!(body["username"], "u1");
    assert_eq!(body["email"], "u1@example.com");
}

#[actix_rt::test]
async fn profile_update_rejects_a_taken_username() {
    let app = spawn_app().await;
    let _other = register_and_login(&app, "taken").await;
    let token = register_and_login(&app, "u1").await;

    let req = test::TestRequest::put()
        .uri("/profile")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({ "username": "taken" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["errors"]["username"][0], "username is already taken");
}

#[actix_rt::test]
async fn listing_orders_by_publish_date_descending() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "u1").await;

    assert_eq!(create_post(&app, &token, "First Out", false).await.status(), 201);
    assert_eq!(create_post(&app, &token, "Second Out", false).await.status(), 201);

    let listed = list_posts(&app).await;
    let titles: Vec<_> = listed.iter().map(|p| p["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Second Out", "First Out"]);
}

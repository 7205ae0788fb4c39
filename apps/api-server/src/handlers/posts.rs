//! Post handlers: create, list, full-replace update, delete.

use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use scribe_core::domain::{Account, Category, Post};
use scribe_core::slugging::assign_unique_slug;
use scribe_shared::FieldErrors;
use scribe_shared::dto::{PostPayload, PostResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Validate the payload shape and resolve the category string.
fn validate_payload(payload: &PostPayload) -> Result<Option<Category>, AppError> {
    let mut errors = FieldErrors::new();

    if payload.title.trim().is_empty() {
        errors
            .entry("title".to_string())
            .or_default()
            .push("title is required".to_string());
    }
    if payload.content.trim().is_empty() {
        errors
            .entry("content".to_string())
            .or_default()
            .push("content is required".to_string());
    }

    let category = match payload.category.as_deref() {
        None => None,
        Some(raw) => match raw.parse::<Category>() {
            Ok(c) => Some(c),
            Err(_) => {
                errors.entry("category".to_string()).or_default().push(
                    "category must be one of Technology, Economy, Business, Sports".to_string(),
                );
                None
            }
        },
    };

    if errors.is_empty() {
        Ok(category)
    } else {
        Err(AppError::Validation(errors))
    }
}

/// POST /blogs
///
/// The author is always the authenticated caller; the payload cannot name one.
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostPayload>,
) -> AppResult<HttpResponse> {
    let payload = body.into_inner();
    let category = validate_payload(&payload)?;

    let mut post = Post::new(
        identity.account_id,
        payload.title,
        payload.content,
        category,
        payload.image,
        payload.is_draft.unwrap_or(true),
    );
    post.slug = assign_unique_slug(state.posts.as_ref(), &post.title, None).await?;
    post.stamp_publish_date(Utc::now());

    let saved = state.posts.insert(post).await?;
    tracing::info!(post_id = %saved.id, slug = %saved.slug, "Post created");

    let author = state.accounts.find_by_id(identity.account_id).await?;
    Ok(HttpResponse::Created().json(PostResponse::from_post(saved, author.as_ref())))
}

/// GET /blogs
///
/// Public listing of published (non-draft) posts, newest publish date first.
pub async fn list_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.list_published().await?;

    // One author lookup per distinct author, not per post.
    let mut authors: HashMap<Uuid, Account> = HashMap::new();
    for post in &posts {
        if let Some(author_id) = post.author_id {
            if !authors.contains_key(&author_id) {
                if let Some(account) = state.accounts.find_by_id(author_id).await? {
                    authors.insert(author_id, account);
                }
            }
        }
    }

    let body: Vec<PostResponse> = posts
        .into_iter()
        .map(|post| {
            let author = post.author_id.and_then(|id| authors.get(&id));
            PostResponse::from_post(post, author)
        })
        .collect();

    Ok(HttpResponse::Ok().json(body))
}

/// PUT /blogs/{id}
///
/// Full-replace update, owner-only. Re-runs slug assignment (excluding this
/// record from the collision check) and publish stamping.
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<PostPayload>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    let existing = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {post_id} not found")))?;

    if !existing.is_owned_by(identity.account_id) {
        return Err(AppError::Forbidden(
            "You are not allowed to edit this blog".to_string(),
        ));
    }

    let payload = body.into_inner();
    let category = validate_payload(&payload)?;

    let mut post = existing;
    post.title = payload.title;
    post.content = payload.content;
    post.category = category;
    post.image = payload.image;
    post.is_draft = payload.is_draft.unwrap_or(true);

    post.slug = assign_unique_slug(state.posts.as_ref(), &post.title, Some(post.id)).await?;
    post.stamp_publish_date(Utc::now());
    post.touch(Utc::now());

    let saved = state.posts.update(post).await?;

    let author = match saved.author_id {
        Some(id) => state.accounts.find_by_id(id).await?,
        None => None,
    };
    Ok(HttpResponse::Accepted().json(PostResponse::from_post(saved, author.as_ref())))
}

/// DELETE /blogs/{id}
///
/// Owner-only, permanent.
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    let existing = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {post_id} not found")))?;

    if !existing.is_owned_by(identity.account_id) {
        return Err(AppError::Forbidden(
            "You are not allowed to delete this blog".to_string(),
        ));
    }

    state.posts.delete(post_id).await?;
    tracing::info!(post_id = %post_id, "Post deleted");

    Ok(HttpResponse::Accepted().json(json!({ "message": "Blog deleted successfully" })))
}

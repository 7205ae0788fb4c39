//! In-memory repositories.
//!
//! Used when no database is configured (development fallback) and as test
//! doubles for handler tests. They enforce the same uniqueness constraints
//! the PostgreSQL schema does so error paths behave identically.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use scribe_core::domain::{Account, Post};
use scribe_core::error::RepoError;
use scribe_core::ports::{AccountRepository, BaseRepository, PostRepository};

/// In-memory account store keyed by id.
#[derive(Default)]
pub struct InMemoryAccountRepository {
    items: RwLock<HashMap<Uuid, Account>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Account, Uuid> for InMemoryAccountRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, RepoError> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn insert(&self, account: Account) -> Result<Account, RepoError> {
        let mut items = self.items.write().await;
        let taken = items
            .values()
            .any(|a| a.username == account.username || a.email == account.email);
        if taken {
            return Err(RepoError::Constraint(
                "unique constraint on accounts violated".to_string(),
            ));
        }
        items.insert(account.id, account.clone());
        Ok(account)
    }

    async fn update(&self, account: Account) -> Result<Account, RepoError> {
        let mut items = self.items.write().await;
        if !items.contains_key(&account.id) {
            return Err(RepoError::NotFound);
        }
        let taken = items
            .values()
            .any(|a| a.id != account.id && (a.username == account.username || a.email == account.email));
        if taken {
            return Err(RepoError::Constraint(
                "unique constraint on accounts violated".to_string(),
            ));
        }
        items.insert(account.id, account.clone());
        Ok(account)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.items.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, RepoError> {
        Ok(self
            .items
            .read()
            .await
            .values()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepoError> {
        Ok(self
            .items
            .read()
            .await
            .values()
            .find(|a| a.email == email)
            .cloned())
    }
}

/// In-memory post store keyed by id.
#[derive(Default)]
pub struct InMemoryPostRepository {
    items: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut items = self.items.write().await;
        if items.values().any(|p| p.slug == post.slug) {
            return Err(RepoError::Constraint(
                "unique constraint on posts.slug violated".to_string(),
            ));
        }
        items.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut items = self.items.write().await;
        if !items.contains_key(&post.id) {
            return Err(RepoError::NotFound);
        }
        if items.values().any(|p| p.id != post.id && p.slug == post.slug) {
            return Err(RepoError::Constraint(
                "unique constraint on posts.slug violated".to_string(),
            ));
        }
        items.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.items.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, RepoError> {
        Ok(self
            .items
            .read()
            .await
            .values()
            .any(|p| p.slug == slug && Some(p.id) != exclude))
    }

    async fn list_published(&self) -> Result<Vec<Post>, RepoError> {
        let mut posts: Vec<Post> = self
            .items
            .read()
            .await
            .values()
            .filter(|p| !p.is_draft)
            .cloned()
            .collect();

        // Newest publish date first, never-published rows last, creation time
        // as the tie-break.
        posts.sort_by(|a, b| match (b.publish_date, a.publish_date) {
            (Some(x), Some(y)) => x.cmp(&y).then(b.created_at.cmp(&a.created_at)),
            (Some(_), None) => std::cmp::Ordering::Greater,
            (None, Some(_)) => std::cmp::Ordering::Less,
            (None, None) => b.created_at.cmp(&a.created_at),
        });

        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(title: &str, slug: &str, is_draft: bool) -> Post {
        let mut p = Post::new(
            Uuid::new_v4(),
            title.to_string(),
            "content".to_string(),
            None,
            None,
            is_draft,
        );
        p.slug = slug.to_string();
        p.stamp_publish_date(chrono::Utc::now());
        p
    }

    #[tokio::test]
    async fn duplicate_username_is_a_constraint_violation() {
        let repo = InMemoryAccountRepository::new();
        repo.insert(Account::new(
            "henry".into(),
            "henry@example.com".into(),
            String::new(),
            String::new(),
            "hash".into(),
        ))
        .await
        .unwrap();

        let err = repo
            .insert(Account::new(
                "henry".into(),
                "other@example.com".into(),
                String::new(),
                String::new(),
                "hash".into(),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[tokio::test]
    async fn listing_skips_drafts_and_orders_newest_first() {
        let repo = InMemoryPostRepository::new();

        let mut old = post("Old", "old", false);
        old.publish_date = Some(chrono::Utc::now() - chrono::TimeDelta::days(3));
        repo.insert(old).await.unwrap();
        repo.insert(post("New", "new", false)).await.unwrap();
        repo.insert(post("Hidden", "hidden", true)).await.unwrap();

        let listed = repo.list_published().await.unwrap();
        let slugs: Vec<_> = listed.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn slug_exists_honors_the_exclusion() {
        let repo = InMemoryPostRepository::new();
        let p = post("Mine", "mine", true);
        let id = p.id;
        repo.insert(p).await.unwrap();

        assert!(repo.slug_exists("mine", None).await.unwrap());
        assert!(!repo.slug_exists("mine", Some(id)).await.unwrap());
        assert!(!repo.slug_exists("other", None).await.unwrap());
    }

    #[tokio::test]
    async fn updating_a_missing_post_reports_not_found() {
        let repo = InMemoryPostRepository::new();
        let err = repo.update(post("Ghost", "ghost", true)).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound));
    }
}

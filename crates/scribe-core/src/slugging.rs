//! Slug assignment - the one piece of real logic in the system.
//!
//! Every save derives the post's URL identifier from its title: normalize the
//! title into lowercase hyphen-separated tokens, then resolve collisions by
//! appending a single random ASCII letter and re-checking. The record being
//! updated is excluded from the collision check so that re-saving an
//! unchanged, already-unique title keeps its slug. Retries are capped; hitting
//! the cap is reported as a conflict rather than looping forever.

use rand::Rng;
use thiserror::Error;
use uuid::Uuid;

use crate::error::RepoError;
use crate::ports::PostRepository;

/// Collision retries before giving up. Each retry draws from 52 letters, so
/// exhaustion only happens when a title has been reused dozens of times.
pub const MAX_SLUG_ATTEMPTS: usize = 16;

const SUFFIX_ALPHABET: &[u8; 52] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Errors from slug assignment.
#[derive(Debug, Error)]
pub enum SlugError {
    #[error("title contains no characters usable in a slug")]
    EmptyTitle,

    #[error("could not allocate a unique slug for \"{0}\"")]
    Exhausted(String),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Normalize a title into its base slug: lowercase, ASCII-safe,
/// hyphen-separated tokens with punctuation stripped.
pub fn base_slug(title: &str) -> String {
    slug::slugify(title)
}

/// Derive a slug for `title` that is unique across all posts.
///
/// `exclude` names the post being updated, if any, so its own current slug
/// does not count as a collision.
pub async fn assign_unique_slug(
    posts: &dyn PostRepository,
    title: &str,
    exclude: Option<Uuid>,
) -> Result<String, SlugError> {
    let base = base_slug(title);
    if base.is_empty() {
        return Err(SlugError::EmptyTitle);
    }

    let mut candidate = base.clone();
    for _ in 0..MAX_SLUG_ATTEMPTS {
        if !posts.slug_exists(&candidate, exclude).await? {
            return Ok(candidate);
        }
        let letter = SUFFIX_ALPHABET[rand::rng().random_range(0..SUFFIX_ALPHABET.len())] as char;
        candidate = format!("{base}-{letter}");
    }

    Err(SlugError::Exhausted(base))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::*;
    use crate::domain::Post;
    use crate::ports::BaseRepository;

    /// Minimal in-memory stand-in tracking only (id, slug) pairs.
    struct SlugSet {
        taken: Mutex<Vec<(Uuid, String)>>,
    }

    impl SlugSet {
        fn new(slugs: &[&str]) -> Self {
            Self {
                taken: Mutex::new(
                    slugs
                        .iter()
                        .map(|s| (Uuid::new_v4(), s.to_string()))
                        .collect(),
                ),
            }
        }

        fn with_ids(pairs: Vec<(Uuid, String)>) -> Self {
            Self {
                taken: Mutex::new(pairs),
            }
        }
    }

    #[async_trait]
    impl BaseRepository<Post, Uuid> for SlugSet {
        async fn find_by_id(&self, _id: Uuid) -> Result<Option<Post>, RepoError> {
            unimplemented!("not used by slug assignment")
        }

        async fn insert(&self, post: Post) -> Result<Post, RepoError> {
            self.taken.lock().await.push((post.id, post.slug.clone()));
            Ok(post)
        }

        async fn update(&self, post: Post) -> Result<Post, RepoError> {
            Ok(post)
        }

        async fn delete(&self, _id: Uuid) -> Result<(), RepoError> {
            Ok(())
        }
    }

    #[async_trait]
    impl PostRepository for SlugSet {
        async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, RepoError> {
            Ok(self
                .taken
                .lock()
                .await
                .iter()
                .any(|(id, s)| s == slug && Some(*id) != exclude))
        }

        async fn list_published(&self) -> Result<Vec<Post>, RepoError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn base_slug_is_lowercase_hyphenated_ascii() {
        assert_eq!(base_slug("My First Post"), "my-first-post");
        assert_eq!(base_slug("  Hello,   World!  "), "hello-world");
        assert_eq!(base_slug("Rust 2024: what's new?"), "rust-2024-what-s-new");
        assert!(base_slug("!!!").is_empty());
    }

    #[tokio::test]
    async fn unique_title_keeps_its_base_slug() {
        let posts = SlugSet::new(&["something-else"]);
        let slug = assign_unique_slug(&posts, "My First Post", None)
            .await
            .unwrap();
        assert_eq!(slug, "my-first-post");
    }

    #[tokio::test]
    async fn collision_appends_a_single_random_letter() {
        let posts = SlugSet::new(&["my-first-post"]);
        let slug = assign_unique_slug(&posts, "My First Post", None)
            .await
            .unwrap();
        assert_ne!(slug, "my-first-post");
        assert!(slug.starts_with("my-first-post-"));
        assert_eq!(slug.len(), "my-first-post-".len() + 1);
        assert!(slug.chars().last().unwrap().is_ascii_alphabetic());
    }

    #[tokio::test]
    async fn update_excludes_its_own_record_from_the_check() {
        let id = Uuid::new_v4();
        let posts = SlugSet::with_ids(vec![(id, "my-first-post".into())]);

        // Re-saving the same title on the same record must not churn the slug.
        let slug = assign_unique_slug(&posts, "My First Post", Some(id))
            .await
            .unwrap();
        assert_eq!(slug, "my-first-post");

        // A different record colliding with it still gets suffixed.
        let other = assign_unique_slug(&posts, "My First Post", Some(Uuid::new_v4()))
            .await
            .unwrap();
        assert_ne!(other, "my-first-post");
    }

    #[tokio::test]
    async fn empty_title_is_rejected() {
        let posts = SlugSet::new(&[]);
        let err = assign_unique_slug(&posts, "???", None).await.unwrap_err();
        assert!(matches!(err, SlugError::EmptyTitle));
    }

    #[tokio::test]
    async fn exhausting_the_suffix_space_is_a_conflict() {
        // Occupy the base and every single-letter suffix.
        let mut taken = vec![(Uuid::new_v4(), "dup".to_string())];
        for letter in SUFFIX_ALPHABET {
            taken.push((Uuid::new_v4(), format!("dup-{}", *letter as char)));
        }
        let posts = SlugSet::with_ids(taken);

        let err = assign_unique_slug(&posts, "Dup", None).await.unwrap_err();
        assert!(matches!(err, SlugError::Exhausted(base) if base == "dup"));
    }

    #[tokio::test]
    async fn repeated_saves_of_the_same_title_all_get_distinct_slugs() {
        let posts = SlugSet::new(&[]);
        let mut seen = HashSet::new();
        for _ in 0..10 {
            let slug = assign_unique_slug(&posts, "My First Post", None)
                .await
                .unwrap();
            assert!(seen.insert(slug.clone()), "slug {slug} repeated");
            let mut post = Post::new(
                Uuid::new_v4(),
                "My First Post".into(),
                "body".into(),
                None,
                None,
                true,
            );
            post.slug = slug;
            posts.insert(post).await.unwrap();
        }
    }
}

//! Owner view cache.
//!
//! Caches the per-owner listing and per-post detail reads so browsing does
//! not hit the repository on every request. Mutations invalidate exactly
//! the entries they touched; a short TTL bounds staleness regardless.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;

use jajan_shared::{OwnerId, PostId};

use super::types::Post;

/// Default cache capacity (number of entries).
const DEFAULT_CACHE_CAPACITY: u64 = 1_000;

/// Default time-to-live for cache entries (60 seconds).
const DEFAULT_TTL_SECS: u64 = 60;

/// Cache for rendered post views.
#[derive(Clone)]
pub struct ViewCache {
    listings: Cache<OwnerId, Arc<Vec<Post>>>,
    details: Cache<(OwnerId, PostId), Arc<Post>>,
}

impl ViewCache {
    /// Creates a view cache with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a view cache with custom capacity and TTL.
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        Self {
            listings: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(Duration::from_secs(ttl_secs))
                .build(),
            details: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(Duration::from_secs(ttl_secs))
                .build(),
        }
    }

    /// Returns the cached listing for an owner, if warm.
    #[must_use]
    pub fn listing(&self, owner: &OwnerId) -> Option<Arc<Vec<Post>>> {
        self.listings.get(owner)
    }

    /// Stores an owner's listing.
    pub fn store_listing(&self, owner: &OwnerId, posts: Vec<Post>) {
        self.listings.insert(owner.clone(), Arc::new(posts));
    }

    /// Returns the cached detail view for a post, if warm.
    #[must_use]
    pub fn detail(&self, owner: &OwnerId, id: PostId) -> Option<Arc<Post>> {
        self.details.get(&(owner.clone(), id))
    }

    /// Stores a post's detail view.
    pub fn store_detail(&self, post: &Post) {
        self.details
            .insert((post.owner.clone(), post.id), Arc::new(post.clone()));
    }

    /// Invalidates an owner's listing (after create).
    pub fn invalidate_listing(&self, owner: &OwnerId) {
        self.listings.invalidate(owner);
    }

    /// Invalidates an owner's listing and one post's detail view (after
    /// update or delete).
    pub fn invalidate_post(&self, owner: &OwnerId, id: PostId) {
        self.listings.invalidate(owner);
        self.details.invalidate(&(owner.clone(), id));
    }
}

impl Default for ViewCache {
    fn default() -> Self {
        Self::new()
    }
}

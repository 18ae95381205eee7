//! Post lifecycle service implementation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use jajan_shared::{OwnerId, PostId};

use super::cache::ViewCache;
use super::error::{MutationKind, PostError};
use super::types::{
    CleanupOutcome, CreatePostInput, NewPostRecord, PhotoUpload, Post, PostChanges,
    UpdatePostInput,
};
use crate::storage::{ObjectStore, PathCodec};

/// Repository trait for post persistence.
///
/// Implemented by the db crate. Every mutating call takes both the primary
/// key and the owner in one filter predicate; there is deliberately no way
/// to check existence and ownership separately.
pub trait PostRepository: Send + Sync {
    /// Insert a new post row, returning the stored post.
    fn insert(
        &self,
        record: NewPostRecord,
    ) -> impl std::future::Future<Output = Result<Post, PostError>> + Send;

    /// Update a post filtered by `id` AND owner, returning rows affected.
    fn update(
        &self,
        id: PostId,
        owner: &OwnerId,
        changes: PostChanges,
    ) -> impl std::future::Future<Output = Result<u64, PostError>> + Send;

    /// Delete a post filtered by `id` AND owner, returning rows affected.
    fn delete(
        &self,
        id: PostId,
        owner: &OwnerId,
    ) -> impl std::future::Future<Output = Result<u64, PostError>> + Send;

    /// List an owner's posts, newest first.
    fn list_for_owner(
        &self,
        owner: &OwnerId,
    ) -> impl std::future::Future<Output = Result<Vec<Post>, PostError>> + Send;

    /// Find one post scoped by owner.
    fn find_by_id(
        &self,
        id: PostId,
        owner: &OwnerId,
    ) -> impl std::future::Future<Output = Result<Option<Post>, PostError>> + Send;
}

/// Orchestrates the post-photo lifecycle across the repository and the
/// object store.
pub struct PostService<R: PostRepository, S: ObjectStore> {
    repo: Arc<R>,
    store: Arc<S>,
    codec: PathCodec,
    cache: ViewCache,
}

impl<R: PostRepository, S: ObjectStore> PostService<R, S> {
    /// Create a new post service.
    #[must_use]
    pub fn new(repo: Arc<R>, store: Arc<S>, codec: PathCodec) -> Self {
        Self {
            repo,
            store,
            codec,
            cache: ViewCache::new(),
        }
    }

    /// Create a new post service with a custom view cache.
    #[must_use]
    pub fn with_cache(repo: Arc<R>, store: Arc<S>, codec: PathCodec, cache: ViewCache) -> Self {
        Self {
            repo,
            store,
            codec,
            cache,
        }
    }

    /// Create a post.
    ///
    /// The photo (when present) is uploaded before the row is written, so
    /// an upload failure aborts the whole operation with no row. A row
    /// failure after a successful upload triggers a compensating delete of
    /// the fresh blob.
    ///
    /// # Errors
    ///
    /// Returns an error if validation, the upload, or the insert fails.
    pub async fn create(&self, input: CreatePostInput) -> Result<Post, PostError> {
        let place_name = required_trimmed(&input.place_name)?;
        let notes = normalized_notes(input.notes.as_deref());

        let mut photo_url = None;
        let mut uploaded_path = None;

        if let Some(photo) = input.photo.filter(|p| !p.is_empty()) {
            let path = self.codec.encode(&input.owner, &photo.file_name);
            let url = self.upload(&path, photo).await?;
            photo_url = Some(url);
            uploaded_path = Some(path);
        }

        let record = NewPostRecord {
            id: PostId::new(),
            owner: input.owner.clone(),
            place_name,
            notes,
            photo_url,
        };

        match self.repo.insert(record).await {
            Ok(post) => {
                info!(post_id = %post.id, owner = %post.owner, "Post created");
                self.cache.invalidate_listing(&post.owner);
                Ok(post)
            }
            Err(err) => {
                // The row never landed; reclaim the blob uploaded above.
                if let Some(path) = uploaded_path {
                    let outcome = self.remove_path(&path).await;
                    log_cleanup("create rollback", &path, &outcome);
                }
                Err(err)
            }
        }
    }

    /// Update a post.
    ///
    /// A replacement photo is uploaded to a fresh path first; the old photo
    /// is only removed after the row write has committed, so a cleanup
    /// failure can never leave the row pointing at a missing object.
    ///
    /// # Errors
    ///
    /// Returns an error if validation, the upload, or the row write fails.
    /// A write affecting zero rows (unknown id, or a post owned by someone
    /// else) is indistinguishable from any other persistence failure.
    pub async fn update(&self, input: UpdatePostInput) -> Result<(), PostError> {
        let place_name = required_trimmed(&input.place_name)?;
        let notes = normalized_notes(input.notes.as_deref());

        let mut photo_url = input.existing_photo_url.clone();
        let mut new_path = None;

        if let Some(photo) = input.new_photo.filter(|p| !p.is_empty()) {
            let path = self.codec.encode(&input.owner, &photo.file_name);
            let url = self.upload(&path, photo).await?;
            photo_url = Some(url);
            new_path = Some(path);
        }

        let changes = PostChanges {
            place_name,
            notes,
            photo_url,
        };

        let rows = match self.repo.update(input.id, &input.owner, changes).await {
            Ok(rows) => rows,
            Err(err) => {
                self.rollback_new_photo(new_path.as_deref()).await;
                return Err(err);
            }
        };

        if rows == 0 {
            self.rollback_new_photo(new_path.as_deref()).await;
            return Err(PostError::Persistence(MutationKind::Update));
        }

        // Row committed; the old photo (if replaced) is now unreferenced.
        if new_path.is_some() {
            if let Some(old_url) = &input.existing_photo_url {
                let outcome = self.remove_url(old_url).await;
                log_cleanup("replaced photo", old_url, &outcome);
            }
        }

        info!(post_id = %input.id, owner = %input.owner, "Post updated");
        self.cache.invalidate_post(&input.owner, input.id);
        Ok(())
    }

    /// Delete a post.
    ///
    /// The row goes first; the blob is only touched once the row delete has
    /// committed. When the delete affects zero rows the photo is left
    /// alone, since the row may still exist under another owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the row delete fails or affects zero rows.
    pub async fn delete(
        &self,
        id: PostId,
        owner: &OwnerId,
        photo_url: Option<&str>,
    ) -> Result<(), PostError> {
        let rows = self.repo.delete(id, owner).await?;

        if rows == 0 {
            return Err(PostError::Persistence(MutationKind::Delete));
        }

        if let Some(url) = photo_url {
            let outcome = self.remove_url(url).await;
            log_cleanup("deleted post photo", url, &outcome);
        }

        info!(post_id = %id, owner = %owner, "Post deleted");
        self.cache.invalidate_post(owner, id);
        Ok(())
    }

    /// List an owner's posts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository read fails.
    pub async fn list(&self, owner: &OwnerId) -> Result<Vec<Post>, PostError> {
        if let Some(cached) = self.cache.listing(owner) {
            return Ok((*cached).clone());
        }

        let posts = self.repo.list_for_owner(owner).await?;
        self.cache.store_listing(owner, posts.clone());
        Ok(posts)
    }

    /// Get one post, owner-scoped.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository read fails.
    pub async fn get(&self, id: PostId, owner: &OwnerId) -> Result<Option<Post>, PostError> {
        if let Some(cached) = self.cache.detail(owner, id) {
            return Ok(Some((*cached).clone()));
        }

        let post = self.repo.find_by_id(id, owner).await?;
        if let Some(post) = &post {
            self.cache.store_detail(post);
        }
        Ok(post)
    }

    /// Upload a photo to the given path.
    async fn upload(&self, path: &str, photo: PhotoUpload) -> Result<String, PostError> {
        self.store
            .upload(path, photo.bytes, &photo.content_type)
            .await
            .map_err(PostError::Storage)
    }

    /// Best-effort removal of a freshly uploaded blob after a failed row
    /// write.
    async fn rollback_new_photo(&self, path: Option<&str>) {
        if let Some(path) = path {
            let outcome = self.remove_path(path).await;
            log_cleanup("update rollback", path, &outcome);
        }
    }

    /// Best-effort removal keyed by public URL. A URL the codec cannot map
    /// back to a path (legacy or externally hosted) skips cleanup.
    async fn remove_url(&self, url: &str) -> CleanupOutcome {
        match self.codec.decode(url) {
            Some(path) => self.remove_path(&path).await,
            None => CleanupOutcome::Skipped,
        }
    }

    /// Best-effort removal keyed by storage path.
    async fn remove_path(&self, path: &str) -> CleanupOutcome {
        match self.store.remove(path).await {
            Ok(()) => CleanupOutcome::Removed,
            Err(err) => CleanupOutcome::Failed(err.to_string()),
        }
    }
}

/// Cleanup outcomes are logged here and nowhere else; they never alter the
/// result of the operation that triggered them.
fn log_cleanup(context: &str, object: &str, outcome: &CleanupOutcome) {
    match outcome {
        CleanupOutcome::Removed => debug!(object, "{context}: stale photo removed"),
        CleanupOutcome::Skipped => debug!(object, "{context}: no deletable path, skipped"),
        CleanupOutcome::Failed(reason) => {
            warn!(object, reason, "{context}: photo cleanup failed");
        }
    }
}

/// Trims a required field, rejecting whitespace-only input.
fn required_trimmed(value: &str) -> Result<String, PostError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PostError::place_name_required());
    }
    Ok(trimmed.to_string())
}

/// Trims notes; blank notes become NULL rather than empty strings.
fn normalized_notes(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;
    use bytes::Bytes;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const BUCKET: &str = "food-posts";
    const BASE_URL: &str = "https://unit.test";

    /// In-memory repository. `deny_writes` simulates a repository outage;
    /// rows are keyed by id and every mutation re-checks the owner, like
    /// the real combined filter.
    struct MockRepository {
        rows: Mutex<HashMap<PostId, Post>>,
        deny_writes: bool,
    }

    impl MockRepository {
        fn new() -> Self {
            Self {
                rows: Mutex::new(HashMap::new()),
                deny_writes: false,
            }
        }

        fn failing() -> Self {
            Self {
                rows: Mutex::new(HashMap::new()),
                deny_writes: true,
            }
        }

        fn seed(&self, post: Post) {
            self.rows.lock().unwrap().insert(post.id, post);
        }

        fn row(&self, id: PostId) -> Option<Post> {
            self.rows.lock().unwrap().get(&id).cloned()
        }

        fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    impl PostRepository for MockRepository {
        async fn insert(&self, record: NewPostRecord) -> Result<Post, PostError> {
            if self.deny_writes {
                return Err(PostError::Persistence(MutationKind::Create));
            }
            let post = Post {
                id: record.id,
                created_at: Utc::now(),
                owner: record.owner,
                place_name: record.place_name,
                notes: record.notes,
                photo_url: record.photo_url,
            };
            self.rows.lock().unwrap().insert(post.id, post.clone());
            Ok(post)
        }

        async fn update(
            &self,
            id: PostId,
            owner: &OwnerId,
            changes: PostChanges,
        ) -> Result<u64, PostError> {
            if self.deny_writes {
                return Err(PostError::Persistence(MutationKind::Update));
            }
            let mut rows = self.rows.lock().unwrap();
            match rows.get_mut(&id).filter(|p| p.owner == *owner) {
                Some(post) => {
                    post.place_name = changes.place_name;
                    post.notes = changes.notes;
                    post.photo_url = changes.photo_url;
                    Ok(1)
                }
                None => Ok(0),
            }
        }

        async fn delete(&self, id: PostId, owner: &OwnerId) -> Result<u64, PostError> {
            if self.deny_writes {
                return Err(PostError::Persistence(MutationKind::Delete));
            }
            let mut rows = self.rows.lock().unwrap();
            let owned = rows.get(&id).is_some_and(|p| p.owner == *owner);
            if owned {
                rows.remove(&id);
                Ok(1)
            } else {
                Ok(0)
            }
        }

        async fn list_for_owner(&self, owner: &OwnerId) -> Result<Vec<Post>, PostError> {
            let mut posts: Vec<Post> = self
                .rows
                .lock()
                .unwrap()
                .values()
                .filter(|p| p.owner == *owner)
                .cloned()
                .collect();
            posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(posts)
        }

        async fn find_by_id(&self, id: PostId, owner: &OwnerId) -> Result<Option<Post>, PostError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .get(&id)
                .filter(|p| p.owner == *owner)
                .cloned())
        }
    }

    /// In-memory object store producing URLs in the same shape as the real
    /// service, so the codec can decode them back.
    struct MockStore {
        objects: Mutex<HashMap<String, usize>>,
        remove_calls: Mutex<Vec<String>>,
        fail_uploads: bool,
        fail_removes: bool,
    }

    impl MockStore {
        fn new() -> Self {
            Self {
                objects: Mutex::new(HashMap::new()),
                remove_calls: Mutex::new(Vec::new()),
                fail_uploads: false,
                fail_removes: false,
            }
        }

        fn failing_uploads() -> Self {
            Self {
                fail_uploads: true,
                ..Self::new()
            }
        }

        fn failing_removes() -> Self {
            Self {
                fail_removes: true,
                ..Self::new()
            }
        }

        fn contains(&self, path: &str) -> bool {
            self.objects.lock().unwrap().contains_key(path)
        }

        fn object_count(&self) -> usize {
            self.objects.lock().unwrap().len()
        }

        fn remove_calls(&self) -> Vec<String> {
            self.remove_calls.lock().unwrap().clone()
        }
    }

    impl ObjectStore for MockStore {
        async fn upload(
            &self,
            path: &str,
            bytes: Bytes,
            _content_type: &str,
        ) -> Result<String, StorageError> {
            if self.fail_uploads {
                return Err(StorageError::bucket_not_found(BUCKET));
            }
            self.objects
                .lock()
                .unwrap()
                .insert(path.to_string(), bytes.len());
            self.public_url(path)
        }

        fn public_url(&self, path: &str) -> Result<String, StorageError> {
            Ok(format!(
                "{BASE_URL}/storage/v1/object/public/{BUCKET}/{path}"
            ))
        }

        async fn remove(&self, path: &str) -> Result<(), StorageError> {
            self.remove_calls.lock().unwrap().push(path.to_string());
            if self.fail_removes {
                return Err(StorageError::operation("remove failed"));
            }
            self.objects.lock().unwrap().remove(path);
            Ok(())
        }
    }

    fn service(
        repo: MockRepository,
        store: MockStore,
    ) -> (
        PostService<MockRepository, MockStore>,
        Arc<MockRepository>,
        Arc<MockStore>,
    ) {
        let repo = Arc::new(repo);
        let store = Arc::new(store);
        let service = PostService::new(repo.clone(), store.clone(), PathCodec::new(BUCKET));
        (service, repo, store)
    }

    fn owner() -> OwnerId {
        OwnerId::new("user_a")
    }

    fn photo() -> PhotoUpload {
        PhotoUpload {
            file_name: "brunch.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: Bytes::from_static(b"\xff\xd8\xff\xe0"),
        }
    }

    fn create_input(photo: Option<PhotoUpload>) -> CreatePostInput {
        CreatePostInput {
            owner: owner(),
            place_name: "Blue Bottle".to_string(),
            notes: Some("flat white, perfect crema".to_string()),
            photo,
        }
    }

    async fn seeded_post_with_photo(
        service: &PostService<MockRepository, MockStore>,
    ) -> Post {
        service
            .create(create_input(Some(photo())))
            .await
            .expect("create should succeed")
    }

    // --- create ---

    #[tokio::test]
    async fn test_create_without_photo() {
        let (service, repo, store) = service(MockRepository::new(), MockStore::new());

        let post = service.create(create_input(None)).await.unwrap();

        assert_eq!(post.place_name, "Blue Bottle");
        assert!(post.photo_url.is_none());
        assert_eq!(repo.len(), 1);
        assert_eq!(store.object_count(), 0);
    }

    #[tokio::test]
    async fn test_create_with_empty_photo_is_no_photo() {
        let (service, _, store) = service(MockRepository::new(), MockStore::new());

        let empty = PhotoUpload {
            file_name: "brunch.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: Bytes::new(),
        };
        let post = service.create(create_input(Some(empty))).await.unwrap();

        assert!(post.photo_url.is_none());
        assert_eq!(store.object_count(), 0);
    }

    #[tokio::test]
    async fn test_create_with_photo_links_public_url() {
        let (service, _, store) = service(MockRepository::new(), MockStore::new());

        let post = service.create(create_input(Some(photo()))).await.unwrap();

        let url = post.photo_url.expect("photo url");
        assert!(url.starts_with(BASE_URL));
        let path = PathCodec::new(BUCKET).decode(&url).expect("decodable");
        assert!(store.contains(&path));
        assert!(path.starts_with("user_a/"));
        assert!(path.ends_with(".jpg"));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_place_name() {
        let (service, repo, store) = service(MockRepository::new(), MockStore::new());

        let input = CreatePostInput {
            place_name: "   ".to_string(),
            ..create_input(Some(photo()))
        };
        let err = service.create(input).await.unwrap_err();

        assert!(matches!(err, PostError::Validation(_)));
        assert_eq!(err.to_string(), "Place name is required.");
        // Validation runs before the upload: nothing was written anywhere.
        assert_eq!(repo.len(), 0);
        assert_eq!(store.object_count(), 0);
    }

    #[tokio::test]
    async fn test_create_blank_notes_become_null() {
        let (service, _, _) = service(MockRepository::new(), MockStore::new());

        let input = CreatePostInput {
            notes: Some("   ".to_string()),
            ..create_input(None)
        };
        let post = service.create(input).await.unwrap();

        assert!(post.notes.is_none());
    }

    #[tokio::test]
    async fn test_create_upload_failure_writes_no_row() {
        let (service, repo, _) = service(MockRepository::new(), MockStore::failing_uploads());

        let err = service.create(create_input(Some(photo()))).await.unwrap_err();

        assert!(matches!(
            err,
            PostError::Storage(StorageError::BucketNotFound { .. })
        ));
        assert_eq!(repo.len(), 0);
    }

    #[tokio::test]
    async fn test_create_insert_failure_reclaims_uploaded_blob() {
        let (service, _, store) = service(MockRepository::failing(), MockStore::new());

        let err = service.create(create_input(Some(photo()))).await.unwrap_err();

        assert!(matches!(
            err,
            PostError::Persistence(MutationKind::Create)
        ));
        assert_eq!(store.object_count(), 0);
        assert_eq!(store.remove_calls().len(), 1);
    }

    // --- update ---

    fn update_input(post: &Post, new_photo: Option<PhotoUpload>) -> UpdatePostInput {
        UpdatePostInput {
            id: post.id,
            owner: post.owner.clone(),
            place_name: "Blue Bottle Annex".to_string(),
            notes: post.notes.clone(),
            existing_photo_url: post.photo_url.clone(),
            new_photo,
        }
    }

    #[tokio::test]
    async fn test_update_without_new_photo_keeps_existing_url() {
        let (service, repo, store) = service(MockRepository::new(), MockStore::new());
        let post = seeded_post_with_photo(&service).await;

        service.update(update_input(&post, None)).await.unwrap();

        let row = repo.row(post.id).unwrap();
        assert_eq!(row.place_name, "Blue Bottle Annex");
        assert_eq!(row.photo_url, post.photo_url);
        assert_eq!(store.remove_calls().len(), 0);
    }

    #[tokio::test]
    async fn test_update_replacing_photo_removes_old_blob() {
        let (service, repo, store) = service(MockRepository::new(), MockStore::new());
        let post = seeded_post_with_photo(&service).await;
        let old_path = PathCodec::new(BUCKET)
            .decode(post.photo_url.as_ref().unwrap())
            .unwrap();

        service
            .update(update_input(&post, Some(photo())))
            .await
            .unwrap();

        let row = repo.row(post.id).unwrap();
        let new_url = row.photo_url.unwrap();
        assert_ne!(new_url, post.photo_url.clone().unwrap());
        assert!(!store.contains(&old_path));
        assert_eq!(store.remove_calls(), vec![old_path]);
    }

    #[tokio::test]
    async fn test_update_upload_failure_leaves_everything_untouched() {
        let (service, repo, store) = service(MockRepository::new(), MockStore::new());
        let post = seeded_post_with_photo(&service).await;
        let old_path = PathCodec::new(BUCKET)
            .decode(post.photo_url.as_ref().unwrap())
            .unwrap();

        // Swap in a store that refuses uploads but still holds the old blob.
        let failing = Arc::new(MockStore::failing_uploads());
        let keep_repo = repo.clone();
        let service2: PostService<MockRepository, MockStore> =
            PostService::new(keep_repo, failing.clone(), PathCodec::new(BUCKET));

        let err = service2
            .update(update_input(&post, Some(photo())))
            .await
            .unwrap_err();

        assert!(matches!(err, PostError::Storage(_)));
        let row = repo.row(post.id).unwrap();
        assert_eq!(row.place_name, post.place_name);
        assert_eq!(row.photo_url, post.photo_url);
        assert!(store.contains(&old_path));
        assert_eq!(failing.remove_calls().len(), 0);
    }

    #[tokio::test]
    async fn test_update_row_failure_reclaims_new_blob_only() {
        let (service, _, store) = service(MockRepository::new(), MockStore::new());
        let post = seeded_post_with_photo(&service).await;
        let old_path = PathCodec::new(BUCKET)
            .decode(post.photo_url.as_ref().unwrap())
            .unwrap();

        let failing_repo = Arc::new(MockRepository::failing());
        let service2 = PostService::new(failing_repo, store.clone(), PathCodec::new(BUCKET));

        let err = service2
            .update(update_input(&post, Some(photo())))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PostError::Persistence(MutationKind::Update)
        ));
        // The fresh blob was removed; the committed one survives.
        assert!(store.contains(&old_path));
        assert_eq!(store.object_count(), 1);
        assert_eq!(store.remove_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_update_foreign_owner_affects_nothing() {
        let (service, repo, store) = service(MockRepository::new(), MockStore::new());
        let post = seeded_post_with_photo(&service).await;

        let mut input = update_input(&post, Some(photo()));
        input.owner = OwnerId::new("user_b");

        let err = service.update(input).await.unwrap_err();

        // Indistinguishable from not-found: the same generic failure.
        assert!(matches!(
            err,
            PostError::Persistence(MutationKind::Update)
        ));
        let row = repo.row(post.id).unwrap();
        assert_eq!(row.place_name, post.place_name);
        // The speculative upload was rolled back.
        assert_eq!(store.object_count(), 1);
    }

    #[tokio::test]
    async fn test_update_skips_cleanup_for_foreign_existing_url() {
        let (service, repo, store) = service(MockRepository::new(), MockStore::new());
        let post = seeded_post_with_photo(&service).await;

        let mut input = update_input(&post, Some(photo()));
        input.existing_photo_url = Some("https://example.com/images/cat.jpg".to_string());

        service.update(input).await.unwrap();

        // Decode fails for the foreign URL, so no remove is attempted
        // against it; only the new blob exists alongside the original one.
        let foreign_removes: Vec<_> = store
            .remove_calls()
            .into_iter()
            .filter(|p| p.contains("cat"))
            .collect();
        assert!(foreign_removes.is_empty());
        assert!(repo.row(post.id).unwrap().photo_url.is_some());
    }

    // --- delete ---

    #[tokio::test]
    async fn test_delete_removes_row_then_blob_once() {
        let (service, repo, store) = service(MockRepository::new(), MockStore::new());
        let post = seeded_post_with_photo(&service).await;
        let path = PathCodec::new(BUCKET)
            .decode(post.photo_url.as_ref().unwrap())
            .unwrap();

        service
            .delete(post.id, &post.owner, post.photo_url.as_deref())
            .await
            .unwrap();

        assert!(repo.row(post.id).is_none());
        assert_eq!(store.remove_calls(), vec![path]);
        assert_eq!(store.object_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_reports_success_even_when_remove_fails() {
        let (service, repo, store) = service(MockRepository::new(), MockStore::failing_removes());
        let post = seeded_post_with_photo(&service).await;

        service
            .delete(post.id, &post.owner, post.photo_url.as_deref())
            .await
            .unwrap();

        assert!(repo.row(post.id).is_none());
        assert_eq!(store.remove_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_without_photo_touches_no_storage() {
        let (service, repo, store) = service(MockRepository::new(), MockStore::new());
        let post = service.create(create_input(None)).await.unwrap();

        service.delete(post.id, &post.owner, None).await.unwrap();

        assert!(repo.row(post.id).is_none());
        assert_eq!(store.remove_calls().len(), 0);
    }

    #[tokio::test]
    async fn test_delete_foreign_owner_leaves_row_and_blob() {
        let (service, repo, store) = service(MockRepository::new(), MockStore::new());
        let post = seeded_post_with_photo(&service).await;

        let err = service
            .delete(post.id, &OwnerId::new("user_b"), post.photo_url.as_deref())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PostError::Persistence(MutationKind::Delete)
        ));
        assert!(repo.row(post.id).is_some());
        assert_eq!(store.object_count(), 1);
        assert_eq!(store.remove_calls().len(), 0);
    }

    #[tokio::test]
    async fn test_delete_repo_failure_leaves_blob() {
        let (_, _, store) = service(MockRepository::new(), MockStore::new());
        let failing_repo = Arc::new(MockRepository::failing());
        let owner = owner();
        let seeded = Post {
            id: PostId::new(),
            created_at: Utc::now(),
            owner: owner.clone(),
            place_name: "Blue Bottle".to_string(),
            notes: None,
            photo_url: Some(format!(
                "{BASE_URL}/storage/v1/object/public/{BUCKET}/user_a/x.jpg"
            )),
        };
        failing_repo.seed(seeded.clone());
        let service2 = PostService::new(failing_repo, store.clone(), PathCodec::new(BUCKET));

        let err = service2
            .delete(seeded.id, &owner, seeded.photo_url.as_deref())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PostError::Persistence(MutationKind::Delete)
        ));
        assert_eq!(store.remove_calls().len(), 0);
    }

    // --- reads and cache ---

    #[tokio::test]
    async fn test_list_is_owner_scoped_and_newest_first() {
        let (service, _, _) = service(MockRepository::new(), MockStore::new());

        service.create(create_input(None)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = service
            .create(CreatePostInput {
                place_name: "Warung Sate".to_string(),
                ..create_input(None)
            })
            .await
            .unwrap();
        service
            .create(CreatePostInput {
                owner: OwnerId::new("user_b"),
                ..create_input(None)
            })
            .await
            .unwrap();

        let posts = service.list(&owner()).await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, second.id);
        assert!(posts.iter().all(|p| p.owner == owner()));
    }

    #[tokio::test]
    async fn test_get_returns_none_for_foreign_owner() {
        let (service, _, _) = service(MockRepository::new(), MockStore::new());
        let post = service.create(create_input(None)).await.unwrap();

        assert!(service.get(post.id, &owner()).await.unwrap().is_some());
        assert!(
            service
                .get(post.id, &OwnerId::new("user_b"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_mutations_invalidate_cached_listing() {
        let (service, _, _) = service(MockRepository::new(), MockStore::new());

        let first = service.create(create_input(None)).await.unwrap();
        assert_eq!(service.list(&owner()).await.unwrap().len(), 1);

        // A second create must show up despite the warm cache.
        service.create(create_input(None)).await.unwrap();
        assert_eq!(service.list(&owner()).await.unwrap().len(), 2);

        // And a delete must disappear from the listing.
        service.delete(first.id, &owner(), None).await.unwrap();
        assert_eq!(service.list(&owner()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_refreshes_cached_detail() {
        let (service, _, _) = service(MockRepository::new(), MockStore::new());
        let post = seeded_post_with_photo(&service).await;

        // Warm the detail cache.
        assert!(service.get(post.id, &owner()).await.unwrap().is_some());

        service.update(update_input(&post, None)).await.unwrap();

        let fresh = service.get(post.id, &owner()).await.unwrap().unwrap();
        assert_eq!(fresh.place_name, "Blue Bottle Annex");
    }
}

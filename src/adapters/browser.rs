use std::{
    collections::{HashMap, VecDeque},
    path::PathBuf,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::{
    adapters::{
        listing_cache::{FetchTicket, ListingCache},
        view::{ListView, SavingsView},
    },
    application::{
        error::ApplicationError, filter_model::FilterStateModel, services::FileDirectory,
    },
    domain::{
        filters::{FilterField, FilterState, UnknownFilterField},
        models::{
            file::{FileRecord, FileUpload},
            savings::StorageSavings,
        },
    },
};

/// Settled mutation states kept for [`FileBrowser::mutation_state`].
const SETTLED_HISTORY: usize = 64;

/// Identifies one mutation. Deletes are keyed by file id; every upload gets
/// its own sequence number so same-named uploads never share a slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MutationKey {
    Delete(String),
    Upload { seq: u64, filename: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

/// Result of an upload or delete plus the listing refetch it triggered.
///
/// `refetch` is `None` when the mutation failed (the listing is left alone)
/// and carries its own error otherwise, so a failed refetch never hides a
/// successful mutation.
#[derive(Debug)]
pub struct MutationOutcome<T> {
    pub key: MutationKey,
    pub result: Result<T, ApplicationError>,
    pub refetch: Option<Result<(), ApplicationError>>,
}

/// In-flight mutations plus the most recent settled ones.
#[derive(Debug, Default)]
struct MutationTracker {
    states: HashMap<MutationKey, MutationState>,
    settled: VecDeque<MutationKey>,
}

impl MutationTracker {
    fn start(&mut self, key: &MutationKey) {
        self.settled.retain(|k| k != key);
        self.states.insert(key.clone(), MutationState::InFlight);
    }

    fn settle(&mut self, key: &MutationKey, state: MutationState) {
        self.states.insert(key.clone(), state);
        self.settled.push_back(key.clone());
        while self.settled.len() > SETTLED_HISTORY {
            if let Some(oldest) = self.settled.pop_front() {
                self.states.remove(&oldest);
            }
        }
    }

    fn get(&self, key: &MutationKey) -> MutationState {
        self.states
            .get(key)
            .copied()
            .unwrap_or(MutationState::Idle)
    }
}

/// Client-side state for browsing the file directory.
///
/// Writes always go through [`FileBrowser::delete`] / [`FileBrowser::upload`],
/// which invalidate the listing cache and refetch from the server on success
/// instead of editing the cached list.
pub struct FileBrowser {
    directory: Arc<dyn FileDirectory>,
    filters: Mutex<FilterStateModel>,
    listing: Mutex<ListingCache>,
    mutations: Mutex<MutationTracker>,
    next_upload: AtomicU64,
    savings: OnceCell<StorageSavings>,
    download_dir: PathBuf,
}

impl FileBrowser {
    pub fn new(directory: Arc<dyn FileDirectory>, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            directory,
            filters: Mutex::new(FilterStateModel::new()),
            listing: Mutex::new(ListingCache::new()),
            mutations: Mutex::new(MutationTracker::default()),
            next_upload: AtomicU64::new(0),
            savings: OnceCell::new(),
            download_dir: download_dir.into(),
        }
    }

    pub fn draft(&self) -> FilterState {
        self.filters.lock().draft().clone()
    }

    pub fn committed(&self) -> FilterState {
        self.filters.lock().committed().clone()
    }

    /// True when the draft differs from the applied filters.
    pub fn has_pending_changes(&self) -> bool {
        self.filters.lock().has_pending_changes()
    }

    pub fn set_filter(&self, field: FilterField, value: impl Into<String>) {
        self.filters.lock().set_field(field, value);
    }

    pub fn set_filter_by_name(
        &self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<FilterField, UnknownFilterField> {
        self.filters.lock().set_field_by_name(name, value)
    }

    pub fn clear_filters(&self) {
        self.filters.lock().clear_draft();
    }

    /// Commits the draft and refreshes the listing for it.
    pub async fn apply_filters(&self) -> Result<(), ApplicationError> {
        let committed = self.filters.lock().commit();
        self.listing.lock().set_active(committed);
        self.refresh().await
    }

    pub async fn refresh(&self) -> Result<(), ApplicationError> {
        let ticket = self.listing.lock().begin();
        self.fetch(ticket).await
    }

    async fn fetch(&self, ticket: FetchTicket) -> Result<(), ApplicationError> {
        let result = self.directory.list_files(&ticket.key).await;
        let (outcome, ret) = match result {
            Ok(files) => (Ok(files), Ok(())),
            Err(e) => (Err(e.to_string()), Err(e)),
        };

        let seq = ticket.seq;
        if !self.listing.lock().complete(ticket, outcome) {
            info!("Discarded stale listing response #{}", seq);
        }
        ret
    }

    async fn invalidate_and_refetch(&self) -> Result<(), ApplicationError> {
        let ticket = self.listing.lock().invalidate_and_begin();
        self.fetch(ticket).await
    }

    pub fn list_view(&self) -> ListView {
        self.listing.lock().view()
    }

    pub fn files(&self) -> Vec<FileRecord> {
        self.listing
            .lock()
            .files()
            .map(<[FileRecord]>::to_vec)
            .unwrap_or_default()
    }

    pub fn mutation_state(&self, key: &MutationKey) -> MutationState {
        self.mutations.lock().get(key)
    }

    async fn run_mutation<T, F>(&self, key: MutationKey, mutation: F) -> MutationOutcome<T>
    where
        F: std::future::Future<Output = Result<T, ApplicationError>>,
    {
        self.mutations.lock().start(&key);

        match mutation.await {
            Ok(value) => {
                self.mutations.lock().settle(&key, MutationState::Succeeded);
                let refetch = self.invalidate_and_refetch().await;
                if let Err(ref e) = refetch {
                    warn!("Listing refetch after {:?} failed: {}", key, e);
                }
                MutationOutcome {
                    key,
                    result: Ok(value),
                    refetch: Some(refetch),
                }
            }
            Err(e) => {
                self.mutations.lock().settle(&key, MutationState::Failed);
                warn!("{:?} failed: {}", key, e);
                MutationOutcome {
                    key,
                    result: Err(e),
                    refetch: None,
                }
            }
        }
    }

    pub async fn delete(&self, id: &str) -> MutationOutcome<()> {
        let key = MutationKey::Delete(id.to_string());
        self.run_mutation(key, self.directory.delete_file(id)).await
    }

    pub async fn upload(&self, upload: FileUpload) -> MutationOutcome<FileRecord> {
        let key = MutationKey::Upload {
            seq: self.next_upload.fetch_add(1, Ordering::Relaxed),
            filename: upload.filename.clone(),
        };
        self.run_mutation(key, self.directory.upload_file(upload))
            .await
    }

    pub async fn download(&self, record: &FileRecord) -> Result<PathBuf, ApplicationError> {
        self.directory
            .download_file(&record.download_request(), &self.download_dir)
            .await
    }

    /// Downloads a file from the current listing by id.
    pub async fn download_by_id(&self, id: &str) -> Result<PathBuf, ApplicationError> {
        let record = self
            .files()
            .into_iter()
            .find(|file| file.id == id)
            .ok_or_else(|| ApplicationError::NotFound(id.to_string()))?;
        self.download(&record).await
    }

    /// Fetched once per browser; later calls reuse the first result.
    pub async fn savings(&self) -> StorageSavings {
        *self
            .savings
            .get_or_init(|| self.directory.get_storage_savings())
            .await
    }

    pub fn savings_view(&self) -> SavingsView {
        match self.savings.get() {
            Some(savings) => SavingsView::Loaded(*savings),
            None => SavingsView::Loading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::{path::Path, sync::atomic::AtomicUsize};

    use crate::{
        domain::models::file::DownloadRequest, services::DirectoryError,
    };

    fn record(id: &str) -> FileRecord {
        FileRecord {
            id: id.to_string(),
            original_filename: format!("{}.bin", id),
            file_type: "application/zip".to_string(),
            size: 1,
            uploaded_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
            file: format!("http://stub/{}", id),
            hash: None,
        }
    }

    /// In-memory directory that counts list calls.
    #[derive(Default)]
    struct MemoryDirectory {
        files: Mutex<Vec<FileRecord>>,
        list_calls: AtomicUsize,
        savings_calls: AtomicUsize,
        fail_listing: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl FileDirectory for MemoryDirectory {
        async fn list_files(
            &self,
            filters: &FilterState,
        ) -> Result<Vec<FileRecord>, ApplicationError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_listing.load(Ordering::SeqCst) {
                return Err(ApplicationError::ListFailed(DirectoryError::NetworkError(
                    "down".to_string(),
                )));
            }
            crate::application::query::serialize(filters)?;
            Ok(self
                .files
                .lock()
                .iter()
                .filter(|f| f.original_filename.contains(&filters.search))
                .cloned()
                .collect())
        }

        async fn upload_file(&self, upload: FileUpload) -> Result<FileRecord, ApplicationError> {
            let stored = record(&upload.filename);
            self.files.lock().push(stored.clone());
            Ok(stored)
        }

        async fn delete_file(&self, id: &str) -> Result<(), ApplicationError> {
            let mut files = self.files.lock();
            let before = files.len();
            files.retain(|f| f.id != id);
            if files.len() == before {
                return Err(ApplicationError::DeleteFailed(DirectoryError::NotFound(
                    id.to_string(),
                )));
            }
            Ok(())
        }

        async fn download_file(
            &self,
            request: &DownloadRequest,
            dest_dir: &Path,
        ) -> Result<PathBuf, ApplicationError> {
            Ok(dest_dir.join(&request.filename))
        }

        async fn get_storage_savings(&self) -> StorageSavings {
            self.savings_calls.fetch_add(1, Ordering::SeqCst);
            StorageSavings {
                total_savings: 4096,
                total_deduplicated_files: 2,
            }
        }
    }

    fn browser_with(files: Vec<FileRecord>) -> (Arc<MemoryDirectory>, FileBrowser) {
        let directory = Arc::new(MemoryDirectory::default());
        *directory.files.lock() = files;
        let browser = FileBrowser::new(directory.clone(), "/tmp");
        (directory, browser)
    }

    #[tokio::test]
    async fn apply_commits_draft_and_fetches() {
        let (directory, browser) = browser_with(vec![record("alpha"), record("beta")]);
        browser.set_filter(FilterField::Search, "beta");
        assert_eq!(browser.list_view(), ListView::Loading);

        browser.apply_filters().await.unwrap();

        assert_eq!(browser.committed().search, "beta");
        assert_eq!(browser.list_view(), ListView::Populated(vec![record("beta")]));
        assert_eq!(directory.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn draft_edits_do_not_refetch() {
        let (directory, browser) = browser_with(vec![record("alpha")]);
        browser.refresh().await.unwrap();
        browser.set_filter(FilterField::Search, "zzz");

        assert_eq!(browser.list_view(), ListView::Populated(vec![record("alpha")]));
        assert_eq!(directory.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn successful_delete_refetches_listing() {
        let (directory, browser) = browser_with(vec![record("a"), record("b")]);
        browser.refresh().await.unwrap();

        let outcome = browser.delete("a").await;

        assert!(outcome.result.is_ok());
        assert!(matches!(outcome.refetch, Some(Ok(()))));
        assert_eq!(browser.list_view(), ListView::Populated(vec![record("b")]));
        assert_eq!(directory.list_calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            browser.mutation_state(&MutationKey::Delete("a".to_string())),
            MutationState::Succeeded
        );
    }

    #[tokio::test]
    async fn failed_delete_leaves_listing_untouched() {
        let (directory, browser) = browser_with(vec![record("a")]);
        browser.refresh().await.unwrap();

        let outcome = browser.delete("missing").await;

        assert!(matches!(outcome.result, Err(ApplicationError::DeleteFailed(_))));
        assert!(outcome.refetch.is_none());
        assert_eq!(browser.list_view(), ListView::Populated(vec![record("a")]));
        assert_eq!(directory.list_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            browser.mutation_state(&MutationKey::Delete("missing".to_string())),
            MutationState::Failed
        );
    }

    #[tokio::test]
    async fn refetch_failure_is_reported_separately() {
        let (directory, browser) = browser_with(vec![record("a")]);
        browser.refresh().await.unwrap();
        directory.fail_listing.store(true, Ordering::SeqCst);

        let outcome = browser.delete("a").await;

        assert!(outcome.result.is_ok());
        assert!(matches!(
            outcome.refetch,
            Some(Err(ApplicationError::ListFailed(_)))
        ));
        assert!(browser.list_view().is_error());
    }

    #[tokio::test]
    async fn upload_refetches_and_returns_server_record() {
        let (_, browser) = browser_with(vec![]);
        browser.refresh().await.unwrap();
        assert_eq!(browser.list_view(), ListView::Empty);

        let outcome = browser
            .upload(FileUpload::new(vec![1, 2], "c".to_string(), "text/plain".to_string()))
            .await;

        assert_eq!(outcome.result.unwrap().id, "c");
        assert_eq!(browser.list_view(), ListView::Populated(vec![record("c")]));
    }

    #[tokio::test]
    async fn invalid_size_filter_surfaces_as_error_view() {
        let (_, browser) = browser_with(vec![record("a")]);
        browser.set_filter(FilterField::MinSize, "lots");

        let err = browser.apply_filters().await.unwrap_err();

        assert!(matches!(err, ApplicationError::InvalidFilter(_)));
        assert!(browser.list_view().is_error());
    }

    #[tokio::test]
    async fn download_by_id_requires_listed_record() {
        let (_, browser) = browser_with(vec![record("a")]);
        browser.refresh().await.unwrap();

        let path = browser.download_by_id("a").await.unwrap();
        assert_eq!(path, PathBuf::from("/tmp/a.bin"));
        assert!(matches!(
            browser.download_by_id("zzz").await,
            Err(ApplicationError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn savings_are_fetched_once() {
        let (directory, browser) = browser_with(vec![]);
        assert_eq!(browser.savings_view(), SavingsView::Loading);

        browser.savings().await;
        let savings = browser.savings().await;

        assert_eq!(savings.total_savings, 4096);
        assert_eq!(directory.savings_calls.load(Ordering::SeqCst), 1);
        assert_eq!(browser.savings_view(), SavingsView::Loaded(savings));
    }

    #[tokio::test]
    async fn same_named_uploads_get_separate_state() {
        let (_, browser) = browser_with(vec![]);
        let upload = || FileUpload::new(vec![1], "dup".to_string(), "text/plain".to_string());

        let (first, second) = tokio::join!(browser.upload(upload()), browser.upload(upload()));

        assert_ne!(first.key, second.key);
        assert_eq!(browser.mutation_state(&first.key), MutationState::Succeeded);
        assert_eq!(browser.mutation_state(&second.key), MutationState::Succeeded);
    }

    #[tokio::test]
    async fn settled_mutation_history_is_bounded() {
        let (_, browser) = browser_with(vec![]);

        for n in 0..SETTLED_HISTORY + 10 {
            browser.delete(&format!("gone-{}", n)).await;
        }

        assert_eq!(browser.mutations.lock().states.len(), SETTLED_HISTORY);
        assert_eq!(
            browser.mutation_state(&MutationKey::Delete("gone-0".to_string())),
            MutationState::Idle
        );
        assert_eq!(
            browser.mutation_state(&MutationKey::Delete(format!("gone-{}", SETTLED_HISTORY + 9))),
            MutationState::Failed
        );
    }
}

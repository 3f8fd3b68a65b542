use axum::body::Bytes;
use size_fit::{
    CancelFlag, ConvertFormat, Converted, DecodeLimits, ImagingError, SearchOutcome, SizeSearch,
};
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::error::ApiError;
use crate::models::AppConfig;

/// Runs CPU-bound image jobs off the async runtime
///
/// A semaphore caps how many jobs run at once. Each job gets a
/// [`CancelFlag`] that is raised when the awaiting request goes away, so
/// an abandoned size search stops at its next iteration.
pub struct ImageService {
    search: Arc<SizeSearch>,
    limits: DecodeLimits,
    permits: Arc<Semaphore>,
}

/// Raises the flag when the request future is dropped
struct CancelOnDrop(CancelFlag);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

impl ImageService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            search: Arc::new(SizeSearch::new(config.search_options())),
            limits: config.decode_limits(),
            permits: Arc::new(Semaphore::new(config.max_concurrent_jobs.max(1))),
        }
    }

    /// Fit the upload into `target_kb` as a JPEG
    pub async fn process(&self, bytes: Bytes, target_kb: u32) -> Result<SearchOutcome, ApiError> {
        let search = self.search.clone();
        let limits = self.limits;
        self.run_blocking(move |cancel| {
            size_fit::process_image(&bytes, target_kb, &*search, limits, cancel)
        })
        .await
    }

    /// Re-encode the upload into `format`
    pub async fn convert(&self, bytes: Bytes, format: ConvertFormat) -> Result<Converted, ApiError> {
        let limits = self.limits;
        self.run_blocking(move |_| {
            let image = size_fit::decode(&bytes, limits)?;
            size_fit::convert(image, format)
        })
        .await
    }

    /// Jobs currently allowed to start without waiting
    pub fn available_slots(&self) -> usize {
        self.permits.available_permits()
    }

    async fn run_blocking<T, F>(&self, job: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&CancelFlag) -> Result<T, ImagingError> + Send + 'static,
    {
        let cancel = CancelFlag::new();
        let _guard = CancelOnDrop(cancel.clone());

        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| ApiError::Internal(format!("Job pool closed: {e}")))?;

        let result = tokio::task::spawn_blocking(move || {
            // Held until the job finishes, even if the request is gone
            let _permit = permit;
            job(&cancel)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("Image task failed: {e}")))?;

        Ok(result?)
    }
}

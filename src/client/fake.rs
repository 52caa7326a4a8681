//! In-memory [`RequirementsApi`] for tests.
//!
//! Applies the same search/filter/paging rules the service does, records
//! every query it receives along with the (tokio) time it arrived, and can be
//! told to stall or fail specific pages.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use non_empty_string::NonEmptyString;
use tokio::time::Instant;

use super::{ApiError, RequirementPage, RequirementsApi, UploadFile};
use crate::domain::{
    PaginationInfo, QueryState, Requirement, RequirementDraft, RequirementId, StatsSnapshot,
    Status,
};

pub struct FakeApi {
    pub requirements: Mutex<Vec<Requirement>>,
    pub page_size: usize,
    pub queries: Mutex<Vec<(Instant, QueryState)>>,
    pub page_delays: Mutex<HashMap<u32, Duration>>,
    pub failing_pages: Mutex<HashSet<u32>>,
    pub fail_overall: AtomicBool,
    pub overall_calls: AtomicU64,
    pub uploads: AtomicU64,
    next_id: AtomicU64,
}

impl FakeApi {
    pub fn new(requirements: Vec<Requirement>, page_size: usize) -> Self {
        let next_id = requirements.len() as u64 + 1;
        Self {
            requirements: Mutex::new(requirements),
            page_size,
            queries: Mutex::new(Vec::new()),
            page_delays: Mutex::new(HashMap::new()),
            failing_pages: Mutex::new(HashSet::new()),
            fail_overall: AtomicBool::new(false),
            overall_calls: AtomicU64::new(0),
            uploads: AtomicU64::new(0),
            next_id: AtomicU64::new(next_id),
        }
    }

    pub fn delay_page(&self, page: u32, delay: Duration) {
        self.page_delays.lock().unwrap().insert(page, delay);
    }

    pub fn fail_page(&self, page: u32, fail: bool) {
        let mut failing = self.failing_pages.lock().unwrap();
        if fail {
            failing.insert(page);
        } else {
            failing.remove(&page);
        }
    }

    pub fn queries(&self) -> Vec<(Instant, QueryState)> {
        self.queries.lock().unwrap().clone()
    }

    fn matching(&self, query: &QueryState) -> Vec<Requirement> {
        let needle = query.search_text().to_lowercase();
        self.requirements
            .lock()
            .unwrap()
            .iter()
            .filter(|r| needle.is_empty() || r.text().to_lowercase().contains(&needle))
            .filter(|r| query.filters().matches(r))
            .cloned()
            .collect()
    }
}

pub fn requirement(id: u64, text: &str, status: Status) -> Requirement {
    Requirement::new(
        id,
        NonEmptyString::new(text.to_string()).unwrap(),
        Utc::now(),
    )
    .with_status(status)
}

#[async_trait]
impl RequirementsApi for FakeApi {
    async fn fetch_page(&self, query: &QueryState) -> Result<RequirementPage, ApiError> {
        self.queries
            .lock()
            .unwrap()
            .push((Instant::now(), query.clone()));

        let delay = self.page_delays.lock().unwrap().get(&query.page()).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing_pages.lock().unwrap().contains(&query.page()) {
            return Err(ApiError::Status {
                status: 500,
                message: None,
            });
        }

        let matching = self.matching(query);
        let pages = matching.len().div_ceil(self.page_size).max(1);
        let start = (query.page() as usize - 1) * self.page_size;
        let requirements = matching
            .iter()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect();

        Ok(RequirementPage {
            requirements,
            stats: StatsSnapshot::tally(&matching),
            pagination: PaginationInfo::new(
                query.page(),
                u32::try_from(pages).unwrap(),
                matching.len() as u64,
            ),
        })
    }

    async fn fetch_requirement(
        &self,
        id: &RequirementId,
    ) -> Result<Option<Requirement>, ApiError> {
        Ok(self
            .requirements
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id() == id)
            .cloned())
    }

    async fn fetch_overall_stats(&self) -> Result<StatsSnapshot, ApiError> {
        self.overall_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_overall.load(Ordering::Relaxed) {
            return Err(ApiError::Status {
                status: 503,
                message: None,
            });
        }
        Ok(StatsSnapshot::tally(self.requirements.lock().unwrap().iter()))
    }

    async fn create(&self, draft: &RequirementDraft) -> Result<(), ApiError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.requirements
            .lock()
            .unwrap()
            .push(requirement(id, draft.text(), Status::Draft));
        Ok(())
    }

    async fn update(&self, id: &RequirementId, draft: &RequirementDraft) -> Result<(), ApiError> {
        let mut requirements = self.requirements.lock().unwrap();
        let Some(existing) = requirements.iter_mut().find(|r| r.id() == id) else {
            return Err(ApiError::Status {
                status: 404,
                message: Some("Requirement not found".to_string()),
            });
        };
        let status = existing.status();
        *existing = Requirement::new(
            id.clone(),
            NonEmptyString::new(draft.text().to_string()).unwrap(),
            existing.date(),
        )
        .with_status(status);
        Ok(())
    }

    async fn update_status(&self, id: &RequirementId, status: Status) -> Result<(), ApiError> {
        let mut requirements = self.requirements.lock().unwrap();
        let Some(existing) = requirements.iter_mut().find(|r| r.id() == id) else {
            return Err(ApiError::Status {
                status: 404,
                message: Some("Requirement not found".to_string()),
            });
        };
        *existing = existing.clone().with_status(status);
        Ok(())
    }

    async fn delete(&self, id: &RequirementId) -> Result<(), ApiError> {
        self.requirements.lock().unwrap().retain(|r| r.id() != id);
        Ok(())
    }

    async fn analyze(&self, _file: UploadFile) -> Result<(), ApiError> {
        self.uploads.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

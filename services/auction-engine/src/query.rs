//! Read paths
//!
//! Every read that exposes job status or stats runs a sweep first, so a
//! reader never sees a job open past its deadline. A failing sweep does not
//! fail the read.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use types::bid::Bid;
use types::errors::AuctionError;
use types::ids::JobId;
use types::job::{Job, JobView};

use crate::engine::AuctionEngine;
use crate::expiry::run_sweep;
use crate::stats::{compute_all, compute_stats};

/// Default page size for the job list
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Default page size for the most-active list
pub const DEFAULT_ACTIVE_LIMIT: usize = 10;

/// Field a job list can be sorted by (wire names in camelCase)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Title,
    Description,
    Requirements,
    PosterName,
    PosterContact,
    PublishedAt,
    ExpiresAt,
    Status,
    BidsCount,
    LowestBid,
}

impl SortField {
    pub fn parse(name: &str) -> Option<Self> {
        let field = match name {
            "id" => SortField::Id,
            "title" => SortField::Title,
            "description" => SortField::Description,
            "requirements" => SortField::Requirements,
            "posterName" => SortField::PosterName,
            "posterContact" => SortField::PosterContact,
            "publishedAt" => SortField::PublishedAt,
            "expiresAt" => SortField::ExpiresAt,
            "status" => SortField::Status,
            "bidsCount" => SortField::BidsCount,
            "lowestBid" => SortField::LowestBid,
            _ => return None,
        };
        Some(field)
    }

    fn compare(&self, a: &JobView, b: &JobView) -> Ordering {
        let (ja, jb): (&Job, &Job) = (&a.job, &b.job);
        match self {
            SortField::Id => ja.id.cmp(&jb.id),
            SortField::Title => ja.title.cmp(&jb.title),
            SortField::Description => ja.description.cmp(&jb.description),
            SortField::Requirements => ja.requirements.cmp(&jb.requirements),
            SortField::PosterName => ja.poster_name.cmp(&jb.poster_name),
            SortField::PosterContact => ja.poster_contact.cmp(&jb.poster_contact),
            SortField::PublishedAt => ja.published_at.cmp(&jb.published_at),
            SortField::ExpiresAt => ja.expires_at.cmp(&jb.expires_at),
            SortField::Status => ja.status.as_str().cmp(jb.status.as_str()),
            SortField::BidsCount => a.stats.bids_count.cmp(&b.stats.bids_count),
            // Jobs without bids sort below any amount
            SortField::LowestBid => a.stats.lowest_bid.cmp(&b.stats.lowest_bid),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Parameters of the job list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobQuery {
    /// None for an unrecognized field: stored order is kept
    pub sort_field: Option<SortField>,
    pub direction: SortDirection,
    pub limit: usize,
}

impl Default for JobQuery {
    fn default() -> Self {
        Self {
            sort_field: Some(SortField::PublishedAt),
            direction: SortDirection::Desc,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl JobQuery {
    /// Build from the raw `sort=field:dir` and `limit=N` query values.
    ///
    /// Any direction other than `desc` sorts ascending. A missing or
    /// unparseable limit falls back to the default.
    pub fn parse(sort: Option<&str>, limit: Option<&str>) -> Self {
        let mut query = Self::default();

        if let Some(sort) = sort {
            let (field, dir) = sort.split_once(':').unwrap_or((sort, ""));
            query.sort_field = SortField::parse(field);
            query.direction = if dir == "desc" {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            };
        }
        query.limit = parse_limit(limit, DEFAULT_LIST_LIMIT);
        query
    }
}

/// Parse a `limit` query value, falling back to `default`
pub fn parse_limit(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

/// Read-side service layered on the engine's store
pub struct QueryService {
    engine: Arc<AuctionEngine>,
}

impl QueryService {
    pub fn new(engine: Arc<AuctionEngine>) -> Self {
        Self { engine }
    }

    /// Jobs sorted and truncated per `query`, with stats
    pub fn list_jobs(
        &self,
        query: &JobQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<JobView>, AuctionError> {
        run_sweep(&self.engine, now);

        let mut views = self.all_views()?;
        if let Some(field) = query.sort_field {
            // Stable: equal keys keep stored order
            views.sort_by(|a, b| match query.direction {
                SortDirection::Asc => field.compare(a, b),
                SortDirection::Desc => field.compare(b, a),
            });
        }
        views.truncate(query.limit);
        Ok(views)
    }

    /// Open jobs with the most bids first
    pub fn list_active_jobs(
        &self,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<JobView>, AuctionError> {
        run_sweep(&self.engine, now);

        let mut views: Vec<JobView> = self
            .all_views()?
            .into_iter()
            .filter(|view| view.job.is_open())
            .collect();
        views.sort_by(|a, b| b.stats.bids_count.cmp(&a.stats.bids_count));
        views.truncate(limit);
        Ok(views)
    }

    pub fn get_job(&self, id: &JobId, now: DateTime<Utc>) -> Result<JobView, AuctionError> {
        run_sweep(&self.engine, now);

        let store = self.engine.store();
        let job = store.job(id)?.ok_or_else(|| AuctionError::not_found(id))?;
        let stats = compute_stats(id, &store.bids_for_job(id)?);
        Ok(JobView { job, stats })
    }

    /// Bids for a job, cheapest first, ties by time
    ///
    /// An unknown job simply has no bids.
    pub fn list_bids(&self, job_id: &JobId) -> Result<Vec<Bid>, AuctionError> {
        let mut bids = self.engine.store().bids_for_job(job_id)?;
        bids.sort_by(|a, b| {
            a.amount
                .cmp(&b.amount)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(bids)
    }

    fn all_views(&self) -> Result<Vec<JobView>, AuctionError> {
        let store = self.engine.store();
        let stats = compute_all(&store.bids()?);
        Ok(store
            .jobs()?
            .into_iter()
            .map(|job| {
                let stats = stats.get(&job.id).copied().unwrap_or_default();
                JobView { job, stats }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;
    use types::job::{JobStatus, NewJob};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    }

    fn setup() -> (Arc<AuctionEngine>, QueryService) {
        let engine = Arc::new(AuctionEngine::new(Arc::new(MemoryStore::new())));
        let query = QueryService::new(Arc::clone(&engine));
        (engine, query)
    }

    fn publish(engine: &AuctionEngine, title: &str, published: DateTime<Utc>, ttl: Duration) -> Job {
        let input = NewJob {
            title: Some(title.to_string()),
            description: Some("desc".to_string()),
            requirements: Some("reqs".to_string()),
            poster_name: Some("Lee".to_string()),
            poster_contact: Some("lee@example.com".to_string()),
            expires_at: Some((published + ttl).to_rfc3339()),
        };
        engine.create_job(input, published).unwrap().job
    }

    fn bid(engine: &AuctionEngine, job: &Job, amount: i64) {
        engine
            .place_bid(&job.id, Ok(Decimal::from(amount)), t0())
            .unwrap();
    }

    fn titles(views: &[JobView]) -> Vec<&str> {
        views.iter().map(|v| v.job.title.as_str()).collect()
    }

    #[test]
    fn test_parse_query() {
        assert_eq!(JobQuery::parse(None, None), JobQuery::default());

        let q = JobQuery::parse(Some("title:asc"), Some("5"));
        assert_eq!(q.sort_field, Some(SortField::Title));
        assert_eq!(q.direction, SortDirection::Asc);
        assert_eq!(q.limit, 5);

        let q = JobQuery::parse(Some("expiresAt"), Some("many"));
        assert_eq!(q.sort_field, Some(SortField::ExpiresAt));
        assert_eq!(q.direction, SortDirection::Asc);
        assert_eq!(q.limit, DEFAULT_LIST_LIMIT);

        let q = JobQuery::parse(Some("shoeSize:desc"), None);
        assert_eq!(q.sort_field, None);
    }

    #[test]
    fn test_list_jobs_default_newest_first() {
        let (engine, query) = setup();
        publish(&engine, "first", t0(), Duration::hours(5));
        publish(&engine, "second", t0() + Duration::minutes(1), Duration::hours(5));
        publish(&engine, "third", t0() + Duration::minutes(2), Duration::hours(5));

        let views = query.list_jobs(&JobQuery::default(), t0()).unwrap();
        assert_eq!(titles(&views), vec!["third", "second", "first"]);

        let q = JobQuery::parse(Some("publishedAt:asc"), Some("2"));
        let views = query.list_jobs(&q, t0()).unwrap();
        assert_eq!(titles(&views), vec!["first", "second"]);
    }

    #[test]
    fn test_list_jobs_unknown_field_keeps_order() {
        let (engine, query) = setup();
        publish(&engine, "b", t0(), Duration::hours(1));
        publish(&engine, "a", t0(), Duration::hours(1));
        publish(&engine, "c", t0(), Duration::hours(1));

        let q = JobQuery::parse(Some("nonsense:desc"), None);
        let views = query.list_jobs(&q, t0()).unwrap();
        assert_eq!(titles(&views), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_list_jobs_by_stats() {
        let (engine, query) = setup();
        let a = publish(&engine, "a", t0(), Duration::hours(1));
        let b = publish(&engine, "b", t0(), Duration::hours(1));
        publish(&engine, "none", t0(), Duration::hours(1));
        bid(&engine, &a, 50);
        bid(&engine, &b, 80);
        bid(&engine, &b, 70);

        let q = JobQuery::parse(Some("bidsCount:desc"), None);
        let views = query.list_jobs(&q, t0()).unwrap();
        assert_eq!(titles(&views), vec!["b", "a", "none"]);
        assert_eq!(views[0].stats.bids_count, 2);
        assert_eq!(views[0].stats.lowest_bid, Some(Decimal::from(70)));

        let q = JobQuery::parse(Some("lowestBid:asc"), None);
        let views = query.list_jobs(&q, t0()).unwrap();
        assert_eq!(titles(&views), vec!["none", "a", "b"]);
    }

    #[test]
    fn test_list_jobs_sweeps_first() {
        let (engine, query) = setup();
        let job = publish(&engine, "short", t0(), Duration::seconds(10));

        let views = query
            .list_jobs(&JobQuery::default(), t0() + Duration::seconds(10))
            .unwrap();
        assert_eq!(views[0].job.id, job.id);
        assert_eq!(views[0].job.status, JobStatus::Closed);
    }

    #[test]
    fn test_list_active_jobs() {
        let (engine, query) = setup();
        let busy = publish(&engine, "busy", t0(), Duration::hours(1));
        let quiet = publish(&engine, "quiet", t0(), Duration::hours(1));
        let expired = publish(&engine, "expired", t0(), Duration::seconds(30));
        for amount in [30, 20, 10] {
            bid(&engine, &busy, amount);
        }
        bid(&engine, &quiet, 99);
        for amount in [9, 8, 7, 6] {
            bid(&engine, &expired, amount);
        }

        let later = t0() + Duration::minutes(1);
        let views = query.list_active_jobs(10, later).unwrap();
        assert_eq!(titles(&views), vec!["busy", "quiet"]);

        let views = query.list_active_jobs(1, later).unwrap();
        assert_eq!(titles(&views), vec!["busy"]);
        assert_eq!(views[0].stats.bids_count, 3);
    }

    #[test]
    fn test_get_job() {
        let (engine, query) = setup();
        let job = publish(&engine, "single", t0(), Duration::hours(1));
        bid(&engine, &job, 40);

        let view = query.get_job(&job.id, t0()).unwrap();
        assert_eq!(view.job, job);
        assert_eq!(view.stats.bids_count, 1);
        assert_eq!(view.stats.lowest_bid, Some(Decimal::from(40)));

        let missing = query.get_job(&JobId::new(), t0()).unwrap_err();
        assert!(matches!(missing, AuctionError::NotFound { .. }));
    }

    #[test]
    fn test_list_bids_sorted_by_amount() {
        let (engine, query) = setup();
        let job = publish(&engine, "bids", t0(), Duration::hours(1));
        for amount in [100, 75, 60] {
            bid(&engine, &job, amount);
        }

        let amounts: Vec<Decimal> = query
            .list_bids(&job.id)
            .unwrap()
            .into_iter()
            .map(|b| b.amount)
            .collect();
        assert_eq!(
            amounts,
            vec![Decimal::from(60), Decimal::from(75), Decimal::from(100)]
        );
        assert!(query.list_bids(&JobId::new()).unwrap().is_empty());
    }
}

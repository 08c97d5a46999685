//! Auction lifecycle over the file store
//!
//! Verifies that admitted bids and closing decisions survive a restart.

use std::sync::Arc;

use auction_engine::{AuctionEngine, QueryService, Store};
use chrono::{DateTime, Duration, TimeZone, Utc};
use persistence::{FileStore, FileStoreConfig};
use rust_decimal::Decimal;
use tempfile::TempDir;
use types::job::{JobStatus, NewJob};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
}

fn open(tmp: &TempDir) -> Arc<AuctionEngine> {
    let store = FileStore::open(FileStoreConfig {
        path: tmp.path().join("db.snap"),
        compress: true,
    })
    .unwrap();
    Arc::new(AuctionEngine::new(Arc::new(store)))
}

#[test]
fn test_restart_preserves_bids_and_winner() {
    let tmp = TempDir::new().unwrap();

    let (job_id, winning_bid) = {
        let engine = open(&tmp);
        let job = engine
            .create_job(
                NewJob {
                    title: Some("Lay patio".to_string()),
                    description: Some("Twenty slabs".to_string()),
                    requirements: Some("Weekend only".to_string()),
                    poster_name: Some("Mo".to_string()),
                    poster_contact: Some("mo@example.com".to_string()),
                    expires_at: Some((t0() + Duration::seconds(30)).to_rfc3339()),
                },
                t0(),
            )
            .unwrap()
            .job;
        engine
            .place_bid(&job.id, Ok(Decimal::from(500)), t0())
            .unwrap();
        let bid = engine
            .place_bid(&job.id, Ok(Decimal::new(44_999, 2)), t0())
            .unwrap();
        (job.id, bid)
    };

    // Restart before the deadline: still open, lowest bid restored
    let engine = open(&tmp);
    let query = QueryService::new(Arc::clone(&engine));
    let view = query.get_job(&job_id, t0() + Duration::seconds(10)).unwrap();
    assert_eq!(view.job.status, JobStatus::Open);
    assert_eq!(view.stats.bids_count, 2);
    assert_eq!(view.stats.lowest_bid, Some(Decimal::new(44_999, 2)));

    // The strictly-lower rule holds against restored bids
    assert!(engine
        .place_bid(&job_id, Ok(Decimal::from(450)), t0() + Duration::seconds(11))
        .is_err());

    engine.sweep(t0() + Duration::seconds(30)).unwrap();
    drop(query);
    drop(engine);

    let engine = open(&tmp);
    let closed = engine.store().job(&job_id).unwrap().unwrap();
    assert_eq!(closed.status, JobStatus::Closed);
    assert_eq!(closed.winner_bid_id, Some(winning_bid.id));
}

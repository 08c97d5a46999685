//! Bid statistics per job
//!
//! Pure functions over a slice of bids; no store access.

use std::collections::HashMap;

use types::bid::Bid;
use types::ids::JobId;
use types::job::JobStats;

/// Count and lowest amount of the bids placed on `job_id`
pub fn compute_stats(job_id: &JobId, bids: &[Bid]) -> JobStats {
    bids.iter()
        .filter(|bid| bid.job_id == *job_id)
        .fold(JobStats::default(), accumulate)
}

/// Stats for every job that has at least one bid, in a single pass
pub fn compute_all(bids: &[Bid]) -> HashMap<JobId, JobStats> {
    let mut stats: HashMap<JobId, JobStats> = HashMap::new();
    for bid in bids {
        let entry = stats.entry(bid.job_id).or_default();
        *entry = accumulate(*entry, bid);
    }
    stats
}

fn accumulate(stats: JobStats, bid: &Bid) -> JobStats {
    JobStats {
        bids_count: stats.bids_count + 1,
        lowest_bid: Some(match stats.lowest_bid {
            Some(lowest) if lowest <= bid.amount => lowest,
            _ => bid.amount,
        }),
    }
}

/// First bid, in admission order, holding the lowest amount
pub fn winning_bid(bids: &[Bid]) -> Option<&Bid> {
    bids.iter().fold(None, |best: Option<&Bid>, bid| match best {
        Some(current) if current.amount <= bid.amount => Some(current),
        _ => Some(bid),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn bid(job_id: JobId, amount: i64) -> Bid {
        Bid::new(
            job_id,
            Decimal::from(amount),
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_stats_without_bids() {
        let stats = compute_stats(&JobId::new(), &[]);
        assert_eq!(stats.bids_count, 0);
        assert_eq!(stats.lowest_bid, None);
    }

    #[test]
    fn test_stats_only_count_matching_job() {
        let job = JobId::new();
        let other = JobId::new();
        let bids = vec![bid(job, 100), bid(other, 10), bid(job, 90)];

        let stats = compute_stats(&job, &bids);
        assert_eq!(stats.bids_count, 2);
        assert_eq!(stats.lowest_bid, Some(Decimal::from(90)));
    }

    #[test]
    fn test_compute_all_matches_per_job() {
        let a = JobId::new();
        let b = JobId::new();
        let bids = vec![bid(a, 100), bid(b, 40), bid(a, 70), bid(b, 30), bid(b, 20)];

        let all = compute_all(&bids);
        assert_eq!(all[&a], compute_stats(&a, &bids));
        assert_eq!(all[&b], compute_stats(&b, &bids));
        assert_eq!(all[&b].bids_count, 3);
        assert!(!all.contains_key(&JobId::new()));
    }

    #[test]
    fn test_winning_bid_prefers_first_at_minimum() {
        let job = JobId::new();
        let bids = vec![bid(job, 100), bid(job, 80), bid(job, 80)];

        let winner = winning_bid(&bids).unwrap();
        assert_eq!(winner.id, bids[1].id);
        assert!(winning_bid(&[]).is_none());
    }
}

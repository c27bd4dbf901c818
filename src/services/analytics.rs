use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::models::{HardestProblem, ProblemStats, Submission};

pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Rating buckets as (label, inclusive lower bound). The upper bound of each
/// bucket is the lower bound of the next one.
const RATING_BUCKETS: [(&str, i64); 7] = [
    ("0-999", 0),
    ("1000-1199", 1000),
    ("1200-1399", 1200),
    ("1400-1599", 1400),
    ("1600-1799", 1600),
    ("1800-1999", 1800),
    ("2000+", 2000),
];

struct SolvedProblem<'a> {
    name: &'a str,
    rating: Option<i64>,
    first_solved_at: DateTime<Utc>,
}

/// Start of the UTC day `window_days` days before `now`, or `None` when that
/// day is outside the representable range.
pub fn window_start(now: DateTime<Utc>, window_days: u32) -> Option<DateTime<Utc>> {
    let day = now
        .checked_sub_signed(Duration::days(i64::from(window_days)))?
        .date_naive();
    Some(day.and_time(NaiveTime::MIN).and_utc())
}

pub fn rating_bucket(rating: i64) -> &'static str {
    RATING_BUCKETS
        .iter()
        .rev()
        .find(|(_, lower)| rating >= *lower)
        .map(|(label, _)| *label)
        .unwrap_or(RATING_BUCKETS[0].0)
}

/// Aggregates accepted submissions inside the window into per-problem stats.
///
/// Problems are identified by (contest, name). When the same problem was
/// accepted more than once the higher recorded rating is kept (the first one
/// seen on ties) and the heatmap counts it on the day it was first accepted.
pub fn compute_stats(submissions: &[Submission], window_days: u32, now: DateTime<Utc>) -> ProblemStats {
    // A window reaching past the earliest representable day covers everything.
    let start = window_start(now, window_days).unwrap_or(DateTime::<Utc>::MIN_UTC);

    let mut order: Vec<(Option<i64>, &str)> = Vec::new();
    let mut solved: HashMap<(Option<i64>, &str), SolvedProblem<'_>> = HashMap::new();

    for sub in submissions
        .iter()
        .filter(|s| s.is_accepted() && s.submission_time >= start)
    {
        let key = (sub.contest_id, sub.problem_name.as_str());
        match solved.get_mut(&key) {
            Some(existing) => {
                if sub.problem_rating.unwrap_or(0) > existing.rating.unwrap_or(0) {
                    existing.name = sub.problem_name.as_str();
                    existing.rating = sub.problem_rating;
                }
                if sub.submission_time < existing.first_solved_at {
                    existing.first_solved_at = sub.submission_time;
                }
            }
            None => {
                order.push(key);
                solved.insert(
                    key,
                    SolvedProblem {
                        name: sub.problem_name.as_str(),
                        rating: sub.problem_rating,
                        first_solved_at: sub.submission_time,
                    },
                );
            }
        }
    }

    let unique: Vec<&SolvedProblem<'_>> = order.iter().filter_map(|key| solved.get(key)).collect();
    let total_problems = unique.len();

    let rated: Vec<(&str, i64)> = unique
        .iter()
        .filter_map(|p| p.rating.filter(|r| *r > 0).map(|r| (p.name, r)))
        .collect();

    let average_rating = if rated.is_empty() {
        0
    } else {
        let sum: i64 = rated.iter().map(|(_, r)| r).sum();
        (sum as f64 / rated.len() as f64).round() as i64
    };

    let average_problems_per_day = if window_days == 0 {
        0.0
    } else {
        round2(total_problems as f64 / f64::from(window_days))
    };

    let most_difficult_problem = rated
        .iter()
        .fold(None::<(&str, i64)>, |best, &(name, rating)| match best {
            Some((_, top)) if rating <= top => best,
            _ => Some((name, rating)),
        })
        .map(|(name, rating)| HardestProblem { name: name.to_string(), rating });

    let mut rating_distribution: BTreeMap<String, u32> = RATING_BUCKETS
        .iter()
        .map(|(label, _)| (label.to_string(), 0))
        .collect();
    for (_, rating) in &rated {
        if let Some(count) = rating_distribution.get_mut(rating_bucket(*rating)) {
            *count += 1;
        }
    }

    let mut submission_heatmap: BTreeMap<String, u32> = BTreeMap::new();
    for problem in &unique {
        let day = problem.first_solved_at.format("%Y-%m-%d").to_string();
        *submission_heatmap.entry(day).or_insert(0) += 1;
    }

    ProblemStats {
        window_days,
        total_problems,
        average_rating,
        average_problems_per_day,
        most_difficult_problem,
        rating_distribution,
        submission_heatmap,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

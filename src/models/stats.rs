use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemStats {
    pub window_days: u32,
    pub total_problems: usize,
    pub average_rating: i64,
    pub average_problems_per_day: f64,
    pub most_difficult_problem: Option<HardestProblem>,
    pub rating_distribution: BTreeMap<String, u32>,
    pub submission_heatmap: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardestProblem {
    pub name: String,
    pub rating: i64,
}

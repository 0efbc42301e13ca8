//! Weight tracking models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest body measurements of a user
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeightRecord {
    pub user_id: i64,
    pub current_weight: f64,
    pub target_weight: f64,
    pub height: f64,
    pub measured_at: DateTime<Utc>,
}

/// POST /weight body
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct SaveWeightRequest {
    pub current_weight: f64,
    pub target_weight: f64,
    pub height: f64,
}

impl SaveWeightRequest {
    /// All measurements must be strictly positive
    pub fn is_valid(&self) -> bool {
        [self.current_weight, self.target_weight, self.height]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightResponse {
    pub user_id: i64,
    pub weight: WeightRecord,
}

#[derive(Debug, Serialize)]
pub struct SaveWeightResponse {
    pub message: String,
    pub weight: WeightRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_weight_validation() {
        let mut req = SaveWeightRequest {
            current_weight: 80.0,
            target_weight: 72.5,
            height: 178.0,
        };
        assert!(req.is_valid());

        req.height = 0.0;
        assert!(!req.is_valid());

        req.height = f64::NAN;
        assert!(!req.is_valid());
    }
}

//! Product review models and rating aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, ReviewId};

/// A buyer-submitted product review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Backend review ID.
    pub id: ReviewId,
    /// Reviewed product.
    pub product_id: ProductId,
    /// Display name of the author.
    pub author: String,
    /// Star rating, 1 through 5.
    pub rating: u8,
    /// Optional short headline.
    pub title: Option<String>,
    /// Review body.
    pub body: String,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
}

/// Aggregate rating for a product, derived from its reviews.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    /// Average rating (0.0 when there are no reviews).
    pub average: f64,
    /// Number of reviews.
    pub count: u64,
}

impl RatingSummary {
    /// Compute the summary from individual ratings.
    #[must_use]
    pub fn from_ratings(ratings: &[u8]) -> Self {
        if ratings.is_empty() {
            return Self {
                average: 0.0,
                count: 0,
            };
        }
        let sum: u64 = ratings.iter().map(|&r| u64::from(r)).sum();
        #[allow(clippy::cast_precision_loss)] // review counts stay far below 2^52
        let average = sum as f64 / ratings.len() as f64;
        Self {
            average,
            count: ratings.len() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_empty() {
        let summary = RatingSummary::from_ratings(&[]);
        assert_eq!(summary.count, 0);
        assert!((summary.average - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary_average() {
        let summary = RatingSummary::from_ratings(&[5, 4, 3]);
        assert_eq!(summary.count, 3);
        assert!((summary.average - 4.0).abs() < f64::EPSILON);
    }
}

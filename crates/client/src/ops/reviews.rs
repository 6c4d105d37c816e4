//! Product reviews and rating aggregates.

use serde::Serialize;
use serde_json::json;
use tracing::instrument;

use larkspur_core::{ProductId, RatingSummary, Review};

use crate::cache::{CacheKey, CacheValue};
use crate::fault::Fault;
use crate::shop::Shop;

/// A review to submit.
#[derive(Debug, Clone, Serialize)]
pub struct NewReview {
    /// Display name; the backend substitutes the profile name for
    /// authenticated submitters.
    pub author: Option<String>,
    /// Star rating, 1 through 5.
    pub rating: u8,
    /// Optional short headline.
    pub title: Option<String>,
    /// Review body.
    pub body: String,
}

impl Shop {
    /// Get the reviews for a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns a fault if the backend call fails and no cached list exists.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn reviews(&self, product_id: &ProductId) -> Result<Vec<Review>, Fault> {
        let key = CacheKey::Reviews(product_id.as_str().to_string());
        let client = self.client().clone();
        let path = format!("/products/{product_id}/reviews");
        self.cache()
            .read(key, self.freshness().reviews, || async move {
                let reviews: Vec<Review> = client.get(&path, &[]).await?;
                Ok(CacheValue::Reviews(reviews))
            })
            .await?
            .into_reviews()
    }

    /// Aggregate rating for a product, derived from its reviews.
    ///
    /// # Errors
    ///
    /// See [`Self::reviews`].
    pub async fn rating_summary(&self, product_id: &ProductId) -> Result<RatingSummary, Fault> {
        let reviews = self.reviews(product_id).await?;
        let ratings: Vec<u8> = reviews.iter().map(|r| r.rating).collect();
        Ok(RatingSummary::from_ratings(&ratings))
    }

    /// Submit a review for a product.
    ///
    /// # Errors
    ///
    /// Returns `Fault::Validation` locally for an out-of-range rating, and
    /// whatever the backend reports otherwise.
    #[instrument(skip(self, review), fields(product_id = %product_id, rating = review.rating))]
    pub async fn submit_review(
        &self,
        product_id: &ProductId,
        review: &NewReview,
    ) -> Result<Review, Fault> {
        if !(1..=5).contains(&review.rating) {
            return Err(Fault::Validation(
                "rating must be between 1 and 5".to_string(),
            ));
        }
        let key = CacheKey::Reviews(product_id.as_str().to_string());
        let path = format!("/products/{product_id}/reviews");
        self.mutate(self.client().post(&path, json!(review)), &[key])
            .await
    }
}

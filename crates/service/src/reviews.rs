//! Reviews, in one of two addressing modes picked at startup.
//!
//! - [`ReviewAddressing::ById`]: reviews get a generated numeric `id` and a
//!   `timestamp`. Updates and deletes locate the review by that id, so they
//!   stay correct when other reviews are removed.
//! - [`ReviewAddressing::ByPosition`]: reviews are plain `{username, message}`
//!   pairs. Updates and deletes name an index into the current list, and
//!   every removal shifts the index of everything after it. A client holding
//!   an index from an earlier listing may edit the wrong review.
//!
//! Listing and username lookup behave the same in both modes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

pub use common::types::ReviewAddressing;

use crate::document::{Document, Review, ReviewId};
use crate::errors::ServiceError;
use crate::persons::parse_index;
use crate::storage::document_store::DocumentStore;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ReviewInput {
    pub username: Option<String>,
    pub message: Option<String>,
}

impl ReviewInput {
    fn required(self) -> Result<(String, String), ServiceError> {
        let username = self.username.filter(|s| !s.is_empty()).ok_or_else(|| ServiceError::required("username"))?;
        let message = self.message.filter(|s| !s.is_empty()).ok_or_else(|| ServiceError::required("message"))?;
        Ok((username, message))
    }
}

/// A lookup hit together with its current position in the list.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct IndexedReview {
    #[serde(flatten)]
    pub review: Review,
    pub index: usize,
}

pub fn list_all(doc: &Document) -> &[Review] {
    &doc.reviews
}

/// Reviews whose stored username is a string equal to `username`.
pub fn find_by_username(doc: &Document, username: &str, case_insensitive: bool) -> Vec<IndexedReview> {
    let wanted = if case_insensitive { username.to_lowercase() } else { username.to_string() };
    doc.reviews
        .iter()
        .enumerate()
        .filter(|(_, r)| match r.username.as_deref() {
            Some(u) if case_insensitive => u.to_lowercase() == wanted,
            Some(u) => u == wanted,
            None => false,
        })
        .map(|(index, r)| IndexedReview { review: r.clone(), index })
        .collect()
}

/// Millisecond clock value, bumped past every id already in the document.
fn next_review_id(doc: &Document, now: DateTime<Utc>) -> ReviewId {
    let taken = |candidate: i64| {
        let key = candidate.to_string();
        doc.reviews.iter().any(|r| r.id.as_ref().is_some_and(|id| id.matches(&key)))
    };
    let floor = doc
        .reviews
        .iter()
        .filter_map(|r| r.id.as_ref().and_then(ReviewId::as_number))
        .max()
        .map_or(Some(i64::MIN), |m| m.checked_add(1));
    let mut next = floor.map(|floor| now.timestamp_millis().max(floor));
    while let Some(candidate) = next {
        if !taken(candidate) {
            return ReviewId::Number(candidate);
        }
        next = candidate.checked_add(1);
    }
    // the top of the range is used up; take the lowest free value instead
    let lowest = (0..=i64::MAX).find(|c| !taken(*c)).unwrap_or_default();
    ReviewId::Number(lowest)
}

pub fn create_with_id(doc: &mut Document, username: String, message: String, now: DateTime<Utc>) -> Review {
    let review = Review {
        id: Some(next_review_id(doc, now)),
        username: Some(username),
        message,
        timestamp: Some(now),
    };
    doc.reviews.push(review.clone());
    review
}

fn position_by_id(doc: &Document, id: &str, owner: Option<&str>) -> Result<usize, ServiceError> {
    doc.reviews
        .iter()
        .position(|r| {
            r.id.as_ref().is_some_and(|rid| rid.matches(id))
                && owner.map_or(true, |o| r.username.as_deref() == Some(o))
        })
        .ok_or_else(|| ServiceError::not_found("review"))
}

pub fn update_by_id(doc: &mut Document, id: &str, message: String, now: DateTime<Utc>) -> Result<Review, ServiceError> {
    let pos = position_by_id(doc, id, None)?;
    Ok(touch(&mut doc.reviews[pos], message, now))
}

pub fn remove_by_id(doc: &mut Document, id: &str) -> Result<Review, ServiceError> {
    let pos = position_by_id(doc, id, None)?;
    Ok(doc.reviews.remove(pos))
}

/// Like [`update_by_id`], but only when the review also belongs to `username`.
pub fn update_owned(
    doc: &mut Document,
    username: &str,
    id: &str,
    message: String,
    now: DateTime<Utc>,
) -> Result<Review, ServiceError> {
    let pos = position_by_id(doc, id, Some(username))?;
    Ok(touch(&mut doc.reviews[pos], message, now))
}

pub fn remove_owned(doc: &mut Document, username: &str, id: &str) -> Result<Review, ServiceError> {
    let pos = position_by_id(doc, id, Some(username))?;
    Ok(doc.reviews.remove(pos))
}

fn touch(review: &mut Review, message: String, now: DateTime<Utc>) -> Review {
    review.message = message;
    review.timestamp = Some(now);
    review.clone()
}

pub fn create_positional(doc: &mut Document, username: String, message: String) -> Review {
    let review = Review { id: None, username: Some(username), message, timestamp: None };
    doc.reviews.push(review.clone());
    review
}

/// Replace the message, and the username when one is given.
pub fn update_at(
    doc: &mut Document,
    index: usize,
    username: Option<String>,
    message: String,
) -> Result<Review, ServiceError> {
    let review = doc.reviews.get_mut(index).ok_or_else(|| ServiceError::not_found("review"))?;
    if let Some(u) = username.filter(|u| !u.is_empty()) {
        review.username = Some(u);
    }
    review.message = message;
    Ok(review.clone())
}

pub fn remove_at(doc: &mut Document, index: usize) -> Result<Review, ServiceError> {
    if index >= doc.reviews.len() {
        return Err(ServiceError::not_found("review"));
    }
    Ok(doc.reviews.remove(index))
}

/// File-backed review operations for the configured addressing mode.
///
/// `key` arguments are the raw path segment: an id in `ById` mode, an index
/// in `ByPosition` mode.
#[derive(Clone)]
pub struct ReviewService {
    store: Arc<DocumentStore>,
    addressing: ReviewAddressing,
    case_insensitive: bool,
}

impl ReviewService {
    pub fn new(store: Arc<DocumentStore>, addressing: ReviewAddressing, case_insensitive: bool) -> Self {
        Self { store, addressing, case_insensitive }
    }

    pub fn addressing(&self) -> ReviewAddressing { self.addressing }

    pub async fn list(&self) -> Result<Vec<Review>, ServiceError> {
        self.store.read(|doc| Ok(list_all(doc).to_vec())).await
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Vec<IndexedReview>, ServiceError> {
        let ci = self.case_insensitive;
        self.store.read(|doc| Ok(find_by_username(doc, username, ci))).await
    }

    #[instrument(skip(self, input), fields(mode = ?self.addressing))]
    pub async fn create(&self, input: ReviewInput) -> Result<Review, ServiceError> {
        let (username, message) = input.required()?;
        let review = match self.addressing {
            ReviewAddressing::ById => {
                let now = Utc::now();
                self.store.update(|doc| Ok(create_with_id(doc, username, message, now))).await?
            }
            ReviewAddressing::ByPosition => {
                self.store.update(|doc| Ok(create_positional(doc, username, message))).await?
            }
        };
        info!(review_id = ?review.id, "review_created");
        Ok(review)
    }

    #[instrument(skip(self, input), fields(mode = ?self.addressing))]
    pub async fn update(&self, key: &str, input: ReviewInput) -> Result<Review, ServiceError> {
        let message = input.message.filter(|s| !s.is_empty()).ok_or_else(|| ServiceError::required("message"))?;
        match self.addressing {
            ReviewAddressing::ById => {
                let now = Utc::now();
                self.store.update(|doc| update_by_id(doc, key, message, now)).await
            }
            ReviewAddressing::ByPosition => {
                let index = parse_index(key, "review")?;
                self.store.update(|doc| update_at(doc, index, input.username, message)).await
            }
        }
    }

    #[instrument(skip(self), fields(mode = ?self.addressing))]
    pub async fn delete(&self, key: &str) -> Result<Review, ServiceError> {
        let removed = match self.addressing {
            ReviewAddressing::ById => self.store.update(|doc| remove_by_id(doc, key)).await?,
            ReviewAddressing::ByPosition => {
                let index = parse_index(key, "review")?;
                self.store.update(|doc| remove_at(doc, index)).await?
            }
        };
        info!("review_deleted");
        Ok(removed)
    }

    /// Owner-scoped update; only meaningful when reviews carry ids.
    #[instrument(skip(self, input))]
    pub async fn update_owned(&self, username: &str, id: &str, input: ReviewInput) -> Result<Review, ServiceError> {
        self.require_ids()?;
        let message = input.message.filter(|s| !s.is_empty()).ok_or_else(|| ServiceError::required("message"))?;
        let now = Utc::now();
        self.store.update(|doc| update_owned(doc, username, id, message, now)).await
    }

    #[instrument(skip(self))]
    pub async fn delete_owned(&self, username: &str, id: &str) -> Result<Review, ServiceError> {
        self.require_ids()?;
        self.store.update(|doc| remove_owned(doc, username, id)).await
    }

    fn require_ids(&self) -> Result<(), ServiceError> {
        match self.addressing {
            ReviewAddressing::ById => Ok(()),
            ReviewAddressing::ByPosition => Err(ServiceError::not_found("review")),
        }
    }
}

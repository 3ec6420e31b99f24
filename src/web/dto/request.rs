//! Request DTOs.

use serde::Deserialize;

use crate::feed::{parse_feed_names, Limit};
use crate::pipeline::PlaylistRequest;
use crate::{FlockError, Result};

/// Query string of `GET /api/playlist`.
///
/// Fields stay raw strings so that bad values are reported with the same
/// messages whatever their shape.
#[derive(Debug, Default, Deserialize)]
pub struct PlaylistQuery {
    /// Feed names separated by whitespace or `+`.
    #[serde(default)]
    pub subreddits: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    /// Time window.
    #[serde(default)]
    pub t: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

impl PlaylistQuery {
    /// Validate into a pipeline request. Missing values take their defaults.
    pub fn to_request(&self) -> Result<PlaylistRequest> {
        let feed_names = parse_feed_names(self.subreddits.as_deref().unwrap_or_default());
        if feed_names.is_empty() {
            return Err(FlockError::Validation("No subreddits given".to_string()));
        }

        let mut request = PlaylistRequest::new(feed_names);
        if let Some(sort) = &self.sort {
            request.sort = sort.parse()?;
        }
        if let Some(window) = &self.t {
            request.window = window.parse()?;
        }
        if let Some(limit) = &self.limit {
            request.limit = limit.parse::<Limit>()?;
        }
        Ok(request)
    }
}

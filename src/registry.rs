//! Fixed, ordered registry of target pages

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("target {id} not found (valid ids are 0..{count})")]
    NotFound { id: i64, count: usize },
}

/// One configured remote page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    pub id: usize,
    pub url: String,
}

/// Immutable list of targets indexed `0..N`.
///
/// Cloning is cheap and every clone shares the same backing slice, so the
/// registry can be handed to any number of concurrent requests.
#[derive(Debug, Clone)]
pub struct TargetRegistry {
    targets: Arc<[Target]>,
}

impl TargetRegistry {
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let targets: Vec<Target> = urls
            .into_iter()
            .enumerate()
            .map(|(id, url)| Target { id, url: url.into() })
            .collect();

        Self {
            targets: targets.into(),
        }
    }

    pub fn count(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Look up a target by id. Negative and out-of-range ids are `NotFound`.
    pub fn get(&self, id: i64) -> Result<&Target, RegistryError> {
        usize::try_from(id)
            .ok()
            .and_then(|index| self.by_index(index))
            .ok_or(RegistryError::NotFound {
                id,
                count: self.count(),
            })
    }

    /// Target at a slot position, for callers already holding a valid index
    pub fn by_index(&self, index: usize) -> Option<&Target> {
        self.targets.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }
}

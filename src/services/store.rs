use crate::models::{Candidate, Evaluation, Listing, ListingTags};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading the listing data files.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// JSON file-backed listing store: the full candidate pool plus per-listing
/// prior evaluations and tags, joined by listing id.
#[derive(Debug)]
pub struct FileStore {
    candidates: Vec<Candidate>,
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
        path: display,
        source,
    })
}

impl FileStore {
    pub fn load(
        listings_path: impl AsRef<Path>,
        evaluations_path: impl AsRef<Path>,
        tags_path: impl AsRef<Path>,
    ) -> Result<Self, StoreError> {
        let listings: Vec<Listing> = load_json(listings_path.as_ref())?;
        let evaluations: Vec<Evaluation> = load_json(evaluations_path.as_ref())?;
        let tags: Vec<ListingTags> = load_json(tags_path.as_ref())?;

        tracing::info!(
            listings = listings.len(),
            evaluations = evaluations.len(),
            tags = tags.len(),
            "Loaded listing data"
        );

        let mut eval_map: HashMap<String, Evaluation> = evaluations
            .into_iter()
            .map(|e| (e.listing_id.clone(), e))
            .collect();
        let mut tags_map: HashMap<String, ListingTags> =
            tags.into_iter().map(|t| (t.listing_id.clone(), t)).collect();

        let candidates = listings
            .into_iter()
            .map(|listing| {
                let evaluation = eval_map.remove(&listing.id);
                let tags = tags_map.remove(&listing.id);
                Candidate {
                    listing,
                    evaluation,
                    tags,
                }
            })
            .collect();

        Ok(Self { candidates })
    }

    /// The full candidate pool, cloned per run: the pipeline consumes and
    /// reorders its working copy.
    pub fn candidates(&self) -> Vec<Candidate> {
        self.candidates.clone()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

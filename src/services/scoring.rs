use crate::models::{Candidate, CriteriaSummary, ScoreResult};
use crate::services::oracle::{extract_json_array, Oracle};
use crate::services::usage::UsageTracker;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

/// Candidates scored per oracle call.
pub const BATCH_SIZE: usize = 10;
/// Largest pool sent to the oracle for one run.
pub const SAMPLING_CAP: usize = 100;
/// Description characters included per candidate in the prompt.
const DESCRIPTION_LIMIT: usize = 500;
const SCORING_MAX_TOKENS: u32 = 2000;

const SCORING_SYSTEM_PROMPT: &str = "\
Tu es un assistant qui evalue la compatibilite entre des annonces d'habitat groupe et les criteres personnels d'un utilisateur.

Tu dois attribuer un score de 0 a 100 a chaque annonce:
- 80-100: Correspond tres bien aux criteres
- 60-79: Bonne correspondance partielle
- 40-59: Correspondance moyenne
- 20-39: Faible correspondance
- 0-19: Ne correspond pas

Reponds UNIQUEMENT avec un tableau JSON valide. Pas de texte avant ou apres.
Format: [{\"listing_id\": \"...\", \"score\": N, \"explanation\": \"...\"}]
L'explication doit etre courte (1 phrase max, en francais).";

/// Take at most `n` characters, on char boundaries.
pub(crate) fn truncate_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Cap oversized pools before scoring.
///
/// Pools above the cap are pre-ranked by prior quality score (descending,
/// missing = 0, stable) and truncated, bounding oracle cost while biasing
/// the sample toward previously well-regarded listings.
pub fn sample_pool(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    if candidates.len() > SAMPLING_CAP {
        candidates.sort_by(|a, b| {
            b.prior_score()
                .partial_cmp(&a.prior_score())
                .unwrap_or(Ordering::Equal)
        });
        candidates.truncate(SAMPLING_CAP);
    }
    candidates
}

/// Batched relevance scoring against the cheap-tier oracle.
///
/// One oracle call per batch, issued sequentially so rate limits and per-run
/// cost stay predictable. Failures are isolated per batch: every candidate
/// of a failed batch gets a zero fallback score and the run continues.
pub struct BatchScorer {
    oracle: Arc<dyn Oracle>,
    usage: Arc<UsageTracker>,
    model: String,
}

impl BatchScorer {
    pub fn new(oracle: Arc<dyn Oracle>, usage: Arc<UsageTracker>, model: String) -> Self {
        Self {
            oracle,
            usage,
            model,
        }
    }

    /// Score every candidate. The output carries exactly one result per
    /// input candidate, in input order, even when every batch fails.
    pub async fn score(
        &self,
        criteria: &CriteriaSummary,
        candidates: &[Candidate],
    ) -> Vec<ScoreResult> {
        let mut all = Vec::with_capacity(candidates.len());
        let batch_count = candidates.len().div_ceil(BATCH_SIZE);

        for (index, batch) in candidates.chunks(BATCH_SIZE).enumerate() {
            tracing::debug!(
                batch = index + 1,
                batches = batch_count,
                size = batch.len(),
                "Scoring batch"
            );
            all.extend(self.score_batch(criteria, batch).await);
        }

        all
    }

    async fn score_batch(
        &self,
        criteria: &CriteriaSummary,
        batch: &[Candidate],
    ) -> Vec<ScoreResult> {
        let user = build_user_prompt(criteria, batch);

        let reply = match self
            .oracle
            .complete(&self.model, SCORING_SYSTEM_PROMPT, &user, SCORING_MAX_TOKENS)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("Scoring batch failed: {}", e);
                return fallback(batch, "Erreur technique");
            }
        };

        self.usage.record(reply.input_tokens, reply.output_tokens);

        let Some(json) = extract_json_array(&reply.text) else {
            tracing::warn!(
                "No JSON array in scoring reply: {}",
                truncate_chars(&reply.text, 200)
            );
            return fallback(batch, "Erreur de parsing");
        };

        let parsed: Vec<ScoreResult> = match serde_json::from_str(json) {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!("Could not parse scoring reply: {}", e);
                return fallback(batch, "Erreur technique");
            }
        };

        align(batch, parsed)
    }
}

fn build_user_prompt(criteria: &CriteriaSummary, batch: &[Candidate]) -> String {
    let listings_text = batch
        .iter()
        .enumerate()
        .map(|(idx, c)| {
            let listing = &c.listing;
            let tags = c
                .tags
                .as_ref()
                .map(|t| t.summary())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "Aucun".to_string());
            format!(
                "[{}] ID: {}\nTitre: {}\nLieu: {}{}\nPrix: {}\nType: {}\nTags: {}\nDescription: {}",
                idx + 1,
                listing.id,
                listing.title,
                listing.location.as_deref().unwrap_or("Non précisé"),
                listing
                    .country
                    .as_deref()
                    .map(|c| format!(" ({})", c))
                    .unwrap_or_default(),
                listing.price.as_deref().unwrap_or("Non précisé"),
                listing.listing_type.as_deref().unwrap_or("Non précisé"),
                tags,
                truncate_chars(&listing.description, DESCRIPTION_LIMIT),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");

    format!(
        "CRITERES DE L'UTILISATEUR:\n{}\n\nANNONCES A EVALUER:\n{}\n\n\
         Evalue chaque annonce selon les criteres. Reponds avec le tableau JSON uniquement.",
        criteria, listings_text
    )
}

/// Re-align parsed oracle output to the batch identity set: one result per
/// input candidate, scores clamped to [0, 100], extraneous or duplicate ids
/// dropped.
fn align(batch: &[Candidate], parsed: Vec<ScoreResult>) -> Vec<ScoreResult> {
    let mut by_id: HashMap<String, ScoreResult> = HashMap::with_capacity(parsed.len());
    for result in parsed {
        by_id.entry(result.listing_id.clone()).or_insert(result);
    }

    batch
        .iter()
        .map(|c| match by_id.remove(&c.listing.id) {
            Some(mut result) => {
                result.score = result.score.clamp(0.0, 100.0);
                result
            }
            None => ScoreResult {
                listing_id: c.listing.id.clone(),
                score: 0.0,
                explanation: "Erreur de parsing".to_string(),
            },
        })
        .collect()
}

fn fallback(batch: &[Candidate], explanation: &str) -> Vec<ScoreResult> {
    batch
        .iter()
        .map(|c| ScoreResult {
            listing_id: c.listing.id.clone(),
            score: 0.0,
            explanation: explanation.to_string(),
        })
        .collect()
}

use serde::{Deserialize, Serialize};

/// A listing from the candidate pool. Read-only within the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    /// Display price as scraped ("650€/mois", "à discuter", ...).
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub price_amount: Option<f64>,
    #[serde(default)]
    pub listing_type: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl Listing {
    /// Lower-cased concatenation of location and province, the text the
    /// substring geography checks run against.
    pub fn location_text(&self) -> String {
        format!(
            "{} {}",
            self.location.as_deref().unwrap_or(""),
            self.province.as_deref().unwrap_or("")
        )
        .to_lowercase()
    }
}

/// Prior quality evaluation of a listing, produced by an earlier pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Evaluation {
    pub listing_id: String,
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub quality_score: Option<f64>,
    #[serde(default)]
    pub quality_summary: Option<String>,
}

impl Evaluation {
    pub fn prior_score(&self) -> Option<f64> {
        self.overall_score.or(self.quality_score)
    }
}

/// Structured tags extracted from a listing's description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingTags {
    pub listing_id: String,
    #[serde(default)]
    pub group_size: Option<u32>,
    #[serde(default)]
    pub shared_spaces: Vec<String>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub shared_meals: Option<String>,
    #[serde(default)]
    pub pets_allowed: Option<bool>,
    #[serde(default)]
    pub accessible_pmr: Option<bool>,
    #[serde(default)]
    pub project_types: Vec<String>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub unit_type: Option<String>,
}

impl ListingTags {
    /// Compact one-line rendition embedded in oracle prompts.
    pub fn summary(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(env) = &self.environment {
            parts.push(env.clone());
        }
        if let Some(size) = self.group_size {
            parts.push(format!("{} pers.", size));
        }
        if !self.shared_spaces.is_empty() {
            parts.push(self.shared_spaces.join(", "));
        }
        if !self.values.is_empty() {
            parts.push(self.values.join(", "));
        }
        if let Some(meals) = &self.shared_meals {
            parts.push(format!("repas: {}", meals));
        }
        if self.pets_allowed == Some(true) {
            parts.push("animaux OK".to_string());
        }
        if self.accessible_pmr == Some(true) {
            parts.push("PMR".to_string());
        }
        if !self.project_types.is_empty() {
            parts.push(self.project_types.join(", "));
        }
        parts.join(" | ")
    }
}

/// A listing joined with its optional prior evaluation and tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub listing: Listing,
    #[serde(default)]
    pub evaluation: Option<Evaluation>,
    #[serde(default)]
    pub tags: Option<ListingTags>,
}

impl Candidate {
    /// Prior quality score used for pre-ranking large pools; missing = 0.
    pub fn prior_score(&self) -> f64 {
        self.evaluation
            .as_ref()
            .and_then(|e| e.prior_score())
            .unwrap_or(0.0)
    }
}

/// Hard admission filters compiled from questionnaire answers.
///
/// Empty lists and `None` mean "no constraint" on that dimension, never
/// "reject all".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HardFilters {
    pub listing_types_include: Vec<String>,
    pub listing_types_exclude: Vec<String>,
    pub locations_include: Vec<String>,
    pub locations_exclude: Vec<String>,
    pub max_price: Option<u32>,
    pub min_score: Option<f64>,
    pub keywords_include: Vec<String>,
    pub keywords_exclude: Vec<String>,
}

/// Ordered, human-readable "label: value" lines shown verbatim to the
/// scoring oracle. Line order is fixed by the compiler because it affects
/// which signals the oracle's attention favors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriteriaSummary {
    lines: Vec<String>,
}

impl CriteriaSummary {
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl std::fmt::Display for CriteriaSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}

/// Relevance score for one listing, as returned by the scoring oracle or
/// substituted by the per-batch fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub listing_id: String,
    pub score: f64,
    pub explanation: String,
}

/// One entry of the final ranked top-N.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedMatch {
    pub candidate: Candidate,
    pub result: ScoreResult,
}

/// Holistic judgment of one matching run, produced by the judge oracle or by
/// a sentinel path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    #[serde(default)]
    pub overall_grade: String,
    #[serde(default)]
    pub overall_score: f64,
    #[serde(default)]
    pub relevance_score: f64,
    #[serde(default)]
    pub diversity_score: f64,
    #[serde(default)]
    pub dealbreaker_respect: f64,
    #[serde(default)]
    pub ranking_quality: f64,
    #[serde(default)]
    pub commentary: String,
    #[serde(default)]
    pub top3_analysis: String,
    #[serde(default)]
    pub worst_suggestion: String,
}

impl Judgment {
    fn zeroed(grade: &str, commentary: String) -> Self {
        Self {
            overall_grade: grade.to_string(),
            overall_score: 0.0,
            relevance_score: 0.0,
            diversity_score: 0.0,
            dealbreaker_respect: 0.0,
            ranking_quality: 0.0,
            commentary,
            top3_analysis: String::new(),
            worst_suggestion: String::new(),
        }
    }

    /// Sentinel for a run where nothing passed the hard filters. Distinct
    /// from the failure sentinel so the two causes stay distinguishable.
    pub fn empty_pool() -> Self {
        Self::zeroed("F", "Aucune annonce ne passe les filtres durs.".to_string())
    }

    /// Sentinel for a judge oracle failure. A genuine F still carries real
    /// sub-scores and commentary; this one carries "?" and zeros.
    pub fn failure(message: &str) -> Self {
        Self::zeroed("?", format!("Erreur: {}", message))
    }
}

/// Full output of one matching run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub filters: HardFilters,
    pub criteria: CriteriaSummary,
    pub total_candidates: usize,
    pub admitted: usize,
    pub scored: usize,
    pub matches: Vec<RankedMatch>,
    pub judgment: Judgment,
}

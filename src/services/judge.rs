use crate::models::{AnswerSet, Judgment, RankedMatch};
use crate::services::oracle::{extract_json_object, Oracle};
use crate::services::scoring::truncate_chars;
use crate::services::usage::UsageTracker;
use std::sync::Arc;

const JUDGE_MAX_TOKENS: u32 = 1500;
const JUDGE_DESCRIPTION_LIMIT: usize = 400;

const JUDGE_SYSTEM_PROMPT: &str = "\
Tu es un evaluateur expert en matching immobilier communautaire.
On te presente un profil utilisateur et les meilleures annonces que l'algorithme lui a suggerees.

Tu dois evaluer la QUALITE du matching avec des scores de 0 a 100 et une note globale (A/B/C/D/F).

Criteres d'evaluation:
- relevance_score: Les suggestions correspondent-elles au profil?
- diversity_score: Y a-t-il de la variete (lieux, types de projet)?
- dealbreaker_respect: L'algo a-t-il respecte les criteres eliminatoires?
- ranking_quality: Les meilleures options sont-elles en haut du classement?

Notes:
- A (85-100): Excellent matching, suggestions tres pertinentes
- B (70-84): Bon matching, quelques suggestions moyennes
- C (55-69): Matching correct mais des lacunes notables
- D (40-54): Matching mediocre, beaucoup de hors-sujet
- F (0-39): Matching defaillant

Reponds UNIQUEMENT en JSON valide, format:
{
  \"overall_grade\": \"A\",
  \"overall_score\": 87,
  \"relevance_score\": 90,
  \"diversity_score\": 80,
  \"dealbreaker_respect\": 95,
  \"ranking_quality\": 85,
  \"commentary\": \"...\",
  \"top3_analysis\": \"...\",
  \"worst_suggestion\": \"...\"
}";

/// Letter grade for a 0-100 score on the fixed band mapping.
pub fn grade_for(score: f64) -> &'static str {
    if score >= 85.0 {
        "A"
    } else if score >= 70.0 {
        "B"
    } else if score >= 55.0 {
        "C"
    } else if score >= 40.0 {
        "D"
    } else {
        "F"
    }
}

/// Second-pass holistic critique of a run's ranked top-N, one richer-tier
/// oracle call per run.
///
/// Never returns an error: any call or parse failure becomes the "?"
/// sentinel judgment with the error surfaced in the commentary.
pub struct QualityJudge {
    oracle: Arc<dyn Oracle>,
    usage: Arc<UsageTracker>,
    model: String,
}

impl QualityJudge {
    pub fn new(oracle: Arc<dyn Oracle>, usage: Arc<UsageTracker>, model: String) -> Self {
        Self {
            oracle,
            usage,
            model,
        }
    }

    pub async fn judge(&self, answers: &AnswerSet, top: &[RankedMatch]) -> Judgment {
        let user = build_user_prompt(answers, top);

        let reply = match self
            .oracle
            .complete(&self.model, JUDGE_SYSTEM_PROMPT, &user, JUDGE_MAX_TOKENS)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("Judge call failed: {}", e);
                return Judgment::failure(&e.to_string());
            }
        };

        self.usage.record(reply.input_tokens, reply.output_tokens);

        let Some(json) = extract_json_object(&reply.text) else {
            tracing::warn!(
                "No JSON object in judge reply: {}",
                truncate_chars(&reply.text, 200)
            );
            return Judgment::failure("JSON introuvable dans la réponse du juge");
        };

        match serde_json::from_str::<Judgment>(json) {
            Ok(mut judgment) => {
                // An omitted grade is derived from the overall score on the
                // same bands the oracle was instructed to use.
                if judgment.overall_grade.is_empty() {
                    judgment.overall_grade = grade_for(judgment.overall_score).to_string();
                }
                judgment
            }
            Err(e) => {
                tracing::warn!("Could not parse judge reply: {}", e);
                Judgment::failure(&e.to_string())
            }
        }
    }
}

fn push_profile_line(lines: &mut Vec<String>, label: &str, value: Option<&str>) {
    if let Some(v) = value {
        if !v.trim().is_empty() {
            lines.push(format!("- {}: {}", label, v));
        }
    }
}

fn build_profile_section(answers: &AnswerSet) -> String {
    let mut lines: Vec<String> = Vec::new();

    if let Some(budget) = answers.get_num("budget_max") {
        lines.push(format!("- Budget: {}€/mois", budget));
    }
    push_profile_line(&mut lines, "Cadre", answers.get_str("setting_preference"));
    push_profile_line(&mut lines, "Taille communauté", answers.get_str("community_size"));
    push_profile_line(&mut lines, "Maturité", answers.get_str("project_maturity"));
    push_profile_line(&mut lines, "Spiritualité", answers.get_str("spiritual_importance"));
    push_profile_line(&mut lines, "Repas partagés", answers.get_str("shared_meals_importance"));
    push_profile_line(&mut lines, "Santé/proximité soins", answers.get_str("health_proximity"));
    let dealbreakers = answers.get_list("dealbreakers");
    if !dealbreakers.is_empty() {
        lines.push(format!("- Dealbreakers: {}", dealbreakers.join(", ")));
    }
    push_profile_line(&mut lines, "Priorité n°1", answers.get_str("single_most_important"));
    push_profile_line(&mut lines, "Vision", answers.get_str("dream_vision"));

    lines.join("\n")
}

fn build_listings_section(top: &[RankedMatch]) -> String {
    top.iter()
        .enumerate()
        .map(|(i, m)| {
            let listing = &m.candidate.listing;
            let tags = m
                .candidate
                .tags
                .as_ref()
                .map(|t| format!("Tags: {}", t.summary()))
                .unwrap_or_else(|| "Tags: non disponibles".to_string());
            format!(
                "#{} [Score: {}]\nTitre: {}\nLieu: {} ({})\nPrix: {}\nType: {}\nDescription: {}\nExplication: {}\n{}",
                i + 1,
                m.result.score,
                listing.title,
                listing.location.as_deref().unwrap_or("?"),
                listing.country.as_deref().unwrap_or("?"),
                listing.price.as_deref().unwrap_or("Non précisé"),
                listing.listing_type.as_deref().unwrap_or("?"),
                truncate_chars(&listing.description, JUDGE_DESCRIPTION_LIMIT),
                m.result.explanation,
                tags,
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

fn build_user_prompt(answers: &AnswerSet, top: &[RankedMatch]) -> String {
    format!(
        "PROFIL UTILISATEUR:\n{}\n\nLES {} SUGGESTIONS DE L'ALGORITHME:\n{}\n\n\
         Evalue la qualite globale de ces suggestions pour ce profil.",
        build_profile_section(answers),
        top.len(),
        build_listings_section(top),
    )
}

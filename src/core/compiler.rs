use crate::models::{AnswerSet, CriteriaSummary, HardFilters};

/// Questionnaire region ids mapped to the province names used in listing data.
const REGION_TO_PROVINCE: &[(&str, &str)] = &[
    ("bruxelles", "Bruxelles"),
    ("brabant_wallon", "Brabant Wallon"),
    ("hainaut", "Hainaut"),
    ("liege", "Liège"),
    ("namur", "Namur"),
    ("luxembourg", "Luxembourg"),
    ("brabant_flamand", "Flandre"),
    ("flandre", "Flandre"),
];

/// Known region tokens scanned for in the free-text "locations to avoid"
/// answer, language variants included.
const REGION_TOKENS: &[(&str, &str)] = &[
    ("flandre", "Flandre"),
    ("flamand", "Flandre"),
    ("flamande", "Flandre"),
    ("bruxelles", "Bruxelles"),
    ("hainaut", "Hainaut"),
    ("liege", "Liège"),
    ("liège", "Liège"),
    ("namur", "Namur"),
    ("luxembourg", "Luxembourg"),
    ("brabant wallon", "Brabant Wallon"),
];

/// Province excluded when the seeker declares a language-barrier dealbreaker.
const LANGUAGE_BARRIER_PROVINCE: &str = "Flandre";

/// Budget overshoot tolerated when budget is the seeker's top criterion.
const BUDGET_BUFFER_STRICT: f64 = 1.05;
/// Budget overshoot tolerated otherwise.
const BUDGET_BUFFER_RELAXED: f64 = 1.15;

/// Compile raw questionnaire answers into hard admission filters and the
/// free-text criteria summary sent to the scoring oracle.
///
/// Deterministic and total: unrecognized or missing fields are skipped, never
/// an error. Only tenure, regions, avoided locations, budget and the
/// language-barrier dealbreaker become hard filters; every other declared
/// field is a soft signal appended to the summary.
pub fn compile(answers: &AnswerSet) -> (HardFilters, CriteriaSummary) {
    let mut filters = HardFilters::default();
    let mut summary = CriteriaSummary::default();

    let most_important = answers.get_str("single_most_important");

    // Budget ceiling with the asymmetric buffer: a budget-prioritizing
    // seeker tolerates less overshoot.
    if let Some(budget) = answers.get_num("budget_max") {
        let buffer = if most_important == Some("budget") {
            BUDGET_BUFFER_STRICT
        } else {
            BUDGET_BUFFER_RELAXED
        };
        filters.max_price = Some((budget * buffer).round() as u32);
        summary.push(format!("Budget max: {}€/mois", budget));
    }

    // Tenure maps to a listing-type allow-list. "creation-groupe" appears in
    // every branch: a forming group can end up either rental or purchase.
    match answers.get_str("tenure_type") {
        Some("rental") => {
            filters.listing_types_include =
                vec!["offre-location".to_string(), "creation-groupe".to_string()];
            summary.push("Type recherché: location");
        }
        Some("purchase") => {
            filters.listing_types_include =
                vec!["offre-vente".to_string(), "creation-groupe".to_string()];
            summary.push("Type recherché: achat");
        }
        Some("either") => {
            filters.listing_types_include = vec![
                "offre-location".to_string(),
                "offre-vente".to_string(),
                "creation-groupe".to_string(),
            ];
            summary.push("Type recherché: location ou achat");
        }
        _ => {}
    }

    // Preferred regions through the fixed table. "no_preference"
    // short-circuits to an unconstrained allow-list rather than matching
    // zero provinces.
    let regions = answers.get_list("preferred_regions");
    if !regions.is_empty() && !regions.iter().any(|r| r == "no_preference") {
        for region in regions {
            if let Some((_, province)) = REGION_TO_PROVINCE.iter().find(|(id, _)| id == region) {
                push_unique(&mut filters.locations_include, province);
            }
        }
        if !filters.locations_include.is_empty() {
            summary.push(format!("Régions: {}", filters.locations_include.join(", ")));
        }
    }

    // Free-text avoided locations, scanned for known region tokens.
    if let Some(avoid) = answers.get_str("locations_avoid") {
        if !avoid.trim().is_empty() {
            let lower = avoid.to_lowercase();
            for (token, province) in REGION_TOKENS {
                if lower.contains(token) {
                    push_unique(&mut filters.locations_exclude, province);
                }
            }
        }
    }

    let dealbreakers = answers.get_list("dealbreakers");
    if dealbreakers.iter().any(|d| d == "language_barrier") {
        push_unique(&mut filters.locations_exclude, LANGUAGE_BARRIER_PROVINCE);
    }

    // A denied province wins over a declared preference for it, so the
    // allow/deny lists never overlap.
    filters
        .locations_include
        .retain(|p| !filters.locations_exclude.contains(p));

    if !filters.locations_exclude.is_empty() {
        summary.push(format!("Exclut: {}", filters.locations_exclude.join(", ")));
    }

    // Everything below is a soft signal for the scoring oracle only.
    push_list_line(&mut summary, "Motivations", answers.get_list("motivation"));
    push_list_line(&mut summary, "Valeurs", answers.get_list("core_values"));
    push_str_line(&mut summary, "Spiritualité", answers.get_str("spiritual_importance"));
    push_str_line(&mut summary, "Taille communauté", answers.get_str("community_size"));
    push_str_line(&mut summary, "Maturité du projet", answers.get_str("project_maturity"));
    push_list_line(&mut summary, "Activités", answers.get_list("community_activities"));
    push_str_line(&mut summary, "Repas partagés", answers.get_str("shared_meals_importance"));
    push_str_line(&mut summary, "Cadre", answers.get_str("setting_preference"));
    push_str_line(&mut summary, "Logement", answers.get_str("unit_type"));
    push_list_line(&mut summary, "Parking", answers.get_list("parking_needs"));
    push_list_line(&mut summary, "Besoins pratiques", answers.get_list("practical_needs"));
    push_str_line(&mut summary, "Proximité soins", answers.get_str("health_proximity"));
    push_list_line(&mut summary, "Dealbreakers", dealbreakers);
    push_str_line(&mut summary, "Vision", answers.get_str("dream_vision"));
    push_str_line(&mut summary, "Priorité n°1", most_important);

    (filters, summary)
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

fn push_str_line(summary: &mut CriteriaSummary, label: &str, value: Option<&str>) {
    if let Some(v) = value {
        if !v.trim().is_empty() {
            summary.push(format!("{}: {}", label, v));
        }
    }
}

fn push_list_line(summary: &mut CriteriaSummary, label: &str, values: &[String]) {
    if !values.is_empty() {
        summary.push(format!("{}: {}", label, values.join(", ")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnswerValue;

    fn answers(pairs: Vec<(&str, AnswerValue)>) -> AnswerSet {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    #[test]
    fn test_budget_buffer_strict_when_budget_is_top_priority() {
        let a = answers(vec![
            ("budget_max", AnswerValue::Number(500.0)),
            ("single_most_important", AnswerValue::Text("budget".into())),
        ]);
        let (filters, _) = compile(&a);
        assert_eq!(filters.max_price, Some(525));
    }

    #[test]
    fn test_budget_buffer_relaxed_otherwise() {
        let a = answers(vec![
            ("budget_max", AnswerValue::Number(500.0)),
            ("single_most_important", AnswerValue::Text("values".into())),
        ]);
        let (filters, _) = compile(&a);
        assert_eq!(filters.max_price, Some(575));

        let no_priority = answers(vec![("budget_max", AnswerValue::Number(900.0))]);
        let (filters, _) = compile(&no_priority);
        assert_eq!(filters.max_price, Some(1035));
    }

    #[test]
    fn test_tenure_branches_all_include_creation_groupe() {
        for tenure in ["rental", "purchase", "either"] {
            let a = answers(vec![("tenure_type", AnswerValue::Text(tenure.into()))]);
            let (filters, _) = compile(&a);
            assert!(
                filters
                    .listing_types_include
                    .iter()
                    .any(|t| t == "creation-groupe"),
                "creation-groupe missing for tenure {}",
                tenure
            );
        }
    }

    #[test]
    fn test_no_preference_region_leaves_allow_list_empty() {
        let a = answers(vec![(
            "preferred_regions",
            AnswerValue::List(vec!["no_preference".into(), "liege".into()]),
        )]);
        let (filters, _) = compile(&a);
        assert!(filters.locations_include.is_empty());
    }

    #[test]
    fn test_regions_map_through_province_table() {
        let a = answers(vec![(
            "preferred_regions",
            AnswerValue::List(vec!["liege".into(), "brabant_flamand".into()]),
        )]);
        let (filters, _) = compile(&a);
        assert_eq!(filters.locations_include, vec!["Liège", "Flandre"]);
    }

    #[test]
    fn test_locations_avoid_matches_language_variants() {
        let a = answers(vec![(
            "locations_avoid",
            AnswerValue::Text("pas le côté flamand ni Liège svp".into()),
        )]);
        let (filters, _) = compile(&a);
        assert!(filters.locations_exclude.contains(&"Flandre".to_string()));
        assert!(filters.locations_exclude.contains(&"Liège".to_string()));
    }

    #[test]
    fn test_language_barrier_forces_flanders_once() {
        let a = answers(vec![
            (
                "dealbreakers",
                AnswerValue::List(vec!["language_barrier".into()]),
            ),
            ("locations_avoid", AnswerValue::Text("la flandre".into())),
        ]);
        let (filters, _) = compile(&a);
        let count = filters
            .locations_exclude
            .iter()
            .filter(|p| *p == "Flandre")
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_language_barrier_without_avoid_text() {
        let a = answers(vec![
            (
                "dealbreakers",
                AnswerValue::List(vec!["language_barrier".into()]),
            ),
            ("locations_avoid", AnswerValue::Text("".into())),
        ]);
        let (filters, _) = compile(&a);
        assert_eq!(filters.locations_exclude, vec!["Flandre"]);
    }

    #[test]
    fn test_allow_and_deny_lists_never_overlap() {
        let a = answers(vec![
            (
                "preferred_regions",
                AnswerValue::List(vec!["flandre".into(), "namur".into()]),
            ),
            (
                "dealbreakers",
                AnswerValue::List(vec!["language_barrier".into()]),
            ),
        ]);
        let (filters, _) = compile(&a);
        for p in &filters.locations_include {
            assert!(!filters.locations_exclude.contains(p));
        }
        assert_eq!(filters.locations_include, vec!["Namur"]);
    }

    #[test]
    fn test_total_on_empty_and_unknown_fields() {
        let (filters, summary) = compile(&AnswerSet::new());
        assert_eq!(filters, HardFilters::default());
        assert!(summary.is_empty());

        let a = answers(vec![
            ("some_future_question", AnswerValue::Text("whatever".into())),
            ("another", AnswerValue::Number(3.0)),
        ]);
        let (filters, summary) = compile(&a);
        assert_eq!(filters, HardFilters::default());
        assert!(summary.is_empty());
    }

    #[test]
    fn test_soft_fields_never_become_filters() {
        let a = answers(vec![
            ("core_values", AnswerValue::List(vec!["ecology".into()])),
            ("spiritual_importance", AnswerValue::Text("central".into())),
            ("community_size", AnswerValue::Text("small".into())),
            ("dream_vision", AnswerValue::Text("un potager partagé".into())),
        ]);
        let (filters, summary) = compile(&a);
        assert_eq!(filters, HardFilters::default());
        assert_eq!(summary.lines().len(), 4);
    }

    #[test]
    fn test_summary_order_budget_first_priority_last() {
        let a = answers(vec![
            ("budget_max", AnswerValue::Number(500.0)),
            ("tenure_type", AnswerValue::Text("rental".into())),
            (
                "preferred_regions",
                AnswerValue::List(vec!["namur".into()]),
            ),
            ("single_most_important", AnswerValue::Text("budget".into())),
            ("dream_vision", AnswerValue::Text("du calme".into())),
        ]);
        let (_, summary) = compile(&a);
        let lines = summary.lines();
        assert_eq!(lines[0], "Budget max: 500€/mois");
        assert_eq!(lines[1], "Type recherché: location");
        assert_eq!(lines[2], "Régions: Namur");
        assert_eq!(lines[lines.len() - 1], "Priorité n°1: budget");
        assert_eq!(lines[lines.len() - 2], "Vision: du calme");
    }
}

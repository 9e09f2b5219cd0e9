use crate::models::{Candidate, HardFilters};

/// Listing types accepted as equivalent when they appear in an allow-list.
///
/// An existing project transitioning into formation is still a valid match
/// for someone open to co-creation, so allowing "creation-groupe" also
/// admits "existing-project".
const TYPE_EQUIVALENTS: &[(&str, &str)] = &[("creation-groupe", "existing-project")];

/// Expand an allow-list with its equivalent types.
pub fn expand_types(allow: &[String]) -> Vec<String> {
    let mut expanded: Vec<String> = allow.to_vec();
    for (declared, equivalent) in TYPE_EQUIVALENTS {
        if allow.iter().any(|t| t == declared) && !expanded.iter().any(|t| t == equivalent) {
            expanded.push((*equivalent).to_string());
        }
    }
    expanded
}

/// Hard admission predicate: every applicable check must pass; an absent
/// filter dimension is always permissive. Checks are conjunctive, so their
/// order does not matter.
pub fn admits(candidate: &Candidate, filters: &HardFilters) -> bool {
    let listing = &candidate.listing;

    // Listing type allow-list, after equivalence expansion
    if !filters.listing_types_include.is_empty() {
        let expanded = expand_types(&filters.listing_types_include);
        match &listing.listing_type {
            Some(t) if expanded.iter().any(|e| e == t) => {}
            _ => return false,
        }
    }

    // Listing type deny-list
    if let Some(t) = &listing.listing_type {
        if filters.listing_types_exclude.iter().any(|e| e == t) {
            return false;
        }
    }

    // Geography is substring matching against the lower-cased location +
    // province text: province names show up as free text with varying
    // formatting.
    if !filters.locations_include.is_empty() {
        let loc = listing.location_text();
        if !filters
            .locations_include
            .iter()
            .any(|l| loc.contains(&l.to_lowercase()))
        {
            return false;
        }
    }

    if !filters.locations_exclude.is_empty() {
        let loc = listing.location_text();
        if filters
            .locations_exclude
            .iter()
            .any(|l| loc.contains(&l.to_lowercase()))
        {
            return false;
        }
    }

    // Price rejects only when both the ceiling and the listing amount are
    // known; unknown prices are never rejected on price.
    if let (Some(max), Some(amount)) = (filters.max_price, listing.price_amount) {
        if amount > max as f64 {
            return false;
        }
    }

    // Prior quality floor: a listing without an evaluation cannot prove it
    // clears the floor.
    if let Some(min) = filters.min_score {
        match candidate.evaluation.as_ref().and_then(|e| e.prior_score()) {
            Some(score) if score >= min => {}
            _ => return false,
        }
    }

    // Keyword checks run against the lower-cased title + description.
    if !filters.keywords_include.is_empty() || !filters.keywords_exclude.is_empty() {
        let text = format!("{} {}", listing.title, listing.description).to_lowercase();

        if !filters.keywords_include.is_empty()
            && !filters
                .keywords_include
                .iter()
                .any(|kw| text.contains(&kw.to_lowercase()))
        {
            return false;
        }

        if filters
            .keywords_exclude
            .iter()
            .any(|kw| text.contains(&kw.to_lowercase()))
        {
            return false;
        }
    }

    true
}

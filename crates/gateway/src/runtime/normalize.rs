//! Enum normalization and name shaping.
//!
//! `normalize` reproduces the agent's established fuzzy matching: the
//! first allowed value contained (case-insensitively) in the candidate
//! wins, and an unmatched candidate falls back to the first allowed value
//! rather than erroring.  Surprising, but load-bearing: stored Status and
//! Industry values are always members of the allowed set.

use wl_airtable::{RecordQuery, RecordStore};
use wl_domain::Result;

/// Map a free-text candidate onto a member of `allowed`.
///
/// The first allowed value (in iteration order) whose lowercase form is
/// contained in the candidate's lowercase form wins; ties go to the
/// earlier entry, not the longer match.  No match returns `allowed[0]`.
/// An empty `allowed` returns the candidate unchanged.
pub fn normalize<S: AsRef<str>>(candidate: &str, allowed: &[S]) -> String {
    let lowered = candidate.to_lowercase();
    allowed
        .iter()
        .find(|option| lowered.contains(&option.as_ref().to_lowercase()))
        .or_else(|| allowed.first())
        .map(|option| option.as_ref().to_string())
        .unwrap_or_else(|| candidate.to_string())
}

/// Title-case an account name: first letter of each whitespace-separated
/// word uppercased, the rest lowercased, single-space joined.  Idempotent.
pub fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pick the industry whose name appears in the free-text description,
/// falling back to `"General"`.
pub fn guess_industry<S: AsRef<str>>(info: &str, options: &[S]) -> String {
    let lowered = info.to_lowercase();
    options
        .iter()
        .find(|option| lowered.contains(&option.as_ref().to_lowercase()))
        .map(|option| option.as_ref().to_string())
        .unwrap_or_else(|| "General".to_string())
}

/// The allowed Industry values, queried live from every account record:
/// distinct non-empty values in first-seen order.  Re-queried on every
/// use; the store is the source of truth and nothing is cached.
pub async fn live_industry_options(store: &dyn RecordStore) -> Result<Vec<String>> {
    let records = store.query(RecordQuery::all().select(&["Industry"])).await?;
    let mut options: Vec<String> = Vec::new();
    for record in &records {
        if let Some(value) = record.field_str("Industry") {
            let value = value.trim();
            if !value.is_empty() && !options.iter().any(|o| o == value) {
                options.push(value.to_string());
            }
        }
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUSES: [&str; 3] = ["Active", "Disabled", "New"];

    #[test]
    fn normalize_returns_a_member_of_allowed() {
        for candidate in ["set it to active", "DISABLED please", "new", "gibberish"] {
            let result = normalize(candidate, &STATUSES);
            assert!(STATUSES.contains(&result.as_str()), "got {result}");
        }
    }

    #[test]
    fn normalize_is_case_insensitive() {
        assert_eq!(normalize("make it DISABLED now", &STATUSES), "Disabled");
    }

    #[test]
    fn normalize_first_match_in_order_wins() {
        // Both "Active" and "New" are contained; "Active" is earlier in
        // the allowed list.
        assert_eq!(normalize("new and active", &STATUSES), "Active");
    }

    #[test]
    fn normalize_unmatched_falls_back_to_first_allowed() {
        assert_eq!(normalize("paused", &STATUSES), "Active");
        let industries = ["Technology".to_string(), "Retail".to_string()];
        assert_eq!(normalize("underwater basket weaving", &industries), "Technology");
    }

    #[test]
    fn normalize_empty_allowed_keeps_candidate() {
        let empty: [&str; 0] = [];
        assert_eq!(normalize("whatever", &empty), "whatever");
    }

    #[test]
    fn title_case_shapes_and_is_idempotent() {
        assert_eq!(title_case("acme corp"), "Acme Corp");
        assert_eq!(title_case("ACME CORP"), "Acme Corp");
        assert_eq!(title_case("  acme   corp  "), "Acme Corp");
        let once = title_case("aCmE cOrP");
        assert_eq!(title_case(&once), once);
    }

    #[test]
    fn guess_industry_matches_or_defaults() {
        let options = ["Healthcare".to_string(), "Technology".to_string()];
        assert_eq!(
            guess_industry("a technology startup from Berlin", &options),
            "Technology"
        );
        assert_eq!(guess_industry("a bakery in Lisbon", &options), "General");
        let empty: [&str; 0] = [];
        assert_eq!(guess_industry("anything", &empty), "General");
    }
}

//! Resolution of the expenditure columns of a survey.
//!
//! Survey exports rarely keep the exact wording of the questions. Each
//! canonical question is matched against the header of the survey with a
//! similarity score, once, at load time. The resulting mapping is explicit
//! and can be audited or overridden before it is used.

use log::{debug, warn};
use std::collections::BTreeMap;
use text_diff::Difference;

use crate::config::Expense;

/// Matches below this similarity are rejected.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.7;

/// The outcome of matching one canonical label.
#[derive(PartialEq, Debug, Clone)]
pub struct ColumnMatch {
    pub expense: Expense,
    pub canonical_label: String,
    /// The header that was selected, if any was similar enough.
    pub matched: Option<String>,
    /// Similarity of the best candidate in [0, 1], even when it was rejected.
    pub score: f64,
    /// True if the column was given explicitly rather than matched.
    pub explicit: bool,
}

/// The mapping from expenditure variables to survey columns.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct ColumnMapping {
    pub matches: Vec<ColumnMatch>,
}

impl ColumnMapping {
    /// The column holding this variable, if it was found.
    pub fn column(&self, expense: Expense) -> Option<&str> {
        self.matches
            .iter()
            .find(|m| m.expense == expense)
            .and_then(|m| m.matched.as_deref())
    }

    /// A mapping made only of explicit column names.
    pub fn explicit(columns: &[(Expense, String)]) -> ColumnMapping {
        ColumnMapping {
            matches: columns
                .iter()
                .map(|(e, c)| ColumnMatch {
                    expense: *e,
                    canonical_label: e.canonical_label().to_string(),
                    matched: Some(c.clone()),
                    score: 1.0,
                    explicit: true,
                })
                .collect(),
        }
    }

    pub fn missing(&self) -> Vec<Expense> {
        self.matches
            .iter()
            .filter(|m| m.matched.is_none())
            .map(|m| m.expense)
            .collect()
    }
}

/// Similarity between two strings: twice the number of characters in common
/// (in order) divided by the total number of characters.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 0.0;
    }
    let (_, diffs) = text_diff::diff(a, b, "");
    let common: usize = diffs
        .iter()
        .map(|d| match d {
            Difference::Same(s) => s.chars().count(),
            _ => 0,
        })
        .sum();
    (2 * common) as f64 / total as f64
}

/// Finds the header most similar to the label.
/// Returns the best candidate and its score, whether or not it passes a threshold.
pub fn best_match(label: &str, header: &[String]) -> Option<(String, f64)> {
    let label = label.trim();
    let mut best: Option<(String, f64)> = None;
    for h in header.iter() {
        let score = similarity(label, h);
        match &best {
            Some((_, s)) if *s >= score => {}
            _ => best = Some((h.clone(), score)),
        }
    }
    best
}

/// Resolves every expenditure variable against the header of a survey.
///
/// Explicit columns take precedence. They are kept even if the header does
/// not contain them, the survey reader reports them as absent.
pub fn resolve_columns(
    header: &[String],
    explicit: &BTreeMap<Expense, String>,
    threshold: f64,
) -> ColumnMapping {
    let mut matches: Vec<ColumnMatch> = Vec::new();
    for expense in Expense::ALL {
        let canonical_label = expense.canonical_label().to_string();
        if let Some(col) = explicit.get(&expense) {
            matches.push(ColumnMatch {
                expense,
                canonical_label,
                matched: Some(col.clone()),
                score: 1.0,
                explicit: true,
            });
            continue;
        }
        let (matched, score) = match best_match(&canonical_label, header) {
            Some((h, score)) if score >= threshold => (Some(h), score),
            Some((h, score)) => {
                warn!(
                    "resolve_columns: no column for {:?}: best candidate {:?} only scores {:.3}",
                    expense, h, score
                );
                (None, score)
            }
            None => {
                warn!("resolve_columns: no column for {:?}: empty header", expense);
                (None, 0.0)
            }
        };
        debug!(
            "resolve_columns: {:?} -> {:?} ({:.3})",
            expense, matched, score
        );
        matches.push(ColumnMatch {
            expense,
            canonical_label,
            matched,
            score,
            explicit: false,
        });
    }
    ColumnMapping { matches }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn similarity_bounds() {
        assert_eq!(similarity("lodging", "lodging"), 1.0);
        assert_eq!(similarity("abc", "xyz"), 0.0);
        assert!((similarity("abcd", "abxd") - 0.75).abs() < 1e-9);
    }

    #[test]
    fn reworded_headers_are_matched() {
        let header: Vec<String> = vec![
            "¿Reside en la ciudad de Cartagena de Indias?".to_string(),
            "¿Cuántos días estará en la ciudad de Cartagena? ".to_string(),
            "¿Cuánto está gastando diariamente en alojamiento? (Por persona)".to_string(),
            "Edad".to_string(),
        ];
        let mapping = resolve_columns(&header, &BTreeMap::new(), DEFAULT_MATCH_THRESHOLD);
        assert_eq!(mapping.column(Expense::StayNights), Some(header[1].as_str()));
        assert_eq!(mapping.column(Expense::Lodging), Some(header[2].as_str()));
        assert_eq!(mapping.column(Expense::Transport), None);
        let missing = mapping.missing();
        assert!(missing.contains(&Expense::Food));
        assert!(missing.contains(&Expense::EventSpend));
        // The rejected candidates still report their score.
        let food = mapping
            .matches
            .iter()
            .find(|m| m.expense == Expense::Food)
            .unwrap();
        assert!(food.score < DEFAULT_MATCH_THRESHOLD);
        assert!(!food.explicit);
    }

    #[test]
    fn explicit_columns_win() {
        let header = vec!["gasto hotel".to_string()];
        let mut explicit = BTreeMap::new();
        explicit.insert(Expense::Lodging, "gasto hotel".to_string());
        let mapping = resolve_columns(&header, &explicit, DEFAULT_MATCH_THRESHOLD);
        let m = mapping
            .matches
            .iter()
            .find(|m| m.expense == Expense::Lodging)
            .unwrap();
        assert!(m.explicit);
        assert_eq!(m.matched.as_deref(), Some("gasto hotel"));
        assert_eq!(mapping.matches.len(), Expense::ALL.len());
    }
}

//! Free-text search → OR-of-LIKE condition tree.
//!
//! Each term expands into casing, spelling and accent variants, matched with plain
//! `LIKE`. Lowering the tree to SQL lives in `apikit-db`.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{json, Value};

use crate::naming::capitalize;

/// Condition tree produced by [`compile_search`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchExpr {
    Or(Vec<SearchExpr>),
    Like { field: String, pattern: String },
}

impl SearchExpr {
    /// Number of `Like` leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            SearchExpr::Or(children) => children.iter().map(SearchExpr::leaf_count).sum(),
            SearchExpr::Like { .. } => 1,
        }
    }

    /// `Or([])` matches nothing on its own; callers treat it as "no filter".
    pub fn is_empty(&self) -> bool {
        self.leaf_count() == 0
    }

    /// Operator-keyed JSON form, e.g. `{"$or":[{"name":{"$like":"%x%"}}]}`.
    pub fn to_json(&self) -> Value {
        match self {
            SearchExpr::Or(children) => {
                json!({ "$or": children.iter().map(SearchExpr::to_json).collect::<Vec<_>>() })
            }
            SearchExpr::Like { field, pattern } => {
                let mut leaf = serde_json::Map::new();
                leaf.insert(field.clone(), json!({ "$like": pattern }));
                Value::Object(leaf)
            }
        }
    }
}

/// Word-level spelling fixes applied before pattern expansion (lower-case keys).
const SPELLING: &[(&str, &str)] = &[
    ("adress", "address"),
    ("calender", "calendar"),
    ("definately", "definitely"),
    ("enviroment", "environment"),
    ("goverment", "government"),
    ("occured", "occurred"),
    ("recieve", "receive"),
    ("seperate", "separate"),
    ("teh", "the"),
    ("untill", "until"),
    ("wich", "which"),
];

/// Diacritic → base letter.
#[rustfmt::skip]
const ACCENTS: &[(char, char)] = &[
    ('á', 'a'), ('à', 'a'), ('â', 'a'), ('ã', 'a'), ('ä', 'a'), ('å', 'a'),
    ('Á', 'A'), ('À', 'A'), ('Â', 'A'), ('Ã', 'A'), ('Ä', 'A'), ('Å', 'A'),
    ('ç', 'c'), ('Ç', 'C'),
    ('é', 'e'), ('è', 'e'), ('ê', 'e'), ('ë', 'e'),
    ('É', 'E'), ('È', 'E'), ('Ê', 'E'), ('Ë', 'E'),
    ('í', 'i'), ('ì', 'i'), ('î', 'i'), ('ï', 'i'),
    ('Í', 'I'), ('Ì', 'I'), ('Î', 'I'), ('Ï', 'I'),
    ('ñ', 'n'), ('Ñ', 'N'),
    ('ó', 'o'), ('ò', 'o'), ('ô', 'o'), ('õ', 'o'), ('ö', 'o'),
    ('Ó', 'O'), ('Ò', 'O'), ('Ô', 'O'), ('Õ', 'O'), ('Ö', 'O'),
    ('ú', 'u'), ('ù', 'u'), ('û', 'u'), ('ü', 'u'),
    ('Ú', 'U'), ('Ù', 'U'), ('Û', 'U'), ('Ü', 'U'),
    ('ý', 'y'), ('ÿ', 'y'), ('Ý', 'Y'),
];

/// Compile `term` into `Or([Like{field, pattern}, ...])` over `fields`.
///
/// Leaves are ordered pattern-major: every field for the first pattern, then every
/// field for the second, and so on.
pub fn compile_search<S: AsRef<str>>(fields: &[S], term: &str) -> SearchExpr {
    let patterns = search_patterns(term);
    let leaves = patterns
        .iter()
        .flat_map(|pattern| {
            fields.iter().map(move |field| SearchExpr::Like {
                field: field.as_ref().to_string(),
                pattern: pattern.clone(),
            })
        })
        .collect();
    SearchExpr::Or(leaves)
}

/// The deduplicated `%...%` patterns [`compile_search`] pairs with every field.
pub fn search_patterns(term: &str) -> Vec<String> {
    let original = term.trim();
    let mut acc = PatternSet::default();
    if original.is_empty() {
        return acc.patterns;
    }

    acc.expand(original);

    let corrected = spell_correct(original);
    if corrected != original {
        acc.expand(&corrected);
    }

    let folded = fold_accents(original);
    if folded != original && folded != corrected {
        acc.expand(&folded);
    }

    acc.patterns
}

#[derive(Default)]
struct PatternSet {
    patterns: Vec<String>,
    seen: HashSet<String>,
}

impl PatternSet {
    fn expand(&mut self, phrase: &str) {
        self.push_variants(phrase);
        let words: Vec<&str> = phrase.split_whitespace().collect();
        if words.len() > 1 {
            for word in words {
                self.push_variants(word);
            }
        }
    }

    fn push_variants(&mut self, text: &str) {
        for variant in [
            text.to_string(),
            text.to_lowercase(),
            text.to_uppercase(),
            capitalize(text),
        ] {
            let pattern = like_contains(&variant);
            if self.seen.insert(pattern.clone()) {
                self.patterns.push(pattern);
            }
        }
    }
}

/// Replace misspelled words using the static table; untouched words keep their casing.
pub fn spell_correct(phrase: &str) -> String {
    let mut changed = false;
    let words: Vec<&str> = phrase
        .split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            match SPELLING.iter().find(|(wrong, _)| *wrong == lower) {
                Some((_, right)) => {
                    changed = true;
                    *right
                }
                None => word,
            }
        })
        .collect();
    if changed {
        words.join(" ")
    } else {
        phrase.to_string()
    }
}

pub fn fold_accents(text: &str) -> String {
    text.chars()
        .map(|c| {
            ACCENTS
                .iter()
                .find(|(accented, _)| *accented == c)
                .map_or(c, |(_, plain)| *plain)
        })
        .collect()
}

/// Escape `LIKE` metacharacters with `\`.
pub fn like_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn like_contains(s: &str) -> String {
    format!("%{}%", like_escape(s))
}

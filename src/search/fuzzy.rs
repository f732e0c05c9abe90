//! Approximate string similarity used when exact matching fails
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TOKEN: Regex = Regex::new(r"[\p{L}\p{N}]+(?:\.[\p{N}]+)*").expect("token pattern");
}

/// Result of a fuzzy comparison: the similarity in [0,1] and the fragment of
/// the field that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch<'a> {
    pub similarity: f64,
    pub fragment: &'a str,
    pub start: usize,
}

pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    if s1_chars.is_empty() {
        return s2_chars.len();
    }
    if s2_chars.is_empty() {
        return s1_chars.len();
    }

    let mut previous: Vec<usize> = (0..=s2_chars.len()).collect();
    let mut current = vec![0; s2_chars.len() + 1];

    for (i, c1) in s1_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, c2) in s2_chars.iter().enumerate() {
            let cost = usize::from(c1 != c2);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[s2_chars.len()]
}

/// Levenshtein distance normalized to a similarity in [0,1], case-insensitive.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein_distance(&a, &b) as f64 / longest as f64
}

/// Splits text into alphanumeric tokens; version numbers like `3.5` stay whole.
pub fn tokens(text: &str) -> impl Iterator<Item = (usize, &str)> {
    TOKEN.find_iter(text).map(|m| (m.start(), m.as_str()))
}

/// Best approximate match of `query` within `field`.
///
/// Compares the whole field and, token by token, each query token against
/// its closest field token; the token score is the mean over query tokens.
/// Returns `None` for empty input.
pub fn best_match<'a>(field: &'a str, query: &str) -> Option<FuzzyMatch<'a>> {
    if field.trim().is_empty() || query.trim().is_empty() {
        return None;
    }

    let whole = FuzzyMatch {
        similarity: similarity(field.trim(), query.trim()),
        fragment: field.trim(),
        start: field.len() - field.trim_start().len(),
    };

    let field_tokens: Vec<(usize, &str)> = tokens(field).collect();
    let query_tokens: Vec<&str> = tokens(query).map(|(_, t)| t).collect();
    if field_tokens.is_empty() || query_tokens.is_empty() {
        return Some(whole);
    }

    let mut total = 0.0;
    let mut strongest: Option<(f64, usize, &str)> = None;
    for query_token in &query_tokens {
        let mut best: Option<(f64, usize, &str)> = None;
        for (start, field_token) in &field_tokens {
            let score = similarity(field_token, query_token);
            if best.map_or(true, |(current, _, _)| score > current) {
                best = Some((score, *start, *field_token));
            }
        }
        if let Some(best) = best {
            total += best.0;
            if strongest.map_or(true, |(current, _, _)| best.0 > current) {
                strongest = Some(best);
            }
        }
    }

    let token_similarity = total / query_tokens.len() as f64;
    match strongest {
        Some((_, start, fragment)) if token_similarity > whole.similarity => Some(FuzzyMatch {
            similarity: token_similarity,
            fragment,
            start,
        }),
        _ => Some(whole),
    }
}

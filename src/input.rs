//! Word-frequency ingestion and mask loading.
//!
//! Two input shapes are accepted: an explicit `word<TAB>count` list (one
//! pair per line), or free text that gets tokenized and counted here.

use crate::engine::Rect;
use crate::words::WordStore;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{Alphabetic}][\p{Alphabetic}'\-]*").unwrap());

/// Count word frequencies in free text. Tokens are lowercased; tokens
/// shorter than `min_length` are skipped. Ties sort alphabetically so the
/// output is stable. At most `max_words` pairs are returned, highest counts
/// first.
pub fn count_words(text: &str, min_length: usize, max_words: usize) -> Vec<(String, u32)> {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for token in WORD_RE.find_iter(text) {
        let word = token.as_str().to_lowercase();
        if word.chars().count() < min_length {
            continue;
        }
        *counts.entry(word).or_insert(0) += 1;
    }
    let mut pairs: Vec<(String, u32)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    pairs.truncate(max_words);
    pairs
}

/// Parse `word<TAB>count` lines. Returns `None` unless every non-empty line
/// matches; a `None` means the input was not an explicit list and should be
/// counted as free text instead.
pub fn parse_word_list(text: &str) -> Option<Vec<(String, u32)>> {
    let mut pairs = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (word, count) = line.split_once('\t')?;
        let word = word.trim();
        let count: u32 = count.trim().parse().ok()?;
        if word.is_empty() {
            return None;
        }
        pairs.push((word.to_string(), count));
    }
    if pairs.is_empty() { None } else { Some(pairs) }
}

/// Explicit list when the input parses as one, frequency counting otherwise.
pub fn load_words(text: &str, min_length: usize, max_words: usize) -> Vec<(String, u32)> {
    match parse_word_list(text) {
        Some(mut pairs) => {
            pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            pairs.truncate(max_words);
            pairs
        }
        None => count_words(text, min_length, max_words),
    }
}

/// Build a store from (word, count) pairs, sorted by descending count with
/// ingestion-order color indices.
pub fn build_store(pairs: &[(String, u32)]) -> WordStore {
    let mut store = WordStore::with_capacity(pairs.len());
    for (index, (word, count)) in pairs.iter().enumerate() {
        store.push(word.clone(), *count, index as u16);
    }
    store.sort_by_count();
    store
}

/// Exclusion rects from a JSON array of `{top, left, right, bottom}`.
pub fn parse_mask(json: &str) -> anyhow::Result<Vec<Rect>> {
    let rects: Vec<Rect> = serde_json::from_str(json)?;
    for rect in &rects {
        if rect.top < rect.bottom || rect.right < rect.left {
            anyhow::bail!(
                "mask rect has inverted edges: top={} bottom={} left={} right={}",
                rect.top,
                rect.bottom,
                rect.left,
                rect.right
            );
        }
    }
    Ok(rects)
}

pub fn load_mask(path: &Path) -> anyhow::Result<Vec<Rect>> {
    let contents = std::fs::read_to_string(path)?;
    parse_mask(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_ranks_free_text() {
        let pairs = count_words("the cat and the dog and the bird", 2, 10);
        assert_eq!(pairs[0], ("the".to_string(), 3));
        assert_eq!(pairs[1], ("and".to_string(), 2));
        // Singles tie, resolved alphabetically.
        assert_eq!(pairs[2].0, "bird");
    }

    #[test]
    fn min_length_filters_short_tokens() {
        let pairs = count_words("a bb ccc", 3, 10);
        assert_eq!(pairs, vec![("ccc".to_string(), 1)]);
    }

    #[test]
    fn apostrophes_and_hyphens_stay_inside_words() {
        let pairs = count_words("don't don't well-known", 2, 10);
        assert_eq!(pairs[0], ("don't".to_string(), 2));
        assert_eq!(pairs[1], ("well-known".to_string(), 1));
    }

    #[test]
    fn max_words_truncates_the_tail() {
        let pairs = count_words("aa aa bb bb cc dd", 2, 2);
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn tab_separated_list_is_taken_verbatim() {
        let pairs = load_words("rust\t42\nwordcloud\t7\n", 2, 10);
        assert_eq!(pairs[0], ("rust".to_string(), 42));
        assert_eq!(pairs[1], ("wordcloud".to_string(), 7));
    }

    #[test]
    fn malformed_list_falls_back_to_counting() {
        let pairs = load_words("rust\t42\nnot a list line\n", 2, 10);
        assert!(pairs.iter().any(|(w, _)| w == "rust"));
        assert!(pairs.iter().any(|(w, _)| w == "line"));
    }

    #[test]
    fn build_store_sorts_descending() {
        let pairs = vec![
            ("small".to_string(), 1),
            ("big".to_string(), 10),
            ("mid".to_string(), 5),
        ];
        let store = build_store(&pairs);
        assert_eq!(store.word(0), "big");
        assert_eq!(store.word(1), "mid");
        assert_eq!(store.word(2), "small");
    }

    #[test]
    fn mask_rects_parse_and_validate() {
        let rects =
            parse_mask(r#"[{"top": 350, "left": 200, "right": 600, "bottom": 250}]"#).unwrap();
        assert_eq!(rects.len(), 1);
        assert_eq!(rects[0].top, 350.0);
        assert!(parse_mask(r#"[{"top": 10, "left": 0, "right": 5, "bottom": 20}]"#).is_err());
    }
}

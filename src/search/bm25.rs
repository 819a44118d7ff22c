//! Okapi BM25 lexical scoring over whitespace-tokenized, lowercased
//! documents (`spec.md` §4.C, GLOSSARY).

/// Term frequency saturation constant.
const K1: f32 = 1.5;
/// Length normalization constant.
const B: f32 = 0.75;

/// Lowercases and splits on whitespace.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase().split_whitespace().map(str::to_string).collect()
}

/// Scores each document in `docs` (already tokenized) against
/// `query_tokens` using Okapi BM25.
#[must_use]
pub fn score_all(query_tokens: &[String], docs: &[Vec<String>]) -> Vec<f32> {
    let n = docs.len();
    if n == 0 {
        return Vec::new();
    }
    let avgdl: f32 = docs.iter().map(|d| d.len() as f32).sum::<f32>() / n as f32;

    let mut doc_freq: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for term in query_tokens {
        let df = docs
            .iter()
            .filter(|d| d.iter().any(|t| t == term))
            .count();
        doc_freq.insert(term.as_str(), df);
    }

    docs.iter()
        .map(|doc| {
            let dl = doc.len() as f32;
            query_tokens
                .iter()
                .map(|term| {
                    let df = *doc_freq.get(term.as_str()).unwrap_or(&0);
                    if df == 0 {
                        return 0.0;
                    }
                    let idf = ((n as f32 - df as f32 + 0.5) / (df as f32 + 0.5) + 1.0).ln();
                    let tf = doc.iter().filter(|t| *t == term).count() as f32;
                    idf * (tf * (K1 + 1.0)) / (tf + K1 * (1.0 - B + B * dl / avgdl.max(1.0)))
                })
                .sum()
        })
        .collect()
}

/// Ranks document indices by descending score, breaking ties by lower
/// index, and returns the top `n`.
#[must_use]
pub fn top_n_by_score(scores: &[f32], n: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });
    indices.into_iter().take(n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_splits_on_whitespace() {
        assert_eq!(
            tokenize("Hello   World\tFoo"),
            vec!["hello", "world", "foo"]
        );
    }

    #[test]
    fn documents_with_no_matching_terms_score_zero() {
        let docs = vec![tokenize("completely unrelated text")];
        let scores = score_all(&tokenize("query terms"), &docs);
        assert_eq!(scores, vec![0.0]);
    }

    #[test]
    fn document_with_more_query_term_occurrences_scores_higher() {
        let docs = vec![
            tokenize("cat cat cat dog"),
            tokenize("cat dog dog dog dog dog"),
        ];
        let scores = score_all(&tokenize("cat"), &docs);
        assert!(scores[0] > scores[1]);
    }

    #[test]
    fn empty_corpus_scores_empty() {
        assert!(score_all(&tokenize("q"), &[]).is_empty());
    }

    #[test]
    fn top_n_breaks_ties_by_lower_index() {
        let scores = vec![1.0, 1.0, 0.5];
        assert_eq!(top_n_by_score(&scores, 2), vec![0, 1]);
    }
}

//! Fuzzy string similarity
//!
//! Gestalt pattern matching (Ratcliff/Obershelp): find the longest common
//! block, recurse on both sides of it, and score `2 * matched / total`.

/// Case-insensitive similarity in 0.0-1.0
///
/// Both inputs are lowercased and trimmed. An empty input on either side
/// scores 0.0. The block search is order dependent, so the larger of the
/// two orderings is returned to keep the score symmetric.
pub fn fuzzy_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.trim().to_lowercase().chars().collect();
    let b: Vec<char> = b.trim().to_lowercase().chars().collect();

    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    ratio(&a, &b).max(ratio(&b, &a))
}

fn ratio(a: &[char], b: &[char]) -> f64 {
    let matched = matching_chars(a, b);
    2.0 * matched as f64 / (a.len() + b.len()) as f64
}

/// Total length of the matching blocks between `a` and `b`
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }

    matched
}

/// Longest common block in `a[alo..ahi]` and `b[blo..bhi]`
///
/// Ties go to the block starting earliest in `a`, then earliest in `b`.
/// Returns `(start_a, start_b, length)`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);

    // run[j - blo] = length of the common suffix ending at a[i], b[j]
    let mut prev = vec![0usize; bhi - blo];
    let mut run = vec![0usize; bhi - blo];

    for i in alo..ahi {
        for j in blo..bhi {
            let offset = j - blo;
            run[offset] = if a[i] == b[j] {
                if offset == 0 {
                    1
                } else {
                    prev[offset - 1] + 1
                }
            } else {
                0
            };

            if run[offset] > best_k {
                best_k = run[offset];
                best_i = i + 1 - best_k;
                best_j = j + 1 - best_k;
            }
        }
        std::mem::swap(&mut prev, &mut run);
    }

    (best_i, best_j, best_k)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings() {
        assert_eq!(fuzzy_similarity("Bohemian Rhapsody", "Bohemian Rhapsody"), 1.0);
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        assert_eq!(fuzzy_similarity("ABC", "abc"), 1.0);
        assert_eq!(fuzzy_similarity("  Queen ", "queen"), 1.0);
    }

    #[test]
    fn test_empty_scores_zero() {
        assert_eq!(fuzzy_similarity("", ""), 0.0);
        assert_eq!(fuzzy_similarity("abc", ""), 0.0);
        assert_eq!(fuzzy_similarity("   ", "abc"), 0.0);
    }

    #[test]
    fn test_known_ratios() {
        // Single block "bcd": 2 * 3 / 8
        assert!((fuzzy_similarity("abcd", "bcde") - 0.75).abs() < 1e-9);
        assert_eq!(fuzzy_similarity("abc", "xyz"), 0.0);
        // Blocks "the " and "at": 2 * 6 / 14
        assert!((fuzzy_similarity("the cat", "the hat") - 12.0 / 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_symmetric() {
        let pairs = [
            ("Bohemian Rhapsody", "Bohemian Rhapsody (Remastered 2011)"),
            ("Queen", "Queen & David Bowie"),
            ("tide", "diet"),
            ("abcabc", "cbacba"),
        ];
        for (a, b) in pairs {
            assert_eq!(fuzzy_similarity(a, b), fuzzy_similarity(b, a), "{} / {}", a, b);
        }
    }

    #[test]
    fn test_partial_match_between_bounds() {
        let score = fuzzy_similarity("Bohemian Rhapsody", "Bohemian Rhapsody - Remastered");
        assert!(score > 0.5 && score < 1.0);
    }
}

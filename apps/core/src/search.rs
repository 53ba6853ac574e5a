use crate::model::FileRecord;

const MATCH_BASE: i64 = 5_000;
const CHAR_BONUS: i64 = 30;
const ADJACENT_BONUS: i64 = 45;
const BOUNDARY_BONUS: i64 = 25;
const GAP_PENALTY: i64 = 6;

/// Ranks candidates by fuzzy match on their name, best first.
///
/// Candidates without a subsequence match are dropped. Equal scores keep
/// candidate order. An empty query keeps every candidate in order.
pub fn rank(candidates: &[FileRecord], query: &str) -> Vec<FileRecord> {
    let needle = normalize_query(query);

    let mut scored: Vec<(i64, usize, &FileRecord)> = candidates
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            score_name(&record.name, &needle).map(|score| (score, index, record))
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    scored
        .into_iter()
        .map(|(_, _, record)| record.clone())
        .collect()
}

pub fn normalize_query(query: &str) -> Vec<char> {
    query
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Lowercased characters of `name`, each paired with the index of the
/// source character it came from.
fn fold_case(name: &str) -> (Vec<char>, Vec<usize>) {
    let mut folded = Vec::with_capacity(name.len());
    let mut sources = Vec::with_capacity(name.len());
    for (index, ch) in name.chars().enumerate() {
        for lower in ch.to_lowercase() {
            folded.push(lower);
            sources.push(index);
        }
    }
    (folded, sources)
}

/// Best score over every start position of the first query character.
pub fn score_name(name: &str, needle: &[char]) -> Option<i64> {
    if needle.is_empty() {
        return Some(0);
    }

    let (haystack, _) = fold_case(name);
    haystack
        .iter()
        .enumerate()
        .filter(|(_, c)| **c == needle[0])
        .filter_map(|(start, _)| {
            let positions = subsequence_positions(&haystack, needle, start)?;
            Some(score_positions(&haystack, &positions))
        })
        .max()
}

/// Char indices into `name` of the best match, for highlighting.
pub fn match_positions(name: &str, query: &str) -> Vec<usize> {
    let needle = normalize_query(query);
    if needle.is_empty() {
        return Vec::new();
    }

    let (haystack, sources) = fold_case(name);
    let mut best: Option<(i64, Vec<usize>)> = None;
    for start in 0..haystack.len() {
        if haystack[start] != needle[0] {
            continue;
        }
        let Some(positions) = subsequence_positions(&haystack, &needle, start) else {
            continue;
        };
        let score = score_positions(&haystack, &positions);
        if best.as_ref().map_or(true, |(top, _)| score > *top) {
            best = Some((score, positions));
        }
    }

    let mut highlighted: Vec<usize> = best
        .map(|(_, positions)| positions)
        .unwrap_or_default()
        .into_iter()
        .map(|position| sources[position])
        .collect();
    highlighted.dedup();
    highlighted
}

fn subsequence_positions(haystack: &[char], needle: &[char], start: usize) -> Option<Vec<usize>> {
    let mut positions = Vec::with_capacity(needle.len());
    let mut next = start;

    for needle_char in needle {
        let offset = haystack[next..].iter().position(|c| c == needle_char)?;
        positions.push(next + offset);
        next += offset + 1;
    }

    Some(positions)
}

fn score_positions(haystack: &[char], positions: &[usize]) -> i64 {
    let start_penalty = positions[0] as i64;
    let adjacent_pairs = positions
        .windows(2)
        .filter(|pair| pair[1] == pair[0] + 1)
        .count() as i64;
    let gap_penalty: i64 = positions
        .windows(2)
        .map(|pair| (pair[1] - pair[0] - 1) as i64)
        .sum();
    let boundary_hits = positions
        .iter()
        .filter(|&&position| position == 0 || !haystack[position - 1].is_alphanumeric())
        .count() as i64;

    MATCH_BASE + (positions.len() as i64) * CHAR_BONUS + adjacent_pairs * ADJACENT_BONUS
        + boundary_hits * BOUNDARY_BONUS
        - gap_penalty * GAP_PENALTY
        - start_penalty
}

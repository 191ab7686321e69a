//! Answer normalization and the fuzzy similarity check behind verdicts.

/// Fixed substitution table folding diacritics to plain ASCII before
/// comparison. Polish letters matter most for the question corpus; a few
/// common western-European ones are folded too so loanwords compare cleanly.
const DIACRITICS: &[(char, &str)] = &[
    ('ą', "a"),
    ('ć', "c"),
    ('ę', "e"),
    ('ł', "l"),
    ('ń', "n"),
    ('ó', "o"),
    ('ś', "s"),
    ('ź', "z"),
    ('ż', "z"),
    ('à', "a"),
    ('á', "a"),
    ('â', "a"),
    ('ä', "a"),
    ('ç', "c"),
    ('è', "e"),
    ('é', "e"),
    ('ê', "e"),
    ('ë', "e"),
    ('î', "i"),
    ('ï', "i"),
    ('í', "i"),
    ('ô', "o"),
    ('ö', "o"),
    ('ò', "o"),
    ('ù', "u"),
    ('û', "u"),
    ('ü', "u"),
    ('ú', "u"),
    ('ý', "y"),
    ('ß', "ss"),
];

/// Lower-case the input, strip diacritics via the fixed table, and collapse
/// runs of whitespace to single spaces.
pub fn normalize(input: &str) -> String {
    let mut folded = String::with_capacity(input.len());
    for c in input.to_lowercase().chars() {
        match DIACRITICS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => folded.push_str(to),
            None => folded.push(c),
        }
    }

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Similarity ratio between two already-raw strings after normalization.
///
/// Normalized Levenshtein distance, in `0.0..=1.0`; two empty strings
/// compare as identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&normalize(a), &normalize(b))
}

/// Whether a submitted answer counts as correct against the canonical one.
pub fn matches(submitted: &str, canonical: &str, threshold: f64) -> bool {
    similarity(submitted, canonical) >= threshold
}

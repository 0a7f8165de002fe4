//! Tokenizers shared by the indexes.
//!
//! The lexical index wants normalised terms so that "Password?" and
//! "password" collide. The semantic index trains on raw whitespace-separated
//! words, and queries must be split the same way or they miss the vocabulary.

/// Lowercased alphanumeric runs of at least two characters.
pub fn lexical_terms(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

/// Whitespace-separated words, case and punctuation preserved.
pub fn whitespace_tokens(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

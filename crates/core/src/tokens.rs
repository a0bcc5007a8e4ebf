//! Rough input-size estimates for language-model requests.

/// Tokens assumed per non-whitespace character.
///
/// Hangul syllables usually tokenize to more than one token each, so the
/// factor sits above 1. This is a cost hint, not a tokenizer.
pub const TOKENS_PER_CHAR: f64 = 1.5;

/// Estimate the number of tokens `text` will consume.
pub fn estimate_tokens(text: &str) -> f64 {
    let chars = text.chars().filter(|c| !c.is_whitespace()).count();
    chars as f64 * TOKENS_PER_CHAR
}

/// Length of `text` in characters, the unit used for suggestion positions.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

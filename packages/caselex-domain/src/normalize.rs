use std::collections::HashSet;

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Function words that never count as search terms.
pub const STOP_WORDS: &[&str] = &[
	"a", "al", "ante", "con", "de", "del", "e", "el", "en", "entre", "la", "las", "lo", "los",
	"no", "o", "para", "por", "que", "se", "sin", "sobre", "su", "sus", "u", "un", "una", "y",
];

const MIN_TOKEN_CHARS: usize = 2;

/// Folds accents, case, decorative quotes, and punctuation so that equal words compare equal.
///
/// Applied identically to queries, titles, and organ names. Letters and digits survive, quote
/// marks are dropped, every other character becomes a separator, and runs of separators collapse
/// into one space.
pub fn normalize_text(input: &str) -> String {
	let mut folded = String::with_capacity(input.len());

	for ch in input.nfd() {
		if is_combining_mark(ch) || is_decorative_quote(ch) {
			continue;
		}

		if ch.is_alphanumeric() {
			folded.extend(ch.to_lowercase());
		} else {
			folded.push(' ');
		}
	}

	folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Search terms of an already normalized text, in first-seen order without duplicates.
pub fn content_tokens(normalized: &str) -> Vec<String> {
	let mut out = Vec::new();
	let mut seen = HashSet::new();

	for token in normalized.split_whitespace() {
		if token.chars().count() < MIN_TOKEN_CHARS || STOP_WORDS.contains(&token) {
			continue;
		}
		if seen.insert(token) {
			out.push(token.to_string());
		}
	}

	out
}

/// Word-aligned containment of a normalized phrase in a normalized text.
pub fn contains_phrase(normalized_text: &str, normalized_phrase: &str) -> bool {
	if normalized_phrase.is_empty() {
		return false;
	}

	format!(" {normalized_text} ").contains(&format!(" {normalized_phrase} "))
}

fn is_decorative_quote(ch: char) -> bool {
	matches!(
		ch,
		'\'' | '"' | '`' | '\u{00B4}' // acute accent used as apostrophe
			| '\u{00AB}' | '\u{00BB}' // guillemets
			| '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}'
			| '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}'
			| '\u{2039}' | '\u{203A}'
	)
}

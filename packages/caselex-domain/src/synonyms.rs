use std::collections::{BTreeMap, HashSet};

use crate::normalize::{contains_phrase, content_tokens, normalize_text};

const BUILTIN_SYNONYMS: &[(&str, &[&str])] = &[
	(
		"fuera de ordenacion",
		&["situacion de fuera de ordenacion", "no ajustado a ordenacion", "edificacion disconforme"],
	),
	("volumen disconforme", &["edificacion disconforme", "exceso de volumen"]),
	(
		"suelo no urbanizable",
		&["suelo rustico", "suelos protegidos", "suelo no apto para urbanizar"],
	),
	("garaje ilegal", &["aparcamiento ilegal", "cochera sin licencia"]),
	("ordenacion", &["planeamiento", "planeacion", "ordenacion urbanistica"]),
];

/// Generic hints offered when no synonym entry applies to an empty result set.
pub const GENERIC_SUGGESTIONS: &[&str] = &["broaden your terms", "adjust the date range"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SynonymEntry {
	pub phrase: String,
	pub synonyms: Vec<String>,
}

/// Synonym phrases that apply to one query, and the extra search terms they contribute.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Expansion {
	/// Entries whose phrase occurs in the query, in table order.
	pub entries: Vec<SynonymEntry>,
	/// Terms contributed by the synonyms that the query did not already contain.
	pub tokens: Vec<String>,
}
impl Expansion {
	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}

	/// Every synonym phrase that contributed to the expansion.
	pub fn phrases(&self) -> Vec<&str> {
		let mut seen = HashSet::new();

		self.entries
			.iter()
			.flat_map(|entry| entry.synonyms.iter())
			.filter(|phrase| seen.insert(phrase.as_str()))
			.map(String::as_str)
			.collect()
	}
}

/// Ordered phrase to synonyms table. Phrases and synonyms are stored normalized.
#[derive(Clone, Debug)]
pub struct SynonymTable {
	entries: Vec<SynonymEntry>,
}
impl SynonymTable {
	pub fn new<I, S>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (S, Vec<S>)>,
		S: AsRef<str>,
	{
		let mut entries = Vec::new();

		for (phrase, synonyms) in pairs {
			let phrase = normalize_text(phrase.as_ref());
			let synonyms: Vec<String> = synonyms
				.iter()
				.map(|synonym| normalize_text(synonym.as_ref()))
				.filter(|synonym| !synonym.is_empty() && *synonym != phrase)
				.collect();

			if phrase.is_empty() || synonyms.is_empty() {
				continue;
			}

			entries.push(SynonymEntry { phrase, synonyms });
		}

		Self { entries }
	}

	pub fn builtin() -> Self {
		Self::new(
			BUILTIN_SYNONYMS
				.iter()
				.map(|(phrase, synonyms)| (*phrase, synonyms.to_vec())),
		)
	}

	pub fn from_config(synonyms: Option<&BTreeMap<String, Vec<String>>>) -> Self {
		match synonyms {
			Some(table) => Self::new(table.iter().map(|(phrase, values)| {
				(phrase.as_str(), values.iter().map(String::as_str).collect())
			})),
			None => Self::builtin(),
		}
	}

	pub fn entries(&self) -> &[SynonymEntry] {
		&self.entries
	}

	/// Entries whose phrase occurs, word-aligned, in the normalized query.
	pub fn matching(&self, normalized_query: &str) -> Vec<&SynonymEntry> {
		self.entries.iter().filter(|entry| contains_phrase(normalized_query, &entry.phrase)).collect()
	}

	/// Broadens `query_tokens` with the terms of every applicable synonym.
	pub fn expand(&self, normalized_query: &str, query_tokens: &[String]) -> Expansion {
		let entries: Vec<SynonymEntry> =
			self.matching(normalized_query).into_iter().cloned().collect();
		let mut seen: HashSet<String> = query_tokens.iter().cloned().collect();
		let mut tokens = Vec::new();

		for synonym in entries.iter().flat_map(|entry| entry.synonyms.iter()) {
			for token in content_tokens(synonym) {
				if seen.insert(token.clone()) {
					tokens.push(token);
				}
			}
		}

		Expansion { entries, tokens }
	}

	/// Up to `max` alternative phrasings for a query that found nothing.
	pub fn suggestions(&self, normalized_query: &str, max: usize) -> Vec<String> {
		let mut out: Vec<String> = Vec::new();

		for entry in self.matching(normalized_query) {
			for synonym in entry.synonyms.iter().take(3) {
				if !out.contains(synonym) {
					out.push(synonym.clone());
				}
			}
		}

		if out.is_empty() {
			out = GENERIC_SUGGESTIONS.iter().map(|hint| hint.to_string()).collect();
		}

		out.truncate(max);

		out
	}
}
impl Default for SynonymTable {
	fn default() -> Self {
		Self::builtin()
	}
}

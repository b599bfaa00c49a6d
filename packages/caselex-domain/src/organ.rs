use std::collections::{BTreeMap, HashMap};

use crate::normalize::{contains_phrase, normalize_text};

const BUILTIN_ALIASES: &[(&str, &str)] = &[
	("ts", "Tribunal Supremo (TS)"),
	("supremo", "Tribunal Supremo (TS)"),
	("tribunal supremo", "Tribunal Supremo (TS)"),
	("tsjc", "Tribunal Superior de Justicia de Cataluña (TSJC)"),
	("tsj cataluna", "Tribunal Superior de Justicia de Cataluña (TSJC)"),
	("tsj de cataluna", "Tribunal Superior de Justicia de Cataluña (TSJC)"),
	("tribunal superior de justicia de cataluna", "Tribunal Superior de Justicia de Cataluña (TSJC)"),
	("tsjm", "Tribunal Superior de Justicia de Madrid (TSJM)"),
	("tsj madrid", "Tribunal Superior de Justicia de Madrid (TSJM)"),
	("tsj de madrid", "Tribunal Superior de Justicia de Madrid (TSJM)"),
	("tribunal superior de justicia de madrid", "Tribunal Superior de Justicia de Madrid (TSJM)"),
	("tsja", "Tribunal Superior de Justicia de Andalucía (TSJA)"),
	("tsj andalucia", "Tribunal Superior de Justicia de Andalucía (TSJA)"),
	("tsj de andalucia", "Tribunal Superior de Justicia de Andalucía (TSJA)"),
	("an", "Audiencia Nacional (AN)"),
	("audiencia nacional", "Audiencia Nacional (AN)"),
	("tc", "Tribunal Constitucional (TC)"),
	("constitucional", "Tribunal Constitucional (TC)"),
	("tribunal constitucional", "Tribunal Constitucional (TC)"),
];

const BUILTIN_CLASSES: &[(&str, &str)] = &[
	("tsj", "tribunal superior de justicia"),
	("tribunales superiores", "tribunal superior de justicia"),
	("ap", "audiencia provincial"),
	("audiencias provinciales", "audiencia provincial"),
	("juzgado", "juzgado"),
	("juzgados", "juzgado"),
];

/// How a textual organ filter is applied to case organs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrganFilter {
	/// A recognized organ. Matches the canonical label exactly after normalization.
	Exact { input: String, label: String, key: String },
	/// A broad class token. Matches every organ whose name contains the fragment.
	Class { input: String, fragment: String },
	/// Unrecognized input, kept as-is and matched as a phrase inside organ names.
	Text { input: String, fragment: String },
}
impl OrganFilter {
	pub fn matches(&self, normalized_organ: &str) -> bool {
		match self {
			Self::Exact { key, .. } => normalized_organ == key,
			Self::Class { fragment, .. } | Self::Text { fragment, .. } =>
				contains_phrase(normalized_organ, fragment),
		}
	}

	pub fn input(&self) -> &str {
		match self {
			Self::Exact { input, .. } | Self::Class { input, .. } | Self::Text { input, .. } =>
				input,
		}
	}

	/// Label echoed back to callers as the effective filter.
	pub fn label(&self) -> &str {
		match self {
			Self::Exact { label, .. } => label,
			Self::Class { fragment, .. } | Self::Text { fragment, .. } => fragment,
		}
	}

	/// Whether resolution changed what the caller typed.
	pub fn was_normalized(&self) -> bool {
		match self {
			Self::Exact { input, label, .. } => input.trim() != label,
			Self::Class { .. } => true,
			Self::Text { .. } => false,
		}
	}
}

/// Static organ alias and class tables, keyed by normalized text.
#[derive(Clone, Debug)]
pub struct OrganDirectory {
	aliases: HashMap<String, String>,
	classes: HashMap<String, String>,
}
impl OrganDirectory {
	pub fn new<A, C>(aliases: A, classes: C) -> Self
	where
		A: IntoIterator<Item = (String, String)>,
		C: IntoIterator<Item = (String, String)>,
	{
		let mut alias_map = HashMap::new();

		for (alias, label) in aliases {
			let label = label.trim().to_string();

			alias_map.insert(normalize_text(&label), label.clone());
			alias_map.insert(normalize_text(&alias), label);
		}

		let classes = classes
			.into_iter()
			.map(|(token, fragment)| (normalize_text(&token), normalize_text(&fragment)))
			.filter(|(token, fragment)| !token.is_empty() && !fragment.is_empty())
			.collect();

		alias_map.remove("");

		Self { aliases: alias_map, classes }
	}

	pub fn builtin() -> Self {
		Self::new(builtin_aliases(), builtin_classes())
	}

	/// Configured tables replace the matching built-in table; an absent table keeps the
	/// built-in one.
	pub fn from_config(organs: &caselex_config::Organs) -> Self {
		let aliases = organs.aliases.clone().unwrap_or_else(builtin_aliases);
		let classes = organs.classes.clone().unwrap_or_else(builtin_classes);

		Self::new(aliases, classes)
	}

	/// Resolves a caller-supplied organ. Blank input means no filter.
	pub fn resolve(&self, raw: &str) -> Option<OrganFilter> {
		let normalized = normalize_text(raw);

		if normalized.is_empty() {
			return None;
		}

		let input = raw.trim().to_string();

		if let Some(label) = self.aliases.get(&normalized) {
			return Some(OrganFilter::Exact {
				input,
				label: label.clone(),
				key: normalize_text(label),
			});
		}
		if let Some(fragment) = self.classes.get(&normalized) {
			return Some(OrganFilter::Class { input, fragment: fragment.clone() });
		}

		Some(OrganFilter::Text { input, fragment: normalized })
	}
}
impl Default for OrganDirectory {
	fn default() -> Self {
		Self::builtin()
	}
}

fn builtin_aliases() -> BTreeMap<String, String> {
	BUILTIN_ALIASES.iter().map(|(alias, label)| (alias.to_string(), label.to_string())).collect()
}

fn builtin_classes() -> BTreeMap<String, String> {
	BUILTIN_CLASSES.iter().map(|(token, fragment)| (token.to_string(), fragment.to_string())).collect()
}

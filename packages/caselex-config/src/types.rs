use std::{collections::BTreeMap, path::PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	#[serde(default)]
	pub corpus: Corpus,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub ranking: Ranking,
	#[serde(default)]
	pub links: Links,
	/// Optional. Replaces the built-in phrase to synonyms table when present.
	pub synonyms: Option<BTreeMap<String, Vec<String>>>,
	#[serde(default)]
	pub organs: Organs,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Corpus {
	/// JSON array of case records. The bundled seed corpus is used when unset.
	pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	pub min_query_chars: u32,
	pub default_limit: u32,
	pub max_limit: u32,
	/// Either "date_first" or "organ_first".
	pub filter_relax_order: String,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			min_query_chars: 3,
			default_limit: 10,
			max_limit: 50,
			filter_relax_order: "date_first".to_string(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Ranking {
	pub relevance_weight: f32,
	pub recency_weight: f32,
	/// Decay constant of the recency term, in days.
	pub recency_tau_days: f32,
	/// Recency assigned to records without a usable decision date.
	pub undated_recency: f32,
}
impl Default for Ranking {
	fn default() -> Self {
		Self {
			relevance_weight: 0.7,
			recency_weight: 0.3,
			recency_tau_days: 365.0,
			undated_recency: 0.5,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Links {
	/// Must contain the `{id}` placeholder.
	pub direct_template: String,
	pub stable_base: String,
	pub stable_query_param: String,
	pub search_base: String,
	pub search_site: String,
	/// Either "direct" or "stable". Applied when validation is not requested.
	pub default_strategy: String,
	pub probe_timeout_ms: u64,
	pub request_deadline_ms: u64,
	pub max_concurrent_probes: u32,
	pub user_agent: String,
	pub error_page_markers: Vec<String>,
}
impl Default for Links {
	fn default() -> Self {
		Self {
			direct_template: "https://www.poderjudicial.es/search/cedula.jsp?id={id}".to_string(),
			stable_base: "https://www.poderjudicial.es/search/indexAN.jsp".to_string(),
			stable_query_param: "q".to_string(),
			search_base: "https://www.google.com/search".to_string(),
			search_site: "poderjudicial.es".to_string(),
			default_strategy: "direct".to_string(),
			probe_timeout_ms: 5_000,
			request_deadline_ms: 9_000,
			max_concurrent_probes: 8,
			user_agent: concat!("caselex/", env!("CARGO_PKG_VERSION")).to_string(),
			error_page_markers: vec![
				"documento no encontrado".to_string(),
				"no se ha encontrado".to_string(),
				"error interno".to_string(),
				"page not found".to_string(),
			],
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Organs {
	/// Optional. Map keys are abbreviations or alternate spellings, values are canonical labels.
	pub aliases: Option<BTreeMap<String, String>>,
	/// Optional. Map keys are broad class tokens (e.g. "tsj"), values are organ-name fragments.
	pub classes: Option<BTreeMap<String, String>>,
}

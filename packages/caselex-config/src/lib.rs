mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Corpus, Links, Organs, Ranking, Search, Service};

use std::{
	fs,
	path::{Path, PathBuf},
};

pub const FILTER_RELAX_ORDERS: [&str; 2] = ["date_first", "organ_first"];
pub const LINK_STRATEGIES: [&str; 2] = ["direct", "stable"];

const MIN_PROBE_TIMEOUT_MS: u64 = 2_000;
const MAX_PROBE_TIMEOUT_MS: u64 = 8_000;
const MIN_RECENCY_TAU_DAYS: f32 = 365.0;
const MAX_RECENCY_TAU_DAYS: f32 = 1_096.0;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	finish(cfg)
}

/// Parses an inline TOML document, e.g. one embedded in a test or a deployment template.
pub fn parse(raw: &str) -> Result<Config> {
	let cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: PathBuf::from("<inline>"), source: err })?;

	finish(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}

	if let Some(path) = cfg.corpus.path.as_ref()
		&& !path.exists()
	{
		return Err(Error::MissingCorpus { path: path.clone() });
	}

	validate_search(cfg)?;
	validate_ranking(cfg)?;
	validate_links(cfg)?;

	if let Some(synonyms) = cfg.synonyms.as_ref() {
		for (phrase, values) in synonyms {
			if phrase.trim().is_empty() {
				return Err(Error::Validation {
					message: "synonyms keys must be non-empty.".to_string(),
				});
			}
			if values.iter().all(|value| value.trim().is_empty()) {
				return Err(Error::Validation {
					message: format!("synonyms.{phrase} must list at least one synonym."),
				});
			}
		}
	}

	for (label, table) in
		[("organs.aliases", &cfg.organs.aliases), ("organs.classes", &cfg.organs.classes)]
	{
		let Some(table) = table else { continue };

		if table.iter().any(|(key, value)| key.trim().is_empty() || value.trim().is_empty()) {
			return Err(Error::Validation {
				message: format!("{label} keys and values must be non-empty."),
			});
		}
	}

	Ok(())
}

fn validate_search(cfg: &Config) -> Result<()> {
	let search = &cfg.search;

	if search.min_query_chars == 0 {
		return Err(Error::Validation {
			message: "search.min_query_chars must be greater than zero.".to_string(),
		});
	}
	if search.default_limit == 0 || search.max_limit == 0 {
		return Err(Error::Validation {
			message: "search.default_limit and search.max_limit must be greater than zero."
				.to_string(),
		});
	}
	if search.default_limit > search.max_limit {
		return Err(Error::Validation {
			message: "search.default_limit must not exceed search.max_limit.".to_string(),
		});
	}
	if !FILTER_RELAX_ORDERS.contains(&search.filter_relax_order.as_str()) {
		return Err(Error::Validation {
			message: "search.filter_relax_order must be one of date_first or organ_first."
				.to_string(),
		});
	}

	Ok(())
}

fn validate_ranking(cfg: &Config) -> Result<()> {
	let ranking = &cfg.ranking;

	for (label, weight) in [
		("ranking.relevance_weight", ranking.relevance_weight),
		("ranking.recency_weight", ranking.recency_weight),
	] {
		if !weight.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if weight < 0.0 {
			return Err(Error::Validation { message: format!("{label} must be zero or greater.") });
		}
	}

	if ranking.relevance_weight + ranking.recency_weight <= 0.0 {
		return Err(Error::Validation {
			message: "ranking weights must not both be zero.".to_string(),
		});
	}
	if !ranking.recency_tau_days.is_finite()
		|| !(MIN_RECENCY_TAU_DAYS..=MAX_RECENCY_TAU_DAYS).contains(&ranking.recency_tau_days)
	{
		return Err(Error::Validation {
			message: format!(
				"ranking.recency_tau_days must be in the range {MIN_RECENCY_TAU_DAYS}-{MAX_RECENCY_TAU_DAYS}."
			),
		});
	}
	if !(0.0..=1.0).contains(&ranking.undated_recency) {
		return Err(Error::Validation {
			message: "ranking.undated_recency must be in the range 0.0-1.0.".to_string(),
		});
	}

	Ok(())
}

fn validate_links(cfg: &Config) -> Result<()> {
	let links = &cfg.links;

	if !links.direct_template.contains("{id}") {
		return Err(Error::Validation {
			message: "links.direct_template must contain the {id} placeholder.".to_string(),
		});
	}

	for (label, value) in [
		("links.stable_base", &links.stable_base),
		("links.stable_query_param", &links.stable_query_param),
		("links.search_base", &links.search_base),
		("links.user_agent", &links.user_agent),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if !LINK_STRATEGIES.contains(&links.default_strategy.as_str()) {
		return Err(Error::Validation {
			message: "links.default_strategy must be one of direct or stable.".to_string(),
		});
	}
	if !(MIN_PROBE_TIMEOUT_MS..=MAX_PROBE_TIMEOUT_MS).contains(&links.probe_timeout_ms) {
		return Err(Error::Validation {
			message: format!(
				"links.probe_timeout_ms must be in the range {MIN_PROBE_TIMEOUT_MS}-{MAX_PROBE_TIMEOUT_MS}."
			),
		});
	}
	if links.request_deadline_ms < links.probe_timeout_ms {
		return Err(Error::Validation {
			message: "links.request_deadline_ms must be at least links.probe_timeout_ms."
				.to_string(),
		});
	}
	if links.max_concurrent_probes == 0 {
		return Err(Error::Validation {
			message: "links.max_concurrent_probes must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn finish(mut cfg: Config) -> Result<Config> {
	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

fn normalize(cfg: &mut Config) {
	if cfg
		.corpus
		.path
		.as_deref()
		.map(|path| path.as_os_str().to_string_lossy().trim().is_empty())
		.unwrap_or(false)
	{
		cfg.corpus.path = None;
	}
	if cfg.synonyms.as_ref().map(|table| table.is_empty()).unwrap_or(false) {
		cfg.synonyms = None;
	}
	if cfg.organs.aliases.as_ref().map(|table| table.is_empty()).unwrap_or(false) {
		cfg.organs.aliases = None;
	}
	if cfg.organs.classes.as_ref().map(|table| table.is_empty()).unwrap_or(false) {
		cfg.organs.classes = None;
	}

	cfg.links.error_page_markers.retain(|marker| !marker.trim().is_empty());
}

use time::Date;

use caselex_domain::{
	OrganDirectory, OrganFilter, date,
	normalize::{content_tokens, normalize_text},
};

use crate::{Error, Result, search::{OrderMode, SearchRequest}};

/// A validated request with every derived matching key.
#[derive(Clone, Debug)]
pub(crate) struct PreparedQuery {
	/// Caller text, trimmed. Echoed back in the response.
	pub(crate) text: String,
	pub(crate) normalized: String,
	pub(crate) tokens: Vec<String>,
	pub(crate) organ: Option<OrganFilter>,
	pub(crate) date_from: Option<Date>,
	pub(crate) date_to: Option<Date>,
	/// The caller sent `date_from` later than `date_to`.
	pub(crate) range_swapped: bool,
	pub(crate) order: OrderMode,
	pub(crate) limit: usize,
	pub(crate) validate_links: bool,
}

pub(crate) fn prepare(
	req: &SearchRequest,
	cfg: &caselex_config::Search,
	organs: &OrganDirectory,
) -> Result<PreparedQuery> {
	let text = req.query.trim().to_string();
	let normalized = normalize_text(&text);
	let min_chars = cfg.min_query_chars as usize;

	if normalized.chars().count() < min_chars {
		return Err(Error::invalid(
			"query",
			format!("query must contain at least {min_chars} characters."),
		));
	}

	let tokens = content_tokens(&normalized);

	if tokens.is_empty() {
		return Err(Error::invalid("query", "query must contain at least one searchable term."));
	}

	let date_from = parse_bound("date_from", req.date_from.as_deref())?;
	let date_to = parse_bound("date_to", req.date_to.as_deref())?;
	let (date_from, date_to, range_swapped) = date::ordered_range(date_from, date_to);
	let limit = resolve_limit(req.limit, cfg)?;
	let organ = req.organ.as_deref().and_then(|raw| organs.resolve(raw));

	Ok(PreparedQuery {
		text,
		normalized,
		tokens,
		organ,
		date_from,
		date_to,
		range_swapped,
		order: req.order,
		limit,
		validate_links: req.validate_links,
	})
}

fn parse_bound(field: &str, raw: Option<&str>) -> Result<Option<Date>> {
	let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
		return Ok(None);
	};

	date::parse_iso_date(raw)
		.map(Some)
		.ok_or_else(|| Error::invalid(field, format!("{field} must be an ISO date (YYYY-MM-DD).")))
}

fn resolve_limit(limit: Option<u32>, cfg: &caselex_config::Search) -> Result<usize> {
	match limit {
		None => Ok(cfg.default_limit as usize),
		Some(limit) if (1..=cfg.max_limit).contains(&limit) => Ok(limit as usize),
		Some(_) => Err(Error::invalid(
			"limit",
			format!("limit must be between 1 and {}.", cfg.max_limit),
		)),
	}
}

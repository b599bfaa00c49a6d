mod links;
mod matcher;
mod note;
mod query;
mod ranking;

pub use links::{
	CaseLinks, LinkDecision, LinkResolver, LinkStrategy, LinkValidation, ResolvedLinks,
};
pub use matcher::{FilterKind, FilterRelaxOrder, MatchCandidate, RelaxationStep, TextStrategy};
pub use ranking::HybridRanker;

pub(crate) use matcher::CorpusMatcher;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use caselex_domain::CaseRecord;

use crate::{
	CaseSearchService, Result,
	search::note::{Note, NoteEvent},
};

const MAX_SUGGESTIONS: usize = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderMode {
	#[default]
	HybridDesc,
	DateDesc,
	DateAsc,
	RelevanceDesc,
}
impl OrderMode {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::HybridDesc => "hybrid-desc",
			Self::DateDesc => "date-desc",
			Self::DateAsc => "date-asc",
			Self::RelevanceDesc => "relevance-desc",
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
	pub query: String,
	pub organ: Option<String>,
	/// ISO date, inclusive.
	pub date_from: Option<String>,
	/// ISO date, inclusive.
	pub date_to: Option<String>,
	#[serde(default)]
	pub order: OrderMode,
	pub limit: Option<u32>,
	#[serde(default)]
	pub validate_links: bool,
}

/// Filters in effect for the returned results, after correction and relaxation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedFilters {
	pub organ: Option<String>,
	#[serde(with = "crate::date_serde::option")]
	pub date_from: Option<Date>,
	#[serde(with = "crate::date_serde::option")]
	pub date_to: Option<Date>,
	pub order: OrderMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
	pub case_id: String,
	pub title: String,
	pub organ: String,
	pub chamber: String,
	pub rapporteur: Option<String>,
	/// Decision date as published.
	pub date: String,
	/// Declared relevance as a percentage in [0, 100].
	pub relevance: u8,
	pub score: f32,
	pub summary: String,
	pub ecli: Option<String>,
	pub roj: Option<String>,
	pub direct_link: String,
	pub stable_link: String,
	pub search_link: String,
	pub preferred_link: String,
	pub link_strategy: LinkStrategy,
	pub validation: LinkValidation,
	pub direct_link_ok: Option<bool>,
}
impl CaseResult {
	fn new(record: &CaseRecord, score: f32, resolved: ResolvedLinks) -> Self {
		let ResolvedLinks { links, decision } = resolved;

		Self {
			case_id: record.case_id.clone(),
			title: record.title.clone(),
			organ: record.organ.clone(),
			chamber: record.chamber.clone(),
			rapporteur: record.rapporteur.clone(),
			date: record.date.clone(),
			relevance: record.relevance_percent(),
			score,
			summary: record.summary_text(),
			ecli: record.ecli.clone(),
			roj: record.roj.clone(),
			direct_link: links.direct,
			stable_link: links.stable,
			search_link: links.search,
			preferred_link: decision.preferred,
			link_strategy: decision.strategy,
			validation: decision.validation,
			direct_link_ok: decision.validation.direct_link_ok(),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
	pub query: String,
	pub total: usize,
	pub filters: AppliedFilters,
	pub results: Vec<CaseResult>,
	pub note: Option<String>,
}

impl CaseSearchService {
	pub async fn search(&self, req: SearchRequest) -> Result<SearchResponse> {
		self.search_on(req, OffsetDateTime::now_utc().date()).await
	}

	/// Runs the pipeline with recency measured from `today`.
	pub async fn search_on(&self, req: SearchRequest, today: Date) -> Result<SearchResponse> {
		let query = query::prepare(&req, &self.cfg.search, &self.organs)?;
		let outcome = self.matcher.run(&self.corpus, &query, &self.synonyms);
		let exhausted = outcome.exhausted();
		let mut candidates = outcome.candidates;

		self.ranker.rank(&mut candidates, query.order, today);
		candidates.truncate(query.limit);

		let records: Vec<&CaseRecord> =
			candidates.iter().map(|candidate| &candidate.entry.record).collect();
		let resolved = self.links.resolve_all(&records, query.validate_links).await;
		let results: Vec<CaseResult> = candidates
			.iter()
			.zip(resolved)
			.map(|(candidate, resolved)| {
				CaseResult::new(&candidate.entry.record, candidate.score, resolved)
			})
			.collect();
		let mut events = Vec::new();

		if query.range_swapped
			&& let (Some(from), Some(to)) = (query.date_from, query.date_to)
		{
			events.push(NoteEvent::DateRangeCorrected { from, to });
		}
		if let Some(organ) = query.organ.as_ref().filter(|organ| organ.was_normalized()) {
			events.push(NoteEvent::OrganResolved {
				input: organ.input().to_string(),
				label: organ.label().to_string(),
			});
		}

		events.extend(outcome.steps.iter().cloned().map(NoteEvent::Relaxation));

		if exhausted {
			events.push(NoteEvent::LadderExhausted);
		}

		for result in &results {
			match result.validation {
				LinkValidation::Broken =>
					events.push(NoteEvent::BrokenLink { case_id: result.case_id.clone() }),
				LinkValidation::Unknown =>
					events.push(NoteEvent::UnverifiedLink { case_id: result.case_id.clone() }),
				LinkValidation::Ok | LinkValidation::NotRequested => {},
			}
		}

		if query.order == OrderMode::HybridDesc || !events.is_empty() {
			events.push(NoteEvent::Order(query.order));
		}

		let suggestions = if results.is_empty() {
			self.synonyms.suggestions(&query.normalized, MAX_SUGGESTIONS)
		} else {
			Vec::new()
		};
		let note = Note::compose(events, suggestions).render();
		// An exhausted ladder returns nothing, so the caller's filters are echoed unrelaxed.
		let kept = |kind: FilterKind| exhausted || !outcome.dropped.contains(&kind);
		let filters = AppliedFilters {
			organ: query
				.organ
				.as_ref()
				.filter(|_| kept(FilterKind::Organ))
				.map(|organ| organ.label().to_string()),
			date_from: query.date_from.filter(|_| kept(FilterKind::Date)),
			date_to: query.date_to.filter(|_| kept(FilterKind::Date)),
			order: query.order,
		};

		tracing::info!(
			query = %query.normalized,
			order = query.order.as_str(),
			steps = outcome.steps.len(),
			total = results.len(),
			validate_links = query.validate_links,
			"Case search completed."
		);

		Ok(SearchResponse { query: query.text, total: results.len(), filters, results, note })
	}
}

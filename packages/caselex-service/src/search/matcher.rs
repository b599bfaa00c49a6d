use std::iter;

use time::Date;

use caselex_domain::{
	Corpus, CorpusEntry, Expansion, OrganFilter, SynonymTable, date, normalize::content_tokens,
};

use crate::search::query::PreparedQuery;

/// Text-matching strategies, from strictest to loosest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextStrategy {
	/// Every query term occurs in the case.
	Strict,
	/// At least one query term occurs in the case.
	Relaxed,
	/// At least one query or synonym term occurs in the case.
	Synonyms,
}
impl TextStrategy {
	pub const LADDER: [Self; 3] = [Self::Strict, Self::Relaxed, Self::Synonyms];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Strict => "strict",
			Self::Relaxed => "relaxed",
			Self::Synonyms => "synonyms",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
	Date,
	Organ,
}
impl FilterKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Date => "date",
			Self::Organ => "organ",
		}
	}
}

/// Which filter is dropped first when filters eliminate every candidate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterRelaxOrder {
	#[default]
	DateFirst,
	OrganFirst,
}
impl FilterRelaxOrder {
	pub fn from_config(cfg: &caselex_config::Search) -> Self {
		match cfg.filter_relax_order.as_str() {
			"organ_first" => Self::OrganFirst,
			_ => Self::DateFirst,
		}
	}

	pub fn sequence(self) -> [FilterKind; 2] {
		match self {
			Self::DateFirst => [FilterKind::Date, FilterKind::Organ],
			Self::OrganFirst => [FilterKind::Organ, FilterKind::Date],
		}
	}
}

/// A loosening of the request that was needed to find matches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelaxationStep {
	ApproximateMatch,
	SynonymsUsed { phrases: Vec<String> },
	FilterDropped(FilterKind),
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Filters<'a> {
	pub(crate) organ: Option<&'a OrganFilter>,
	pub(crate) date_from: Option<Date>,
	pub(crate) date_to: Option<Date>,
}
impl<'a> Filters<'a> {
	pub(crate) fn from_query(query: &'a PreparedQuery) -> Self {
		Self { organ: query.organ.as_ref(), date_from: query.date_from, date_to: query.date_to }
	}

	fn has(&self, kind: FilterKind) -> bool {
		match kind {
			FilterKind::Date => self.date_from.is_some() || self.date_to.is_some(),
			FilterKind::Organ => self.organ.is_some(),
		}
	}

	fn without(self, kind: FilterKind) -> Self {
		match kind {
			FilterKind::Date => Self { date_from: None, date_to: None, ..self },
			FilterKind::Organ => Self { organ: None, ..self },
		}
	}

	fn admits(&self, entry: &CorpusEntry) -> bool {
		self.organ.is_none_or(|organ| organ.matches(&entry.normalized_organ))
			&& date::within(entry.decision_date, self.date_from, self.date_to)
	}
}

/// A case that survived matching, annotated for ranking.
#[derive(Clone, Debug)]
pub struct MatchCandidate<'a> {
	pub entry: &'a CorpusEntry,
	pub matched_terms: usize,
	/// Filled by the ranker.
	pub score: f32,
}

#[derive(Debug, Default)]
pub(crate) struct MatchOutcome<'a> {
	pub(crate) candidates: Vec<MatchCandidate<'a>>,
	/// Every loosening taken, in the order it was applied.
	pub(crate) steps: Vec<RelaxationStep>,
	pub(crate) dropped: Vec<FilterKind>,
}
impl MatchOutcome<'_> {
	pub(crate) fn exhausted(&self) -> bool {
		self.candidates.is_empty()
	}
}

/// Runs the relaxation ladder over the corpus.
///
/// The text ladder runs under the full filter set first. When it finds nothing, the filters that
/// were set are dropped one at a time, in the configured order, and the whole ladder runs again
/// after each drop. The first non-empty step wins.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct CorpusMatcher {
	relax_order: FilterRelaxOrder,
}
impl CorpusMatcher {
	pub(crate) fn new(relax_order: FilterRelaxOrder) -> Self {
		Self { relax_order }
	}

	pub(crate) fn run<'a>(
		&self,
		corpus: &'a Corpus,
		query: &PreparedQuery,
		synonyms: &SynonymTable,
	) -> MatchOutcome<'a> {
		let full = Filters::from_query(query);
		let drops = self.relax_order.sequence().into_iter().filter(|kind| full.has(*kind));
		let mut filters = full;
		let mut expansion: Option<Expansion> = None;
		let mut outcome = MatchOutcome::default();

		for drop in iter::once(None).chain(drops.map(Some)) {
			if let Some(kind) = drop {
				filters = filters.without(kind);

				outcome.steps.push(RelaxationStep::FilterDropped(kind));
				outcome.dropped.push(kind);
			}

			for strategy in TextStrategy::LADDER {
				let terms = match strategy {
					TextStrategy::Strict | TextStrategy::Relaxed => query.tokens.clone(),
					TextStrategy::Synonyms => {
						let expansion = expansion
							.get_or_insert_with(|| synonyms.expand(&query.normalized, &query.tokens));

						if expansion.is_empty() {
							tracing::debug!(strategy = strategy.as_str(), "No synonym applies.");

							continue;
						}

						query.tokens.iter().chain(expansion.tokens.iter()).cloned().collect()
					},
				};
				let candidates = collect(corpus, &filters, strategy, &terms);

				tracing::debug!(
					strategy = strategy.as_str(),
					dropped = ?outcome.dropped,
					matches = candidates.len(),
					"Ladder step evaluated."
				);

				if candidates.is_empty() {
					continue;
				}

				match strategy {
					TextStrategy::Strict => {},
					TextStrategy::Relaxed => outcome.steps.push(RelaxationStep::ApproximateMatch),
					TextStrategy::Synonyms => {
						let phrases = expansion
							.as_ref()
							.map(|expansion| used_phrases(expansion, &query.tokens, &candidates))
							.unwrap_or_default();

						outcome.steps.push(RelaxationStep::SynonymsUsed { phrases });
					},
				}

				outcome.candidates = candidates;

				return outcome;
			}
		}

		outcome
	}
}

fn collect<'a>(
	corpus: &'a Corpus,
	filters: &Filters<'_>,
	strategy: TextStrategy,
	terms: &[String],
) -> Vec<MatchCandidate<'a>> {
	corpus
		.entries()
		.iter()
		.filter(|entry| filters.admits(entry))
		.filter_map(|entry| {
			let matched_terms = terms.iter().filter(|term| entry.has_term(term)).count();
			let hit = match strategy {
				TextStrategy::Strict => matched_terms == terms.len(),
				TextStrategy::Relaxed | TextStrategy::Synonyms => matched_terms > 0,
			};

			(hit && matched_terms > 0).then_some(MatchCandidate { entry, matched_terms, score: 0.0 })
		})
		.collect()
}

/// Synonym phrases that contributed a term found in at least one candidate.
fn used_phrases(
	expansion: &Expansion,
	query_tokens: &[String],
	candidates: &[MatchCandidate<'_>],
) -> Vec<String> {
	let used: Vec<String> = expansion
		.phrases()
		.into_iter()
		.filter(|phrase| {
			content_tokens(phrase).iter().any(|token| {
				!query_tokens.contains(token)
					&& candidates.iter().any(|candidate| candidate.entry.has_term(token))
			})
		})
		.map(str::to_string)
		.collect();

	if used.is_empty() {
		expansion.phrases().into_iter().map(str::to_string).collect()
	} else {
		used
	}
}

#[cfg(test)]
mod tests {
	use caselex_domain::{CaseRecord, OrganDirectory};

	use super::*;
	use crate::search::{SearchRequest, query};

	fn record(case_id: &str, title: &str, organ: &str, date: &str) -> CaseRecord {
		CaseRecord {
			case_id: case_id.to_string(),
			title: title.to_string(),
			organ: organ.to_string(),
			chamber: "Sala Tercera".to_string(),
			rapporteur: None,
			date: date.to_string(),
			relevance: 0.5,
			summary: None,
			ecli: None,
			roj: None,
		}
	}

	fn corpus() -> Corpus {
		Corpus::new(vec![
			record("a", "Licencia de obras en suelo urbano", "Tribunal Supremo (TS)", "2021-01-10"),
			record("b", "Cochera sin licencia", "Audiencia Nacional (AN)", "2015-05-05"),
			record("c", "Obras menores", "Tribunal Supremo (TS)", ""),
		])
		.expect("corpus")
	}

	fn prepared(req: SearchRequest) -> PreparedQuery {
		query::prepare(&req, &caselex_config::Search::default(), &OrganDirectory::builtin())
			.expect("prepare")
	}

	fn ids(outcome: &MatchOutcome<'_>) -> Vec<String> {
		let mut ids: Vec<String> =
			outcome.candidates.iter().map(|c| c.entry.record.case_id.clone()).collect();

		ids.sort();

		ids
	}

	fn text(query: &str) -> SearchRequest {
		SearchRequest { query: query.to_string(), ..SearchRequest::default() }
	}

	#[test]
	fn strict_match_requires_every_term() {
		let corpus = corpus();
		let outcome = CorpusMatcher::default().run(
			&corpus,
			&prepared(text("licencia obras")),
			&SynonymTable::builtin(),
		);

		assert_eq!(ids(&outcome), vec!["a"]);
		assert!(outcome.steps.is_empty());
		assert_eq!(outcome.candidates[0].matched_terms, 2);
	}

	#[test]
	fn relaxed_match_is_reported_as_approximate() {
		let corpus = corpus();
		let outcome = CorpusMatcher::default().run(
			&corpus,
			&prepared(text("obras clandestinas")),
			&SynonymTable::builtin(),
		);

		assert_eq!(ids(&outcome), vec!["a", "c"]);
		assert_eq!(outcome.steps, vec![RelaxationStep::ApproximateMatch]);
	}

	#[test]
	fn synonyms_run_only_after_text_steps_fail() {
		let corpus = corpus();
		let outcome = CorpusMatcher::default().run(
			&corpus,
			&prepared(text("garaje ilegal")),
			&SynonymTable::builtin(),
		);

		assert_eq!(ids(&outcome), vec!["a", "b"]);
		assert_eq!(outcome.steps, vec![RelaxationStep::SynonymsUsed {
			phrases: vec!["cochera sin licencia".to_string()],
		}]);
	}

	#[test]
	fn filters_are_dropped_in_configured_order() {
		let corpus = corpus();
		let req = SearchRequest {
			organ: Some("ts".to_string()),
			date_from: Some("2000-01-01".to_string()),
			date_to: Some("2001-01-01".to_string()),
			..text("cochera")
		};
		let date_first = CorpusMatcher::new(FilterRelaxOrder::DateFirst).run(
			&corpus,
			&prepared(req.clone()),
			&SynonymTable::builtin(),
		);

		assert_eq!(ids(&date_first), vec!["b"]);
		assert_eq!(date_first.steps, vec![
			RelaxationStep::FilterDropped(FilterKind::Date),
			RelaxationStep::FilterDropped(FilterKind::Organ),
		]);

		let organ_first = CorpusMatcher::new(FilterRelaxOrder::OrganFirst).run(
			&corpus,
			&prepared(req),
			&SynonymTable::builtin(),
		);

		assert_eq!(organ_first.dropped, vec![FilterKind::Organ, FilterKind::Date]);
	}

	#[test]
	fn unset_filters_are_never_reported_as_dropped() {
		let corpus = corpus();
		let req = SearchRequest { organ: Some("an".to_string()), ..text("obras") };
		let outcome =
			CorpusMatcher::default().run(&corpus, &prepared(req), &SynonymTable::builtin());

		assert_eq!(ids(&outcome), vec!["a", "c"]);
		assert_eq!(outcome.steps, vec![RelaxationStep::FilterDropped(FilterKind::Organ)]);
	}

	#[test]
	fn date_bounds_exclude_undated_cases() {
		let corpus = corpus();
		let req = SearchRequest { date_from: Some("2020-01-01".to_string()), ..text("obras") };
		let outcome =
			CorpusMatcher::default().run(&corpus, &prepared(req), &SynonymTable::builtin());

		assert_eq!(ids(&outcome), vec!["a"]);
		assert!(outcome.steps.is_empty());
	}

	#[test]
	fn exhausted_ladder_yields_no_candidates() {
		let corpus = corpus();
		let req = SearchRequest { organ: Some("tc".to_string()), ..text("permuta solares") };
		let outcome =
			CorpusMatcher::default().run(&corpus, &prepared(req), &SynonymTable::builtin());

		assert!(outcome.exhausted());
		assert_eq!(outcome.dropped, vec![FilterKind::Organ]);
	}

	#[test]
	fn relax_order_reads_configuration() {
		let cfg = caselex_config::Search {
			filter_relax_order: "organ_first".to_string(),
			..caselex_config::Search::default()
		};

		assert_eq!(FilterRelaxOrder::from_config(&cfg), FilterRelaxOrder::OrganFirst);
		assert_eq!(
			FilterRelaxOrder::from_config(&caselex_config::Search::default()),
			FilterRelaxOrder::DateFirst
		);
	}
}

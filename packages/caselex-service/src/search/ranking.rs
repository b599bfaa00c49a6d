use std::cmp::Ordering;

use time::Date;

use crate::search::{OrderMode, matcher::MatchCandidate};

/// Blends declared relevance with an exponential recency decay.
#[derive(Clone, Copy, Debug)]
pub struct HybridRanker {
	pub relevance_weight: f32,
	pub recency_weight: f32,
	pub recency_tau_days: f32,
	pub undated_recency: f32,
}
impl HybridRanker {
	pub fn from_config(cfg: &caselex_config::Ranking) -> Self {
		Self {
			relevance_weight: cfg.relevance_weight,
			recency_weight: cfg.recency_weight,
			recency_tau_days: cfg.recency_tau_days,
			undated_recency: cfg.undated_recency,
		}
	}

	/// `exp(-elapsed_days / tau)`. Future dates count as today.
	pub fn recency(&self, decision_date: Option<Date>, today: Date) -> f32 {
		let Some(decision_date) = decision_date else { return self.undated_recency };
		let elapsed = (today - decision_date).whole_days().max(0) as f32;

		(-elapsed / self.recency_tau_days).exp()
	}

	pub fn hybrid_score(&self, relevance: f32, decision_date: Option<Date>, today: Date) -> f32 {
		self.relevance_weight * relevance + self.recency_weight * self.recency(decision_date, today)
	}

	/// Scores and sorts candidates for `order`.
	///
	/// Explicit orders score by relevance alone. Ties fall back to the most recent date, then
	/// score, then matched terms, then case id, so equal requests always sort equally.
	pub fn rank(&self, candidates: &mut [MatchCandidate<'_>], order: OrderMode, today: Date) {
		for candidate in candidates.iter_mut() {
			let relevance = candidate.entry.record.clamped_relevance();

			candidate.score = match order {
				OrderMode::HybridDesc =>
					self.hybrid_score(relevance, candidate.entry.decision_date, today),
				OrderMode::DateDesc | OrderMode::DateAsc | OrderMode::RelevanceDesc => relevance,
			};
		}

		candidates.sort_by(|a, b| {
			let primary = match order {
				OrderMode::HybridDesc | OrderMode::RelevanceDesc => cmp_f32_desc(a.score, b.score),
				OrderMode::DateDesc =>
					cmp_date_desc(a.entry.decision_date, b.entry.decision_date),
				OrderMode::DateAsc => cmp_date_asc(a.entry.decision_date, b.entry.decision_date),
			};

			primary
				.then_with(|| cmp_date_desc(a.entry.decision_date, b.entry.decision_date))
				.then_with(|| cmp_f32_desc(a.score, b.score))
				.then_with(|| b.matched_terms.cmp(&a.matched_terms))
				.then_with(|| a.entry.record.case_id.cmp(&b.entry.record.case_id))
		});
	}
}
impl Default for HybridRanker {
	fn default() -> Self {
		Self::from_config(&caselex_config::Ranking::default())
	}
}

fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}

// Undated cases sort last in both directions.
fn cmp_date_desc(a: Option<Date>, b: Option<Date>) -> Ordering {
	match (a, b) {
		(Some(a), Some(b)) => b.cmp(&a),
		(Some(_), None) => Ordering::Less,
		(None, Some(_)) => Ordering::Greater,
		(None, None) => Ordering::Equal,
	}
}

fn cmp_date_asc(a: Option<Date>, b: Option<Date>) -> Ordering {
	match (a, b) {
		(Some(a), Some(b)) => a.cmp(&b),
		(Some(_), None) => Ordering::Less,
		(None, Some(_)) => Ordering::Greater,
		(None, None) => Ordering::Equal,
	}
}

#[cfg(test)]
mod tests {
	use time::macros::date;

	use caselex_domain::{CaseRecord, Corpus};

	use super::*;

	const TODAY: Date = date!(2025 - 06 - 01);

	fn corpus() -> Corpus {
		let record = |case_id: &str, date: &str, relevance: f32| CaseRecord {
			case_id: case_id.to_string(),
			title: "Licencia".to_string(),
			organ: "Tribunal Supremo (TS)".to_string(),
			chamber: "Sala Tercera".to_string(),
			rapporteur: None,
			date: date.to_string(),
			relevance,
			summary: None,
			ecli: None,
			roj: None,
		};

		Corpus::new(vec![
			record("old-strong", "2010-01-01", 0.9),
			record("new-weak", "2025-05-01", 0.6),
			record("undated", "", 0.95),
			record("twin-b", "2020-01-01", 0.5),
			record("twin-a", "2020-01-01", 0.5),
		])
		.expect("corpus")
	}

	fn ranked(corpus: &Corpus, order: OrderMode) -> Vec<String> {
		let mut candidates: Vec<MatchCandidate<'_>> = corpus
			.entries()
			.iter()
			.map(|entry| MatchCandidate { entry, matched_terms: 1, score: 0.0 })
			.collect();

		HybridRanker::default().rank(&mut candidates, order, TODAY);

		candidates.into_iter().map(|c| c.entry.record.case_id.clone()).collect()
	}

	#[test]
	fn recency_decays_with_a_one_year_constant() {
		let ranker = HybridRanker::default();

		assert_eq!(ranker.recency_tau_days, 365.0);
		assert!((ranker.recency(Some(TODAY), TODAY) - 1.0).abs() < 1e-6);
		assert!((ranker.recency(Some(date!(2024 - 06 - 01)), TODAY) - (-1.0_f32).exp()).abs() < 1e-6);
		assert!((ranker.recency(Some(date!(2026 - 01 - 01)), TODAY) - 1.0).abs() < 1e-6);
	}

	#[test]
	fn undated_cases_get_the_neutral_recency() {
		assert_eq!(HybridRanker::default().recency(None, TODAY), 0.5);
	}

	#[test]
	fn hybrid_score_blends_relevance_and_recency() {
		let ranker = HybridRanker::default();
		let score = ranker.hybrid_score(0.8, Some(TODAY), TODAY);

		assert!((score - (0.7 * 0.8 + 0.3)).abs() < 1e-6);
	}

	#[test]
	fn hybrid_order_rewards_recent_decisions() {
		let corpus = corpus();

		assert_eq!(ranked(&corpus, OrderMode::HybridDesc), vec![
			"undated", "new-weak", "old-strong", "twin-a", "twin-b",
		]);
	}

	#[test]
	fn relevance_order_ignores_recency() {
		let corpus = corpus();

		assert_eq!(ranked(&corpus, OrderMode::RelevanceDesc), vec![
			"undated", "old-strong", "new-weak", "twin-a", "twin-b",
		]);
	}

	#[test]
	fn date_orders_keep_undated_cases_last() {
		let corpus = corpus();

		assert_eq!(ranked(&corpus, OrderMode::DateDesc), vec![
			"new-weak", "twin-a", "twin-b", "old-strong", "undated",
		]);
		assert_eq!(ranked(&corpus, OrderMode::DateAsc), vec![
			"old-strong", "twin-a", "twin-b", "new-weak", "undated",
		]);
	}
}

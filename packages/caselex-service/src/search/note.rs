use time::Date;

use caselex_domain::date::format_iso_date;

use crate::search::{OrderMode, RelaxationStep};

/// Something the pipeline decided that callers should be told about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum NoteEvent {
	DateRangeCorrected { from: Date, to: Date },
	OrganResolved { input: String, label: String },
	Relaxation(RelaxationStep),
	LadderExhausted,
	BrokenLink { case_id: String },
	UnverifiedLink { case_id: String },
	Order(OrderMode),
}
impl NoteEvent {
	fn rank(&self) -> u8 {
		match self {
			Self::DateRangeCorrected { .. } => 0,
			Self::OrganResolved { .. } => 1,
			Self::Relaxation(RelaxationStep::SynonymsUsed { .. }) => 2,
			Self::Relaxation(_) => 3,
			Self::LadderExhausted => 4,
			Self::BrokenLink { .. } | Self::UnverifiedLink { .. } => 5,
			Self::Order(_) => 6,
		}
	}
}

/// The four parts of a response note, each a list of clauses.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Note {
	pub(crate) motive: Vec<String>,
	pub(crate) action: Vec<String>,
	pub(crate) suggestions: Vec<String>,
	pub(crate) info: Vec<String>,
}
impl Note {
	/// Folds events into note parts in a fixed order, whatever order they were raised in.
	pub(crate) fn compose(mut events: Vec<NoteEvent>, suggestions: Vec<String>) -> Self {
		let mut note = Self { suggestions, ..Self::default() };

		events.sort_by_key(NoteEvent::rank);

		for event in events {
			note.apply(event);
		}

		note
	}

	fn apply(&mut self, event: NoteEvent) {
		match event {
			NoteEvent::DateRangeCorrected { from, to } => {
				self.motive.push("date_from was later than date_to".to_string());
				self.action.push(format!(
					"inverted date range corrected to {} .. {}",
					format_iso_date(from),
					format_iso_date(to)
				));
			},
			NoteEvent::OrganResolved { input, label } =>
				self.info.push(format!("organ \"{input}\" interpreted as \"{label}\"")),
			NoteEvent::Relaxation(RelaxationStep::ApproximateMatch) => {
				self.motive.push("no case contains every query term".to_string());
				self.action.push("approximate match on any query term".to_string());
			},
			NoteEvent::Relaxation(RelaxationStep::SynonymsUsed { phrases }) => {
				self.motive.push("no case matched the query terms".to_string());
				self.action.push(format!("synonyms used: {}", phrases.join(", ")));
			},
			NoteEvent::Relaxation(RelaxationStep::FilterDropped(kind)) => {
				self.motive.push(format!("no case matched within the {} filter", kind.as_str()));
				self.action.push(format!("{} filter relaxed", kind.as_str()));
			},
			NoteEvent::LadderExhausted => {
				self.motive.push("no cases matched the query".to_string());
				self.action.push("tried strict, approximate and synonym matching".to_string());
			},
			NoteEvent::BrokenLink { case_id } => self
				.info
				.push(format!("direct link broken for case {case_id}, stable link preferred")),
			NoteEvent::UnverifiedLink { case_id } => self.info.push(format!(
				"direct link for case {case_id} could not be verified, stable link preferred"
			)),
			NoteEvent::Order(mode) => self.info.push(order_text(mode)),
		}
	}

	pub(crate) fn is_empty(&self) -> bool {
		self.motive.is_empty()
			&& self.action.is_empty()
			&& self.suggestions.is_empty()
			&& self.info.is_empty()
	}

	/// `Motive: a; b. Action: c. Suggestions: d; e. Info: f.` with empty parts left out.
	pub(crate) fn render(&self) -> Option<String> {
		if self.is_empty() {
			return None;
		}

		let parts: Vec<String> = [
			("Motive", &self.motive),
			("Action", &self.action),
			("Suggestions", &self.suggestions),
			("Info", &self.info),
		]
		.into_iter()
		.filter(|(_, clauses)| !clauses.is_empty())
		.map(|(label, clauses)| format!("{label}: {}.", clauses.join("; ")))
		.collect();

		Some(parts.join(" "))
	}
}

fn order_text(mode: OrderMode) -> String {
	match mode {
		OrderMode::HybridDesc => "order: hybrid ranking (relevance + recency)".to_string(),
		mode => format!("order: {}", mode.as_str()),
	}
}

#[cfg(test)]
mod tests {
	use time::macros::date;

	use super::*;
	use crate::search::FilterKind;

	#[test]
	fn nothing_noteworthy_renders_nothing() {
		assert_eq!(Note::compose(Vec::new(), Vec::new()).render(), None);
	}

	#[test]
	fn parts_follow_a_fixed_order() {
		let note = Note::compose(
			vec![
				NoteEvent::Order(OrderMode::HybridDesc),
				NoteEvent::Relaxation(RelaxationStep::FilterDropped(FilterKind::Date)),
				NoteEvent::DateRangeCorrected {
					from: date!(2020 - 01 - 01),
					to: date!(2025 - 01 - 01),
				},
			],
			Vec::new(),
		);

		assert_eq!(
			note.render().as_deref(),
			Some(
				"Motive: date_from was later than date_to; no case matched within the date filter. \
				 Action: inverted date range corrected to 2020-01-01 .. 2025-01-01; date filter \
				 relaxed. Info: order: hybrid ranking (relevance + recency)."
			)
		);
	}

	#[test]
	fn empty_results_carry_motive_action_and_suggestions() {
		let note = Note::compose(
			vec![NoteEvent::LadderExhausted, NoteEvent::Order(OrderMode::DateDesc)],
			vec!["broaden your terms".to_string(), "adjust the date range".to_string()],
		);
		let rendered = note.render().expect("note");

		assert!(rendered.starts_with("Motive: no cases matched the query."));
		assert!(rendered.contains("Suggestions: broaden your terms; adjust the date range."));
		assert!(rendered.ends_with("Info: order: date-desc."));
	}

	#[test]
	fn link_events_name_the_case() {
		let note = Note::compose(
			vec![
				NoteEvent::UnverifiedLink { case_id: "b".to_string() },
				NoteEvent::BrokenLink { case_id: "a".to_string() },
			],
			Vec::new(),
		);

		assert_eq!(note.info, vec![
			"direct link for case b could not be verified, stable link preferred".to_string(),
			"direct link broken for case a, stable link preferred".to_string(),
		]);
	}
}

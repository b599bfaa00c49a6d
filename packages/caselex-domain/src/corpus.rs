use std::{collections::HashSet, fs, path::Path};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
	Error, Result, date,
	normalize::{content_tokens, normalize_text},
};

const SEED_CORPUS_JSON: &str = include_str!("../corpus/seed.json");

/// A published decision as stored in the reference corpus.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
	pub case_id: String,
	pub title: String,
	pub organ: String,
	pub chamber: String,
	#[serde(default)]
	pub rapporteur: Option<String>,
	/// ISO decision date as published. May be empty or malformed in source data.
	#[serde(default)]
	pub date: String,
	/// Declared relevance, nominally in [0, 1].
	pub relevance: f32,
	#[serde(default)]
	pub summary: Option<String>,
	/// European Case Law Identifier.
	#[serde(default)]
	pub ecli: Option<String>,
	/// Repertorio Oficial de Jurisprudencia reference.
	#[serde(default)]
	pub roj: Option<String>,
}
impl CaseRecord {
	pub fn clamped_relevance(&self) -> f32 {
		if self.relevance.is_nan() { 0.0 } else { self.relevance.clamp(0.0, 1.0) }
	}

	/// Relevance as a whole percentage in [0, 100].
	pub fn relevance_percent(&self) -> u8 {
		(self.clamped_relevance() * 100.0).round() as u8
	}

	pub fn summary_text(&self) -> String {
		match self.summary.as_deref().map(str::trim) {
			Some(summary) if !summary.is_empty() => summary.to_string(),
			_ => format!(
				"{} ({} - {}) Date: {}.",
				self.title,
				self.organ,
				self.chamber,
				if self.date.trim().is_empty() { "unknown" } else { self.date.trim() }
			),
		}
	}

	/// Durable cross-reference, falling back to the secondary reference.
	pub fn stable_reference(&self) -> Option<&str> {
		non_blank(self.ecli.as_deref()).or_else(|| non_blank(self.roj.as_deref()))
	}
}

/// A record together with the matching keys derived from it at load time.
#[derive(Clone, Debug)]
pub struct CorpusEntry {
	pub record: CaseRecord,
	pub decision_date: Option<Date>,
	pub normalized_organ: String,
	/// Terms of title, organ, and chamber.
	pub terms: HashSet<String>,
}
impl CorpusEntry {
	fn new(record: CaseRecord) -> Self {
		let searchable =
			normalize_text(&format!("{} {} {}", record.title, record.organ, record.chamber));
		let terms = content_tokens(&searchable).into_iter().collect();

		Self {
			decision_date: date::parse_iso_date(&record.date),
			normalized_organ: normalize_text(&record.organ),
			terms,
			record,
		}
	}

	pub fn has_term(&self, term: &str) -> bool {
		self.terms.contains(term)
	}
}

/// Read-only collection of case records, shared by every request.
#[derive(Clone, Debug)]
pub struct Corpus {
	entries: Vec<CorpusEntry>,
}
impl Corpus {
	pub fn new(records: Vec<CaseRecord>) -> Result<Self> {
		let mut ids = HashSet::new();

		for record in &records {
			if record.case_id.trim().is_empty() {
				return Err(Error::InvalidCorpus {
					message: "case_id must be non-empty.".to_string(),
				});
			}
			if !ids.insert(record.case_id.as_str()) {
				return Err(Error::InvalidCorpus {
					message: format!("Duplicate case_id {}.", record.case_id),
				});
			}
			if record.title.trim().is_empty() {
				return Err(Error::InvalidCorpus {
					message: format!("Case {} has an empty title.", record.case_id),
				});
			}
			if !record.relevance.is_finite() {
				return Err(Error::InvalidCorpus {
					message: format!("Case {} has a non-finite relevance.", record.case_id),
				});
			}
		}

		Ok(Self { entries: records.into_iter().map(CorpusEntry::new).collect() })
	}

	pub fn from_json_str(raw: &str) -> Result<Self> {
		let records: Vec<CaseRecord> = serde_json::from_str(raw)?;

		Self::new(records)
	}

	pub fn load(path: &Path) -> Result<Self> {
		let raw = fs::read_to_string(path)
			.map_err(|err| Error::ReadCorpus { path: path.to_path_buf(), source: err })?;

		Self::from_json_str(&raw)
	}

	/// The bundled reference corpus.
	pub fn seed() -> Result<Self> {
		Self::from_json_str(SEED_CORPUS_JSON)
	}

	pub fn from_config(corpus: &caselex_config::Corpus) -> Result<Self> {
		match corpus.path.as_deref() {
			Some(path) => Self::load(path),
			None => Self::seed(),
		}
	}

	pub fn entries(&self) -> &[CorpusEntry] {
		&self.entries
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

fn non_blank(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|value| !value.is_empty())
}

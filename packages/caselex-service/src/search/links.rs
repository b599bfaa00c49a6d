use std::{sync::Arc, time::Duration};

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tokio::{
	sync::Semaphore,
	task::JoinSet,
	time::{self, Instant},
};

use caselex_domain::CaseRecord;

use crate::{LinkProbe, ProbeVerdict};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStrategy {
	Direct,
	Stable,
}
impl LinkStrategy {
	pub fn from_config(cfg: &caselex_config::Links) -> Self {
		match cfg.default_strategy.as_str() {
			"stable" => Self::Stable,
			_ => Self::Direct,
		}
	}
}

/// Outcome of direct-link validation as reported to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkValidation {
	NotRequested,
	Ok,
	Broken,
	/// The probe could not decide. Never reported as broken.
	Unknown,
}
impl LinkValidation {
	pub fn from_verdict(verdict: ProbeVerdict) -> Self {
		match verdict {
			ProbeVerdict::Ok => Self::Ok,
			ProbeVerdict::Broken => Self::Broken,
			ProbeVerdict::Inconclusive => Self::Unknown,
		}
	}

	/// `Some` only when the probe gave a definite answer.
	pub fn direct_link_ok(self) -> Option<bool> {
		match self {
			Self::Ok => Some(true),
			Self::Broken => Some(false),
			Self::NotRequested | Self::Unknown => None,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseLinks {
	pub direct: String,
	pub stable: String,
	/// Public web search restricted to the court site.
	pub search: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkDecision {
	pub preferred: String,
	pub strategy: LinkStrategy,
	pub validation: LinkValidation,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedLinks {
	pub links: CaseLinks,
	pub decision: LinkDecision,
}

/// Builds the links of each result and picks the preferred one.
pub struct LinkResolver {
	direct_template: String,
	stable_base: String,
	stable_query_param: String,
	search_base: String,
	search_site: String,
	default_strategy: LinkStrategy,
	probe_timeout: Duration,
	request_deadline: Duration,
	max_concurrent_probes: usize,
	probe: Arc<dyn LinkProbe>,
}
impl LinkResolver {
	pub fn new(cfg: &caselex_config::Links, probe: Arc<dyn LinkProbe>) -> Self {
		Self {
			direct_template: cfg.direct_template.clone(),
			stable_base: cfg.stable_base.clone(),
			stable_query_param: cfg.stable_query_param.clone(),
			search_base: cfg.search_base.clone(),
			search_site: cfg.search_site.clone(),
			default_strategy: LinkStrategy::from_config(cfg),
			probe_timeout: Duration::from_millis(cfg.probe_timeout_ms),
			request_deadline: Duration::from_millis(cfg.request_deadline_ms),
			max_concurrent_probes: (cfg.max_concurrent_probes as usize).max(1),
			probe,
		}
	}

	pub fn build_links(&self, record: &CaseRecord) -> CaseLinks {
		let direct = self.direct_template.replace("{id}", record.case_id.trim());
		let stable = match record.stable_reference() {
			Some(reference) => with_params(
				&self.stable_base,
				&[(self.stable_query_param.as_str(), reference)],
			),
			None => with_params(&self.stable_base, &[]),
		};
		let references: Vec<&str> = [record.ecli.as_deref(), record.roj.as_deref()]
			.into_iter()
			.flatten()
			.map(str::trim)
			.filter(|reference| !reference.is_empty())
			.collect();
		let terms = if references.is_empty() {
			format!("\"{}\"", record.title.trim())
		} else {
			references.join(" ")
		};
		let search_query = format!("site:{} {terms}", self.search_site);
		let search = with_params(&self.search_base, &[("q", search_query.as_str())]);

		CaseLinks { direct, stable, search }
	}

	/// Picks the preferred link from a probe verdict, or from policy when nothing was probed.
	///
	/// Only a confirmed probe or the direct-by-policy default ever yields the direct link.
	pub fn decide(&self, links: &CaseLinks, verdict: Option<ProbeVerdict>) -> LinkDecision {
		let (strategy, validation) = match verdict {
			None => (self.default_strategy, LinkValidation::NotRequested),
			Some(ProbeVerdict::Ok) => (LinkStrategy::Direct, LinkValidation::Ok),
			Some(verdict) => (LinkStrategy::Stable, LinkValidation::from_verdict(verdict)),
		};
		let preferred = match strategy {
			LinkStrategy::Direct => links.direct.clone(),
			LinkStrategy::Stable => links.stable.clone(),
		};

		LinkDecision { preferred, strategy, validation }
	}

	/// Resolves links for ranked records, preserving their order.
	pub async fn resolve_all(&self, records: &[&CaseRecord], validate: bool) -> Vec<ResolvedLinks> {
		let links: Vec<CaseLinks> = records.iter().map(|record| self.build_links(record)).collect();
		let verdicts: Vec<Option<ProbeVerdict>> = if validate {
			let urls: Vec<String> = links.iter().map(|links| links.direct.clone()).collect();

			self.probe_all(urls).await.into_iter().map(Some).collect()
		} else {
			vec![None; links.len()]
		};

		links
			.into_iter()
			.zip(verdicts)
			.map(|(links, verdict)| {
				let decision = self.decide(&links, verdict);

				ResolvedLinks { links, decision }
			})
			.collect()
	}

	/// Probes every url concurrently, at most `max_concurrent_probes` at a time.
	///
	/// Each probe is cut at the probe timeout. Probes still running when the request deadline
	/// elapses are aborted and count as inconclusive.
	async fn probe_all(&self, urls: Vec<String>) -> Vec<ProbeVerdict> {
		let mut verdicts = vec![ProbeVerdict::Inconclusive; urls.len()];

		if urls.is_empty() {
			return verdicts;
		}

		let deadline = Instant::now() + self.request_deadline;
		let semaphore = Arc::new(Semaphore::new(self.max_concurrent_probes));
		let mut tasks = JoinSet::new();

		for (index, url) in urls.into_iter().enumerate() {
			let probe = Arc::clone(&self.probe);
			let semaphore = Arc::clone(&semaphore);
			let timeout = self.probe_timeout;

			tasks.spawn(async move {
				let Ok(_permit) = semaphore.acquire_owned().await else {
					return (index, ProbeVerdict::Inconclusive);
				};
				let verdict = match time::timeout(timeout, probe.probe(&url, timeout)).await {
					Ok(verdict) => verdict,
					Err(_) => {
						tracing::warn!(url = %url, "Link probe timed out.");

						ProbeVerdict::Inconclusive
					},
				};

				tracing::debug!(url = %url, verdict = verdict.as_str(), "Link probed.");

				(index, verdict)
			});
		}

		loop {
			match time::timeout_at(deadline, tasks.join_next()).await {
				Ok(Some(Ok((index, verdict)))) => verdicts[index] = verdict,
				Ok(Some(Err(err))) => tracing::warn!(error = %err, "Link probe task failed."),
				Ok(None) => break,
				Err(_) => {
					tracing::warn!(
						outstanding = tasks.len(),
						"Request deadline elapsed. Abandoning link probes."
					);
					tasks.abort_all();

					break;
				},
			}
		}

		verdicts
	}
}

fn with_params(base: &str, params: &[(&str, &str)]) -> String {
	let url = if params.is_empty() { Url::parse(base) } else { Url::parse_with_params(base, params) };

	match url {
		Ok(url) => url.into(),
		Err(_) => base.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use crate::BoxFuture;

	use super::*;

	struct NeverCalled;
	impl LinkProbe for NeverCalled {
		fn probe<'a>(&'a self, _: &'a str, _: Duration) -> BoxFuture<'a, ProbeVerdict> {
			panic!("Probe must not run.")
		}
	}

	fn resolver(cfg: &caselex_config::Links) -> LinkResolver {
		LinkResolver::new(cfg, Arc::new(NeverCalled))
	}

	fn record() -> CaseRecord {
		CaseRecord {
			case_id: "28079130012022000456".to_string(),
			title: "Sentencia ejemplo".to_string(),
			organ: "Tribunal Supremo (TS)".to_string(),
			chamber: "Sala Tercera".to_string(),
			rapporteur: None,
			date: "2022-11-03".to_string(),
			relevance: 0.82,
			summary: None,
			ecli: Some("ECLI:ES:TS:2022:456".to_string()),
			roj: Some("STS 456/2022".to_string()),
		}
	}

	#[test]
	fn builds_direct_stable_and_search_links() {
		let links = resolver(&caselex_config::Links::default()).build_links(&record());

		assert_eq!(
			links.direct,
			"https://www.poderjudicial.es/search/cedula.jsp?id=28079130012022000456"
		);
		assert_eq!(
			links.stable,
			"https://www.poderjudicial.es/search/indexAN.jsp?q=ECLI%3AES%3ATS%3A2022%3A456"
		);
		assert!(links.search.starts_with("https://www.google.com/search?q=site%3Apoderjudicial.es"));
		assert!(links.search.contains("ECLI%3AES%3ATS%3A2022%3A456"));
		assert!(links.search.contains("STS+456%2F2022"));
	}

	#[test]
	fn stable_link_falls_back_to_roj_then_generic_form() {
		let resolver = resolver(&caselex_config::Links::default());
		let mut case = record();

		case.ecli = None;

		assert!(resolver.build_links(&case).stable.ends_with("?q=STS+456%2F2022"));

		case.roj = None;

		assert_eq!(
			resolver.build_links(&case).stable,
			"https://www.poderjudicial.es/search/indexAN.jsp"
		);
		assert!(resolver.build_links(&case).search.contains("%22Sentencia+ejemplo%22"));
	}

	#[test]
	fn decision_follows_probe_verdict() {
		let resolver = resolver(&caselex_config::Links::default());
		let links = resolver.build_links(&record());
		let ok = resolver.decide(&links, Some(ProbeVerdict::Ok));
		let broken = resolver.decide(&links, Some(ProbeVerdict::Broken));
		let unknown = resolver.decide(&links, Some(ProbeVerdict::Inconclusive));

		assert_eq!((ok.strategy, ok.validation), (LinkStrategy::Direct, LinkValidation::Ok));
		assert_eq!(ok.preferred, links.direct);
		assert_eq!((broken.strategy, broken.validation), (
			LinkStrategy::Stable,
			LinkValidation::Broken
		));
		assert_eq!(broken.preferred, links.stable);
		assert_eq!((unknown.strategy, unknown.validation), (
			LinkStrategy::Stable,
			LinkValidation::Unknown
		));
		assert_eq!(unknown.validation.direct_link_ok(), None);
	}

	#[test]
	fn unvalidated_links_follow_the_configured_default() {
		let direct = resolver(&caselex_config::Links::default());
		let links = direct.build_links(&record());
		let decision = direct.decide(&links, None);

		assert_eq!(decision.strategy, LinkStrategy::Direct);
		assert_eq!(decision.validation, LinkValidation::NotRequested);

		let stable = resolver(&caselex_config::Links {
			default_strategy: "stable".to_string(),
			..caselex_config::Links::default()
		});
		let decision = stable.decide(&links, None);

		assert_eq!(decision.strategy, LinkStrategy::Stable);
		assert_eq!(decision.preferred, links.stable);
	}

	#[tokio::test]
	async fn unvalidated_resolution_never_probes() {
		let resolver = resolver(&caselex_config::Links::default());
		let case = record();
		let resolved = resolver.resolve_all(&[&case, &case], false).await;

		assert_eq!(resolved.len(), 2);
		assert!(resolved.iter().all(|r| r.decision.validation == LinkValidation::NotRequested));
	}
}

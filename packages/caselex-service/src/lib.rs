pub mod date_serde;
pub mod search;

mod error;

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use caselex_config::Config;
use caselex_domain::{Corpus, OrganDirectory, SynonymTable};
use caselex_providers::LinkChecker;

pub use caselex_providers::ProbeVerdict;
pub use error::{Error, Result};
pub use search::{
	AppliedFilters, CaseResult, FilterKind, FilterRelaxOrder, LinkStrategy, LinkValidation,
	OrderMode, RelaxationStep, SearchRequest, SearchResponse,
};

use search::{CorpusMatcher, HybridRanker, LinkResolver};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Live check of a direct link. Implementations classify every failure as a verdict.
pub trait LinkProbe
where
	Self: Send + Sync,
{
	fn probe<'a>(&'a self, url: &'a str, timeout: Duration) -> BoxFuture<'a, ProbeVerdict>;
}

impl LinkProbe for LinkChecker {
	fn probe<'a>(&'a self, url: &'a str, timeout: Duration) -> BoxFuture<'a, ProbeVerdict> {
		Box::pin(self.check(url, timeout))
	}
}

/// Answers case queries against one immutable corpus.
///
/// Tables and corpus are fixed at construction, so a single instance serves concurrent
/// requests without locking.
pub struct CaseSearchService {
	pub cfg: Config,
	pub corpus: Corpus,
	synonyms: SynonymTable,
	organs: OrganDirectory,
	matcher: CorpusMatcher,
	ranker: HybridRanker,
	links: LinkResolver,
}
impl CaseSearchService {
	/// Loads the configured corpus and probes links over HTTP.
	pub fn from_config(cfg: Config) -> Result<Self> {
		let corpus = Corpus::from_config(&cfg.corpus)?;

		Self::new(cfg, corpus)
	}

	pub fn new(cfg: Config, corpus: Corpus) -> Result<Self> {
		let checker = LinkChecker::new(&cfg.links)?;

		Ok(Self::with_probe(cfg, corpus, Arc::new(checker)))
	}

	pub fn with_probe(cfg: Config, corpus: Corpus, probe: Arc<dyn LinkProbe>) -> Self {
		let synonyms = SynonymTable::from_config(cfg.synonyms.as_ref());
		let organs = OrganDirectory::from_config(&cfg.organs);
		let matcher = CorpusMatcher::new(FilterRelaxOrder::from_config(&cfg.search));
		let ranker = HybridRanker::from_config(&cfg.ranking);
		let links = LinkResolver::new(&cfg.links, probe);

		Self { cfg, corpus, synonyms, organs, matcher, ranker, links }
	}
}

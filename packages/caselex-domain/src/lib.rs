pub mod corpus;
pub mod date;
pub mod normalize;
pub mod organ;
pub mod synonyms;

mod error;

pub use corpus::{CaseRecord, Corpus, CorpusEntry};
pub use error::{Error, Result};
pub use organ::{OrganDirectory, OrganFilter};
pub use synonyms::{Expansion, SynonymEntry, SynonymTable};

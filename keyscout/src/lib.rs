pub mod config;
pub mod errors;
pub mod filters;
pub mod keywords;
pub mod results;
pub mod search;
pub mod walker;
mod wire;

pub use config::{ConfigOverrides, EncodingMode, SearchConfig, Strategy};
pub use errors::{SearchError, SearchResult};
pub use results::{FinalResult, PartialResult, SkippedFile};
pub use search::{search, search_with, SearchReport};

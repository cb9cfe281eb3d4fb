pub mod canonical;
pub mod derived;
pub mod mappings;
pub mod merger;
pub mod pipeline;

pub use canonical::FundTable;
pub use derived::{average_ranks, RankOrder, RankWeights};
pub use mappings::CategoryMappings;
pub use merger::{FallbackPolicy, MergedFund, SourceMerger};
pub use pipeline::Pipeline;

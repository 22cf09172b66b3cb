//! Filter-then-context composition.

use tracing::info;
use tweetprep_types::{PipelineConfig, TweetRecord};

use crate::context::ContextBuilder;
use crate::filter::{FilterStats, RowFilter};

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Surviving records, sorted by author then recency, fully annotated.
    pub records: Vec<TweetRecord>,
    /// What the filter stage kept and dropped.
    pub filter_stats: FilterStats,
}

/// Runs [`RowFilter`] then [`ContextBuilder`] over a record collection.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    filter: RowFilter,
    context: ContextBuilder,
}

impl Pipeline {
    /// Creates a pipeline whose stages share `config`.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            filter: RowFilter::new(&config),
            context: ContextBuilder::new(&config),
        }
    }

    /// Cleans, filters and contextualizes `records`.
    pub fn run(&self, records: Vec<TweetRecord>) -> PipelineOutput {
        let (kept, filter_stats) = self.filter.apply_with_stats(records);
        let records = self.context.build(kept);

        info!(
            rows_in = filter_stats.rows_in,
            rows_out = records.len(),
            window_size = self.context.window_size(),
            "pipeline finished"
        );

        PipelineOutput {
            records,
            filter_stats,
        }
    }
}

use std::time::{Duration, Instant};

/// Timing for one classification run.
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Tokenization plus forward pass.
    pub total_time: Duration,
    /// Tokens fed to the model after truncation, special tokens included.
    pub input_tokens: usize,
}

impl PipelineStats {
    /// Start timing (call at start of operation).
    pub(crate) fn start() -> PipelineStatsBuilder {
        PipelineStatsBuilder {
            start_time: Instant::now(),
        }
    }
}

pub(crate) struct PipelineStatsBuilder {
    start_time: Instant,
}

impl PipelineStatsBuilder {
    pub fn finish(self, input_tokens: usize) -> PipelineStats {
        PipelineStats {
            total_time: self.start_time.elapsed(),
            input_tokens,
        }
    }
}

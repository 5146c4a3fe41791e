use std::time::SystemTime;

use crate::research::{NormalizedResearch, ResearchError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudioCommand {
    NormalizeResponse { raw: String },
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StudioEvent {
    ResearchStarted {
        request_id: u64,
        input_chars: usize,
        started_at: SystemTime,
    },
    ResearchCompleted {
        request_id: u64,
        research: NormalizedResearch,
    },
    ResearchFailed {
        request_id: u64,
        error: ResearchError,
    },
}

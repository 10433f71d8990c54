// Resume pipeline: drives a résumé from `uploaded` to a terminal state and
// produces a roast. Observers follow progress through the persisted status.

pub mod orchestrator;

pub use orchestrator::{process_roast, Degradation, PipelineError, RoastOutcome, EXTRACTION_FALLBACK_CONTENT};

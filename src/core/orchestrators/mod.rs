mod session_orchestrator;


pub use session_orchestrator::{
    AnalysisOutcome, SessionConfig, TextExtractionOutcome, VisionSession,
};

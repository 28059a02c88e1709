// CandidateLens Core Services

pub mod text_processor;
pub mod metrics;
pub mod detection;
pub mod autopilot;
pub mod analyzer;
pub mod config_store;
pub mod upload_store;
pub mod templates;

pub use analyzer::{analyze, AnalysisError, Analyzer};
pub use autopilot::{Autopilot, AutopilotRegistry, PythonAutopilotStub};
pub use config_store::{AppConfig, ConfigError, ConfigStore};
pub use detection::{AiScorer, DetectionSensitivity, RigorousScorer, UniformityScorer};
pub use metrics::{compute_metrics, count_syllables};
pub use text_processor::{compute_stylometry, Document, SubmissionKind};
pub use upload_store::{UploadError, UploadStore};

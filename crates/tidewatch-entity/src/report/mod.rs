//! Community report entities.

pub mod analysis;
pub mod attachment;
pub mod engagement;
pub mod kind;
pub mod model;
pub mod status;

pub use analysis::AiAnalysis;
pub use attachment::Attachment;
pub use engagement::{Comment, VoteTally};
pub use kind::ReportType;
pub use model::{Report, SubmitReport};
pub use status::ReportStatus;

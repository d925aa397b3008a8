pub mod context;
pub mod fallback;
pub mod frontend;
pub mod manager;
pub mod render;
pub mod terminal;
pub mod types;

pub use context::{ApprovalContext, TuiState};
pub use fallback::FallbackPrompt;
pub use frontend::{ReviewFrontend, TerminalFrontend};
pub use manager::ApprovalManager;
pub use types::{ApprovalDecision, ReviewPath, Verdict};

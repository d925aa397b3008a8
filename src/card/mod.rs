pub mod diff;
pub mod types;

pub use diff::{escape_controls, CardLine, DiffCard, LineStyle};
pub use types::*;

pub mod design;
pub mod record;
pub mod stage;

pub use design::DesignRow;
pub use record::{LOG_HEADER, LogRecord};
pub use stage::{Decision, ExpressionPhase, Stage};

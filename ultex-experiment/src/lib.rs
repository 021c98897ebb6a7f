pub mod config;
pub mod design;
pub mod logger;
pub mod session;

pub use config::SessionConfig;
pub use design::{Design, DesignError};
pub use logger::TrialLogger;
pub use session::{Recorder, Screen, Session, SessionEvent};

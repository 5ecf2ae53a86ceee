//! Core of the multiplication practice app: problem generation, the practice
//! session state machine, statistics over attempt history, and the
//! persistence contract. No UI code lives here.

pub mod clock;
pub mod error;
pub mod generator;
pub mod persist;
pub mod problem;
pub mod session;
pub mod settings;
pub mod stats;

pub use error::StoreError;
pub use persist::{Autosave, PersistedState, Store};
pub use problem::{CurrentProblem, PracticeAttempt, Problem};
pub use session::{PracticeSession, SessionPhase};
pub use settings::{PracticeMode, PracticeSettings, SettingsPatch};

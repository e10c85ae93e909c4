// Library surface shared by the binary and the integration tests.
// The TUI itself lives in main.rs and ui/.
pub mod analyzer;
pub mod app_dirs;
pub mod audio;
pub mod config;
pub mod corpus;
pub mod logging;
pub mod metrics;
pub mod result;
pub mod runtime;
pub mod session;
pub mod store;
pub mod time_series;
pub mod timer;
pub mod util;

pub use analyzer::{CharacterState, Mistake, MistakeKind};
pub use config::{Settings, SettingsOverride};
pub use corpus::TextMode;
pub use metrics::LiveStats;
pub use result::{SessionResult, StoredResult};
pub use session::{EndReason, Session, SessionState};

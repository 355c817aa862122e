pub mod probe;

pub use probe::{ProbeState, ProbeStatus, SettingsProbe, SettingsReport};

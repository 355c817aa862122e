pub mod http;
pub mod project_store;
pub mod simulated;

pub use http::HttpBackendAdapter;
pub use project_store::JsonFileProjectStore;
pub use simulated::SimulatedResponder;

pub mod app;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod plan;
pub mod session;
pub mod storage;
pub mod track;
pub mod ui;
pub mod state;

pub use app::router;
pub use session::Session;
pub use state::AppState;
pub use storage::{load_store, resolve_data_path};

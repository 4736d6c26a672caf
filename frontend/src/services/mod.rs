pub mod api;
pub mod session;

pub use api::*;
pub use session::session_token;

pub mod auth;
pub mod response;

pub use auth::{auth_gate_middleware, authenticate};
pub use response::{frame, ApiResponse, ApiResult, ResponseFrame};

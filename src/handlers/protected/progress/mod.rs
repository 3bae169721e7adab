mod get;
mod post;

// Re-export handler functions for use in routing
pub use get::progress_get;
pub use post::progress_post;

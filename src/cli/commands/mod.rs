pub mod migrate;
pub mod progress;
pub mod serve;

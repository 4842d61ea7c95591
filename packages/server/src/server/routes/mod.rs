// HTTP routes
pub mod fetch;
pub mod fetch_jobs;
pub mod health;

pub use fetch::*;
pub use fetch_jobs::*;
pub use health::*;

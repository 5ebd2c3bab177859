pub mod config;
pub mod products;
pub mod search;
pub mod stats;
pub mod status;

pub use products::list_products;
pub use search::{run_search, show_samples};
pub use stats::{show_stats, show_trends};
pub use status::show_status;

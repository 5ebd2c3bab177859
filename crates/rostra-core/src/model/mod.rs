pub mod product;
pub mod record;
pub mod result;
pub mod table;

pub use product::{DataProductAvailability, DataProductDefinition};
pub use record::{CanonicalRecord, Record};
pub use result::SearchResult;
pub use table::Table;

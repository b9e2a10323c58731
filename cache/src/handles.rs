mod sync;

pub use sync::Cache;

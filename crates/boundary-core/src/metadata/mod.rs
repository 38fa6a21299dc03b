pub mod resolver;
pub mod schema;

pub use resolver::{resolve, EMBEDDED_META_KEY};
pub use schema::RawMetadata;

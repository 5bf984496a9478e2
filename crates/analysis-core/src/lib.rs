pub mod error;
pub mod ingest;
pub mod numeric;
pub mod traits;
pub mod types;

pub use error::*;
pub use ingest::*;
pub use traits::*;
pub use types::*;

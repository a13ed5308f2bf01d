//! Input/output helpers.
//!
//! - Penn World Table CSV ingest (`ingest`)
//! - overlay CSV export (`export`)
//! - trend JSON read/write (`trend_file`)

pub mod export;
pub mod ingest;
pub mod trend_file;

pub use export::*;
pub use ingest::*;
pub use trend_file::*;

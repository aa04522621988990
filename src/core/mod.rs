/*!
 * Core Module
 * Memory, synchronization and string primitives plus shared error types
 */

pub mod data_structures;
pub mod errors;
pub mod hints;
pub mod limits;
pub mod memory;
pub mod sync;

// Re-export for convenience
pub use errors::*;
pub use hints::*;

//! Daily sequence number ("meu número") allocation.
//!
//! Several converters writing into the same directory share one counter per
//! calendar day. The counter lives in a small JSON file guarded by an
//! exclusive-create lock file, and is replaced atomically on every change.
//!
//! # Example
//!
//! ```no_run
//! use remessa_sequence::SequenceAllocator;
//!
//! let allocator = SequenceAllocator::new("out").unwrap();
//! let numbers = allocator.allocate("20250903", 3).unwrap();
//! assert_eq!(numbers.len(), 3);
//! ```

mod allocator;
mod error;
mod lock;
mod state;

pub use allocator::{
    AllocatorOptions, LOCK_FILENAME, MAX_SEQUENCE, STATE_FILENAME, SequenceAllocator,
    format_sequence,
};
pub use error::{Result, SequenceError};
pub use state::SequenceState;

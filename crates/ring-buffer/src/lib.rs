//! Fixed-Capacity Ring Buffer
//!
//! Provides the bounded, index-based history used to smooth per-frame
//! attention decisions:
//! - [`RingBuffer`]: pre-allocated storage that overwrites the oldest entry
//! - [`VoteWindow`]: boolean history with running tallies for majority votes
//! - [`RollingMean`]: short moving average over scalar samples

mod buffer;
mod window;

pub use buffer::RingBuffer;
pub use window::{RollingMean, VoteWindow, WindowSnapshot};

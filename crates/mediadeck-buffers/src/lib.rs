//! # mediadeck-buffers
//!
//! Bounded in-memory buffers used around the library index:
//!
//! - [`ThumbnailCache`]: LRU cache of thumbnail bytes with age expiry
//! - [`HistoryStack`]: most-recent-first prompt history, deduplicated by id
//! - [`BatchQueue`]: FIFO staging queue that drops the oldest item on overflow
//!
//! None of these block or run background work. Capacity evictions are
//! silent and deterministic.

pub mod batch_queue;
pub mod clock;
pub mod history;
pub mod thumbnail_cache;

pub use batch_queue::BatchQueue;
pub use clock::{Clock, ManualClock, SystemClock};
pub use history::HistoryStack;
pub use thumbnail_cache::{CacheStats, ThumbnailCache};

/// Status label for posts that went live on every target platform.
pub const STATUS_PUBLISHED: &str = "published";

/// Status label for posts still waiting on the publishing pipeline.
pub const STATUS_PENDING: &str = "pending";

/// Status label for posts rejected by at least one platform.
pub const STATUS_FAILED: &str = "failed";

/// Status label for unsubmitted posts.
pub const STATUS_DRAFT: &str = "draft";

/// Platform labels known to the upload flow. Providers may send others.
pub const PLATFORM_YOUTUBE: &str = "youtube";
pub const PLATFORM_INSTAGRAM: &str = "instagram";
pub const PLATFORM_TIKTOK: &str = "tiktok";

/// Default number of thumbnails held in memory.
pub const DEFAULT_THUMBNAIL_CACHE_SIZE: usize = 100;

/// Default thumbnail lifetime in seconds (30 minutes).
pub const DEFAULT_THUMBNAIL_MAX_AGE_SECS: u64 = 30 * 60;

/// Default number of prompts kept in the generation history.
pub const DEFAULT_HISTORY_SIZE: usize = 50;

/// Default capacity of the staging queue (one page of posts).
pub const DEFAULT_BATCH_QUEUE_SIZE: usize = 50;

// Service exports
pub mod analytics;
pub mod cache;
pub mod directory;
pub mod push;

pub use analytics::{AnalyticsSink, NoopAnalytics, RedisAnalytics};
pub use cache::{CacheError, CacheKey, CacheManager};
pub use directory::{DirectoryError, HttpUserDirectory, MemoryUserDirectory, UserDirectory};
pub use push::{
    NotificationEvent, NotificationSink, PushError, PushGatewayClient, RecordingNotifications,
};

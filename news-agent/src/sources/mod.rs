pub mod gnews;
pub mod newsdata;
pub mod rss_feed;

pub use gnews::GNewsSource;
pub use newsdata::NewsDataSource;
pub use rss_feed::{default_feed_urls, RssFeedSource};

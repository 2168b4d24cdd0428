//! Ranked feed engine (§4.1).

pub mod alignment;
pub mod engine;
pub mod geo;

pub use engine::{
    get_daily_picks, get_feed, FeedProfile, FeedResult, Priority, DAILY_PICKS_COUNT,
    MAX_FEED_LIMIT, MIN_FEED_LIMIT,
};

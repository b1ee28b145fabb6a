mod collection;
mod memory;
mod store;

pub use collection::{sort_newest_first, HistoryCollection, HistoryFeed, HistoryItem, NewHistoryItem};
pub use memory::InMemoryHistoryCollection;
pub use store::{HistoryStore, HistorySubscription};

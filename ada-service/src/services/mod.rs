pub mod access;
pub mod chronicle;
pub mod forge;
pub mod keys;
pub mod metrics;
pub mod narrator;
pub mod repository;
pub mod roster;
pub mod rules;
pub mod session;
pub mod store;
pub mod text;

pub use narrator::{LocalNarrator, Narrator};
pub use repository::Repository;
pub use session::SessionService;
pub use store::{KvStore, MemoryStore, RedisStore};

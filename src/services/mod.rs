//! Collaborators the registry delegates to, and their in-memory implementations.
//!
//! | Seam                    | Built-in                  | Used by                         |
//! |-------------------------|---------------------------|---------------------------------|
//! | [`ConditionOperator`]   | [`ComparisonOperator`]    | subject/condition filtering     |
//! | [`CacheInvalidator`]    | [`InvalidationStore`]     | `clear_caches` actions          |
//! | [`ServiceLocator`]      | [`Container`]             | service calls, object storages  |

mod cache;
mod condition;
mod locator;

pub use cache::{CacheInvalidator, InvalidationStore};
pub use condition::{ComparisonOperator, ConditionOperator};
pub use locator::{Container, Service, ServiceLocator, Storage};

pub mod adapter;
pub mod memory;
pub mod store;

pub use adapter::{RecordAdapter, BMI_HISTORY_LIMIT, WATER_PREFERENCE_LIMIT};
pub use memory::InMemoryRecordStore;
pub use store::{PgRecordStore, RecordStore};

pub mod association;
pub mod store;

pub mod error;
pub mod event;
pub mod grid;
pub mod selection;
pub mod store;

//! State machines for the kiosk control loop.

pub mod page_sm;

pub use page_sm::PageHealth;

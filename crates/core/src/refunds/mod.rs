//! Refund allocation across order line items.

mod allocator;

pub use allocator::{allocate_refund, item_weight};

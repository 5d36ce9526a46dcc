//! Record managers exposed to application code.
//!
//! # Responsibility
//! - Offer list/get/save/delete/toggle-status per entity family.
//! - Keep callers unaware of which store is authoritative.

pub mod record_manager;

//! # Export Event Bus
//!
//! Publish/subscribe channel for export job notifications. Workers publish
//! `Started`, `Progress` and `Finished` events; presentation layers either
//! register a synchronous handler or poll a broadcast receiver.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fabkit_core::event_bus::{export_event_bus, EventCategory, EventFilter, ExportEvent};
//!
//! let subscription = export_event_bus().subscribe(
//!     EventFilter::Categories(vec![EventCategory::Progress]),
//!     |event| {
//!         if let ExportEvent::Progress { percent, .. } = event {
//!             println!("{}%", percent);
//!         }
//!     },
//! );
//!
//! export_event_bus().unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;

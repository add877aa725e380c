//! orthodesk: appointment scheduling for the workshop back office.
//!
//! The core is booking with multi-staff conflict detection: intervals are
//! rebuilt from stored wall-clock fields ([`scheduling`]), every assigned
//! staff member's day is probed for overlap, and the check-then-persist
//! sequence runs as one unit of work inside [`db`]. A periodic
//! [`reminder`] sweeper dispatches at-most-once reminders, and outbound
//! events go through the [`notify::Notifier`] capability instead of a
//! concrete transport.

pub mod api;
pub mod booking;
pub mod db;
pub mod error;
pub mod models;
pub mod notify;
pub mod reminder;
pub mod scheduling;

//! Domain models for orthodesk.
//!
//! # Core Concepts
//!
//! - [`Appointment`]: a booked visit against one or more staff calendars.
//!   Its date and time fields are local wall-clock values; concrete
//!   intervals are reconstructed from them on demand.
//! - [`StaffAssignment`]: join row between an appointment and a staff
//!   member. Legacy single-assignee bookings instead carry a denormalized
//!   `staff_id` directly on the appointment; both forms are readable.
//! - [`Staff`] and [`Customer`]: collaborator entities consulted read-only
//!   (existence and display-name lookup).
//! - [`CustomerHistoryEntry`]: append-only trail of customer-facing events,
//!   written as a side effect of client-visit bookings.

mod appointment;
mod assignment;
mod customer;
mod staff;

pub use appointment::*;
pub use assignment::*;
pub use customer::*;
pub use staff::*;

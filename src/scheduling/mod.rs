//! Pure time logic: interval construction, the overlap policy, and
//! free-slot generation. Nothing in here touches the database.

mod interval;
mod overlap;
mod slots;

pub use interval::*;
pub use overlap::*;
pub use slots::*;

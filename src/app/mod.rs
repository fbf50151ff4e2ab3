//! Application boundary: the ports the tracking core talks through and
//! the events it emits.  No I/O lives here.

pub mod events;
pub mod ports;

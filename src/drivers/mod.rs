//! Hardware initialisation and thread placement.

pub mod hw_init;
pub mod task_pin;

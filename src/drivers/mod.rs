//! Hardware initialisation, the tick timer, and pinned-thread helpers.

pub mod hw_init;
pub mod hw_timer;
pub mod task_pin;

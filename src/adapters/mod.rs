//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements   | Connects to                   |
//! |------------|--------------|-------------------------------|
//! | `log_sink` | EventSink    | Serial log output             |
//! | `shutdown` | ShutdownPort | Run-enable + fault lamp GPIO  |
//! | `time`     | Clock        | ESP32 high-resolution timer   |

pub mod log_sink;
pub mod shutdown;
pub mod time;

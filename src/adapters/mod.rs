//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter    | Implements                  | Connects to              |
//! |------------|-----------------------------|--------------------------|
//! | `hardware` | MillivoltReader             | ESP32 ADC oneshot + cali |
//! |            | OutputPin / InputPin        | ESP32 GPIO               |
//! | `log_sink` | EventSink                   | Serial log output        |

pub mod hardware;
pub mod log_sink;

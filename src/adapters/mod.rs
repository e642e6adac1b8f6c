//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter          | Implements         | Connects to                 |
//! |------------------|--------------------|-----------------------------|
//! | `baseline_store` | BaselineStorePort  | any StoragePort (NVS)       |
//! | `hardware`       | AirSensorPort      | SGP30 over I²C              |
//! |                  | IndicatorPort      | Alert LED GPIO              |
//! | `log_sink`       | EventSink          | Serial log output           |
//! | `nvs`            | ConfigPort         | NVS / in-memory store       |
//! |                  | StoragePort        |                             |
//! | `time`           | ClockPort          | ESP32 system timer + TWDT   |

pub mod baseline_store;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;

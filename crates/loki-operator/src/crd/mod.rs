//! Custom resources read or written by the operator.

pub mod lokistack;
pub mod service_monitor;

//! Accelerator offload backend

/// Device trait and host-emulated device
pub mod device;
/// Device-resident generation loop
pub mod offload;

pub use device::{ComputeDevice, DeviceBuffer, HostDevice};
pub use offload::Accelerator;

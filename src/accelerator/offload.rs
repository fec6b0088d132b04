//! Generation loop running entirely on a compute device

use tracing::info;

use crate::accelerator::device::{ComputeDevice, DeviceBuffer};
use crate::io::error::{Result, WithContext, invalid_parameter};
use crate::spatial::grid::Grid;

/// Offloads every generation to a [`ComputeDevice`]
///
/// The grid stays on the device between generations: each one is a single
/// kernel launch followed by swapping the input and output handles. No change
/// flag is read back, so the loop never detects stabilization.
#[derive(Debug)]
pub struct Accelerator<D> {
    device: D,
    current: DeviceBuffer,
    next: DeviceBuffer,
    global: [usize; 2],
    local: [usize; 2],
}

impl<D: ComputeDevice> Accelerator<D> {
    /// Upload `initial` into two device buffers
    ///
    /// `local` is the work-group shape as `[rows, cols]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the work-group shape is zero or does not divide the
    /// grid, or the device cannot allocate the buffers
    pub fn new(mut device: D, initial: &Grid, local: [usize; 2]) -> Result<Self> {
        let global = [initial.rows(), initial.cols()];
        for (extent, group) in global.into_iter().zip(local) {
            if group == 0 || !extent.is_multiple_of(group) {
                return Err(invalid_parameter(
                    "device_tile",
                    &format!("{}x{}", local[0], local[1]),
                    &format!("work-groups must evenly divide the {}x{} grid", global[0], global[1]),
                ));
            }
        }

        let current = device.create_buffer(initial)?;
        let next = device.create_buffer(initial)?;
        Ok(Self {
            device,
            current,
            next,
            global,
            local,
        })
    }

    /// Run exactly `nb_iter` generations on the device
    ///
    /// Always returns 0: stabilization is never detected on this path.
    ///
    /// # Errors
    ///
    /// Returns the first submission failure, tagged with its generation
    pub fn compute(&mut self, nb_iter: u32) -> Result<u32> {
        for generation in 1..=nb_iter {
            self.submit().with_generation(generation)?;
        }
        self.device.finish()?;
        info!(nb_iter, "device generations complete");
        Ok(0)
    }

    fn submit(&mut self) -> Result<()> {
        self.device.set_kernel_arg(0, self.current)?;
        self.device.set_kernel_arg(1, self.next)?;
        self.device.enqueue_kernel(self.global, self.local)?;
        std::mem::swap(&mut self.current, &mut self.next);
        Ok(())
    }

    /// Copy the latest completed generation back to the host
    ///
    /// # Errors
    ///
    /// Returns an error if the device read fails
    pub fn read_back(&mut self) -> Result<Grid> {
        self.device.read_buffer(self.current)
    }

    /// Work-group shape as `[rows, cols]`
    pub const fn local(&self) -> [usize; 2] {
        self.local
    }

    /// Borrow the device
    pub const fn device(&self) -> &D {
        &self.device
    }
}

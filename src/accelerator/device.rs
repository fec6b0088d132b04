//! Compute device abstraction and a host-emulated implementation
//!
//! The device model mirrors a GPU command queue: buffers live on the device
//! and are addressed by handle, kernel arguments are bound by index, and
//! launches are queued in order and only guaranteed complete after `finish`
//! or a blocking read.

use std::collections::VecDeque;

use ndarray::ArrayViewMut2;
use rayon::prelude::*;
use tracing::trace;

use crate::algorithm::rule;
use crate::io::error::{Result, device_error};
use crate::spatial::grid::{Cell, Grid};

/// Handle to a buffer in device memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceBuffer(usize);

impl DeviceBuffer {
    /// Device-local buffer index
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Number of arguments the life kernel takes (input grid, output grid)
pub const KERNEL_ARGS: usize = 2;

/// Minimal command interface of an accelerator running the life kernel
///
/// Argument 0 is the input grid and argument 1 the output grid. The kernel
/// copies border cells unchanged and applies the rule to every other cell.
pub trait ComputeDevice {
    /// Allocate a buffer initialized with the contents of `initial`
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot allocate the buffer
    fn create_buffer(&mut self, initial: &Grid) -> Result<DeviceBuffer>;

    /// Bind a buffer to a kernel argument slot
    ///
    /// # Errors
    ///
    /// Returns an error if the slot or the buffer does not exist
    fn set_kernel_arg(&mut self, index: usize, buffer: DeviceBuffer) -> Result<()>;

    /// Queue one kernel launch over a `global` range in `local` work-groups
    ///
    /// Ranges are `[rows, cols]`. The launch captures the arguments bound at
    /// the time of the call.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments are unbound or aliased, or the ranges
    /// do not fit the bound buffers
    fn enqueue_kernel(&mut self, global: [usize; 2], local: [usize; 2]) -> Result<()>;

    /// Block until every queued launch has completed
    ///
    /// # Errors
    ///
    /// Returns an error if a queued launch fails
    fn finish(&mut self) -> Result<()>;

    /// Wait for the queue to drain and copy a buffer back to the host
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer does not exist or a queued launch fails
    fn read_buffer(&mut self, buffer: DeviceBuffer) -> Result<Grid>;
}

#[derive(Debug, Clone, Copy)]
struct Launch {
    input: DeviceBuffer,
    output: DeviceBuffer,
    local: [usize; 2],
}

/// Device emulated on the host CPU
///
/// Launches are deferred until `finish` or a read; each work-group of a launch
/// is evaluated as an independent rayon task.
#[derive(Debug, Default)]
pub struct HostDevice {
    buffers: Vec<Grid>,
    args: [Option<DeviceBuffer>; KERNEL_ARGS],
    queue: VecDeque<Launch>,
}

impl HostDevice {
    /// Create a device with no buffers and an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of launches waiting in the queue
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    fn buffer(&self, handle: DeviceBuffer) -> Result<&Grid> {
        self.buffers.get(handle.0).ok_or_else(|| {
            device_error("lookup", &format!("no buffer with handle {}", handle.0))
        })
    }

    fn execute(&mut self, launch: Launch) -> Result<()> {
        self.buffer(launch.input)?;
        let slot = self.buffers.get_mut(launch.output.0).ok_or_else(|| {
            device_error("execute", &format!("no buffer with handle {}", launch.output.0))
        })?;
        // Moved out while the work-groups write it, restored below
        let mut output = std::mem::take(slot);
        let input = self.buffer(launch.input)?;

        let [group_rows, group_cols] = launch.local;
        let groups_per_row = output.cols() / group_cols;
        let mut cells = output.cells_mut();
        let groups: Vec<(usize, ArrayViewMut2<'_, Cell>)> = cells
            .exact_chunks_mut((group_rows, group_cols))
            .into_iter()
            .enumerate()
            .collect();

        trace!(groups = groups.len(), "executing launch");
        groups.into_par_iter().for_each(|(index, group)| {
            let origin = [
                index / groups_per_row * group_rows,
                index % groups_per_row * group_cols,
            ];
            run_work_group(input, origin, group);
        });

        if let Some(target) = self.buffers.get_mut(launch.output.0) {
            *target = output;
        }
        Ok(())
    }
}

/// Kernel body for one work-group whose first work-item sits at `origin`
fn run_work_group(input: &Grid, origin: [usize; 2], mut group: ArrayViewMut2<'_, Cell>) {
    let (rows, cols) = input.dim();
    for ((r, c), cell) in group.indexed_iter_mut() {
        let (row, col) = (origin[0] + r, origin[1] + c);
        *cell = if row == 0 || col == 0 || row + 1 == rows || col + 1 == cols {
            input.get(row, col)
        } else {
            rule::next_state(input, row, col).0
        };
    }
}

impl ComputeDevice for HostDevice {
    fn create_buffer(&mut self, initial: &Grid) -> Result<DeviceBuffer> {
        self.buffers.push(initial.clone());
        Ok(DeviceBuffer(self.buffers.len() - 1))
    }

    fn set_kernel_arg(&mut self, index: usize, buffer: DeviceBuffer) -> Result<()> {
        self.buffer(buffer)?;
        let slot = self.args.get_mut(index).ok_or_else(|| {
            device_error(
                "set_kernel_arg",
                &format!("kernel takes {KERNEL_ARGS} arguments, got index {index}"),
            )
        })?;
        *slot = Some(buffer);
        Ok(())
    }

    fn enqueue_kernel(&mut self, global: [usize; 2], local: [usize; 2]) -> Result<()> {
        let [Some(input), Some(output)] = self.args else {
            return Err(device_error("enqueue", &"kernel arguments are not all bound"));
        };
        if input == output {
            return Err(device_error("enqueue", &"input and output alias the same buffer"));
        }
        if local.contains(&0) {
            return Err(device_error("enqueue", &"work-group dimensions must be nonzero"));
        }
        if !global[0].is_multiple_of(local[0]) || !global[1].is_multiple_of(local[1]) {
            return Err(device_error(
                "enqueue",
                &format!("global range {global:?} is not a multiple of work-group {local:?}"),
            ));
        }
        for handle in [input, output] {
            let (rows, cols) = self.buffer(handle)?.dim();
            if [rows, cols] != global {
                return Err(device_error(
                    "enqueue",
                    &format!("global range {global:?} does not cover buffer of {rows}x{cols}"),
                ));
            }
        }

        self.queue.push_back(Launch {
            input,
            output,
            local,
        });
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        while let Some(launch) = self.queue.pop_front() {
            self.execute(launch)?;
        }
        Ok(())
    }

    fn read_buffer(&mut self, buffer: DeviceBuffer) -> Result<Grid> {
        self.finish()?;
        self.buffer(buffer).cloned()
    }
}

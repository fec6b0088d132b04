//! Tests for the host-emulated compute device

#[cfg(test)]
mod tests {
    use tiled_life::LifeError;
    use tiled_life::accelerator::device::{ComputeDevice, HostDevice};
    use tiled_life::algorithm::executor::Executor;
    use tiled_life::io::configuration::ALIVE;
    use tiled_life::io::seeds::PatternRegistry;
    use tiled_life::spatial::grid::Grid;
    use tiled_life::spatial::tiles::Region;

    fn sequential_step(current: &Grid) -> Grid {
        let executor = Executor::sequential();
        let mut next = current.clone();
        let region = Region::interior(current.rows(), current.cols());
        let blocks = executor.decompose_rows(&mut next, region);
        executor.dispatch(current, blocks);
        next
    }

    fn is_device_error(result: &tiled_life::Result<()>) -> bool {
        matches!(result, Err(LifeError::DeviceSubmission { .. }))
    }

    // Tests a launch needs both arguments bound
    // Verified by defaulting the output argument to the input
    #[test]
    fn test_unbound_arguments() {
        let mut device = HostDevice::new();
        let buffer = device
            .create_buffer(&Grid::square(8))
            .unwrap_or_else(|error| unreachable!("{error}"));
        assert!(is_device_error(&device.enqueue_kernel([8, 8], [4, 4])));

        assert!(device.set_kernel_arg(0, buffer).is_ok());
        assert!(is_device_error(&device.enqueue_kernel([8, 8], [4, 4])));
        assert!(device.set_kernel_arg(2, buffer).is_err());
        assert_eq!(device.pending(), 0);
    }

    // Tests input and output may not be the same buffer
    // Verified by removing the aliasing check
    #[test]
    fn test_aliased_arguments() {
        let mut device = HostDevice::new();
        let buffer = device
            .create_buffer(&Grid::square(8))
            .unwrap_or_else(|error| unreachable!("{error}"));
        assert!(device.set_kernel_arg(0, buffer).is_ok());
        assert!(device.set_kernel_arg(1, buffer).is_ok());
        assert!(is_device_error(&device.enqueue_kernel([8, 8], [4, 4])));
    }

    // Tests launch ranges must tile the bound buffers exactly
    // Verified by accepting a global range smaller than the buffer
    #[test]
    fn test_launch_ranges() {
        let mut device = HostDevice::new();
        let grid = Grid::square(12);
        let input = device.create_buffer(&grid).unwrap_or_else(|error| unreachable!("{error}"));
        let output = device.create_buffer(&grid).unwrap_or_else(|error| unreachable!("{error}"));
        assert!(device.set_kernel_arg(0, input).is_ok());
        assert!(device.set_kernel_arg(1, output).is_ok());

        assert!(is_device_error(&device.enqueue_kernel([12, 12], [5, 4])));
        assert!(is_device_error(&device.enqueue_kernel([12, 12], [0, 4])));
        assert!(is_device_error(&device.enqueue_kernel([8, 8], [4, 4])));
        assert!(device.enqueue_kernel([12, 12], [3, 4]).is_ok());
        assert_eq!(device.pending(), 1);
    }

    // Tests launches are deferred and a read drains the queue in order
    // Verified by executing launches in reverse order on finish
    #[test]
    fn test_deferred_queue() {
        let mut initial = Grid::square(8);
        for col in 2..5 {
            initial.set(3, col, ALIVE);
        }
        let mut device = HostDevice::new();
        let first = device.create_buffer(&initial).unwrap_or_else(|error| unreachable!("{error}"));
        let second = device.create_buffer(&initial).unwrap_or_else(|error| unreachable!("{error}"));

        for (input, output) in [(first, second), (second, first)] {
            assert!(device.set_kernel_arg(0, input).is_ok());
            assert!(device.set_kernel_arg(1, output).is_ok());
            assert!(device.enqueue_kernel([8, 8], [4, 8]).is_ok());
        }
        assert_eq!(device.pending(), 2);

        // Two blinker generations land back on the initial phase
        let read = device.read_buffer(first).unwrap_or_else(|error| unreachable!("{error}"));
        assert_eq!(device.pending(), 0);
        assert_eq!(read, initial);
        let middle = device.read_buffer(second).unwrap_or_else(|error| unreachable!("{error}"));
        assert_eq!(middle, sequential_step(&initial));
        assert_ne!(middle, initial);
    }

    // Tests one launch computes one generation and copies the border
    // Verified by applying the rule to border work-items
    #[test]
    fn test_launch_matches_sequential_generation() {
        let mut initial = PatternRegistry::new()
            .seed("random", 16, 4)
            .unwrap_or_else(|error| unreachable!("{error}"));
        for col in 0..16 {
            initial.set(0, col, ALIVE);
        }

        let mut device = HostDevice::new();
        let input = device.create_buffer(&initial).unwrap_or_else(|error| unreachable!("{error}"));
        let output = device.create_buffer(&Grid::square(16)).unwrap_or_else(|error| unreachable!("{error}"));
        assert!(device.set_kernel_arg(0, input).is_ok());
        assert!(device.set_kernel_arg(1, output).is_ok());
        assert!(device.enqueue_kernel([16, 16], [4, 8]).is_ok());
        assert!(device.finish().is_ok());

        let result = device.read_buffer(output).unwrap_or_else(|error| unreachable!("{error}"));
        assert_eq!(result.border(), initial.border());
        assert_eq!(result, sequential_step(&initial));
    }
}

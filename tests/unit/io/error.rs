//! Tests for error types including source chaining and message formatting

#[cfg(test)]
mod tests {
    use std::error::Error;
    use tiled_life::LifeError;
    use tiled_life::io::error::{WithContext, communication_error, device_error, invalid_parameter};

    // Tests messages name the failing parameter, value and reason
    // Verified by dropping the value from the message
    #[test]
    fn test_display_messages() {
        let error = invalid_parameter("grain", &7, &"must divide 512");
        assert_eq!(error.to_string(), "Invalid parameter 'grain' = '7': must divide 512");

        let unknown = LifeError::UnknownPattern {
            name: "spaceship".to_string(),
            available: vec!["guns", "stable"],
        };
        assert_eq!(unknown.to_string(), "Unknown pattern 'spaceship' (available: guns, stable)");

        let comm = communication_error(2, "gather", &"peer hung up");
        assert_eq!(comm.to_string(), "Rank 2 failed during gather: peer hung up");
        assert!(comm.source().is_none());
    }

    // Tests generation context is attached to run-time failures only
    // Verified by tagging parameter errors as well
    #[test]
    fn test_with_generation() {
        let device: Result<(), LifeError> = Err(device_error("enqueue", &"queue lost"));
        let tagged = device.with_generation(4);
        assert!(matches!(
            tagged,
            Err(LifeError::DeviceSubmission { generation: Some(4), .. })
        ));
        assert!(
            tagged
                .err()
                .is_some_and(|error| error.to_string().ends_with("(generation 4)"))
        );

        let comm: Result<(), LifeError> = Err(communication_error(1, "halo", &"closed"));
        assert!(matches!(
            comm.with_generation(9),
            Err(LifeError::Communication { generation: Some(9), .. })
        ));

        let param: Result<(), LifeError> = Err(invalid_parameter("dim", &2, &"too small"));
        assert!(param.with_generation(3).err().is_some_and(|error| !error.to_string().contains("generation")));

        let ok: Result<u32, LifeError> = Ok(5);
        assert_eq!(ok.with_generation(1).ok(), Some(5));
    }

    // Tests error source chaining works correctly
    // Verified by breaking source chain
    #[test]
    fn test_thread_pool_source() {
        let build = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .spawn_handler(|_| Err(std::io::Error::other("no threads")))
            .build();
        let Err(source) = build else {
            unreachable!("spawn handler always fails");
        };
        let error = LifeError::from(source);
        assert!(error.source().is_some());
        assert!(error.to_string().starts_with("Failed to build worker pool"));
    }
}

//! Tests for engine constants and configuration validation

#[cfg(test)]
mod tests {
    use tiled_life::LifeError;
    use tiled_life::algorithm::policy::{Granularity, Policy};
    use tiled_life::io::configuration::{
        ALIVE, DEFAULT_DEVICE_TILE, DEFAULT_DIM, DEFAULT_GRAIN, EngineConfig, MAX_DIM, MIN_TRANCHE,
        resolve_workers,
    };

    // Tests defaults describe a valid tiling
    // Verified by changing DEFAULT_GRAIN to a non-divisor
    #[test]
    fn test_defaults_validate() {
        assert_eq!(DEFAULT_DIM % DEFAULT_GRAIN, 0);
        assert!(DEFAULT_DIM / DEFAULT_GRAIN >= MIN_TRANCHE);
        assert_eq!(DEFAULT_DIM % DEFAULT_DEVICE_TILE[0], 0);
        assert_ne!(ALIVE, 0);

        let tiling = EngineConfig::default()
            .validate()
            .unwrap_or_else(|error| unreachable!("{error}"));
        assert_eq!(tiling.dim(), DEFAULT_DIM);
        assert_eq!(tiling.grain(), DEFAULT_GRAIN);
    }

    // Tests each out-of-range parameter is named in the error
    // Verified by skipping the MAX_DIM check
    #[test]
    fn test_validate_rejects() {
        let too_large = EngineConfig {
            dim: MAX_DIM + 8,
            grain: 8,
            ..EngineConfig::default()
        };
        assert!(matches!(
            too_large.validate(),
            Err(LifeError::InvalidParameter { parameter: "dim", .. })
        ));

        let zero_chunk = EngineConfig {
            policy: Policy::Dynamic { chunk: 0 },
            ..EngineConfig::default()
        };
        assert!(zero_chunk.validate().is_err());

        let uneven = EngineConfig {
            dim: 100,
            grain: 8,
            ..EngineConfig::default()
        };
        assert!(uneven.validate().is_err());
    }

    // Tests the optimizer flag selects the dirty-tile stepper
    // Verified by ignoring skip_stable_tiles in build_stepper
    #[test]
    fn test_build_stepper() {
        let mut config = EngineConfig {
            dim: 32,
            grain: 4,
            workers: 2,
            policy: Policy::Collapsed,
            granularity: Granularity::Tiles,
            skip_stable_tiles: false,
        };
        let sweep = config.build_stepper().unwrap_or_else(|error| unreachable!("{error}"));
        assert_eq!(sweep.name(), "collapse");

        config.skip_stable_tiles = true;
        let dirty = config.build_stepper().unwrap_or_else(|error| unreachable!("{error}"));
        assert_eq!(dirty.name(), "dirty");

        config.grain = 5;
        assert!(config.build_stepper().is_err());
    }

    // Tests zero workers resolves to the machine's parallelism
    // Verified by returning 0 unchanged
    #[test]
    fn test_resolve_workers() {
        assert_eq!(resolve_workers(6), 6);
        assert!(resolve_workers(0) >= 1);
        let config = EngineConfig {
            workers: 3,
            ..EngineConfig::default()
        };
        assert_eq!(config.effective_workers(), 3);
    }
}

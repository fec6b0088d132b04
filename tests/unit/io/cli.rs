//! Tests for command-line parsing and the backend runner

#[cfg(test)]
mod tests {
    use clap::Parser;
    use std::time::Duration;
    use tiled_life::LifeError;
    use tiled_life::algorithm::policy::{Granularity, Policy};
    use tiled_life::distributed::BoundaryMode;
    use tiled_life::io::cli::{Backend, Cli, Report, Runner, parse_device_tile};
    use tiled_life::io::configuration::{DEFAULT_DIM, DEFAULT_GRAIN, DEFAULT_ITERATIONS, DEFAULT_PATTERN};
    use tiled_life::io::seeds::PatternRegistry;

    fn parse(args: &[&str]) -> Cli {
        let argv = std::iter::once("tiled-life").chain(args.iter().copied());
        Cli::try_parse_from(argv).unwrap_or_else(|error| unreachable!("{error}"))
    }

    fn run(args: &[&str]) -> Report {
        Runner::new(parse(args))
            .run()
            .unwrap_or_else(|error| unreachable!("{error}"))
    }

    // Tests work-group shapes accept both forms and reject zero sides
    // Verified by splitting only on lowercase x
    #[test]
    fn test_parse_device_tile() {
        assert_eq!(parse_device_tile("8x16").ok(), Some([8, 16]));
        assert_eq!(parse_device_tile("4X2").ok(), Some([4, 2]));
        assert_eq!(parse_device_tile("12").ok(), Some([12, 12]));
        assert!(parse_device_tile("0x4").is_err());
        assert!(parse_device_tile("ax4").is_err());
        assert!(parse_device_tile("").is_err());
    }

    // Tests CLI parsing with no arguments uses the defaults
    // Verified by changing default values to ensure defaults are used
    #[test]
    fn test_cli_defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.dim, DEFAULT_DIM);
        assert_eq!(cli.grain, DEFAULT_GRAIN);
        assert_eq!(cli.iterations, DEFAULT_ITERATIONS);
        assert_eq!(cli.pattern, DEFAULT_PATTERN);
        assert_eq!(cli.backend, Backend::Shared);
        assert_eq!(cli.strategy, Policy::StaticBlock);
        assert_eq!(cli.granularity, Granularity::Rows);
        assert_eq!(cli.boundary, BoundaryMode::Exchange);
        assert_eq!(cli.device_tile, None);
        assert!(cli.should_show_progress());
        assert!(!cli.engine_config().skip_stable_tiles);
    }

    // Tests CLI parsing with every option set
    // Verified by modifying custom parsers to ensure they're invoked
    #[test]
    fn test_cli_all_args() {
        let cli = parse(&[
            "-n", "64", "-g", "4", "-i", "50", "-p", "clown", "--seed", "9", "-b", "distributed",
            "-s", "cyclic:4", "--granularity", "tiles", "-t", "3", "--skip-stable", "--ranks",
            "2", "--boundary", "frozen", "--device-tile", "8x4", "-q", "-vv",
        ]);
        assert_eq!(cli.backend, Backend::Distributed);
        assert_eq!(cli.strategy, Policy::StaticCyclic { chunk: 4 });
        assert_eq!(cli.boundary, BoundaryMode::Frozen);
        assert_eq!(cli.device_tile, Some([8, 4]));
        assert_eq!(cli.verbose, 2);
        assert!(!cli.should_show_progress());

        let config = cli.engine_config();
        assert_eq!((config.dim, config.grain, config.workers), (64, 4, 3));
        assert_eq!(config.granularity, Granularity::Tiles);
        assert!(config.skip_stable_tiles);
    }

    // Tests malformed options are rejected by the parser
    // Verified by accepting a zero chunk in the policy parser
    #[test]
    fn test_cli_rejects_bad_values() {
        for args in [
            ["-s", "cyclic:x"],
            ["-b", "gpu"],
            ["--boundary", "wrap"],
            ["--device-tile", "0"],
        ] {
            let argv = std::iter::once("tiled-life").chain(args);
            assert!(Cli::try_parse_from(argv).is_err(), "{args:?}");
        }
    }

    // Tests a still life stabilizes at generation 1 on the shared backend
    // Verified by reporting the generation before the unchanged one
    #[test]
    fn test_runner_shared_still_life() {
        for extra in [&[][..], &["--skip-stable"][..], &["--granularity", "tiles"][..]] {
            let mut args = vec!["-n", "32", "-g", "4", "-p", "stable", "-q", "-t", "2"];
            args.extend_from_slice(extra);
            let report = run(&args);
            assert_eq!(report.generation, 1, "{extra:?}");
            assert_eq!(report.backend, Backend::Shared);
        }
    }

    // Tests the accelerator backend runs every generation and reports 0
    // Verified by stopping the device loop at stabilization
    #[test]
    fn test_runner_accelerator() {
        let report = run(&["-n", "32", "-g", "4", "-p", "stable", "-i", "5", "-b", "accelerator", "-q"]);
        assert_eq!(report.generation, 0);
        assert_eq!(report.strategy, "device:16x16");
        assert_eq!(report.population, 8 * 8 * 4);

        let tiled = run(&["-n", "32", "-g", "4", "-b", "accelerator", "--device-tile", "8x4", "-i", "3", "-q"]);
        assert_eq!(tiled.strategy, "device:8x4");
    }

    // Tests the distributed backend agrees with the shared one
    // Verified by dropping the last rank's gathered rows
    #[test]
    fn test_runner_distributed_matches_shared() {
        let common = ["-n", "32", "-g", "4", "-p", "random", "--seed", "3", "-i", "40", "-q"];
        let shared = run(&common);

        let mut args = common.to_vec();
        args.extend_from_slice(&["-b", "distributed", "--ranks", "4"]);
        let distributed = run(&args);

        assert_eq!(distributed.generation, shared.generation);
        assert_eq!(distributed.population, shared.population);
        assert_eq!(distributed.strategy, "distributed:4/exchange");
    }

    // Tests the distributed backend refuses options it would ignore
    // Verified by dropping the granularity check
    #[test]
    fn test_distributed_rejects_shared_only_options() {
        for extra in [&["--skip-stable"][..], &["--granularity", "tiles"][..]] {
            let mut args = vec!["-n", "32", "-g", "4", "-q", "-b", "distributed", "--ranks", "2"];
            args.extend_from_slice(extra);
            let runner = Runner::new(parse(&args));
            assert!(
                matches!(runner.check_backend_options(), Err(LifeError::InvalidParameter { .. })),
                "{extra:?}"
            );
            assert!(runner.run().is_err(), "{extra:?}");
        }

        let shared = Runner::new(parse(&["--skip-stable", "--granularity", "tiles"]));
        assert!(shared.check_backend_options().is_ok());
    }

    // Tests an unknown pattern falls back to the default one
    // Verified by seeding an empty grid for unknown names
    #[test]
    fn test_runner_unknown_pattern_falls_back() {
        let runner = Runner::new(parse(&["-n", "100", "-p", "spaceship"]));
        let grid = runner.initial_grid().unwrap_or_else(|error| unreachable!("{error}"));
        let expected = PatternRegistry::new()
            .seed(DEFAULT_PATTERN, 100, 0)
            .unwrap_or_else(|error| unreachable!("{error}"));
        assert_eq!(grid, expected);
    }

    // Tests invalid engine parameters surface as errors from run
    // Verified by validating the configuration after seeding
    #[test]
    fn test_runner_rejects_bad_grain() {
        assert!(Runner::new(parse(&["-n", "30", "-g", "4", "-q"])).run().is_err());
    }

    // Tests the report wording for each outcome
    // Verified by printing the generation for accelerator runs
    #[test]
    fn test_report_display() {
        let mut report = Report {
            backend: Backend::Shared,
            strategy: "static".to_string(),
            dim: 32,
            nb_iter: 100,
            generation: 12,
            population: 40,
            elapsed: Duration::from_millis(5),
        };
        let text = report.to_string();
        assert!(text.starts_with("static (shared) on 32x32: stabilized at generation 12"));
        assert!(text.contains("40 live cells"));

        report.generation = 0;
        assert!(report.to_string().contains("still changing after 100 generations"));

        report.backend = Backend::Accelerator;
        assert!(report.to_string().contains("stabilization not tracked"));
    }
}

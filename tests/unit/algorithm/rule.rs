//! Tests for the B3/S23 cell transition

#[cfg(test)]
mod tests {
    use tiled_life::algorithm::rule::{apply, evaluate, next_state};
    use tiled_life::io::configuration::ALIVE;
    use tiled_life::spatial::grid::Grid;
    use tiled_life::spatial::tiles::Region;

    fn neighbours(live: usize) -> [u32; 8] {
        let mut cells = [0; 8];
        for cell in cells.iter_mut().take(live) {
            *cell = ALIVE;
        }
        cells
    }

    // Tests live cells survive with two or three live neighbours only
    // Verified by allowing survival with four neighbours
    #[test]
    fn test_survival() {
        for live in 0..=8 {
            let (state, changed) = evaluate(ALIVE, &neighbours(live));
            let survives = live == 2 || live == 3;
            assert_eq!(state, if survives { ALIVE } else { 0 }, "{live} neighbours");
            assert_eq!(changed, !survives, "{live} neighbours");
        }
    }

    // Tests dead cells are born with exactly three live neighbours
    // Verified by allowing birth with two neighbours
    #[test]
    fn test_birth() {
        for live in 0..=8 {
            let (state, changed) = evaluate(0, &neighbours(live));
            assert_eq!(state, if live == 3 { ALIVE } else { 0 }, "{live} neighbours");
            assert_eq!(changed, live == 3, "{live} neighbours");
        }
    }

    // Tests liveness ignores colour but survivors are normalized to ALIVE
    // Verified by counting only neighbours equal to ALIVE
    #[test]
    fn test_colours_only_signal_liveness() {
        let (state, changed) = evaluate(0, &[1, 0, 0xABCD, 0, 0, 7, 0, 0]);
        assert_eq!(state, ALIVE);
        assert!(changed);

        let (state, changed) = evaluate(5, &[1, 2, 0, 0, 0, 0, 0, 0]);
        assert_eq!(state, ALIVE);
        assert!(changed, "a recoloured survivor counts as a change");
    }

    // Tests neighbours outside the grid read as dead
    // Verified by wrapping neighbour coordinates around the grid
    #[test]
    fn test_next_state_at_corner() {
        let mut grid = Grid::square(3);
        grid.set(2, 2, ALIVE);
        grid.set(2, 1, ALIVE);
        grid.set(1, 2, ALIVE);

        assert_eq!(next_state(&grid, 0, 0), (0, false));
        assert_eq!(next_state(&grid, 1, 1), (ALIVE, true));
    }

    // Tests applying the rule to a view turns a vertical blinker horizontal
    // Verified by reading neighbours from the output view
    #[test]
    fn test_apply_blinker() {
        let mut current = Grid::square(5);
        for row in 1..4 {
            current.set(row, 2, ALIVE);
        }
        let mut next = current.clone();

        let changed = apply(&current, [1, 1], next.region_mut(Region::interior(5, 5)));
        assert!(changed);
        for col in 1..4 {
            assert_eq!(next.get(2, col), ALIVE);
        }
        assert_eq!(next.get(1, 2), 0);
        assert_eq!(next.get(3, 2), 0);
        assert_eq!(next.population(), 3);

        let flipped_back = apply(&next, [1, 1], current.region_mut(Region::interior(5, 5)));
        assert!(flipped_back, "second generation restores the vertical phase");
        assert_eq!(current.get(1, 2), ALIVE);
        assert_eq!(current.get(2, 1), 0);
    }
}

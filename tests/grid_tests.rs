//! Grid and placement tests

use blockfit::core::{
    detect, GameSession, Grid, LevelConfig, Piece, PieceTile, PlaceError, SessionConfig,
    STANDARD_SHAPES,
};
use blockfit::types::{Line, PlayMode, SequenceEndBehavior, SpecialKind, TileKind, BOARD_SIZE};

fn scripted(seq: Vec<usize>) -> LevelConfig {
    let mut level = LevelConfig::standard();
    level.play_mode = PlayMode::Scripted;
    level.spawn_sequence = seq;
    level.sequence_end_behavior = SequenceEndBehavior::Loop;
    level
}

fn instant_session(level: LevelConfig) -> GameSession<blockfit::core::MemoryStore, blockfit::core::InlineCatalog> {
    let mut session = GameSession::in_memory(SessionConfig {
        clear_step_ms: 0,
        ..SessionConfig::default()
    });
    session.on_level_loaded(level).unwrap();
    session
}

#[test]
fn test_grid_new_empty() {
    let grid = Grid::new();
    assert_eq!(grid.size(), BOARD_SIZE);
    assert_eq!(grid.count_empty(), 100);
    for y in 0..BOARD_SIZE as i8 {
        for x in 0..BOARD_SIZE as i8 {
            assert_eq!(grid.get(x, y), Some(&None));
        }
    }
    assert_eq!(grid.get(-1, 0), None);
    assert_eq!(grid.get(0, BOARD_SIZE as i8), None);
}

#[test]
fn test_placement_accepted_iff_in_range_and_free() {
    // An L tromino against a board with a few blocked cells
    let blocked: [(i8, i8); 4] = [(3, 3), (0, 9), (9, 0), (5, 6)];

    for origin_y in -2..12i8 {
        for origin_x in -2..12i8 {
            // four dots block cells, then corner2_bl reaches slot 0
            let mut session = instant_session(scripted(vec![0, 0, 0, 0, 11, 11, 11]));
            for &(x, y) in &blocked {
                session.try_place(0, (x, y)).unwrap();
            }
            let before = session.grid().clone();
            let piece = session.hand().piece(0).unwrap().clone();

            let expected_ok = piece.cells_at((origin_x, origin_y)).all(|(x, y)| {
                (0..BOARD_SIZE as i8).contains(&x)
                    && (0..BOARD_SIZE as i8).contains(&y)
                    && !blocked.contains(&(x, y))
            });

            let result = session.try_place(0, (origin_x, origin_y));
            assert_eq!(
                result.is_ok(),
                expected_ok,
                "origin ({origin_x}, {origin_y}) gave {result:?}"
            );

            let grid = session.grid();
            for y in 0..BOARD_SIZE as i8 {
                for x in 0..BOARD_SIZE as i8 {
                    let now = grid.is_occupied(x, y);
                    let was = before.is_occupied(x, y);
                    let covered = expected_ok && piece.covers((origin_x, origin_y), x, y);
                    assert_eq!(now, was || covered, "cell ({x}, {y})");
                }
            }
        }
    }
}

#[test]
fn test_square_far_corner_example() {
    // square2
    let mut session = instant_session(scripted(vec![9]));
    assert_eq!(session.try_place(0, (9, 8)), Err(PlaceError::OutOfRange));
    assert!(session.try_place(0, (8, 8)).is_ok());
    assert!(session.grid().is_occupied(9, 9));
}

#[test]
fn test_single_row_clear_example() {
    let mut session = instant_session(scripted(vec![0]));
    for x in 0..9 {
        session.try_place(0, (x, 3)).unwrap();
    }
    let placed = session.try_place(0, (9, 3)).unwrap();
    assert_eq!(placed.lines.as_slice(), &[Line::row(3)]);
    assert_eq!(session.grid().count_empty(), 100);
}

#[test]
fn test_commit_clear_round_trip() {
    let mut grid = Grid::new();
    let star = TileKind::Special {
        kind: SpecialKind::Star,
        sprite: Some("star_gold".to_string()),
    };
    let piece = Piece::new(
        0,
        vec![
            PieceTile::normal((0, 0)),
            PieceTile {
                offset: (0, 1),
                kind: star.clone(),
            },
        ],
    )
    .unwrap();

    grid.commit(&piece, (6, 2));
    let cells: Vec<_> = piece.cells_at((6, 2)).map(|(x, y)| (x as u8, y as u8)).collect();
    let prior = grid.clear_cells(&cells);

    assert_eq!(prior, vec![((6, 2), TileKind::Normal), ((6, 3), star)]);
    assert_eq!(grid, Grid::new());
}

#[test]
fn test_detect_is_idempotent_on_full_board() {
    let mut grid = Grid::new();
    for y in 0..BOARD_SIZE as i8 {
        for x in 0..BOARD_SIZE as i8 {
            grid.set(x, y, Some(TileKind::Normal));
        }
    }
    let first = detect(&grid);
    assert_eq!(first.len(), 20);
    assert_eq!(first, detect(&grid));
    assert_eq!(first[0], Line::column(0));
    assert_eq!(first[10], Line::row(0));
}

#[test]
fn test_every_standard_shape_fits_empty_board() {
    let grid = Grid::new();
    for (id, (name, offsets)) in STANDARD_SHAPES.iter().enumerate() {
        let piece = Piece::from_offsets(id, offsets).unwrap();
        assert!(grid.fits_anywhere(&piece), "{name} should fit");
        assert!(grid.fits_at(&piece, (0, 0)), "{name} should fit at the origin");
    }
}

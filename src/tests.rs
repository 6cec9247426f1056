use proptest::prelude::*;

use super::*;

fn sq(token: &str) -> Square {
    token.parse().unwrap()
}

fn position(diagram: &str, turn: Color) -> Game {
    Game::with_position(Board::from_rows(diagram).unwrap(), turn)
}

#[test]
fn fresh_game() {
    let game = Game::new();
    assert_eq!(game.turn(), Color::White);
    assert_eq!(game.tally(), Tally::default());
    assert_eq!(game.state(), GameState::AwaitingMove);
    assert_eq!(game.board().piece_count(), 24);
    assert_eq!(game.legal_moves().len(), 7);
}

#[test]
fn a3_b4_on_fresh_board_is_not_whites_piece() {
    // a3 holds a black man and white moves first
    let mut game = Game::new();
    assert_eq!(
        game.action("a3", "b4"),
        Err(MoveError::Illegal(IllegalMove::NotYourTurn))
    );
}

#[test]
fn opening_moves() {
    let mut game = Game::new();
    let snapshot = game.action("b6", "a5").unwrap();
    assert_eq!(snapshot.turn, Color::Black);
    assert_eq!(snapshot.board.get(sq("a5")), Some(Cell::ManWhite));
    assert_eq!(snapshot.board.get(sq("b6")), Some(Cell::Empty));
    assert_eq!(
        snapshot.last_move,
        Some(AppliedMove {
            from: sq("b6"),
            to: sq("a5"),
            captured: None,
            promoted: false,
        })
    );
    assert!(game.action("c3", "d4").is_ok());
    assert_eq!(game.turn(), Color::White);
}

#[test]
fn parse_and_range_errors() {
    let mut game = Game::new();
    for (from, to) in [("a9", "b4"), ("b6", "a"), ("bb", "a5"), ("b6", "a5x")] {
        assert!(
            matches!(game.action(from, to), Err(MoveError::Parse(_))),
            "{from} {to}"
        );
    }
    assert_eq!(
        game.action("b6", "b5"),
        Err(MoveError::Illegal(IllegalMove::OutOfRange))
    );
    assert_eq!(
        game.action("b4", "a5"),
        Err(MoveError::Illegal(IllegalMove::NoPieceThere))
    );
    assert_eq!(game.snapshot(), Game::new().snapshot());
}

#[test]
fn men_never_move_backward() {
    let game = Game::with_position(Board::default(), Color::Black);
    for col in (0..8).step_by(2) {
        let from = Square::new(2, col);
        for to_col in [col.wrapping_sub(1), col + 1] {
            let to = Square::new(1, to_col);
            if !to.is_playable() {
                continue;
            }
            assert_eq!(
                game.evaluate(from, to),
                Err(MoveError::Illegal(IllegalMove::BackwardNotAllowed)),
                "{from} -> {to}"
            );
        }
    }
}

#[test]
fn men_move_one_square_along_a_diagonal() {
    let mut game = Game::new();
    assert_eq!(
        game.action("b6", "b4"),
        Err(MoveError::Illegal(IllegalMove::InvalidDiagonal))
    );
    assert_eq!(
        game.action("b6", "d4"),
        Err(MoveError::Illegal(IllegalMove::TooFar))
    );
    assert_eq!(game.snapshot(), Game::new().snapshot());
}

#[test]
fn crowning_keeps_color() {
    assert_eq!(Cell::ManBlack.crowned(), Cell::KingBlack);
    assert_eq!(Cell::ManWhite.crowned(), Cell::KingWhite);
    assert_eq!(Cell::KingWhite.crowned(), Cell::KingWhite);
    assert_eq!(Cell::Empty.crowned(), Cell::Empty);
    assert_eq!(Cell::piece(Color::Black, PieceKind::Man), Cell::ManBlack);
}

#[test]
fn mandatory_capture() {
    let mut game = position(
        ".......w
         ........
         ........
         ........
         ...w....
         ..b.....
         ........
         ......b.",
        Color::Black,
    );
    assert_eq!(
        game.action("g1", "h2"),
        Err(MoveError::Illegal(IllegalMove::MustCapture))
    );
    assert_eq!(
        game.action("c3", "b4"),
        Err(MoveError::Illegal(IllegalMove::MustCapture))
    );
    let snapshot = game.action("c3", "e5").unwrap();
    assert_eq!(snapshot.board.get(sq("d4")), Some(Cell::Empty));
    assert_eq!(snapshot.tally, Tally { black: 10, white: 11 });
    assert_eq!(snapshot.turn, Color::White);
    assert_eq!(snapshot.state, GameState::AwaitingMove);
}

#[test]
fn multi_jump_keeps_the_turn() {
    let mut game = position(
        "........
         w.......
         .....w..
         ........
         ...w....
         ..b.....
         ........
         ......b.",
        Color::Black,
    );
    let first = game.action("c3", "e5").unwrap();
    assert_eq!(first.turn, Color::Black);
    assert_eq!(first.state, GameState::CaptureChain(sq("e5")));

    // only the jumping piece may move, and only by jumping
    assert_eq!(
        game.action("g1", "h2"),
        Err(MoveError::Illegal(IllegalMove::MustCapture))
    );
    assert_eq!(
        game.action("e5", "d6"),
        Err(MoveError::Illegal(IllegalMove::MustCapture))
    );

    let second = game.action("e5", "g7").unwrap();
    assert_eq!(second.turn, Color::White);
    assert_eq!(second.state, GameState::AwaitingMove);
    assert_eq!(second.tally.white, 11);
    assert_eq!(second.board.get(sq("f6")), Some(Cell::Empty));
    assert_eq!(second.board.get(sq("g7")), Some(Cell::ManBlack));
}

#[test]
fn promotion_gives_king_moves_next_turn() {
    let mut game = position(
        "........
         ........
         ........
         ......b.
         ........
         ........
         .w......
         ........",
        Color::White,
    );
    let crowned = game.action("b2", "c1").unwrap();
    assert_eq!(crowned.board.get(sq("c1")), Some(Cell::KingWhite));
    assert!(crowned.last_move.unwrap().promoted);
    assert_eq!(crowned.turn, Color::Black);

    game.action("g5", "h6").unwrap();
    assert_eq!(game.evaluate(sq("c1"), sq("e3")), Ok(MoveKind::Move));
    assert_eq!(game.evaluate(sq("c1"), sq("a3")), Ok(MoveKind::Move));
    assert_eq!(game.evaluate(sq("c1"), sq("f4")), Ok(MoveKind::Move));
    let snapshot = game.action("c1", "e3").unwrap();
    assert_eq!(snapshot.board.get(sq("e3")), Some(Cell::KingWhite));
}

#[test]
fn promotion_mid_chain_continues_as_king() {
    let mut game = position(
        "........
         ....w...
         ...b...w
         ..w.....
         ........
         ........
         ........
         ........",
        Color::Black,
    );
    let promoted = game.action("d6", "f8").unwrap();
    assert_eq!(promoted.board.get(sq("f8")), Some(Cell::KingBlack));
    assert_eq!(promoted.turn, Color::Black);
    assert_eq!(promoted.state, GameState::CaptureChain(sq("f8")));

    // the new king flies over c5 and may land on any empty square beyond it
    assert_eq!(
        game.evaluate(sq("f8"), sq("b4")),
        Ok(MoveKind::Capture { jumped: sq("c5") })
    );
    let landed = game.action("f8", "a3").unwrap();
    assert_eq!(landed.board.get(sq("c5")), Some(Cell::Empty));
    assert_eq!(landed.tally.white, 11);
    assert_eq!(landed.turn, Color::White);
}

#[test]
fn king_can_not_jump_two_enemies() {
    let mut game = position(
        "........
         ........
         .....w..
         ....w...
         ........
         ........
         .B......
         b.......",
        Color::Black,
    );
    assert_eq!(
        game.action("b2", "h8"),
        Err(MoveError::Illegal(IllegalMove::MultipleEnemiesOnDiagonal))
    );
    assert!(game.action("b2", "c1").is_ok());
}

#[test]
fn capturing_the_last_piece_ends_the_game() {
    let mut game = position(
        "........
         ........
         ........
         ....w...
         ...b....
         ........
         ........
         ........",
        Color::White,
    );
    assert_eq!(game.tally().black, 11);
    let snapshot = game.action("e5", "c3").unwrap();
    assert_eq!(snapshot.tally.black, 12);
    assert_eq!(
        snapshot.game_over(),
        Some(GameEnd {
            winner: Color::White,
            reason: EndReason::AllCaptured,
        })
    );
    assert_eq!(game.action("c3", "b2"), Err(MoveError::GameAlreadyOver));
    assert_eq!(game.action("zz", "b2"), Err(MoveError::GameAlreadyOver));
    assert!(game.legal_moves().is_empty());
}

#[test]
fn blocked_side_loses() {
    let game = position(
        "........
         ........
         ........
         ........
         ........
         w.......
         .b......
         ..b.....",
        Color::White,
    );
    assert_eq!(
        game.state(),
        GameState::GameOver(GameEnd {
            winner: Color::Black,
            reason: EndReason::NoMovesLeft,
        })
    );
}

#[test]
fn blocking_the_last_mobile_piece_wins() {
    let mut game = position(
        "........
         w.......
         ........
         ........
         .....w..
         ......w.
         .......b
         ........",
        Color::White,
    );
    assert_eq!(game.state(), GameState::AwaitingMove);
    // h2 can neither step onto g3 nor jump it while f4 is held
    assert!(game.board().legal_moves(Color::Black, None).is_empty());
    let snapshot = game.action("a7", "b6").unwrap();
    assert_eq!(snapshot.turn, Color::Black);
    assert_eq!(snapshot.tally.black, 11);
    assert_eq!(
        snapshot.game_over(),
        Some(GameEnd {
            winner: Color::White,
            reason: EndReason::NoMovesLeft,
        })
    );
    assert_eq!(game.action("h2", "g3"), Err(MoveError::GameAlreadyOver));
    assert_eq!(game.action("b6", "a5"), Err(MoveError::GameAlreadyOver));
    assert_eq!(game.board().piece_count(), 4);
}

#[test]
fn side_names() {
    assert_eq!("white".parse::<Color>(), Ok(Color::White));
    assert_eq!("B".parse::<Color>(), Ok(Color::Black));
    assert!("red".parse::<Color>().is_err());
}

#[test]
fn error_codes() {
    assert_eq!(MoveError::GameAlreadyOver.code(), "game_already_over");
    assert_eq!(
        MoveError::from(IllegalMove::MustCapture).code(),
        "must_capture"
    );
    let parse = translate("k1", "a1").unwrap_err();
    assert_eq!(MoveError::from(parse).code(), "parse_error");
}

#[test]
fn snapshot_json_layout() {
    let json = serde_json::to_value(Game::new().snapshot()).unwrap();
    assert_eq!(json["turn"], "W");
    assert_eq!(json["tally"]["black"], 0);
    assert_eq!(json["tally"]["white"], 0);
    assert_eq!(json["board"][2]["0"], "B");
    assert_eq!(json["board"][5]["1"], "W");
    assert_eq!(json["state"], "AwaitingMove");
    let back: Snapshot = serde_json::from_value(json).unwrap();
    assert_eq!(back, Game::new().snapshot());
}

fn pieces(game: &Game) -> u8 {
    game.board().piece_count()
}

proptest! {
    #[test]
    fn random_games_keep_invariants(choices in prop::collection::vec(any::<u16>(), 0..120)) {
        let mut game = Game::new();
        for choice in choices {
            let moves = game.legal_moves();
            if moves.is_empty() {
                break;
            }
            let candidate = moves[choice as usize % moves.len()];
            let before = pieces(&game);

            let first = game.evaluate(candidate.from, candidate.to);
            prop_assert_eq!(first.clone(), game.evaluate(candidate.from, candidate.to));
            prop_assert_eq!(first, Ok(candidate.kind));

            let snapshot = game.play(candidate.from, candidate.to).unwrap();
            let after = pieces(&game);
            match candidate.kind {
                MoveKind::Move => prop_assert_eq!(after, before),
                MoveKind::Capture { .. } => prop_assert_eq!(after + 1, before),
            }
            prop_assert_eq!(snapshot.tally.total(), 24 - after);
            prop_assert!(snapshot.tally.black <= 12 && snapshot.tally.white <= 12);
            prop_assert!(game.board().iter_pieces().all(|(square, _)| square.is_dark()));
        }
    }

    #[test]
    fn rejected_moves_change_nothing(from in "[a-h][1-8]", to in "[a-h][1-8]") {
        let mut game = Game::new();
        let before = game.snapshot();
        if game.clone().action(&from, &to).is_err() {
            prop_assert!(game.action(&from, &to).is_err());
            prop_assert_eq!(game.snapshot(), before);
        }
    }
}

use checkers_engine::{utils::perft, Board, Color, Game, Square};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn midgame() -> Game {
    let board = Board::from_rows(
        "........
         w.......
         .....w..
         ..w.w...
         ...b....
         ..b.b...
         .B......
         ........",
    )
    .expect("valid diagram");
    Game::with_position(board, Color::Black)
}

fn scan_all_captures(board: &Board) -> usize {
    board.side_captures(Color::Black).len() + board.side_captures(Color::White).len()
}

fn evaluate_every_pair(game: &Game) -> usize {
    let mut legal = 0;
    for from in 0..64u8 {
        for to in 0..64u8 {
            let from = Square::new(from / 8, from % 8);
            let to = Square::new(to / 8, to % 8);
            if game.evaluate(from, to).is_ok() {
                legal += 1;
            }
        }
    }
    legal
}

fn random_walk(mut game: Game, max_steps: usize) -> Game {
    for step in 0..max_steps {
        let moves = game.legal_moves();
        if moves.is_empty() {
            break;
        }
        let candidate = moves[step * 7 % moves.len()];
        let _ = game.play(candidate.from, candidate.to);
    }
    game
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("capture scan opening", |b| {
        b.iter(|| scan_all_captures(black_box(&Board::default())))
    });
    let game = midgame();
    c.bench_function("capture scan midgame", |b| {
        b.iter(|| scan_all_captures(black_box(game.board())))
    });
    c.bench_function("evaluate every pair", |b| {
        b.iter(|| evaluate_every_pair(black_box(&game)))
    });
    c.bench_function("legal moves midgame", |b| {
        b.iter(|| black_box(&game).legal_moves())
    });
    c.bench_function("walk 100", |b| b.iter(|| random_walk(Game::new(), 100)));
    c.bench_function("perft 4", |b| b.iter(|| perft(black_box(&Game::new()), 4)));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tchess::search::negamax::{NegamaxSearch, SearchConfig};
use tchess::utils::fen_parser::{parse_fen, STARTING_POSITION_FEN};

const POSITIONS: &[(&str, &str)] = &[
    ("start", STARTING_POSITION_FEN),
    (
        "kiwipete",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    ),
    ("endgame", "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1"),
];

fn bench_fixed_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("negamax_fixed_depth");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(6));
    group.sample_size(10);

    for &(name, fen) in POSITIONS {
        let (board, info) = parse_fen(fen).expect("benchmark FEN should parse");
        for depth in 1..=3 {
            let mut search = NegamaxSearch::new(SearchConfig { depth, tt_size_mb: 16 });
            let mut bench_board = board.clone();
            group.bench_with_input(
                BenchmarkId::new(name, format!("d{depth}")),
                &depth,
                |b, _| {
                    b.iter(|| {
                        let result = search
                            .best_move(black_box(&mut bench_board), black_box(&info))
                            .expect("benchmark position has legal moves");
                        black_box(result.score)
                    });
                },
            );
            assert_eq!(bench_board, board, "search must restore the board");
        }
    }

    group.finish();
}

criterion_group!(search_benches, bench_fixed_depth);
criterion_main!(search_benches);

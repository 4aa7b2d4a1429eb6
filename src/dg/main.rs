// Copyright 2024 Karl Sundequist Blomdahl <karl.sundequist.blomdahl@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The self-play binary: drives `dg_mcts::pool` through `--num-games`
//! complete games, up to `--jobs` of them running concurrently against one
//! shared network, and writes out one SGF record plus a flat dump of the
//! training examples per game. Loading real network weights is outside this
//! engine's scope (spec.md section 1) -- this binary drives the search with
//! `dg_nn::UniformPredictor`, the same stand-in the rest of the workspace
//! tests against, so the loop below is exactly what a real model would be
//! plugged into through `dg_nn::Network`.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;

use dg_go::Position;
use dg_nn::UniformPredictor;

#[derive(Parser)]
#[command(name = "dream_go")]
#[command(author, version, about = "Self-play MCTS engine for Go", long_about = None)]
struct Cli {
    /// Number of self-play games to run. Defaults to `DG_NUM_GAMES`.
    #[arg(long, default_value_t = *dg_utils::config::NUM_GAMES)]
    num_games: usize,

    /// Number of games to run concurrently. Defaults to `DG_NUM_THREADS`
    /// (itself defaulting to `1`, i.e. one game at a time).
    #[arg(long)]
    jobs: Option<usize>,

    /// Per-move readout (rollout) budget.
    #[arg(long, default_value_t = 1600)]
    num_readouts: usize,

    /// Side length of the board.
    #[arg(long, default_value_t = 19)]
    board_size: usize,

    /// Resignation threshold. A game resigns when `to_play * root.Q` drops
    /// below this value.
    #[arg(long, default_value_t = -0.9)]
    resign_threshold: f32,

    /// Komi added to White's score. Ignored if `--random-komi` is set.
    #[arg(long, default_value_t = 7.5)]
    komi: f32,

    /// Draw a fresh weighted-random komi per game (`dg_mcts::random_komi`)
    /// instead of the fixed value in `--komi`, so self-play data is not all
    /// generated at one komi.
    #[arg(long, default_value_t = false)]
    random_komi: bool,

    /// Directory to write one `.sgf` file per finished game into. If unset,
    /// games are played but no SGF is written.
    #[arg(long)]
    sgf_dir: Option<PathBuf>,

    /// Print a line of progress to stderr as each game finishes.
    #[arg(long, default_value_t = false)]
    verbose: bool
}

fn main() {
    let cli = Cli::parse();
    let jobs = cli.jobs.unwrap_or(*dg_utils::config::NUM_THREADS);

    if let Some(dir) = &cli.sgf_dir {
        fs::create_dir_all(dir).expect("could not create --sgf-dir");
    }

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);

    let games = dg_mcts::pool::play_games(
        UniformPredictor::new(0.0),
        cli.num_games,
        jobs,
        seed,
        cli.num_readouts,
        cli.resign_threshold,
        *dg_utils::config::RESIGN_DISABLE_PROBABILITY,
        |rng| {
            let komi = if cli.random_komi { dg_mcts::random_komi(rng) } else { cli.komi };

            Position::new(cli.board_size, komi)
        }
    );

    let mut total_examples = 0;

    for (game_index, game) in games.iter().enumerate() {
        total_examples += game.examples.len();

        if cli.verbose {
            eprintln!(
                "[dream_go] game {} finished: winner={:?} was_resign={} score={:.1}",
                game_index + 1, game.result.winner, game.result.was_resign, game.result.score
            );
        }

        if let Some(dir) = &cli.sgf_dir {
            let path = dir.join(format!("{:06}.sgf", game_index));
            let mut file = fs::File::create(&path).expect("could not create sgf file");

            file.write_all(game.sgf.as_bytes()).expect("could not write sgf file");
        }
    }

    eprintln!("[dream_go] {} games, {} training examples emitted", games.len(), total_examples);
}

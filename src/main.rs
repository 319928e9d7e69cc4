//! Animal Shogi: play against a fixed-depth minimax engine.
//!
//! ## Usage
//!
//! - `animal-shogi` / `animal-shogi play` - Play a game on the terminal
//! - `animal-shogi protocol` - Start the text command protocol on stdin/stdout
//! - `animal-shogi analyze` - Print the best line for a position
//! - `animal-shogi demo` - Watch the engine play a random mover

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use fastrand::Rng;
use log::{debug, info, warn};

use animal_shogi::board::{Board, Cell, Location, PieceKind, Placement, Side, initial_board};
use animal_shogi::constants::{DEFAULT_DEPTH, MAX_PLAYOUT_PLIES};
use animal_shogi::moves::{Move, apply};
use animal_shogi::playout::random_move;
use animal_shogi::protocol::{EngineConfig, Session};
use animal_shogi::search::Searcher;

/// Animal Shogi: a 3x4 capture game with drops, and a minimax engine
#[derive(Parser)]
#[command(name = "animal-shogi")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log warnings and errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(flatten)]
    engine: EngineArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct EngineArgs {
    /// Search depth in plies
    #[arg(long, global = true, default_value_t = DEFAULT_DEPTH)]
    depth: u32,

    /// Abort a search after this many nodes
    #[arg(long, global = true)]
    max_nodes: Option<u64>,

    /// Abort a search after this many milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Seed for the random mover
    #[arg(long, global = true, default_value_t = 0)]
    seed: u64,
}

impl EngineArgs {
    fn config(&self) -> EngineConfig {
        EngineConfig {
            depth: self.depth,
            max_nodes: self.max_nodes,
            timeout: self.timeout_ms.map(Duration::from_millis),
            seed: self.seed,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game against the engine on the terminal
    Play {
        /// Which side you play
        #[arg(long, value_enum, default_value_t = SideArg::First)]
        human: SideArg,

        /// How the computer chooses its moves
        #[arg(long, value_enum, default_value_t = Opponent::Minimax)]
        opponent: Opponent,
    },
    /// Start the text command protocol on stdin/stdout
    Protocol,
    /// Print the score and best line for a position
    Analyze {
        /// Side to move
        #[arg(long, value_enum, default_value_t = SideArg::First)]
        side: SideArg,

        /// Placements such as `bL@b4 wC@hand`; the initial position if empty
        placements: Vec<String>,
    },
    /// Let the engine play against a random mover
    Demo,
}

#[derive(Copy, Clone, ValueEnum)]
enum SideArg {
    First,
    Second,
}

impl From<SideArg> for Side {
    fn from(arg: SideArg) -> Self {
        match arg {
            SideArg::First => Side::First,
            SideArg::Second => Side::Second,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum Opponent {
    Minimax,
    Random,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::Level::Debug
    } else if cli.quiet {
        log::Level::Warn
    } else {
        log::Level::Info
    };
    simple_logger::init_with_level(level).context("initialising logger")?;

    let config = cli.engine.config();
    match cli.command {
        Some(Commands::Play { human, opponent }) => play_game(config, human.into(), opponent),
        Some(Commands::Protocol) => {
            let mut session = Session::new(config);
            session.run(io::stdin().lock(), io::stdout())
        }
        Some(Commands::Analyze { side, placements }) => analyze(config, side.into(), &placements),
        Some(Commands::Demo) => run_demo(config),
        None => play_game(config, Side::First, Opponent::Minimax),
    }
}

/// A move chosen by the computer, with the search score when there was one.
struct Reply {
    mv: Move,
    score: Option<i32>,
}

impl Reply {
    /// Lines shown to the human after the computer moves.
    fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(2);
        if let Some(score) = self.score {
            lines.push(format!("Score: {score}"));
        }
        lines.push(format!("Their move: {}", self.mv));
        lines
    }
}

/// Choose the computer's move, or `None` if it has no legal move.
fn computer_move(
    board: &Board,
    side: Side,
    config: &EngineConfig,
    opponent: Opponent,
    rng: &mut Rng,
) -> Result<Option<Reply>> {
    match opponent {
        Opponent::Random => Ok(random_move(board, side, rng).map(|mv| Reply { mv, score: None })),
        Opponent::Minimax => {
            let mut searcher = Searcher::new(config.limits());
            let (score, pv) = searcher
                .run(board, side, config.depth)
                .context("engine search")?;
            info!("score {score} after {} nodes", searcher.nodes());
            debug!(
                "line: {}",
                pv.iter().map(Move::to_string).collect::<Vec<_>>().join(", ")
            );
            Ok(pv.first().map(|&mv| Reply {
                mv,
                score: Some(score),
            }))
        }
    }
}

/// Read one move from the human, re-prompting until it is legal.
fn read_move<R: BufRead>(input: &mut R, board: &Board, side: Side) -> Result<Option<(Move, Board)>> {
    let mut prompt = |text: &str| -> Result<Option<String>> {
        print!("{text}");
        io::stdout().flush().context("flushing prompt")?;
        let mut line = String::new();
        if input.read_line(&mut line).context("reading move")? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    };

    loop {
        let Some(origin) = prompt("Original position [a1, hand, m]: ")? else {
            return Ok(None);
        };
        let Some(destination) = prompt("New position: ")? else {
            return Ok(None);
        };
        let Some(kind) = prompt("Piece [LION, ELEPHANT, GIRAFFE, CHICK, PROMOTEDCHICK]: ")? else {
            return Ok(None);
        };

        let origin: Location = match origin.parse() {
            Ok(o) => o,
            Err(e) => {
                println!("Invalid input: {e}");
                continue;
            }
        };
        let destination: Cell = match destination.parse() {
            Ok(d) => d,
            Err(e) => {
                println!("Invalid input: {e}");
                continue;
            }
        };
        let kind: PieceKind = match kind.parse() {
            Ok(k) => k,
            Err(e) => {
                println!("Invalid input: {e}");
                continue;
            }
        };

        let mv = Move::new(side, kind, origin, destination);
        match board.play(&mv) {
            Ok(next) => return Ok(Some((mv, next))),
            Err(e) => println!("Invalid movement: {e}"),
        }
    }
}

fn play_game(config: EngineConfig, human: Side, opponent: Opponent) -> Result<()> {
    let mut board = initial_board();
    let mut rng = Rng::with_seed(config.seed);
    let mut to_move = Side::First;
    let stdin = io::stdin();
    let mut input = stdin.lock();

    loop {
        if let Some(winner) = board.captured_lion() {
            println!("{board}");
            let who = if winner == human { "You win" } else { "You lose" };
            println!("{who}!");
            return Ok(());
        }

        if to_move == human {
            println!("{board}");
            println!("Input your move");
            let Some((mv, next)) = read_move(&mut input, &board, human)? else {
                info!("input closed, leaving game");
                return Ok(());
            };
            println!();
            println!("Your move: {mv}");
            board = next;
        } else {
            match computer_move(&board, to_move, &config, opponent, &mut rng)? {
                Some(reply) => {
                    println!();
                    for line in reply.lines() {
                        println!("{line}");
                    }
                    board = apply(&board, &reply.mv);
                }
                None => {
                    println!("{board}");
                    println!("The computer has no legal move. You win!");
                    return Ok(());
                }
            }
        }
        to_move = to_move.opponent();
    }
}

fn analyze(config: EngineConfig, side: Side, tokens: &[String]) -> Result<()> {
    let board = if tokens.is_empty() {
        initial_board()
    } else {
        let placements = tokens
            .iter()
            .map(|t| t.parse::<Placement>())
            .collect::<Result<Vec<_>, _>>()
            .context("parsing placements")?;
        Board::new(placements).context("building board")?
    };

    println!("{board}");
    let mut searcher = Searcher::new(config.limits());
    let (score, pv) = searcher
        .run(&board, side, config.depth)
        .context("engine search")?;
    println!("Score: {score}");
    println!("Nodes: {}", searcher.nodes());
    for (i, mv) in pv.iter().enumerate() {
        println!("{:>2}. {mv}", i + 1);
    }
    Ok(())
}

fn run_demo(config: EngineConfig) -> Result<()> {
    println!("Animal Shogi: minimax (first) vs random (second)\n");

    let mut board = initial_board();
    let mut rng = Rng::with_seed(config.seed);
    let mut to_move = Side::First;

    for ply in 0..MAX_PLAYOUT_PLIES {
        if let Some(winner) = board.captured_lion() {
            println!("{board}");
            println!("{winner} side wins after {ply} plies");
            return Ok(());
        }
        let opponent = match to_move {
            Side::First => Opponent::Minimax,
            Side::Second => Opponent::Random,
        };
        let Some(Reply { mv, .. }) = computer_move(&board, to_move, &config, opponent, &mut rng)?
        else {
            println!("{to_move} side has no legal move and loses");
            return Ok(());
        };
        println!("{:>3}. {mv}", ply + 1);
        board = apply(&board, &mv);
        to_move = to_move.opponent();
    }

    warn!("no result after {MAX_PLAYOUT_PLIES} plies");
    Ok(())
}

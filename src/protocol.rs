//! Line-oriented text protocol for driving a game.
//!
//! Modeled on the Go Text Protocol: one command per line, an optional numeric
//! id in front, and a response of `=[id] text` on success or `?[id] message`
//! on failure, followed by a blank line.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`
//! - `quit`
//! - `clear_board` - Reset to the initial position, first side to move
//! - `showboard` - Render the board
//! - `turn` - Report the side to move
//! - `depth <n>` - Set the default search depth
//! - `moves` - List the legal moves for the side to move
//! - `play <origin> <destination> <kind>` - Validate and play a move
//! - `genmove [depth]` - Search, then play the best move
//! - `eval [depth]` - Search and report the score and principal variation
//! - `random` - Play a random legal move
//! - `setpos <side> <placement>...` - Load a position, e.g. `setpos b bL@b4 wL@b1`

use std::io::{BufRead, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use fastrand::Rng;
use log::{debug, info, warn};

use crate::board::{Board, Cell, Location, PieceKind, Placement, Side, initial_board};
use crate::constants::DEFAULT_DEPTH;
use crate::moves::{Move, apply, generate_moves};
use crate::playout::random_move;
use crate::search::{SearchLimits, Searcher};

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "clear_board",
    "depth",
    "eval",
    "genmove",
    "known_command",
    "list_commands",
    "moves",
    "name",
    "play",
    "protocol_version",
    "quit",
    "random",
    "setpos",
    "showboard",
    "turn",
    "version",
];

/// Engine settings that outlive a single game.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Default search depth in plies.
    pub depth: u32,
    /// Abort searches after this many nodes.
    pub max_nodes: Option<u64>,
    /// Abort searches after this long.
    pub timeout: Option<Duration>,
    /// Seed for the random mover.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            depth: DEFAULT_DEPTH,
            max_nodes: None,
            timeout: None,
            seed: 0,
        }
    }
}

impl EngineConfig {
    /// Search limits for a search starting now.
    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            max_nodes: self.max_nodes,
            deadline: self.timeout.map(|t| Instant::now() + t),
        }
    }
}

/// A game in progress plus engine settings.
pub struct Session {
    board: Board,
    to_move: Side,
    config: EngineConfig,
    rng: Rng,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Session {
    pub fn new(config: EngineConfig) -> Self {
        Session {
            board: initial_board(),
            to_move: Side::First,
            config,
            rng: Rng::with_seed(config.seed),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Side {
        self.to_move
    }

    /// Read commands from `input` until `quit` or end of input, writing
    /// responses to `output`.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        for line in input.lines() {
            let line = line.context("reading command")?;

            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }

            let command = parts[0].to_lowercase();
            let args = &parts[1..];
            debug!("command {command} {args:?}");

            let (success, message) = self.execute(&command, args);
            if !success {
                warn!("{command}: {message}");
            }
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(output, "{prefix}{id_str} {message}\n").context("writing response")?;
            output.flush().context("flushing response")?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end > 0 {
            if let Ok(id) = trimmed[..end].parse::<u32>() {
                return (Some(id), trimmed[end..].trim());
            }
        }
        (None, trimmed)
    }

    /// Execute a command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "1".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => match args.first() {
                Some(cmd) => {
                    let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                    (true, known.to_string())
                }
                None => (false, "missing argument".to_string()),
            },

            "quit" => (true, String::new()),

            "clear_board" => {
                self.board = initial_board();
                self.to_move = Side::First;
                (true, String::new())
            }

            "showboard" => (true, format!("\n{}", self.board)),

            "turn" => (true, self.to_move.to_string()),

            "depth" => match args.first().map(|d| d.parse::<u32>()) {
                Some(Ok(depth)) => {
                    self.config.depth = depth;
                    (true, String::new())
                }
                Some(Err(_)) => (false, "invalid depth".to_string()),
                None => (true, self.config.depth.to_string()),
            },

            "moves" => {
                let moves = generate_moves(&self.board, self.to_move);
                let text: Vec<String> = moves.iter().map(Move::to_string).collect();
                (true, text.join("\n"))
            }

            "play" => self.play(args),

            "genmove" => match self.depth_arg(args) {
                Ok(depth) => self.genmove(depth),
                Err(msg) => (false, msg),
            },

            "eval" => match self.depth_arg(args) {
                Ok(depth) => self.eval(depth),
                Err(msg) => (false, msg),
            },

            "random" => {
                if let Some(msg) = self.game_over() {
                    return (false, msg);
                }
                match random_move(&self.board, self.to_move, &mut self.rng) {
                    Some(mv) => {
                        self.commit(mv);
                        (true, mv.to_string())
                    }
                    None => (true, "resign".to_string()),
                }
            }

            "setpos" => self.setpos(args),

            _ => (false, format!("unknown command: {command}")),
        }
    }

    fn depth_arg(&self, args: &[&str]) -> Result<u32, String> {
        match args.first() {
            Some(d) => d.parse().map_err(|_| format!("invalid depth [{d}]")),
            None => Ok(self.config.depth),
        }
    }

    fn game_over(&self) -> Option<String> {
        self.board
            .captured_lion()
            .map(|winner| format!("game over, {winner} side won"))
    }

    fn commit(&mut self, mv: Move) {
        self.board = apply(&self.board, &mv);
        self.to_move = self.to_move.opponent();
        if let Some(winner) = self.board.captured_lion() {
            info!("{mv} captures the lion, {winner} side wins");
        }
    }

    fn play(&mut self, args: &[&str]) -> (bool, String) {
        if let Some(msg) = self.game_over() {
            return (false, msg);
        }
        let [origin, destination, kind] = args else {
            return (false, "usage: play <origin> <destination> <kind>".to_string());
        };
        let parsed = (|| {
            let origin: Location = origin.parse()?;
            let destination: Cell = destination.parse()?;
            let kind: PieceKind = kind.parse()?;
            Ok::<_, crate::board::ParseError>(Move::new(self.to_move, kind, origin, destination))
        })();
        let mv = match parsed {
            Ok(mv) => mv,
            Err(e) => return (false, e.to_string()),
        };
        match self.board.play(&mv) {
            Ok(next) => {
                self.board = next;
                self.to_move = self.to_move.opponent();
                (true, mv.to_string())
            }
            Err(e) => (false, format!("illegal move: {e}")),
        }
    }

    fn genmove(&mut self, depth: u32) -> (bool, String) {
        if let Some(msg) = self.game_over() {
            return (false, msg);
        }
        let limits = self.config.limits();
        if !limits.is_unlimited() {
            debug!("genmove limits: {limits:?}");
        }
        let mut searcher = Searcher::new(limits);
        match searcher.run(&self.board, self.to_move, depth) {
            Ok((score, pv)) => {
                info!("depth {depth} score {score} nodes {}", searcher.nodes());
                match pv.first() {
                    Some(&mv) => {
                        self.commit(mv);
                        (true, mv.to_string())
                    }
                    None => (true, "resign".to_string()),
                }
            }
            Err(e) => (false, e.to_string()),
        }
    }

    fn eval(&mut self, depth: u32) -> (bool, String) {
        let mut searcher = Searcher::new(self.config.limits());
        match searcher.run(&self.board, self.to_move, depth) {
            Ok((score, pv)) => {
                debug!("eval depth {depth}: {} nodes", searcher.nodes());
                let line: Vec<String> = pv.iter().map(Move::to_string).collect();
                (true, format!("{score} {}", line.join(", ")).trim_end().to_string())
            }
            Err(e) => (false, e.to_string()),
        }
    }

    fn setpos(&mut self, args: &[&str]) -> (bool, String) {
        let Some((side, tokens)) = args.split_first() else {
            return (false, "usage: setpos <side> <placement>...".to_string());
        };
        let side: Side = match side.parse() {
            Ok(side) => side,
            Err(e) => return (false, e.to_string()),
        };
        let placements: Result<Vec<Placement>, _> = tokens.iter().map(|t| t.parse()).collect();
        let placements = match placements {
            Ok(p) => p,
            Err(e) => return (false, e.to_string()),
        };
        match Board::new(placements) {
            Ok(board) => {
                self.board = board;
                self.to_move = side;
                (true, String::new())
            }
            Err(e) => (false, e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = Session::parse_id("123 name");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = Session::parse_id("name");
        assert_eq!(id, None);
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_known_command() {
        let mut session = Session::default();

        let (success, response) = session.execute("known_command", &["genmove"]);
        assert!(success);
        assert_eq!(response, "true");

        let (success, response) = session.execute("known_command", &["komi"]);
        assert!(success);
        assert_eq!(response, "false");
    }

    #[test]
    fn test_play_alternates_turns() {
        let mut session = Session::default();
        let (success, response) = session.execute("play", &["b3", "b2", "chick"]);
        assert!(success, "{response}");
        assert_eq!(response, "▲b2 Chick (b3)");
        assert_eq!(session.to_move(), Side::Second);
        assert_eq!(session.board().hand(Side::First).count(), 1);
    }

    #[test]
    fn test_play_rejects_invalid() {
        let mut session = Session::default();

        let (success, response) = session.execute("play", &["b3", "b2", "dragon"]);
        assert!(!success);
        assert!(response.contains("piece name"));

        let (success, response) = session.execute("play", &["b3", "a2", "elephant"]);
        assert!(!success);
        assert!(response.starts_with("illegal move"));

        assert_eq!(session.board(), &initial_board());
        assert_eq!(session.to_move(), Side::First);
    }

    #[test]
    fn test_genmove_plays_for_side_to_move() {
        let mut session = Session::default();
        let (success, response) = session.execute("genmove", &["2"]);
        assert!(success, "{response}");
        assert!(response.starts_with('▲'));
        assert_eq!(session.to_move(), Side::Second);
    }

    #[test]
    fn test_genmove_reports_node_limit() {
        let config = EngineConfig {
            max_nodes: Some(5),
            ..EngineConfig::default()
        };
        assert!(!config.limits().is_unlimited());
        let mut session = Session::new(config);
        let (success, response) = session.execute("genmove", &["3"]);
        assert!(!success);
        assert_eq!(response, "search aborted after 5 nodes");
        assert_eq!(session.board(), &initial_board());
        assert_eq!(session.to_move(), Side::First);
    }

    #[test]
    fn test_setpos_and_game_over() {
        let mut session = Session::default();
        let (success, _) = session.execute("setpos", &["w", "bL@b4", "bL@hand"]);
        assert!(success);
        assert_eq!(session.to_move(), Side::Second);

        let (success, response) = session.execute("genmove", &[]);
        assert!(!success);
        assert!(response.contains("game over"));

        let (success, response) = session.execute("eval", &["3"]);
        assert!(success);
        assert_eq!(response, "9999");
    }

    #[test]
    fn test_setpos_rejects_overlap() {
        let mut session = Session::default();
        let (success, _) = session.execute("setpos", &["b", "bL@b4", "wL@b4"]);
        assert!(!success);
        assert_eq!(session.board(), &initial_board());
    }

    #[test]
    fn test_run_writes_responses() {
        let mut session = Session::default();
        let input = "1 turn\nplay b3 b2 C\n# comment\n2 turn\nquit\nturn\n";
        let mut output = Vec::new();
        session.run(input.as_bytes(), &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert_eq!(text, "=1 first\n\n= ▲b2 Chick (b3)\n\n=2 second\n\n= \n\n");
    }
}

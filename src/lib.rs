//! Animal Shogi: rules and a brute-force look-ahead engine.
//!
//! A two-player capture game on a 3x4 board. Captured pieces go to the
//! capturer's hand and can be dropped back onto any empty cell. Capturing
//! the opposing lion wins.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry, scores, and engine defaults
//! - [`board`] - Sides, pieces, cells, and the board model
//! - [`moves`] - Move generation, validation, and board transition
//! - [`search`] - Exhaustive fixed-depth minimax
//! - [`playout`] - Random playouts
//! - [`protocol`] - Text command protocol for front ends
//!
//! ## Example
//!
//! ```
//! use animal_shogi::board::{initial_board, Side};
//! use animal_shogi::moves::{apply, generate_moves};
//! use animal_shogi::search::evaluate;
//!
//! let board = initial_board();
//! let moves = generate_moves(&board, Side::First);
//! let next = apply(&board, &moves[0]);
//!
//! let (score, pv) = evaluate(&next, Side::Second, 2);
//! println!("score {score}, best reply {}", pv[0]);
//! ```

pub mod board;
pub mod constants;
pub mod moves;
pub mod playout;
pub mod protocol;
pub mod search;

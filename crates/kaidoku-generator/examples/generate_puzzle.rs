//! Generates one puzzle and prints its clues, solution, and seed.
//!
//! ```sh
//! cargo run --example generate_puzzle
//! ```

use kaidoku_generator::PuzzleGenerator;

fn main() {
    env_logger::init();

    let mut generator = PuzzleGenerator::new();
    println!("Seed:");
    println!("  {}", generator.seed());
    println!();

    match generator.generate_once() {
        Some(puzzle) => {
            println!("Clues:");
            println!("  {}", puzzle.clues);
            println!();
            println!("Board (givens + solution):");
            println!("  {}", puzzle.grid.to_board_string());
            println!();
            match puzzle.difficulty {
                Some(difficulty) => println!("Difficulty: {difficulty:?}"),
                None => println!("Difficulty: beyond the technique library"),
            }
        }
        None => println!("generation failed; try another seed"),
    }
}

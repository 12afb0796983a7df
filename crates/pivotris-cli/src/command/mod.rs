use clap::{Parser, Subcommand};

use self::{shapes::ShapesArg, simulate::SimulateArg};

mod shapes;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play a headless game with random moves and print the final board
    Simulate(#[clap(flatten)] SimulateArg),
    /// Print every piece kind in its four orientations
    Shapes(#[clap(flatten)] ShapesArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Simulate(arg) => simulate::run(&arg)?,
        Mode::Shapes(arg) => shapes::run(&arg)?,
    }
    Ok(())
}

//! Four🍀bar fit command-line tool.
mod cli;

fn main() {
    cli::Entry::main();
}

use clap::Parser;

use terminal_todo::io::logging;

/// A markdown todo list in your terminal
#[derive(Parser, Debug)]
#[command(name = "todo", version, about)]
struct Cli {}

fn main() {
    let _cli = Cli::parse();
    let _log_guard = logging::init();

    if let Err(e) = terminal_todo::tui::run() {
        tracing::error!(error = %e, "startup failed");
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

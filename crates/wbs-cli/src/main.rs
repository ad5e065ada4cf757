use std::io::Write;

use anyhow::Context;
use wbs_cli::{init_logging, parse, scan};

fn main() -> anyhow::Result<()> {
    let cli = parse(std::env::args_os()).unwrap_or_else(|err| err.exit());
    init_logging(cli.verbosity, cli.log_format)?;

    let Some(args) = cli.scan else {
        wbs_cli::command().print_help()?;
        return Ok(());
    };

    let out = scan(&args)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(out.as_bytes()).context("writing output")?;
    stdout.flush()?;
    Ok(())
}

use std::io::{self, BufRead};
use std::time::Duration;

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::services::{
    Analysis, CancelToken, ExpressionService, PlaybackOutcome, Player, Session, SAMPLE_EXPRESSIONS,
};
use crate::cli::args::{Cli, Commands, ConfigCommands, ExpressionArg};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{format_number, render, EventKind};

pub fn execute_command(cli: &Cli, settings: &Settings) -> CliResult<()> {
    let mut settings = settings.clone();
    if cli.strict {
        settings.strict = true;
    }
    let service = ExpressionService::new(settings.mode());

    match &cli.command {
        Commands::Postfix(input) => _postfix(&service, &expression(input, &settings)),
        Commands::Tree(input) => _tree(&service, &expression(input, &settings)),
        Commands::Eval(input) => _eval(&service, &expression(input, &settings)),
        Commands::Visualize(input) => _visualize(&service, &expression(input, &settings)),
        Commands::Steps {
            input,
            delay_ms,
            no_delay,
            limit,
        } => {
            let delay = if *no_delay {
                Duration::ZERO
            } else {
                (*delay_ms).map_or(settings.step_delay(), Duration::from_millis)
            };
            _steps(&service, &expression(input, &settings), delay, *limit)
        }
        Commands::Repl => _repl(service),
        Commands::Examples => _examples(&service),
        Commands::Config { command } => _config(command, &settings),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

fn expression(input: &ExpressionArg, settings: &Settings) -> String {
    input
        .expression
        .clone()
        .unwrap_or_else(|| settings.default_expression.clone())
}

#[instrument(skip(service))]
fn _postfix(service: &ExpressionService, infix: &str) -> CliResult<()> {
    output::info(&service.postfix(infix)?);
    Ok(())
}

#[instrument(skip(service))]
fn _tree(service: &ExpressionService, infix: &str) -> CliResult<()> {
    let tree = service.tree(infix)?;
    print!("{}", render(&tree));
    Ok(())
}

#[instrument(skip(service))]
fn _eval(service: &ExpressionService, infix: &str) -> CliResult<()> {
    output::info(&format_number(service.evaluate(infix)?));
    Ok(())
}

#[instrument(skip(service))]
fn _visualize(service: &ExpressionService, infix: &str) -> CliResult<()> {
    print_analysis(&service.analyze(infix)?);
    Ok(())
}

fn print_analysis(analysis: &Analysis) {
    output::action("Infix Expression", &analysis.infix);
    output::action("Postfix Expression", &analysis.postfix);
    println!();
    output::header("Expression Tree Structure:");
    print!("{}", analysis.rendered_tree());
    println!();
    output::result(&format_number(analysis.result));
}

#[instrument(skip(service))]
fn _steps(
    service: &ExpressionService,
    infix: &str,
    delay: Duration,
    limit: Option<usize>,
) -> CliResult<()> {
    if limit == Some(0) {
        return Err(CliError::InvalidArgs("--limit must be at least 1".to_string()));
    }
    let tree = service.tree(infix)?;
    output::header("Step-by-Step Evaluation (Postorder Traversal):");
    println!();

    let cancel = CancelToken::new();
    let mut shown = 0;
    let outcome = Player::new(delay).play(&tree, &cancel, |event| {
        output::info(event);
        if !matches!(event.kind, EventKind::Visit { .. }) {
            println!();
        }
        shown += 1;
        if limit == Some(shown) {
            cancel.cancel();
        }
    })?;

    match outcome {
        PlaybackOutcome::Completed { result, .. } => output::result(&format_number(result)),
        PlaybackOutcome::Cancelled { events } => {
            output::warning(&format!("stopped after {} steps", events))
        }
    }
    Ok(())
}

/// Interactive loop; a failed expression leaves the last good one in place.
#[instrument(skip(service))]
fn _repl(service: ExpressionService) -> CliResult<()> {
    let mut session = Session::new(service);
    let stdin = io::stdin();
    output::detail("enter an expression, :show, :clear or :quit");

    loop {
        output::prompt("expr>");
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match line.trim() {
            "" => continue,
            ":q" | ":quit" => break,
            ":clear" => session.clear(),
            ":show" => match session.current() {
                Some(analysis) => print_analysis(analysis),
                None => output::detail("nothing to show"),
            },
            infix => match session.submit(infix) {
                Ok(analysis) => print_analysis(analysis),
                Err(e) => output::error(&e),
            },
        }
    }
    debug!("repl finished");
    Ok(())
}

fn _examples(service: &ExpressionService) -> CliResult<()> {
    output::header("Try examples:");
    for sample in SAMPLE_EXPRESSIONS {
        let value = service.evaluate(sample)?;
        output::detail(&format!("{:<32} = {}", sample, format_number(value)));
    }
    Ok(())
}

fn _config(command: &ConfigCommands, settings: &Settings) -> CliResult<()> {
    match command {
        ConfigCommands::Show => print!("{}", settings.to_toml()?),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::warning("no home directory, global config unavailable"),
            }
            let cwd = std::env::current_dir()?;
            output::action("local", &local_config_path(&cwd).display());
        }
        ConfigCommands::Template => print!("{}", Settings::template()),
    }
    Ok(())
}

//! CLI argument definitions using clap

use clap::{ArgAction, Args, Parser, Subcommand};

/// Arithmetic expression trees: convert, build, evaluate and step through
#[derive(Parser, Debug)]
#[command(name = "exprtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose logging to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Reject unbalanced brackets, unknown characters and leftover operands
    #[arg(long, global = true)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Infix expression argument shared by the pipeline commands.
#[derive(Args, Debug, Clone)]
pub struct ExpressionArg {
    /// Infix expression, e.g. "(3+5)*(2-8)" (default: configured default_expression)
    #[arg(allow_hyphen_values = true)]
    pub expression: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the postfix form
    Postfix(ExpressionArg),

    /// Print the expression tree
    Tree(ExpressionArg),

    /// Print the numeric result
    Eval(ExpressionArg),

    /// Print infix, postfix, tree and result
    Visualize(ExpressionArg),

    /// Replay the postorder evaluation step by step
    Steps {
        #[command(flatten)]
        input: ExpressionArg,
        /// Pause before each node visit in milliseconds (default: configured step_delay_ms)
        #[arg(short, long, conflicts_with = "no_delay")]
        delay_ms: Option<u64>,
        /// Print all steps immediately
        #[arg(long)]
        no_delay: bool,
        /// Stop after this many steps
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Read expressions from stdin and visualize each one
    Repl,

    /// List sample expressions
    Examples,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Print a config template
    Template,
}

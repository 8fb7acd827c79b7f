//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::tutor::TaskChoice;

#[derive(Debug, Parser)]
#[command(name = "mathtutor", version, about = "Telegram math tutor backed by DeepSeek")]
pub struct Cli {
    /// Configuration file (defaults to ~/.mathtutor/config.toml)
    #[arg(short, long, global = true, env = "MATHTUTOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Also write logs to a daily-rolling file in this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the Telegram bot (default)
    Run,

    /// Ask the model once and print the answer in message-sized pieces
    Ask {
        #[arg(value_enum)]
        task: TaskArg,
        /// Task input, e.g. "200 15" for a percentage
        input: String,
    },

    /// Print the instruction that would be sent, without calling the model
    Prompt {
        #[arg(value_enum)]
        task: TaskArg,
        input: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TaskArg {
    Equation,
    Percentage,
    Circle,
    Free,
}

impl From<TaskArg> for TaskChoice {
    fn from(arg: TaskArg) -> Self {
        match arg {
            TaskArg::Equation => TaskChoice::SolveEquation,
            TaskArg::Percentage => TaskChoice::Percentage,
            TaskArg::Circle => TaskChoice::CircleArea,
            TaskArg::Free => TaskChoice::FreeForm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_run() {
        let cli = Cli::try_parse_from(["mathtutor"]).expect("parse");
        assert!(cli.command.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn test_parse_ask() {
        let cli = Cli::try_parse_from(["mathtutor", "--debug", "ask", "percentage", "200 15"])
            .expect("parse");
        assert!(cli.debug);
        assert!(
            matches!(
                &cli.command,
                Some(Commands::Ask { task: TaskArg::Percentage, input }) if input == "200 15"
            ),
            "{:?}",
            cli.command
        );
    }

    #[test]
    fn test_task_arg_slugs_match_task_slugs() {
        for arg in TaskArg::value_variants() {
            let name = arg.to_possible_value().expect("visible").get_name().to_string();
            assert_eq!(name, TaskChoice::from(*arg).slug());
        }
    }

    #[test]
    fn test_unknown_task_is_rejected() {
        assert!(Cli::try_parse_from(["mathtutor", "prompt", "algebra", "x"]).is_err());
    }
}

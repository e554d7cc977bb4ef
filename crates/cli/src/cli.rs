use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use jest_runner_core::Action;
use std::path::PathBuf;

use crate::commands::{init_command, locations_command, run_command};

#[derive(Parser, Debug)]
#[command(name = "jest-runner")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Runner {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Print the command and working directory without executing
    #[arg(short = 'd', long = "dry-run", global = true)]
    pub dry_run: bool,

    /// Where the last command is remembered between runs
    #[arg(long, global = true, env = "JEST_RUNNER_SESSION")]
    pub session_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Runner invocation to use instead of the configured one (e.g. "yarn jest")
    #[arg(long = "command", global = true)]
    pub runner_command: Option<String>,

    /// Flags passed to the runner, replacing the configured ones (repeatable)
    #[arg(long = "option", global = true, allow_hyphen_values = true)]
    pub options: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the tests in one file
    #[command(visible_alias = "run-current-file")]
    File {
        /// Path to the test file
        filepath: String,
    },
    /// Run every test in the project
    #[command(visible_alias = "run-all-tests")]
    All {
        /// Any path inside the project (defaults to the current directory)
        path: Option<String>,
    },
    /// Run the describe block enclosing a position
    #[command(visible_alias = "run-at-point")]
    At {
        /// Path with the cursor position (e.g. src/sum.test.ts:12 or src/sum.test.ts:12:5)
        filepath: String,

        /// Byte offset of the cursor instead of LINE[:COL]
        #[arg(long)]
        offset: Option<usize>,
    },
    /// Run the last command again
    #[command(visible_alias = "rerun-last")]
    Rerun,
    /// Print file:line:column locations found in runner output
    Locations {
        /// File holding captured output (defaults to stdin)
        file: Option<PathBuf>,

        /// Directory relative paths are resolved against
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Write a default .jest-runner.json
    Init {
        /// Directory to write the config into (defaults to current directory)
        #[arg(long = "cwd")]
        cwd: Option<String>,

        /// Overwrite an existing configuration file
        #[arg(short = 'f', long = "force")]
        force: bool,
    },
}

impl Commands {
    /// Execute the command
    pub fn execute(self, global: &GlobalArgs) -> Result<()> {
        match self {
            Commands::File { filepath } => {
                run_command(Action::RunCurrentFile, Some(&filepath), None, global)
            }
            Commands::All { path } => run_command(Action::RunAllTests, path.as_deref(), None, global),
            Commands::At { filepath, offset } => {
                run_command(Action::RunAtPoint, Some(&filepath), offset, global)
            }
            Commands::Rerun => run_command(Action::RerunLast, None, None, global),
            Commands::Locations { file, dir } => {
                locations_command(file.as_deref(), dir.as_deref(), global)
            }
            Commands::Init { cwd, force } => init_command(cwd.as_deref(), force),
        }
    }
}

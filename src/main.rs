// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::{Parser, Subcommand};
use lazybin::cancellation::global_token;
use lazybin::commands::install::InstallCommand;
use lazybin::commands::list::ListCommand;
use lazybin::commands::uninstall::UninstallCommand;
use lazybin::commands::which::WhichCommand;
use lazybin::config::new_lazybin_config;
use lazybin::error::{LazybinError, Result, format_error_with_color, get_exit_code};
use lazybin::logging;
use std::io::IsTerminal;

#[derive(Parser)]
#[command(name = "lazybin")]
#[command(author, version, about = "Install and manage the bl release binary", long_about = None)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download and install a release, then make it current
    #[command(visible_alias = "i")]
    Install {
        /// Version to install (e.g., "1.2.0", "v2.0.0"); defaults to the configured version
        version: Option<String>,

        /// Reinstall even if a valid installation exists
        #[arg(short, long)]
        force: bool,

        /// Disable the download progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Print the path of an installed executable
    #[command(visible_alias = "w")]
    Which {
        /// Version to look up; defaults to the configured version
        version: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List installed versions
    #[command(visible_alias = "ls")]
    List,

    /// Remove an installed version
    #[command(visible_alias = "u", alias = "remove")]
    Uninstall {
        /// Version to remove
        version: String,
    },
}

fn main() {
    let cli = Cli::parse();

    logging::setup_logger(cli.verbose);

    let config = match new_lazybin_config() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    let result: Result<()> = (|| match cli.command {
        Commands::Install {
            version,
            force,
            no_progress,
        } => {
            let command = InstallCommand::new(&config, global_token())?;
            command.execute(version.as_deref(), force, no_progress)
        }
        Commands::Which { version, json } => {
            let command = WhichCommand::new(&config)?;
            command.execute(version.as_deref(), json)
        }
        Commands::List => {
            let command = ListCommand::new(&config)?;
            command.execute()
        }
        Commands::Uninstall { version } => {
            let command = UninstallCommand::new(&config)?;
            command.execute(&version)
        }
    })();

    if let Err(e) = result {
        exit_with(&e);
    }
}

fn exit_with(error: &LazybinError) -> ! {
    eprint!(
        "{}",
        format_error_with_color(error, std::io::stderr().is_terminal())
    );
    std::process::exit(get_exit_code(error));
}

// Command-line interface definition.

use clap::{Parser, Subcommand, ValueEnum};

use sevens_core::category::{ALL, DEFAULT_TIERED_GENDER};

#[derive(Debug, Parser)]
#[command(name = "sevens")]
#[command(about = "Standings, fixtures and admin access for the Try It Sevens tournament", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Use the built-in demo data instead of Supabase
    #[arg(long, global = true)]
    pub demo: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the ranked standings table of a category
    Standings {
        /// Gender group (e.g. Male, Ladies, Juniors)
        #[arg(short, long, default_value = DEFAULT_TIERED_GENDER)]
        gender: String,

        /// Tier of the tiered group, or All
        #[arg(short = 't', long = "type", default_value = ALL)]
        category_type: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// List games in kickoff order
    Fixtures {
        /// Gender group, or All
        #[arg(short, long, default_value = ALL)]
        gender: String,

        /// Tier of the tiered group, or All
        #[arg(short = 't', long = "type", default_value = ALL)]
        category_type: String,
    },

    /// Sign in and remember the user
    Login {
        username: String,

        #[arg(short, long)]
        password: String,
    },

    /// Forget the signed-in user
    Logout,

    /// Show the signed-in user and their access level
    Whoami,

    /// Check whether the signed-in user may open an admin page
    Access {
        /// Page path, e.g. /admin/games
        path: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
}

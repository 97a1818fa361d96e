use crate::config::{Config, IndexOptions};
use crate::model::ArtifactKind;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "laridx",
    version,
    about = "Laravel artifact indexer: routes, translations, views, assets",
    after_help = r#"Examples:
  laridx reindex --repo .
  laridx list --kind route
  laridx request --method usages --params '{"kind":"route","key":"users.index"}'
  laridx request --method classify --params '{"file":"routes/web.php","offset":42}'
  laridx serve --repo .
"#
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

/// Flags shared by every subcommand.
#[derive(ClapArgs, Clone)]
pub struct ProjectArgs {
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,
    /// Include files ignored by .gitignore.
    #[arg(long)]
    pub no_ignore: bool,
    /// Parse JSON translation files with a strict JSON parser.
    #[arg(long)]
    pub strict_json: bool,
}

impl ProjectArgs {
    /// Environment defaults with the command-line flags applied on top.
    pub fn options(&self) -> IndexOptions {
        let config = Config::get();
        IndexOptions::from_config(config)
            .with_no_ignore(self.no_ignore)
            .with_strict_json(self.strict_json || config.strict_json)
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Run JSONL RPC server over stdin/stdout.
    Serve {
        #[command(flatten)]
        project: ProjectArgs,
    },
    /// Index the project once and print the stats.
    Reindex {
        #[command(flatten)]
        project: ProjectArgs,
    },
    /// Print every key of one artifact kind.
    List {
        #[command(flatten)]
        project: ProjectArgs,
        /// route|translation|view|asset
        #[arg(long)]
        kind: ArtifactKind,
    },
    /// Run a single JSONL request and exit.
    Request {
        #[command(flatten)]
        project: ProjectArgs,
        #[arg(long)]
        method: String,
        #[arg(long, default_value = "{}")]
        params: String,
        #[arg(long, value_name = "PATH")]
        params_file: Option<PathBuf>,
        #[arg(long, default_value = "1")]
        id: String,
    },
}

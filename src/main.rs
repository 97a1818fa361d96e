use anyhow::Result;
use clap::Parser;
use laridx::query::is_laravel_project;
use laridx::source::FsSourceTree;
use laridx::{LaravelIndex, cli, rpc};
use tracing::warn;

fn warn_if_not_laravel(project: &cli::ProjectArgs) {
    let tree = FsSourceTree::new(project.repo.clone(), project.options());
    if !is_laravel_project(&tree) {
        warn!(
            "{} does not look like a Laravel project; results may be empty",
            project.repo.display()
        );
    }
}

fn main() -> Result<()> {
    let args = cli::Args::parse();

    // stdout carries JSON; logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match args.command {
        cli::Command::Serve { project } => {
            warn_if_not_laravel(&project);
            rpc::serve(&project.repo, project.options())
        }
        cli::Command::Reindex { project } => {
            warn_if_not_laravel(&project);
            let index = LaravelIndex::open(&project.repo, project.options())?;
            let stats = index.refresh()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
        cli::Command::List { project, kind } => {
            warn_if_not_laravel(&project);
            let index = LaravelIndex::open(&project.repo, project.options())?;
            index.refresh()?;
            println!("{}", serde_json::to_string_pretty(&index.query(kind).all())?);
            Ok(())
        }
        cli::Command::Request {
            project,
            method,
            params,
            params_file,
            id,
        } => {
            let params_raw = if let Some(path) = params_file {
                std::fs::read_to_string(&path)?
            } else {
                params
            };
            let response = rpc::call(&project.repo, project.options(), method, &params_raw, &id)?;
            println!("{response}");
            Ok(())
        }
    }
}

mod app;
mod autodetect;
mod catalogs;
mod keymap;
mod logging;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use aztui_core::catalog::RemoteCatalog;
use aztui_core::config::{AppConfig, default_config_path};
use aztui_core::focus::WorkspaceFocusPolicy;
use aztui_core::model::short_ref;

use app::App;
use autodetect::AutoSelect;
use catalogs::{AzureDevOpsCatalog, DemoCatalog};

#[derive(Parser)]
#[command(name = "aztui", version)]
#[command(about = "Browse Azure DevOps projects, repositories and pipelines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Use built-in demo data instead of Azure DevOps
    #[arg(long, global = true)]
    demo: bool,

    /// Where the interactive session writes its log
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Let Tab keep cycling projects and repositories while a workspace is open
    #[arg(long, global = true)]
    skip_workspace_focus: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive browser (default)
    Tui,
    /// List projects
    Projects,
    /// List repositories of a project
    Repos { project: String },
    /// List pipelines of a project
    Pipelines {
        project: String,
        /// Only pipelines building this repository
        #[arg(long)]
        repo: Option<String>,
    },
    /// List recent runs of a pipeline
    Runs { project: String, pipeline_id: u64 },
    /// Show the step timeline of a build
    Timeline { project: String, build_id: u64 },
    /// Store the organization URL and personal access token
    Config {
        #[arg(long)]
        org_url: Option<String>,
        #[arg(long)]
        pat: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Cli {
        command,
        demo,
        log_file,
        skip_workspace_focus,
    } = Cli::parse();

    let policy = if skip_workspace_focus {
        WorkspaceFocusPolicy::SkipWorkspace
    } else {
        WorkspaceFocusPolicy::Blocked
    };

    match command.unwrap_or(Commands::Tui) {
        Commands::Tui => run_tui(demo, log_file, policy).await,
        Commands::Config { org_url, pat } => {
            logging::init_stderr();
            run_config(org_url, pat)
        }
        command => {
            logging::init_stderr();
            let catalog = one_shot_catalog(demo)?;
            run_one_shot(catalog.as_ref(), command).await
        }
    }
}

async fn run_tui(demo: bool, log_file: Option<PathBuf>, policy: WorkspaceFocusPolicy) -> anyhow::Result<()> {
    if let Some(path) = log_file.or_else(logging::default_log_path) {
        logging::init_file(&path)?;
    }
    info!(version = env!("CARGO_PKG_VERSION"), ?policy, "starting aztui");

    let (config, config_note) = match AppConfig::discover() {
        Ok((path, config)) => {
            info!(path = %path.display(), complete = config.is_complete(), "configuration resolved");
            (config, None)
        }
        Err(e) => {
            warn!(error = %e, "could not read configuration");
            let config = AppConfig::default().with_env_overrides(|key| std::env::var(key).ok());
            (config, Some(format!("config error: {}", e)))
        }
    };

    let (catalog, catalog_note) = catalogs::select(&config, demo);
    let auto_select = if !demo && config.is_complete() {
        autodetect::detect_remote(config.org_url()).await.map(AutoSelect::new)
    } else {
        None
    };

    let app = App::new(catalog, policy, config_note.or(catalog_note)).with_auto_select(auto_select);
    app::run(app)
}

fn run_config(org_url: Option<String>, pat: Option<String>) -> anyhow::Result<()> {
    let path = default_config_path()?;
    let mut config = if path.exists() {
        AppConfig::load_from(&path).with_context(|| format!("reading {}", path.display()))?
    } else {
        AppConfig::default()
    };
    if org_url.is_none() && pat.is_none() {
        println!("config file: {}", path.display());
        println!("organization: {}", display_or_unset(config.org_url()));
        let token = if config.azure_pat.is_empty() { "(unset)" } else { "(set)" };
        println!("token: {}", token);
        return Ok(());
    }

    if let Some(url) = org_url {
        config.azure_org_url = url;
    }
    if let Some(pat) = pat {
        config.azure_pat = pat;
    }
    config
        .save(&path)
        .with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "configuration saved");
    println!("saved {}", path.display());
    Ok(())
}

fn display_or_unset(value: &str) -> &str {
    if value.is_empty() { "(unset)" } else { value }
}

fn one_shot_catalog(demo: bool) -> anyhow::Result<Arc<dyn RemoteCatalog>> {
    if demo {
        return Ok(Arc::new(DemoCatalog::new()));
    }
    let (path, config) = AppConfig::discover()?;
    if !config.is_complete() {
        bail!(
            "no organization URL or token configured (checked {} and $AZURE_ORG_URL / $AZURE_PAT); \
             run `aztui config --org-url <url> --pat <token>` or pass --demo",
            path.display()
        );
    }
    Ok(Arc::new(AzureDevOpsCatalog::new(&config)?))
}

async fn run_one_shot(catalog: &dyn RemoteCatalog, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Projects => {
            for project in catalog.list_projects().await? {
                println!("{:<32} {}", project.name, project.id);
            }
        }
        Commands::Repos { project } => {
            for repo in catalog.list_repositories(&project).await? {
                let branch = repo.default_branch.as_deref().map(short_ref).unwrap_or("-");
                println!("{:<32} {:<16} {}", repo.name, branch, repo.id);
            }
        }
        Commands::Pipelines { project, repo } => {
            let pipelines = match repo {
                Some(repo) => catalog.list_pipelines_for_repository(&project, &repo).await?,
                None => catalog.list_pipelines(&project).await?,
            };
            for pipeline in pipelines {
                println!(
                    "{:<8} {:<32} {}",
                    pipeline.id,
                    pipeline.name,
                    pipeline.folder.as_deref().unwrap_or("")
                );
            }
        }
        Commands::Runs {
            project,
            pipeline_id,
        } => {
            for run in catalog.list_runs(&project, pipeline_id).await? {
                println!(
                    "{:<10} {:<20} {:<12} {:<12} {}",
                    run.id,
                    run.name,
                    run.state,
                    run.result.as_deref().unwrap_or("-"),
                    run.created_date.as_deref().unwrap_or("")
                );
            }
        }
        Commands::Timeline { project, build_id } => {
            let mut records = catalog.get_timeline(&project, build_id).await?;
            records.sort_by_key(|r| r.order.unwrap_or(i64::MAX));
            for record in records {
                println!(
                    "{:<10} {:<32} {:<12} {}",
                    record.record_type,
                    record.name,
                    record.state.as_deref().unwrap_or("-"),
                    record.result.as_deref().unwrap_or("-")
                );
            }
        }
        Commands::Tui | Commands::Config { .. } => bail!("not a catalog query"),
    }
    Ok(())
}

use anyhow::{Context, Result};
use bugpatch::api::BackendClient;
use bugpatch::app;
use bugpatch::config::Config;
use bugpatch::logging::{self, LogTarget};
use bugpatch::model::AnalysisTool;
use bugpatch::session::Session;
use bugpatch::ui::App;
use bugpatch::workflow::intake;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "bugpatch",
    about = "Find, fix and validate static-analysis bugs in a GitHub Java repository",
    version
)]
struct Args {
    /// Backend base URL (overrides config and BUGPATCH_SERVER_URL)
    #[arg(short, long)]
    server: Option<String>,

    /// GitHub repository URL to analyze at startup
    #[arg(short, long)]
    repo: Option<String>,

    /// Analysis tool: spotbugs or pmd
    #[arg(short, long, value_parser = parse_tool)]
    tool: Option<AnalysisTool>,

    /// Analyze --repo, print its Java files and exit (no TUI)
    #[arg(long, requires = "repo")]
    list_files: bool,
}

fn parse_tool(s: &str) -> Result<AnalysisTool, String> {
    AnalysisTool::parse(s).ok_or_else(|| format!("unknown tool '{}', expected spotbugs or pmd", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load().with_env();
    if let Some(server) = args.server {
        config.server_url = server;
    }
    if let Some(tool) = args.tool {
        config.default_tool = tool;
    }

    let target = if args.list_files {
        LogTarget::Stderr
    } else {
        LogTarget::File
    };
    if let Err(e) = logging::init(&config.log_level, target) {
        eprintln!("  Logging disabled: {:#}", e);
    }

    let client = BackendClient::new(&config.server_url, config.request_timeout())
        .with_context(|| format!("Invalid server URL '{}'", config.server_url))?;
    tracing::info!(server = %client.base_url(), tool = config.default_tool.as_str(), "starting");

    if args.list_files {
        let url = args.repo.unwrap_or_default();
        return list_files(&client, &url).await;
    }

    let session = Session::new(config.default_tool);
    let mut app = App::new(config, session);
    let start_intake = match args.repo {
        Some(url) => {
            app.repo_input = url;
            true
        }
        None => false,
    };

    app::run_tui(app, client, start_intake).await
}

/// Headless intake: analyze the repository and print its file list
async fn list_files(client: &BackendClient, url: &str) -> Result<()> {
    let repo = intake::prepare(url).map_err(|e| anyhow::anyhow!(e.user_message()))?;
    eprintln!("  Analyzing {} ...", repo.full_name());

    let outcome = intake::run(client, repo)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    eprintln!("  {}", outcome.status());
    for file in &outcome.files {
        println!("{}", file);
    }
    Ok(())
}

// Command-line front-end.
// Looks up a repository and prints its top contributor companies and locations.

use std::process::ExitCode;
use std::str::FromStr;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use contribstats::{
    Config, Contributor, GitHubApi, HistoryKind, HistoryStore, Repository, Result, SummaryItem,
    company_summary, location_summary,
};

/// Company and location statistics for the contributors of a GitHub repository
#[derive(Parser, Debug)]
#[command(name = "contribstats")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Repository to inspect, as OWNER/REPO
    repository: Option<RepoSlug>,

    /// GitHub personal access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Drop all cached API responses before doing anything else
    #[arg(long)]
    clear_cache: bool,

    /// Check the token and print the current rate limit
    #[arg(long)]
    rate_limit: bool,

    /// Print recent searches and bookmarks
    #[arg(long)]
    history: bool,

    /// Also bookmark the repository
    #[arg(long)]
    bookmark: bool,

    /// Also list every contributor with their profile details
    #[arg(long)]
    contributors: bool,

    /// Log level used when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

/// `owner/repo` pair.
#[derive(Debug, Clone)]
struct RepoSlug {
    owner: String,
    repo: String,
}

impl FromStr for RepoSlug {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('/');
        match trimmed.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
                Ok(Self {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                })
            }
            _ => Err(format!("expected OWNER/REPO, got '{}'", s)),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            if e.is_http() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_env();
    if let Some(token) = cli.token {
        config = config.with_token(token);
    }

    let api = GitHubApi::new(config)?;

    if cli.clear_cache {
        api.clear_cache();
        match api.cache().path() {
            Some(path) => println!("Cache cleared ({}).", path.display()),
            None => println!("Cache cleared."),
        }
    }

    if cli.rate_limit {
        let info = api.validate_token().await?;
        let auth = if api.client().has_token() {
            "authenticated"
        } else {
            "anonymous"
        };
        println!(
            "Rate limit ({}): {}/{} remaining, resets at {}",
            auth,
            info.remaining,
            info.limit,
            info.reset.format("%H:%M:%S UTC")
        );
    }

    if cli.history {
        print_history(api.recent_searches());
        print_history(api.bookmarks());
    }

    let Some(RepoSlug { owner, repo }) = cli.repository else {
        return Ok(());
    };

    let repository = api.get_repository(&owner, &repo).await?;
    api.recent_searches().record(&owner, &repo, &repository);
    if cli.bookmark {
        api.bookmarks().record(&owner, &repo, &repository);
    }

    let contributors = api.get_contributors_with_details(&owner, &repo).await?;

    let quota = api.client().last_rate_limit();
    info!(
        remaining = quota.remaining,
        limit = quota.limit,
        "Rate limit after fetch"
    );

    print_repository(&owner, &repository);
    println!("Contributors analysed: {}", contributors.len());
    print_summary("Top companies", "Contributions", &company_summary(&contributors));
    print_summary("Top locations", "Contributors", &location_summary(&contributors));

    if cli.contributors {
        println!();
        println!("Contributors");
        for row in contributor_rows(&contributors) {
            println!("  {}", row);
        }
    }

    Ok(())
}

fn print_repository(owner: &str, repository: &Repository) {
    println!("{}/{}", owner, repository.name);
    if let Some(description) = &repository.description {
        println!("  {}", description);
    }
    println!(
        "  Language: {}  License: {}  Stars: {}  Watchers: {}",
        repository.language.as_deref().unwrap_or("-"),
        repository.license_name().unwrap_or("-"),
        repository.stargazers_count,
        repository.subscribers_count
    );
}

fn print_summary(title: &str, unit: &str, items: &[SummaryItem]) {
    println!();
    println!("{}", title);
    println!("  {:<32} {:>13} {:>7}", "", unit, "%");
    for item in items {
        println!(
            "  {:<32} {:>13} {:>6.1}%",
            item.name, item.count, item.percentage
        );
    }
}

/// One line per contributor, in the order given.
fn contributor_rows(contributors: &[Contributor]) -> Vec<String> {
    let mut rows = vec![format!(
        "{:<24} {:<24} {:<24} {:<24} {:>13}",
        "Login", "Name", "Company", "Location", "Contributions"
    )];

    rows.extend(contributors.iter().map(|c| {
        format!(
            "{:<24} {:<24} {:<24} {:<24} {:>13}",
            c.login,
            c.name.as_deref().unwrap_or("-"),
            c.company.as_deref().unwrap_or("-"),
            c.location.as_deref().unwrap_or("-"),
            c.contributions
        )
    }));

    rows
}

fn print_history(store: &HistoryStore) {
    let title = match store.kind() {
        HistoryKind::RecentSearches => "Recent searches",
        HistoryKind::Bookmarks => "Bookmarks",
    };
    let entries = store.entries();

    println!("{}:", title);
    if entries.is_empty() {
        println!("  (none)");
    }
    for entry in &entries {
        println!(
            "  {:<40} {}",
            entry.id,
            entry.timestamp.format("%Y-%m-%d %H:%M")
        );
    }
}

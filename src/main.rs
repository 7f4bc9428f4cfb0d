use bsky_org_search::config::{BlueskySettings, LoggingSettings, Settings, SettingsError};
use bsky_org_search::core::{Matcher, PaginatedSearch, RateLimitedSearch, RateLimiter};
use bsky_org_search::models::{OrganizationRecord, SearchQuery};
use bsky_org_search::services::report::{self, GithubEnv, ReportError};
use bsky_org_search::services::{ActorSearch, BlueskyClient, BlueskyError};
use dialoguer::{theme::ColorfulTheme, Password};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Attempts at entering the emailed sign-in code before giving up
const MAX_TWO_FACTOR_ATTEMPTS: u32 = 3;

/// Errors that end the whole run
#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Bluesky request failed: {0}")]
    Bluesky(#[from] BlueskyError),

    #[error("Could not read two-factor code: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("Search interrupted by user")]
    Interrupted,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load();
    init_logging(settings.as_ref().map(|s| &s.logging).ok());

    info!("Bluesky Organization Search");

    let result = match settings {
        Ok(settings) => run(settings).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("An error occurred: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(logging: Option<&LoggingSettings>) {
    let defaults = LoggingSettings::default();
    let logging = logging.unwrap_or(&defaults);

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

async fn run(settings: Settings) -> Result<(), RunError> {
    settings.check()?;

    let mut client = BlueskyClient::new(settings.bluesky.service_url.clone(), settings.request_timeout())?;
    login(&mut client, &settings.bluesky).await?;

    let organizations = report::read_organizations(&settings.run.input_file)?;

    let output_dir = PathBuf::from(report::output_dir_name(
        &settings.run.output_dir_prefix,
        chrono::Local::now().naive_local(),
    ));
    std::fs::create_dir_all(&output_dir).map_err(|source| ReportError::Io {
        path: output_dir.clone(),
        source,
    })?;

    let github_env = GithubEnv::from_env();
    if let Some(env) = &github_env {
        env.export_var("REPORT_DIR", &output_dir.display().to_string())?;
    }

    let limiter = RateLimiter::new(settings.rate_limit.max_calls, settings.rate_limit_period());
    info!(
        "Rate limit: {} searches per {}s",
        limiter.max_calls(),
        limiter.period().as_secs()
    );

    let search = PaginatedSearch::new(
        RateLimitedSearch::new(client, limiter),
        Matcher::new(settings.match_thresholds()),
        settings.search_policy(),
    );

    info!("Starting search using {}", settings.run.input_file.display());
    info!("Saving results to {}", output_dir.display());
    info!("This may take a while due to API rate limiting...");

    tokio::select! {
        _ = search_all(
            &search,
            &organizations,
            &output_dir,
            github_env.as_ref(),
            settings.organization_delay(),
        ) => {
            info!("Search completed! Results saved to {}", output_dir.display());
            Ok(())
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Search interrupted. Reports written so far are in {}", output_dir.display());
            Err(RunError::Interrupted)
        }
    }
}

/// Log in, prompting for the emailed code when the account has two-factor enabled
async fn login(client: &mut BlueskyClient, settings: &BlueskySettings) -> Result<(), RunError> {
    match client.login(&settings.username, &settings.app_password).await {
        Ok(session) => {
            info!("Successfully logged in as {}", session.handle);
            return Ok(());
        }
        Err(BlueskyError::AuthFactorTokenRequired) => {
            warn!("Two-factor authentication is required.");
        }
        Err(e) => return Err(e.into()),
    }

    let mut attempt = 1;
    loop {
        let code = Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Enter the 2FA code sent to your email")
            .interact()?;

        match client
            .login_with_token(&settings.username, &settings.app_password, Some(code.trim()))
            .await
        {
            Ok(session) => {
                info!("Successfully logged in with 2FA as {}", session.handle);
                return Ok(());
            }
            Err(e) if attempt < MAX_TWO_FACTOR_ATTEMPTS => {
                warn!("Invalid 2FA code. Please try again. Error: {}", e);
                attempt += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Search every organization in turn, writing one report each
///
/// A failed organization is logged and reported; the run moves on.
async fn search_all<S: ActorSearch>(
    search: &PaginatedSearch<S>,
    organizations: &[OrganizationRecord],
    output_dir: &Path,
    github_env: Option<&GithubEnv>,
    organization_delay: Duration,
) {
    let total = organizations.len();

    for (i, org) in organizations.iter().enumerate() {
        info!("Searching {}/{}: {} ({})", i + 1, total, org.name, org.org_type);

        let query = SearchQuery::new(org.name.clone(), org.org_type.clone());
        let outcome = search.search_organization(&query).await;

        if let Some(e) = &outcome.error {
            if outcome.matches.is_empty() {
                error!("Error processing {}: {}", org.name, e);
            } else {
                warn!(
                    "Search for {} stopped early ({}); keeping {} matches",
                    org.name,
                    e,
                    outcome.matches.len()
                );
            }
        }

        let rows = report::report_rows(&query, &outcome);
        match report::write_report(output_dir, &org.name, &rows) {
            Ok(path) => info!("Results for {} saved to {}", org.name, path.display()),
            Err(e) => error!("Could not write results for {}: {}", org.name, e),
        }

        if let Some(env) = github_env {
            if let Err(e) = env.export_report(&org.name, &outcome.matches) {
                error!("Could not export {} to GITHUB_ENV: {}", org.name, e);
            }
        }

        // Spread organizations out to stay under the remote's limits
        if i + 1 < total {
            tokio::time::sleep(organization_delay).await;
        }
    }
}

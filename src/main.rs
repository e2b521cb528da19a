//! monzo-widget CLI entry point

use std::time::Duration;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;
use anyhow::Result;
use monzo_widget::auth::{accept_redirect, bind_callback, AuthState};
use monzo_widget::{ui, AppContext};

/// How often to re-check strong customer authentication while waiting
const SCA_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Give up waiting for approval in the Monzo app after this many checks
const SCA_MAX_POLLS: usize = 60;

#[derive(Parser)]
#[command(name = "monzo-widget")]
#[command(about = "Monzo account and pot balances in your terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the OAuth client id and secret
    Setup,

    /// Sign in to Monzo
    Login {
        /// Print the authorization URL instead of opening a browser
        #[arg(long)]
        no_browser: bool,
    },

    /// Remove the stored session
    Logout,

    /// Show login and sync status
    Status,

    /// Refresh accounts, balances and pots from the API
    Sync,

    /// List cached balances
    Balances {
        /// Sync before listing
        #[arg(short, long)]
        sync: bool,
    },

    /// Show a balance widget for an account or pot
    Widget {
        /// Account or pot id (defaults to the first account)
        id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Setup => {
            monzo_widget::config::setup()?;
        }

        Commands::Login { no_browser } => run_login(&context()?, no_browser).await?,

        Commands::Logout => {
            context()?.sessions.logout().await?;
            ui::print_success("Logged out");
        }

        Commands::Status => {
            let ctx = context()?;
            ui::print_header("Status");
            print_auth_state(&ctx.sessions.auth_state().await);
            match ctx.repository.last_synced().await? {
                Some(at) => ui::print_step(&format!("Last synced: {}", at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M"))),
                None => ui::print_step("Never synced"),
            }
        }

        Commands::Sync => {
            let ctx = context()?;
            run_sync(&ctx).await?;
            ui::print_accounts(&ctx.repository.accounts().await?);
        }

        Commands::Balances { sync } => {
            let ctx = context()?;
            if sync {
                run_sync(&ctx).await?;
            }
            ui::print_accounts(&ctx.repository.accounts().await?);
        }

        Commands::Widget { id } => {
            let accounts = context()?.repository.accounts().await?;
            match monzo_widget::widget::find_widget(&accounts, id.as_deref()) {
                Some(widget) => ui::print_widget(&widget),
                None => ui::print_warning("Nothing to show yet. Run 'monzo-widget sync' first."),
            }
        }
    }

    Ok(())
}

fn context() -> Result<AppContext> {
    let config = monzo_widget::config::load()?;
    Ok(AppContext::from_config(config)?)
}

async fn run_login(ctx: &AppContext, no_browser: bool) -> Result<()> {
    ui::print_header("Sign in");

    let listener = bind_callback(ctx.config.callback_port).await?;

    let request = ctx.sessions.begin_authorization().await?;
    ui::print_step("Sign in with the email link Monzo sends you.");
    println!("\n  {}\n", request.url);

    if !no_browser {
        if let Err(e) = open::that(request.url.as_str()) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    ui::print_thinking("Waiting for the redirect");
    let params = accept_redirect(listener).await?;
    let mut state = match ctx.sessions.handle_redirect(&params).await {
        Ok(Some(_)) => ctx.sessions.auth_state().await,
        Ok(None) => {
            ui::print_warning("Redirect carried no authorization code, nothing to do.");
            return Ok(());
        }
        Err(e) => AuthState::Error(e.to_string()),
    };
    if state == (AuthState::RequiresAuth { has_session: true }) {
        state = wait_for_approval(ctx).await;
    }
    print_auth_state(&state);
    Ok(())
}

/// Poll until the user approves access in the Monzo app
async fn wait_for_approval(ctx: &AppContext) -> AuthState {
    let spinner = spinner("Approve access in the Monzo app on your phone");

    let mut state = AuthState::Loading;
    for _ in 0..SCA_MAX_POLLS {
        tokio::time::sleep(SCA_POLL_INTERVAL).await;
        state = ctx.sessions.auth_state().await;
        if state != (AuthState::RequiresAuth { has_session: true }) {
            break;
        }
    }

    spinner.finish_and_clear();
    state
}

async fn run_sync(ctx: &AppContext) -> Result<()> {
    let spinner = spinner("Syncing accounts");
    let result = ctx.repository.sync_all().await;
    spinner.finish_and_clear();

    let report = result?;
    if report.is_complete() {
        ui::print_success(&format!("Synced {} accounts", report.accounts));
    } else {
        for (account_id, error) in &report.failures {
            ui::print_error(&format!("{}: {}", account_id, error));
        }
        ui::print_warning(&format!(
            "Synced {} accounts with {} failures",
            report.accounts,
            report.failures.len()
        ));
    }
    Ok(())
}

fn print_auth_state(state: &AuthState) {
    match state {
        AuthState::Authenticated => ui::print_success("Signed in"),
        AuthState::RequiresAuth { has_session: false } => {
            ui::print_warning("Not signed in. Run 'monzo-widget login'.")
        }
        AuthState::RequiresAuth { has_session: true } => {
            ui::print_warning("Waiting for approval in the Monzo app. Run 'monzo-widget status' once approved.")
        }
        AuthState::Error(message) => ui::print_error(message),
        AuthState::Loading => ui::print_thinking("Checking session"),
    }
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

//! Command-line front end for the subtrack subscription service.

mod output;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use output::{
    format_categories_output, format_list_output, format_mutation_output, format_totals_output,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use subtrack_client::{
    spawn_backend, CollectionStore, HttpSubscriptionApi, SessionContext, SubscriptionListView,
};
use subtrack_core::{
    analytics::ChartOrder,
    models::SubscriptionDraft,
    preferences::{FilePreferences, ViewPreferences},
    Config,
};
use tracing::debug;

#[derive(Parser)]
#[command(name = "subtrack", about = "Subscription tracker CLI", version)]
struct Cli {
    /// API base URL (can also be set via SUBTRACK_API_URL)
    #[arg(short, long, env = "SUBTRACK_API_URL")]
    server: Option<String>,

    /// Bearer token from the identity provider (can also be set via SUBTRACK_TOKEN)
    #[arg(long, env = "SUBTRACK_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Request timeout in seconds
    #[arg(short = 't', long)]
    timeout: Option<u64>,

    /// View preference file (defaults to ~/.config/subtrack/view_prefs.json)
    #[arg(long, env = "SUBTRACK_PREFS_PATH")]
    prefs: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Show one page of subscriptions; filter flags are remembered
    List {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(short, long, conflicts_with = "all_categories")]
        category: Option<String>,
        /// Clear the remembered category filter
        #[arg(long)]
        all_categories: bool,
        #[arg(short, long)]
        page: Option<usize>,
    },
    /// List categories
    Categories,
    Create {
        #[arg(short, long)]
        name: String,
        /// Next payment date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,
        #[arg(short, long)]
        amount: String,
        #[arg(long)]
        currency: String,
        /// Category id
        #[arg(short, long)]
        category: String,
    },
    /// Update a subscription; omitted fields keep their current value
    Update {
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        amount: Option<String>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
    },
    Delete {
        id: String,
    },
    /// Per-category spend totals
    Analytics {
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SortArg {
    Asc,
    Desc,
}

impl From<SortArg> for ChartOrder {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Asc => ChartOrder::Ascending,
            SortArg::Desc => ChartOrder::Descending,
        }
    }
}

/// Fields supplied on the command line for an update.
#[derive(Debug, Default)]
struct DraftOverrides {
    name: Option<String>,
    date: Option<String>,
    amount: Option<String>,
    currency: Option<String>,
    category: Option<String>,
}

impl DraftOverrides {
    fn apply(self, draft: &mut SubscriptionDraft) {
        if let Some(name) = self.name {
            draft.service_name = name;
        }
        if let Some(date) = self.date {
            draft.next_payment_date = date;
        }
        if let Some(amount) = self.amount {
            draft.amount = amount;
        }
        if let Some(currency) = self.currency {
            draft.currency = currency;
        }
        if let Some(category) = self.category {
            draft.category_id = category;
        }
    }
}

/// A failed command: printed as `<action> failed: <message>`.
#[derive(Debug)]
struct Failure {
    action: &'static str,
    message: String,
}

impl Failure {
    fn new(action: &'static str, message: impl ToString) -> Self {
        Self {
            action,
            message: message.to_string(),
        }
    }
}

type View = SubscriptionListView<FilePreferences>;

/// Merge CLI flags over environment configuration.
fn resolve_config(
    mut config: Config,
    server: Option<String>,
    token: Option<String>,
    timeout: Option<u64>,
    prefs: Option<PathBuf>,
) -> Config {
    if let Some(server) = server.filter(|s| !s.trim().is_empty()) {
        config.api_url = server.trim().to_string();
    }
    if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
        config.token = Some(token);
    }
    if let Some(secs) = timeout.filter(|secs| *secs > 0) {
        config.request_timeout = Duration::from_secs(secs);
    }
    if let Some(prefs) = prefs {
        config.preferences_path = prefs;
    }
    config
}

fn build_view(config: &Config, action: &'static str) -> Result<View, Failure> {
    let session = Arc::new(SessionContext::new());
    if let Some(token) = config.token.as_deref() {
        session
            .init(token, None)
            .map_err(|err| Failure::new(action, err))?;
    }
    let api = HttpSubscriptionApi::new(&config.api_url, session.clone(), config.request_timeout)
        .map_err(|err| Failure::new(action, err))?;
    let store = CollectionStore::new(spawn_backend(api, config.request_timeout), session);
    let prefs =
        FilePreferences::open(&config.preferences_path).map_err(|err| Failure::new(action, err))?;
    debug!("using preferences at {}", config.preferences_path.display());
    Ok(SubscriptionListView::new(
        store,
        ViewPreferences::new(prefs),
        config.page_size,
    ))
}

/// Wait for every outstanding request and turn the first failure into an error.
fn settle(view: &mut View, action: &'static str, wait: Duration) -> Result<(), Failure> {
    let idle = view.wait_idle(wait);
    if let Some(message) = view.take_last_error() {
        let hint = if view.auth_required() {
            " (set SUBTRACK_TOKEN or pass --token)"
        } else {
            ""
        };
        return Err(Failure::new(action, format!("{}{}", message, hint)));
    }
    if !idle {
        return Err(Failure::new(action, "timed out waiting for the server"));
    }
    Ok(())
}

fn print_output(action: &'static str, rendered: Result<String, String>) -> Result<(), Failure> {
    let output = rendered.map_err(|message| Failure::new(action, message))?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}

fn submit_draft(
    view: &mut View,
    action: &'static str,
    submitted: bool,
) -> Result<(), Failure> {
    if submitted {
        return Ok(());
    }
    if !view.field_errors().is_empty() {
        return Err(Failure::new(action, view.field_errors()));
    }
    let message = view
        .take_last_error()
        .unwrap_or_else(|| "request was not sent".to_string());
    Err(Failure::new(action, message))
}

fn run(cli: Cli) -> Result<(), Failure> {
    let Cli {
        server,
        token,
        json,
        timeout,
        prefs,
        command,
    } = cli;
    let config = resolve_config(Config::from_env(), server, token, timeout, prefs);
    // Leave the worker a moment past its own request timeout to report it.
    let wait = config.request_timeout * 2 + Duration::from_secs(1);

    match command {
        Commands::Completions { .. } => Ok(()),
        Commands::List {
            search,
            category,
            all_categories,
            page,
        } => {
            let mut view = build_view(&config, "List")?;
            view.start();
            settle(&mut view, "List", wait)?;
            if let Some(search) = search {
                view.set_search_text(search);
            }
            if all_categories {
                view.set_selected_category(None);
            } else if let Some(category) = category {
                view.set_selected_category(Some(category));
            }
            if let Some(page) = page {
                view.set_page(page);
            }
            let outcome = view.view();
            print_output("List", format_list_output(&outcome, json))
        }
        Commands::Categories => {
            let mut view = build_view(&config, "Categories")?;
            view.load_categories();
            settle(&mut view, "Categories", wait)?;
            print_output("Categories", format_categories_output(view.categories(), json))
        }
        Commands::Create {
            name,
            date,
            amount,
            currency,
            category,
        } => {
            let mut view = build_view(&config, "Create")?;
            view.start();
            settle(&mut view, "Create", wait)?;
            let draft = SubscriptionDraft {
                service_name: name,
                next_payment_date: date,
                amount,
                currency,
                category_id: category,
            };
            let submitted = view.submit_create(&draft);
            submit_draft(&mut view, "Create", submitted)?;
            settle(&mut view, "Create", wait)?;
            print_output(
                "Create",
                format_mutation_output("Created", draft.service_name.trim(), json),
            )
        }
        Commands::Update {
            id,
            name,
            date,
            amount,
            currency,
            category,
        } => {
            let mut view = build_view(&config, "Update")?;
            view.start();
            settle(&mut view, "Update", wait)?;
            let mut draft = view
                .subscriptions()
                .iter()
                .find(|s| s.subscription_id == id)
                .map(SubscriptionDraft::from_subscription)
                .ok_or_else(|| Failure::new("Update", format!("subscription '{}' not found", id)))?;
            DraftOverrides {
                name,
                date,
                amount,
                currency,
                category,
            }
            .apply(&mut draft);
            let submitted = view.submit_update(&id, &draft);
            submit_draft(&mut view, "Update", submitted)?;
            settle(&mut view, "Update", wait)?;
            print_output("Update", format_mutation_output("Updated", &id, json))
        }
        Commands::Delete { id } => {
            let mut view = build_view(&config, "Delete")?;
            view.request_delete(&id);
            settle(&mut view, "Delete", wait)?;
            print_output("Delete", format_mutation_output("Deleted", &id, json))
        }
        Commands::Analytics { sort } => {
            let mut view = build_view(&config, "Analytics")?;
            view.load_category_totals();
            settle(&mut view, "Analytics", wait)?;
            if let Some(sort) = sort {
                view.set_chart_order(sort.into());
            }
            print_output("Analytics", format_totals_output(&view.chart().points(), json))
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return;
    }

    subtrack_client::init_tracing();
    if let Err(failure) = run(cli) {
        eprintln!("{} failed: {}", failure.action, failure.message);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests;

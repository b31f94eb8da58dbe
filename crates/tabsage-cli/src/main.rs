use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tabsage_core::scope::Scope;
use tabsage_core::session::TabId;
use tabsage_infrastructure::TabSagePaths;

mod browser;
mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "tabsage")]
#[command(about = "TabSage - page summaries and scoped AI questions, kept per browser tab", long_about = None)]
struct Cli {
    /// Use DIR instead of the platform config directory
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Also write logs to <config_dir>/logs/tabsage.log.YYYY-MM-DD
    #[arg(long, global = true)]
    log_to_file: bool,

    #[command(subcommand)]
    command: Command,
}

/// The tab a command acts on.
#[derive(Args, Debug, Clone)]
pub struct TabArgs {
    /// Tab id
    #[arg(long)]
    pub tab: TabId,

    /// URL loaded in the tab
    #[arg(long)]
    pub url: Option<String>,

    /// File with the tab's visible text (`-` reads stdin)
    #[arg(long, value_name = "FILE")]
    pub page: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ScopeArg {
    Page,
    Domain,
    All,
}

impl From<ScopeArg> for Scope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::Page => Scope::Page,
            ScopeArg::Domain => Scope::Domain,
            ScopeArg::All => Scope::All,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Subcommand)]
pub enum Command {
    /// Summarize the page and archive it for domain/all context
    Summarize {
        #[command(flatten)]
        tab: TabArgs,
        /// Switch the tab to this model first
        #[arg(long)]
        model: Option<String>,
    },
    /// Ask a question; replaces the tab's answer
    Ask {
        #[command(flatten)]
        tab: TabArgs,
        #[arg(long, value_enum, default_value = "page")]
        scope: ScopeArg,
        /// Model id (defaults to the tab's current model)
        #[arg(long)]
        model: Option<String>,
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,
    },
    /// Search; accepts a leading [PAGE]/[DOMAIN]/[ALL] tag and appends to the log
    Search {
        #[command(flatten)]
        tab: TabArgs,
        #[arg(long, value_enum, default_value = "page")]
        scope: ScopeArg,
        #[arg(long)]
        model: Option<String>,
        #[arg(required = true, trailing_var_arg = true)]
        query: Vec<String>,
    },
    /// Explain a text selection and append it to the log
    Explain {
        #[arg(long)]
        tab: TabId,
        #[arg(long)]
        model: Option<String>,
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
    /// List the follow-up suggestions, or run one by number
    Suggest {
        #[command(flatten)]
        tab: TabArgs,
        /// 1-based suggestion number to run
        #[arg(long)]
        run: Option<usize>,
        #[arg(long)]
        model: Option<String>,
    },
    /// Print the tab's stored session
    Show {
        #[arg(long)]
        tab: TabId,
        /// Print the stored record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the tab's dark mode preference
    DarkMode {
        #[arg(long)]
        tab: TabId,
        #[arg(value_enum)]
        state: Toggle,
    },
    /// Select the tab's model
    Model {
        #[arg(long)]
        tab: TabId,
        id: String,
    },
    /// Forget a closed tab
    Close {
        #[arg(long)]
        tab: TabId,
    },
    /// Forget every tab not listed as open
    Prune {
        #[arg(long, value_delimiter = ',', num_args = 0..)]
        open: Vec<TabId>,
    },
    /// List registered providers
    Providers,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = match &cli.config_dir {
        Some(dir) => TabSagePaths::with_base_dir(dir),
        None => TabSagePaths::resolve()?,
    };
    let _log_guard = logging::init(&paths, cli.log_to_file)?;

    commands::run(cli.command, &paths).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask_joins_question_words() {
        let cli = Cli::try_parse_from([
            "tabsage", "ask", "--tab", "3", "--url", "https://example.com", "--scope", "domain",
            "what", "is", "this?",
        ])
        .unwrap();

        match cli.command {
            Command::Ask {
                tab,
                scope,
                model,
                question,
            } => {
                assert_eq!(tab.tab, 3);
                assert_eq!(Scope::from(scope), Scope::Domain);
                assert!(model.is_none());
                assert_eq!(question.join(" "), "what is this?");
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_parse_prune_list() {
        let cli = Cli::try_parse_from(["tabsage", "--config-dir", "/tmp/ts", "prune", "--open", "1,4,9"])
            .unwrap();

        assert_eq!(cli.config_dir, Some(PathBuf::from("/tmp/ts")));
        match cli.command {
            Command::Prune { open } => assert_eq!(open, vec![1, 4, 9]),
            _ => panic!("expected prune"),
        }
    }

    #[test]
    fn test_search_requires_query() {
        assert!(Cli::try_parse_from(["tabsage", "search", "--tab", "1"]).is_err());
    }
}

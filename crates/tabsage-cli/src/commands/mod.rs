mod app;
mod providers;
mod query;
mod tab;

use crate::Command;
use anyhow::Result;
use tabsage_infrastructure::TabSagePaths;

pub use app::App;

pub async fn run(command: Command, paths: &TabSagePaths) -> Result<()> {
    match command {
        Command::Summarize { tab, model } => query::summarize(paths, &tab, model.as_deref()).await,
        Command::Ask {
            tab,
            scope,
            model,
            question,
        } => query::ask(paths, &tab, scope.into(), model.as_deref(), &question.join(" ")).await,
        Command::Search {
            tab,
            scope,
            model,
            query,
        } => query::search(paths, &tab, scope.into(), model.as_deref(), &query.join(" ")).await,
        Command::Explain { tab, model, text } => {
            query::explain(paths, tab, model.as_deref(), &text.join(" ")).await
        }
        Command::Suggest { tab, run, model } => {
            query::suggest(paths, &tab, run, model.as_deref()).await
        }
        Command::Show { tab, json } => tab::show(paths, tab, json).await,
        Command::DarkMode { tab, state } => tab::dark_mode(paths, tab, state).await,
        Command::Model { tab, id } => tab::select_model(paths, tab, &id).await,
        Command::Close { tab } => tab::close(paths, tab).await,
        Command::Prune { open } => tab::prune(paths, &open).await,
        Command::Providers => providers::list(paths),
    }
}

//! Commands that call a provider.

use super::App;
use crate::TabArgs;
use crate::browser::CliBrowser;
use anyhow::{Result, bail};
use tabsage_core::scope::Scope;
use tabsage_core::session::{SearchResult, TabId};
use tabsage_infrastructure::TabSagePaths;

pub async fn summarize(paths: &TabSagePaths, tab: &TabArgs, model: Option<&str>) -> Result<()> {
    let app = App::build(paths, CliBrowser::from_args(tab)?)?;
    if let Some(model) = model {
        app.orchestrator.select_model(tab.tab, model).await?;
    }

    let summary = app.orchestrator.summarize_page(tab.tab).await?;
    app.archive_page().await;

    println!("{summary}");
    print_suggestions(&app.orchestrator.suggestions(tab.tab).await);
    Ok(())
}

pub async fn ask(
    paths: &TabSagePaths,
    tab: &TabArgs,
    scope: Scope,
    model: Option<&str>,
    question: &str,
) -> Result<()> {
    let app = App::build(paths, CliBrowser::from_args(tab)?)?;
    let model = app.model_for(tab.tab, model).await;

    let answer = app.orchestrator.ask(question, scope, &model).await?;
    app.archive_page().await;

    println!("{answer}");
    Ok(())
}

pub async fn search(
    paths: &TabSagePaths,
    tab: &TabArgs,
    scope: Scope,
    model: Option<&str>,
    query: &str,
) -> Result<()> {
    let app = App::build(paths, CliBrowser::from_args(tab)?)?;
    let model = app.model_for(tab.tab, model).await;

    let result = app.orchestrator.search(query, scope, &model).await?;
    app.archive_page().await;

    print_result(&result);
    Ok(())
}

pub async fn explain(
    paths: &TabSagePaths,
    tab_id: TabId,
    model: Option<&str>,
    selection: &str,
) -> Result<()> {
    let app = App::build(paths, CliBrowser::detached())?;
    let model = app.model_for(tab_id, model).await;

    let result = app
        .orchestrator
        .explain_selection(tab_id, selection, &model)
        .await?;

    print_result(&result);
    Ok(())
}

/// Lists suggestions, or runs suggestion `run` (1-based).
pub async fn suggest(
    paths: &TabSagePaths,
    tab: &TabArgs,
    run: Option<usize>,
    model: Option<&str>,
) -> Result<()> {
    let app = App::build(paths, CliBrowser::from_args(tab)?)?;

    let Some(number) = run else {
        let suggestions = app.orchestrator.suggestions(tab.tab).await;
        if suggestions.is_empty() {
            println!("No suggestions yet; summarize the page first.");
        }
        print_suggestions(&suggestions);
        return Ok(());
    };
    let Some(index) = number.checked_sub(1) else {
        bail!("suggestions are numbered from 1");
    };

    let model = app.model_for(tab.tab, model).await;
    let result = app
        .orchestrator
        .search_suggestion(tab.tab, index, &model)
        .await?;

    print_result(&result);
    Ok(())
}

fn print_result(result: &SearchResult) {
    tracing::debug!("[Search] stored result {}", result.id);
    println!("{}", result.content);
}

fn print_suggestions(suggestions: &[&str]) {
    if suggestions.is_empty() {
        return;
    }
    println!();
    println!("Suggestions:");
    for (i, suggestion) in suggestions.iter().enumerate() {
        println!("  {}. {}", i + 1, suggestion);
    }
}

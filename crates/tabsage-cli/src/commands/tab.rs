//! Commands that only touch stored sessions.

use super::App;
use crate::Toggle;
use crate::browser::CliBrowser;
use anyhow::Result;
use tabsage_core::session::{Session, TabId};
use tabsage_infrastructure::TabSagePaths;
use tabsage_infrastructure::dto::SessionRecord;

pub async fn show(paths: &TabSagePaths, tab_id: TabId, json: bool) -> Result<()> {
    let app = App::build(paths, CliBrowser::detached())?;
    let session = app.orchestrator.session(tab_id).await;

    if json {
        let record = SessionRecord::from_domain(&session, chrono::Utc::now().timestamp_millis());
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print!("{}", render_session(&session));
    }
    Ok(())
}

pub async fn dark_mode(paths: &TabSagePaths, tab_id: TabId, state: Toggle) -> Result<()> {
    let app = App::build(paths, CliBrowser::detached())?;
    let enabled = matches!(state, Toggle::On);

    app.orchestrator.set_dark_mode(tab_id, enabled).await?;
    println!("Dark mode {} for tab {}", on_off(enabled), tab_id);
    Ok(())
}

pub async fn select_model(paths: &TabSagePaths, tab_id: TabId, model_id: &str) -> Result<()> {
    let app = App::build(paths, CliBrowser::detached())?;

    app.orchestrator.select_model(tab_id, model_id).await?;
    println!("Tab {tab_id} now uses '{model_id}'");
    Ok(())
}

pub async fn close(paths: &TabSagePaths, tab_id: TabId) -> Result<()> {
    let app = App::build(paths, CliBrowser::detached())?;

    app.orchestrator.close_tab(tab_id).await?;
    println!("Forgot tab {tab_id}");
    Ok(())
}

pub async fn prune(paths: &TabSagePaths, open: &[TabId]) -> Result<()> {
    let app = App::build(paths, CliBrowser::detached())?;

    let removed = app.orchestrator.prune(open).await?;
    if removed.is_empty() {
        println!("Nothing to prune");
    } else {
        let ids: Vec<String> = removed.iter().map(ToString::to_string).collect();
        println!("Forgot tabs {}", ids.join(", "));
    }
    Ok(())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

fn render_session(session: &Session) -> String {
    let mut out = format!(
        "Tab {} (model: {}, dark mode: {})\n",
        session.tab_id,
        session.current_model_id,
        on_off(session.dark_mode)
    );

    if let Some(summary) = &session.summary {
        out.push_str(&format!("\nSummary:\n{summary}\n"));
    }
    if let Some(answer) = &session.answer {
        out.push_str(&format!("\nAnswer:\n{answer}\n"));
    }
    if !session.search_results.is_empty() {
        out.push_str(&format!(
            "\nSearch results ({}):\n",
            session.search_results.len()
        ));
        for result in session.search_results.iter() {
            out.push_str(&format!("- [{}] {}\n", result.id, result.content));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_new_session() {
        let session = Session::new(4, "gemini");

        assert_eq!(
            render_session(&session),
            "Tab 4 (model: gemini, dark mode: off)\n"
        );
    }

    #[test]
    fn test_render_full_session() {
        let mut session = Session::new(4, "perplexity");
        session.dark_mode = true;
        session.summary = Some("Reefs are bleaching.".to_string());
        session.search_results = session.search_results.append("Warming seas.", 1_000);

        let rendered = render_session(&session);

        assert!(rendered.starts_with("Tab 4 (model: perplexity, dark mode: on)\n"));
        assert!(rendered.contains("\nSummary:\nReefs are bleaching.\n"));
        assert!(!rendered.contains("Answer:"));
        assert!(rendered.contains("Search results (1):\n- ["));
        assert!(rendered.ends_with("] Warming seas.\n"));
    }
}

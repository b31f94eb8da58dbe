use super::App;
use crate::browser::CliBrowser;
use anyhow::Result;
use tabsage_infrastructure::TabSagePaths;

pub fn list(paths: &TabSagePaths) -> Result<()> {
    let app = App::build(paths, CliBrowser::detached())?;
    let registry = app.orchestrator.registry();

    for id in registry.ids() {
        let marker = if id == app.config.default_model { "*" } else { " " };
        match registry.config(&id) {
            Some(config) => {
                let key = if config.api_key.is_empty() {
                    "no API key"
                } else {
                    "API key set"
                };
                println!(
                    "{marker} {id:<12} {:?} {} ({key})",
                    config.kind, config.model_name
                );
            }
            None => println!("{marker} {id}"),
        }
    }
    Ok(())
}

//! Prompt templates.

use minijinja::{Environment, context};
use tabsage_core::context::ContextBlock;
use tabsage_core::scope::Scope;
use tabsage_core::{Result, TabSageError};

const SUMMARIZE: &str = "summarize";
const QUESTION: &str = "question";
const EXPLAIN: &str = "explain";

const SUMMARIZE_TEMPLATE: &str = r#"Summarize the following web page for a reader who has not seen it.
Cover the main topic, the key points and any conclusions. Use clear, concise language and format with markdown.

Page content{% if truncated %} (excerpt){% endif %}:
{{ context }}"#;

const QUESTION_TEMPLATE: &str = r#"Answer the question using the {{ scope_label }} below.{% if context %} If it does not contain the answer, say so and answer from general knowledge.{% endif %}

{% if context -%}
Context{% if truncated %} (excerpt){% endif %}:
{{ context }}
{%- else -%}
No {{ scope_label }} is available.
{%- endif %}

Question: {{ question }}"#;

const EXPLAIN_TEMPLATE: &str = r#"Please analyze and provide detailed information about: "{{ selection }}"

Your response should:
1. Provide comprehensive context and explanation
2. Include relevant facts and details
3. Cite sources when possible
4. Use clear, concise language
5. Format with markdown for readability"#;

/// Renders the fixed prompt templates.
pub struct PromptBuilder {
    env: Environment<'static>,
}

impl PromptBuilder {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        for (name, source) in [
            (SUMMARIZE, SUMMARIZE_TEMPLATE),
            (QUESTION, QUESTION_TEMPLATE),
            (EXPLAIN, EXPLAIN_TEMPLATE),
        ] {
            env.add_template(name, source).map_err(template_error)?;
        }
        Ok(Self { env })
    }

    pub fn summarize(&self, page: &ContextBlock) -> Result<String> {
        self.render(
            SUMMARIZE,
            context! {
                context => page.text(),
                truncated => page.truncated,
            },
        )
    }

    /// Prompt for `ask` and `search`: the question grounded in `grounding`.
    pub fn question(&self, question: &str, grounding: &ContextBlock) -> Result<String> {
        self.render(
            QUESTION,
            context! {
                question => question.trim(),
                context => grounding.text(),
                truncated => grounding.truncated,
                scope_label => scope_label(grounding.scope),
            },
        )
    }

    pub fn explain(&self, selection: &str) -> Result<String> {
        self.render(EXPLAIN, context! { selection => selection.trim() })
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String> {
        self.env
            .get_template(name)
            .and_then(|template| template.render(ctx))
            .map_err(template_error)
    }
}

fn scope_label(scope: Scope) -> &'static str {
    match scope {
        Scope::Page => "content of the current page",
        Scope::Domain => "content from pages on this site",
        Scope::All => "content from previously visited pages",
    }
}

fn template_error(err: minijinja::Error) -> TabSageError {
    TabSageError::internal(format!("prompt template: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabsage_core::context::ContextSegment;

    fn block(scope: Scope, texts: &[&str]) -> ContextBlock {
        ContextBlock {
            scope,
            segments: texts
                .iter()
                .enumerate()
                .map(|(position, text)| ContextSegment {
                    source: "https://example.com/".into(),
                    text: text.to_string(),
                    relevance: 1.0,
                    position,
                })
                .collect(),
            truncated: false,
        }
    }

    #[test]
    fn test_question_embeds_context_and_question() {
        let prompts = PromptBuilder::new().unwrap();
        let prompt = prompts
            .question(
                "  What is the main topic? ",
                &block(Scope::Page, &["The article discusses coral reef bleaching."]),
            )
            .unwrap();

        assert!(prompt.contains("content of the current page"));
        assert!(prompt.contains("Context:\nThe article discusses coral reef bleaching."));
        assert!(prompt.ends_with("Question: What is the main topic?"));
    }

    #[test]
    fn test_question_without_context() {
        let prompts = PromptBuilder::new().unwrap();
        let prompt = prompts.question("pricing?", &ContextBlock::empty(Scope::Domain)).unwrap();

        assert!(prompt.contains("No content from pages on this site is available."));
        assert!(!prompt.contains("Context"));
    }

    #[test]
    fn test_summarize_marks_excerpts() {
        let prompts = PromptBuilder::new().unwrap();
        let mut page = block(Scope::Page, &["One.", "Two."]);
        assert!(prompts.summarize(&page).unwrap().ends_with("Page content:\nOne.\n\nTwo."));

        page.truncated = true;
        assert!(prompts.summarize(&page).unwrap().contains("Page content (excerpt):"));
    }

    #[test]
    fn test_explain_is_fixed_template() {
        let prompts = PromptBuilder::new().unwrap();
        let prompt = prompts.explain(" photosynthesis ").unwrap();
        assert!(prompt.starts_with(
            "Please analyze and provide detailed information about: \"photosynthesis\""
        ));
        assert!(prompt.ends_with("5. Format with markdown for readability"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let prompts = PromptBuilder::new().unwrap();
        let page = block(Scope::Page, &["Same text."]);
        assert_eq!(prompts.summarize(&page).unwrap(), prompts.summarize(&page).unwrap());
    }
}

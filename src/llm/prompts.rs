//! Prompt templates for grounded question answering

use std::collections::HashMap;

use crate::rag::Context;

/// Template with `{{name}}` placeholders
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    variables: Vec<String>,
}

impl PromptTemplate {
    /// Create a new prompt template
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let variables = extract_variables(&template);
        Self {
            template,
            variables,
        }
    }

    /// Fill in the template in a single pass.
    ///
    /// Substituted values are never rescanned, so retrieved text that happens
    /// to contain `{{question}}` stays literal. Unknown placeholders are kept.
    #[must_use]
    pub fn render(&self, values: &HashMap<&str, &str>) -> String {
        let mut result = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let name = &after[..end];
                    match values.get(name.trim()) {
                        Some(value) => result.push_str(value),
                        None => {
                            result.push_str("{{");
                            result.push_str(name);
                            result.push_str("}}");
                        }
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    result.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        result.push_str(rest);
        result
    }

    /// Get required variables
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
}

/// Extract variable names from template
fn extract_variables(template: &str) -> Vec<String> {
    let mut variables = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };
        let name = after[..end].trim();
        if !name.is_empty() && !variables.iter().any(|v| v == name) {
            variables.push(name.to_string());
        }
        rest = &after[end + 2..];
    }

    variables
}

/// A rendered chat prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    /// Characters sent to the backend, used in diagnostics
    pub fn char_len(&self) -> usize {
        self.system.chars().count() + self.user.chars().count()
    }
}

/// Standard prompts for answering questions about an institution
pub struct QaPrompts;

impl QaPrompts {
    #[must_use]
    pub fn system() -> PromptTemplate {
        PromptTemplate::new(
            r"You are a helpful assistant answering questions about {{institution}}.
Answer using only the numbered context passages provided by the user.
If the passages do not contain the answer, say that you could not find that information.
Be concise. You may use **bold**, *italic* and bullet lists.",
        )
    }

    #[must_use]
    pub fn question() -> PromptTemplate {
        PromptTemplate::new(
            r"Context:
{{context}}

Question: {{question}}",
        )
    }

    /// Build the prompt for one attempt from the current context
    #[must_use]
    pub fn build(institution: &str, context: &Context, question: &str) -> Prompt {
        let rendered_context = render_context(context);

        let mut values = HashMap::new();
        values.insert("institution", institution);
        let system = Self::system().render(&values);

        values.insert("context", rendered_context.as_str());
        values.insert("question", question);
        let user = Self::question().render(&values);

        Prompt { system, user }
    }
}

/// Numbered passages, one block per fragment
fn render_context(context: &Context) -> String {
    context
        .fragments()
        .iter()
        .map(|fragment| match &fragment.source {
            Some(source) => format!("[{}] {}\n(Source: {source})", fragment.rank, fragment.text),
            None => format!("[{}] {}", fragment.rank, fragment.text),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

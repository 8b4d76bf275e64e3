//! Views handed to the templating collaborator

use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::Record,
    validation::escape_html,
};

/// A named template plus its view-model
#[derive(Debug, Clone)]
pub struct View {
    pub template: &'static str,
    pub context: Value,
}

impl View {
    pub fn new(template: &'static str, context: Value) -> Self {
        Self { template, context }
    }

    pub fn title(&self) -> &str {
        self.context["title"].as_str().unwrap_or(self.template)
    }
}

/// What a controller flow resolved to
#[derive(Debug, Clone)]
pub enum Page {
    Render(View),
    Redirect(String),
}

impl Page {
    pub fn redirect(to: impl Into<String>) -> Self {
        Page::Redirect(to.into())
    }
}

/// Turns a [`View`] into HTML
pub trait ViewRenderer: Send + Sync {
    fn render(&self, view: &View) -> AppResult<String>;
}

/// Bare-bones renderer: page title plus the view-model as a readable dump.
/// Deployments with real templates plug their own [`ViewRenderer`] in.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer;

impl ViewRenderer for HtmlRenderer {
    fn render(&self, view: &View) -> AppResult<String> {
        let context = serde_json::to_string_pretty(&view.context)
            .map_err(|e| AppError::Render(format!("{}: {}", view.template, e)))?;
        let title = escape_html(view.title());
        Ok(format!(
            "<!DOCTYPE html>\n<html>\n<head><title>{title}</title></head>\n<body data-view=\"{template}\">\n\
             <h1>{title}</h1>\n<pre>{context}</pre>\n</body>\n</html>\n",
            template = view.template,
            context = escape_html(&context),
        ))
    }
}

/// View-model form of a record: its stored fields, its url and derived display strings
pub fn present<R: Record>(record: &R) -> AppResult<Value> {
    let mut value = serde_json::to_value(record)
        .map_err(|e| AppError::Render(format!("{} {}: {}", R::KIND, record.id(), e)))?;
    if let Value::Object(fields) = &mut value {
        fields.insert("url".to_string(), Value::String(record.url()));
        for (name, text) in record.display_fields() {
            fields.insert(name.to_string(), Value::String(text));
        }
    }
    Ok(value)
}

pub fn present_all<'a, R: Record>(records: impl IntoIterator<Item = &'a R>) -> AppResult<Vec<Value>> {
    records.into_iter().map(present).collect()
}

/// A form choice flagged with `flag` (`selected`, `checked`) when `on`
pub fn choice<R: Record>(record: &R, flag: &str, on: bool) -> AppResult<Value> {
    let mut value = present(record)?;
    if let Value::Object(fields) = &mut value {
        fields.insert(flag.to_string(), json!(on));
    }
    Ok(value)
}

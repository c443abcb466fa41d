//! Content generation collaborator.
//!
//! The orchestrator hands a [`GenerationPayload`] to a [`Generator`] and
//! stores the markup it returns. [`TemplateGenerator`] is the built-in
//! implementation: it rebuilds a standalone page from the sanitized DOM and
//! the extracted style facts without calling any external service.

use std::fmt::Write as _;

use async_trait::async_trait;
use webclone_core::payload::GenerationPayload;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Generation failed: {0}")]
    Failed(String),

    #[error("Generation produced no markup")]
    Empty,
}

#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, payload: &GenerationPayload) -> Result<String, GenerationError>;
}

/// Number of palette entries exposed as CSS custom properties.
const PALETTE_VARS: usize = 8;

#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateGenerator;

#[async_trait]
impl Generator for TemplateGenerator {
    async fn generate(&self, payload: &GenerationPayload) -> Result<String, GenerationError> {
        let html = render(payload);
        if html.trim().is_empty() {
            return Err(GenerationError::Empty);
        }
        Ok(html)
    }
}

fn render(payload: &GenerationPayload) -> String {
    let metadata = &payload.metadata;
    let charset = metadata.charset.as_deref().unwrap_or("utf-8");
    let viewport = metadata
        .viewport
        .as_deref()
        .unwrap_or("width=device-width, initial-scale=1");
    let title = metadata.title.as_deref().unwrap_or(&payload.url);

    let mut head = String::new();
    let _ = writeln!(head, r#"<meta charset="{}">"#, escape(charset));
    let _ = writeln!(head, r#"<meta name="viewport" content="{}">"#, escape(viewport));
    if let Some(description) = &metadata.description {
        let _ = writeln!(head, r#"<meta name="description" content="{}">"#, escape(description));
    }
    let _ = writeln!(head, "<title>{}</title>", escape(title));
    let _ = writeln!(head, "<style>\n{}</style>", stylesheet(payload));

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n{head}</head>\n<body>\n{}\n</body>\n</html>\n",
        body_content(&payload.dom_excerpt)
    )
}

fn stylesheet(payload: &GenerationPayload) -> String {
    let mut css = String::from(":root {\n");
    let palette = payload.colors.iter().filter_map(|c| css_value(c));
    for (i, color) in palette.take(PALETTE_VARS).enumerate() {
        let _ = writeln!(css, "  --palette-{i}: {color};");
    }
    css.push_str("}\n");

    let mut body_rules: Vec<(&str, &str)> = Vec::new();
    if let Some(metrics) = &payload.typography.body {
        body_rules.push(("font-family", metrics.font_family.as_str()));
        body_rules.push(("font-size", metrics.font_size.as_str()));
        body_rules.push(("line-height", metrics.line_height.as_str()));
    } else if let Some(font) = payload.typography.fonts.first() {
        body_rules.push(("font-family", font.as_str()));
    }
    if let Some(body) = &payload.css.body {
        for prop in ["color", "background-color", "margin", "padding"] {
            if let Some(value) = body.get(prop) {
                body_rules.push((prop, value.as_str()));
            }
        }
    }
    push_rule(&mut css, "body", &body_rules);

    for (level, metrics) in &payload.typography.headings {
        push_rule(
            &mut css,
            level,
            &[
                ("font-family", metrics.font_family.as_str()),
                ("font-size", metrics.font_size.as_str()),
                ("font-weight", metrics.font_weight.as_str()),
                ("line-height", metrics.line_height.as_str()),
            ],
        );
    }
    css
}

/// Write `selector { ... }` from the declarations whose values are safe to
/// embed. Nothing is written when none are.
fn push_rule(css: &mut String, selector: &str, declarations: &[(&str, &str)]) {
    let declarations: Vec<_> = declarations
        .iter()
        .filter_map(|(prop, value)| css_value(value).map(|value| (prop, value)))
        .collect();
    if declarations.is_empty() {
        return;
    }
    let _ = writeln!(css, "{selector} {{");
    for (prop, value) in declarations {
        let _ = writeln!(css, "  {prop}: {value};");
    }
    css.push_str("}\n");
}

/// A page-supplied value fit for a declaration inside `<style>`, or `None`.
///
/// Values containing CSS or markup delimiters are dropped.
fn css_value(raw: &str) -> Option<&str> {
    let value = raw.trim();
    let unsafe_char = |c: char| matches!(c, '<' | '>' | '{' | '}' | ';') || c.is_control();
    (!value.is_empty() && !value.contains(unsafe_char)).then_some(value)
}

/// Inner markup of `<body>` when present, otherwise the whole excerpt.
fn body_content(dom: &str) -> &str {
    let lower = dom.to_ascii_lowercase();
    let Some(open) = lower.find("<body") else {
        return dom.trim();
    };
    let Some(open_end) = lower[open..].find('>').map(|i| open + i + 1) else {
        return dom.trim();
    };
    let close = lower.rfind("</body").filter(|&c| c >= open_end).unwrap_or(dom.len());
    dom[open_end..close].trim()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

use std::collections::HashMap;

use chrono::Utc;
use gtmpl::{Context, Template};
use notification_common::{Alert, NotifyContext};
use tracing::debug;
use url::Url;

use crate::data::extended_data;
use crate::defaults::DEFAULT_TEMPLATES;
use crate::error::{TemplateError, TemplateResult};
use crate::funcs;
use crate::outline::{check_calls, outline};

const NOTIFICATION_TEMPLATE: &str = "notification";
const DEFAULT_SOURCE: &str = "default";

/// Result of expanding several templates against one notification
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    /// One entry per requested template, in request order
    pub rendered: Vec<String>,
    /// First execution error. Templates after the failing one render empty.
    pub failure: Option<TemplateError>,
}

/// Expands user templates against an alert group
pub trait AlertTemplater: Send + Sync {
    /// Base URL links in notifications are built from
    fn external_url(&self) -> &Url;

    /// Expand `templates` in order. Malformed templates fail the whole call;
    /// execution errors are reported through [`Expansion::failure`].
    fn expand(
        &self,
        ctx: &NotifyContext,
        alerts: &[Alert],
        templates: &[&str],
    ) -> TemplateResult<Expansion>;
}

/// Template library: the defaults plus any registered definitions
#[derive(Debug, Clone)]
pub struct Templates {
    external_url: Url,
    /// Registered definition sources, parsed after the defaults
    definitions: Vec<(String, String)>,
    /// `template` calls made by every known definition
    calls: HashMap<String, Vec<String>>,
}

/// Pre-scan `src` and merge its definitions into `calls`
fn scan(name: &str, src: &str, calls: &mut HashMap<String, Vec<String>>) -> TemplateResult<()> {
    let found = outline(src).map_err(|e| TemplateError::parse(name, e))?;
    calls.extend(found.calls);
    check_calls(calls).map_err(|e| TemplateError::parse(name, e))
}

fn parse(template: &mut Template, name: &str, src: &str) -> TemplateResult<()> {
    template
        .parse(src)
        .map_err(|e| TemplateError::parse(name, e))
}

fn render(template: &Template, context: &Context) -> (String, Option<TemplateError>) {
    let mut out: Vec<u8> = Vec::new();
    let failure = template
        .execute(&mut out, context)
        .err()
        .map(|e| TemplateError::exec(NOTIFICATION_TEMPLATE, e));
    (String::from_utf8_lossy(&out).into_owned(), failure)
}

impl Templates {
    pub fn new(external_url: Url) -> TemplateResult<Self> {
        let mut calls = HashMap::new();
        scan(DEFAULT_SOURCE, DEFAULT_TEMPLATES, &mut calls)?;

        let templates = Self {
            external_url,
            definitions: Vec::new(),
            calls,
        };
        templates.compile("")?;
        Ok(templates)
    }

    /// Register every `define` block in `src`. Later registrations override
    /// earlier ones and the defaults.
    pub fn with_definitions(mut self, name: &str, src: &str) -> TemplateResult<Self> {
        let mut calls = self.calls.clone();
        scan(name, src, &mut calls)?;

        self.calls = calls;
        self.definitions.push((name.to_string(), src.to_string()));
        self.compile("")?;

        debug!("Registered template definitions from {}", name);
        Ok(self)
    }

    /// Check that `src` is well formed without executing it
    pub fn check(src: &str) -> TemplateResult<()> {
        scan(NOTIFICATION_TEMPLATE, src, &mut HashMap::new())?;

        let mut template = Template::default();
        funcs::register(&mut template);
        parse(&mut template, NOTIFICATION_TEMPLATE, src)
    }

    /// The whole library with `src` as the template to execute
    fn compile(&self, src: &str) -> TemplateResult<Template> {
        scan(NOTIFICATION_TEMPLATE, src, &mut self.calls.clone())?;

        let mut template = Template::default();
        funcs::register(&mut template);
        parse(&mut template, DEFAULT_SOURCE, DEFAULT_TEMPLATES)?;
        for (name, definitions) in &self.definitions {
            parse(&mut template, name, definitions)?;
        }
        parse(&mut template, NOTIFICATION_TEMPLATE, src)?;
        Ok(template)
    }
}

impl AlertTemplater for Templates {
    fn external_url(&self) -> &Url {
        &self.external_url
    }

    fn expand(
        &self,
        ctx: &NotifyContext,
        alerts: &[Alert],
        templates: &[&str],
    ) -> TemplateResult<Expansion> {
        // Whitespace-only sources render as themselves
        let compiled = templates
            .iter()
            .map(|src| {
                if src.trim().is_empty() {
                    Ok(None)
                } else {
                    self.compile(src).map(Some)
                }
            })
            .collect::<TemplateResult<Vec<Option<Template>>>>()?;

        let context = Context::from(extended_data(ctx, alerts, &self.external_url, Utc::now()));
        let mut expansion = Expansion::default();

        for (src, template) in templates.iter().zip(&compiled) {
            if expansion.failure.is_some() {
                expansion.rendered.push(String::new());
                continue;
            }

            match template {
                Some(template) => {
                    let (output, failure) = render(template, &context);
                    expansion.rendered.push(output);
                    expansion.failure = failure;
                }
                None => expansion.rendered.push(src.to_string()),
            }
        }

        Ok(expansion)
    }
}

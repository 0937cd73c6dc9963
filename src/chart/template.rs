use std::collections::BTreeMap;

use crate::data::filter::FilterPredicate;
use crate::error::ChartError;

/// Variables available to `{placeholder}` templates for one chart.
#[derive(Debug, Clone, Default)]
pub struct Vars(BTreeMap<String, String>);

impl Vars {
    /// `metric` and `METRIC`, plus every filter column mapped to its value.
    pub fn for_chart(metric: &str, filter: &FilterPredicate) -> Self {
        let mut vars = Vars::default();
        for (column, value) in filter.constraints() {
            vars.set(column, value.to_string());
        }
        vars.set("metric", metric);
        vars.set("METRIC", metric.to_uppercase());
        vars
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Substitute every `{name}` in `template`. `{{` and `}}` are literal braces.
    pub fn render(&self, template: &str) -> Result<String, ChartError> {
        let fail = |reason: String| ChartError::Template {
            template: template.to_string(),
            reason,
        };

        let mut out = String::with_capacity(template.len());
        let mut chars = template.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    out.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    out.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) => name.push(c),
                            None => return Err(fail("unclosed '{'".to_string())),
                        }
                    }
                    let value = self
                        .0
                        .get(&name)
                        .ok_or_else(|| fail(format!("unknown placeholder '{name}'")))?;
                    out.push_str(value);
                }
                '}' => return Err(fail("unmatched '}'".to_string())),
                c => out.push(c),
            }
        }
        Ok(out)
    }

    pub fn render_all(&self, templates: &[String]) -> Result<Vec<String>, ChartError> {
        templates.iter().map(|t| self.render(t)).collect()
    }
}

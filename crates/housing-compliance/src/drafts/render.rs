use handlebars::{Handlebars, RenderError, Template, TemplateError};

use crate::fields::FieldContext;

fn registry() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
}

/// Plain substitution of `{{field}}` placeholders. Any placeholder without a
/// value is an error rather than blank output.
pub fn render_text(source: &str, fields: &FieldContext) -> Result<String, RenderError> {
    registry().render_template(source, fields)
}

pub(crate) fn check_syntax(source: &str) -> Result<(), TemplateError> {
    Template::compile(source).map(|_| ())
}

//! # Template Engine
//!
//! Wraps a Handlebars registry holding the projection templates and their
//! mixins. A mixin is rendered first, with the same context as the
//! template that includes it, and its text is exposed to that template as
//! `mixin`.

use std::fs;
use std::io::Write;
use std::path::Path;

use handlebars::{Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use mox_structure::StructureRegistry;

use crate::catalog::{BUILTIN_MIXINS, BUILTIN_TEMPLATES, TEMPLATES, TEMPLATE_EXTENSION};
use crate::context::{capitalize, ProjectionContext};
use crate::error::TemplateError;
use crate::options::TemplateOptions;

pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
    options: TemplateOptions,
}

impl TemplateEngine {
    /// Engine with the embedded templates, mixins and option table.
    pub fn builtin() -> Result<Self, TemplateError> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(true);
        handlebars.register_helper("uppercase", Box::new(uppercase_helper));
        handlebars.register_helper("capitalize", Box::new(capitalize_helper));

        let mut engine = Self {
            handlebars,
            options: TemplateOptions::builtin()?,
        };
        for (name, source) in BUILTIN_TEMPLATES.iter().chain(BUILTIN_MIXINS) {
            engine.register(name, source)?;
        }
        Ok(engine)
    }

    pub fn with_options(mut self, options: TemplateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &TemplateOptions {
        &self.options
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.handlebars.has_template(name)
    }

    /// Register (or replace) a template or mixin.
    pub fn register(&mut self, name: &str, source: &str) -> Result<(), TemplateError> {
        self.handlebars
            .register_template_string(name, source)
            .map_err(|e| TemplateError::Parse {
                name: name.to_string(),
                reason: e.to_string(),
            })
    }

    /// Register every `*.sql.hbs` file in `dir`, replacing built-ins of the
    /// same name. Returns the number of files loaded.
    pub fn load_directory(&mut self, dir: &Path) -> Result<usize, TemplateError> {
        let mut files: Vec<_> = fs::read_dir(dir)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|entry| entry.path())
            .collect();
        files.sort();

        let mut loaded = 0;
        for path in files {
            let Some(name) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_suffix(TEMPLATE_EXTENSION))
            else {
                continue;
            };
            let source = fs::read_to_string(&path)?;
            self.register(name, &source)?;
            tracing::debug!(template = name, path = %path.display(), "loaded template");
            loaded += 1;
        }
        Ok(loaded)
    }

    /// Render one (object type, template) pair.
    pub fn project(
        &self,
        registry: &StructureRegistry,
        object_type: &str,
        template: &str,
    ) -> Result<String, TemplateError> {
        let (name, description) = registry.entry(object_type)?;
        if !self.has_template(template) {
            return Err(TemplateError::TemplateNotFound(template.to_string()));
        }
        let mixin = self.options.include_mixin(name.as_str(), template);
        if !self.has_template(mixin) {
            return Err(TemplateError::MixinNotFound {
                object_type: name.to_string(),
                template: template.to_string(),
                mixin: mixin.to_string(),
            });
        }

        let mut context = ProjectionContext::build(name.as_str(), description, template, mixin)?;
        context.mixin = self.render(mixin, &context)?;
        self.render(template, &context)
    }

    fn render(&self, template: &str, context: &ProjectionContext) -> Result<String, TemplateError> {
        self.handlebars
            .render(template, context)
            .map_err(|e| TemplateError::Render {
                object_type: context.oio_type.clone(),
                template: template.to_string(),
                reason: e.to_string(),
            })
    }

    /// Render every pair: object types sorted, templates in declaration
    /// order, one blank line between outputs. Pairs that render only
    /// whitespace are skipped. Returns the number of pairs written.
    pub fn project_all(
        &self,
        registry: &StructureRegistry,
        out: &mut dyn Write,
    ) -> Result<usize, TemplateError> {
        let mut rendered = 0;
        for name in registry.object_types() {
            for template in TEMPLATES {
                let text = self.project(registry, name.as_str(), template)?;
                let text = text.trim_matches(&['\n', '\r'][..]);
                if text.trim().is_empty() {
                    tracing::debug!(object_type = %name, template, "empty projection skipped");
                    continue;
                }
                if rendered > 0 {
                    out.write_all(b"\n")?;
                }
                out.write_all(text.as_bytes())?;
                out.write_all(b"\n")?;
                rendered += 1;
            }
        }
        out.flush()?;
        tracing::info!(pairs = rendered, object_types = registry.len(), "templates applied");
        Ok(rendered)
    }

    /// [`project_all`](Self::project_all) into a string.
    pub fn project_all_to_string(
        &self,
        registry: &StructureRegistry,
    ) -> Result<String, TemplateError> {
        let mut buffer = Vec::new();
        self.project_all(registry, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| TemplateError::Render {
            object_type: String::new(),
            template: String::new(),
            reason: e.to_string(),
        })
    }
}

// Handlebars helpers

fn uppercase_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let param = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    out.write(&param.to_uppercase())?;
    Ok(())
}

fn capitalize_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let param = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    out.write(&capitalize(param))?;
    Ok(())
}

//! Templated tenant communications with vulnerability-aware tone selection.

mod catalog;
mod render;

pub use render::render_text;

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Entity, VulnerabilityMarker};
use crate::fields::FieldContext;
use crate::tables::TableError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tone {
    Formal,
    Supportive,
    Urgent,
    Legal,
}

impl Tone {
    pub const fn ordered() -> [Self; 4] {
        [Self::Formal, Self::Supportive, Self::Urgent, Self::Legal]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Formal => "formal",
            Self::Supportive => "supportive",
            Self::Urgent => "urgent",
            Self::Legal => "legal",
        }
    }

    /// Any vulnerability marker forces a supportive tone; otherwise the
    /// requested tone, defaulting to formal.
    pub fn resolve(requested: Option<Tone>, markers: &[VulnerabilityMarker]) -> Tone {
        if !markers.is_empty() {
            return Tone::Supportive;
        }
        requested.unwrap_or(Tone::Formal)
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Tone::ordered()
            .into_iter()
            .find(|tone| tone.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| format!("unknown tone '{value}'"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error("template {template} is missing required fields: {}", .missing.join(", "))]
    IncompleteContext {
        template: String,
        missing: Vec<String>,
    },
    #[error("unknown draft template {0}")]
    UnknownTemplate(String),
    #[error("failed to render template {template}: {message}")]
    Render { template: String, message: String },
}

/// One communication type. The letter is assembled as salutation, shared
/// body, the tone's paragraph, optional closing, sign-off and signatory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftTemplate {
    pub id: String,
    pub title: String,
    /// Fields that must be present and non-blank; `salutation` is always required.
    #[serde(default)]
    pub required_fields: Vec<String>,
    pub body: String,
    /// Must contain a formal paragraph; other tones fall back to it.
    pub tone_variants: BTreeMap<Tone, String>,
    #[serde(default)]
    pub closing: Option<String>,
    pub signatory: String,
}

impl DraftTemplate {
    pub fn paragraph_for(&self, tone: Tone) -> Option<&str> {
        self.tone_variants
            .get(&tone)
            .or_else(|| self.tone_variants.get(&Tone::Formal))
            .map(String::as_str)
    }

    fn missing_fields(&self, fields: &FieldContext) -> Vec<String> {
        std::iter::once("salutation")
            .chain(self.required_fields.iter().map(String::as_str))
            .filter(|field| !fields.has(field))
            .map(str::to_string)
            .collect()
    }

    fn source(&self, tone: Tone, sign_off: &str) -> String {
        let mut source = String::from("{{salutation}},\n\n");
        source.push_str(self.body.trim_end());
        if let Some(paragraph) = self.paragraph_for(tone) {
            source.push_str("\n\n");
            source.push_str(paragraph.trim_end());
        }
        if let Some(closing) = &self.closing {
            source.push_str("\n\n");
            source.push_str(closing.trim_end());
        }
        source.push_str("\n\n");
        source.push_str(sign_off);
        source.push_str(",\n");
        source.push_str(&self.signatory);
        source.push_str("\n{{organisation}}");
        source
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Draft {
    pub template: String,
    pub tone: Tone,
    pub text: String,
}

/// Versioned set of draft templates plus organisation-wide sign-offs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateLibrary {
    version: String,
    organisation: String,
    sign_offs: BTreeMap<Tone, String>,
    templates: Vec<DraftTemplate>,
}

impl Default for TemplateLibrary {
    fn default() -> Self {
        catalog::library()
    }
}

impl TemplateLibrary {
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let library: Self = serde_json::from_reader(reader).map_err(TableError::Json)?;
        library.validate()?;
        Ok(library)
    }

    pub fn validate(&self) -> Result<(), TableError> {
        for template in &self.templates {
            if !template.tone_variants.contains_key(&Tone::Formal) {
                return Err(TableError::MissingFormalVariant(template.id.clone()));
            }
            for tone in Tone::ordered() {
                render::check_syntax(&template.source(tone, self.sign_off(tone))).map_err(
                    |err| TableError::Template {
                        id: template.id.clone(),
                        message: err.to_string(),
                    },
                )?;
            }
        }
        Ok(())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn organisation(&self) -> &str {
        &self.organisation
    }

    pub fn templates(&self) -> &[DraftTemplate] {
        &self.templates
    }

    pub fn get(&self, id: &str) -> Option<&DraftTemplate> {
        self.templates.iter().find(|template| template.id == id)
    }

    pub fn sign_off(&self, tone: Tone) -> &str {
        self.sign_offs
            .get(&tone)
            .or_else(|| self.sign_offs.get(&Tone::Formal))
            .map(String::as_str)
            .unwrap_or("Kind regards")
    }

    pub fn draft(
        &self,
        template_id: &str,
        entity: &Entity,
        requested: Option<Tone>,
    ) -> Result<Draft, DraftError> {
        self.draft_with_related(template_id, entity, &[], requested)
    }

    /// Related entities (e.g. the tenant of a repair) contribute fields the
    /// primary entity lacks and their vulnerability markers.
    pub fn draft_with_related(
        &self,
        template_id: &str,
        entity: &Entity,
        related: &[Entity],
        requested: Option<Tone>,
    ) -> Result<Draft, DraftError> {
        let template = self
            .get(template_id)
            .ok_or_else(|| DraftError::UnknownTemplate(template_id.to_string()))?;

        let markers: Vec<VulnerabilityMarker> = std::iter::once(entity)
            .chain(related)
            .flat_map(|e| e.vulnerability_markers().iter().cloned())
            .collect();
        let tone = Tone::resolve(requested, &markers);

        let mut fields = FieldContext::with_related(entity, related);
        fields.insert_missing("organisation", self.organisation.as_str());

        let missing = template.missing_fields(&fields);
        if !missing.is_empty() {
            return Err(DraftError::IncompleteContext {
                template: template.id.clone(),
                missing,
            });
        }

        let text = render_text(&template.source(tone, self.sign_off(tone)), &fields).map_err(
            |err| DraftError::Render {
                template: template.id.clone(),
                message: err.to_string(),
            },
        )?;

        debug!(
            template = %template.id,
            requested = ?requested,
            tone = %tone,
            entity = %entity.reference(),
            "rendered draft"
        );

        Ok(Draft {
            template: template.id.clone(),
            tone,
            text,
        })
    }
}

/// Render `template_id` for `entity` from the given library.
pub fn draft(
    library: &TemplateLibrary,
    template_id: &str,
    entity: &Entity,
    requested: Option<Tone>,
) -> Result<Draft, DraftError> {
    library.draft(template_id, entity, requested)
}

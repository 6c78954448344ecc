//! URL objects and URL groups.

use crate::Result;
use fmc_client::{fmc_resource, ObjectId};
use fmc_core::types::Metadata;
use fmc_core::validation::{object_name, sanitize_name};
use fmc_core::{Error, ObjectRef};
use serde::{Deserialize, Serialize};

fn checked_url(url: &str) -> Result<String> {
    let url = url.trim();
    if url.is_empty() || url.chars().any(char::is_whitespace) {
        return Err(Error::ValidationError(format!("invalid URL `{url}`")));
    }
    Ok(url.to_string())
}

/// URL object (`object/urls`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UrlObject {
    /// Object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Object name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `Url`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// URL or host pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether child domains may override the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overridable: Option<bool>,
    /// Server metadata.
    #[serde(default, skip_serializing)]
    pub metadata: Option<Metadata>,
}

impl UrlObject {
    /// Create a URL object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] for an empty URL or one containing
    /// whitespace.
    pub fn new(name: &str, url: &str) -> Result<Self> {
        Ok(Self {
            name: Some(object_name(name)?),
            kind: Some("Url".to_string()),
            url: Some(checked_url(url)?),
            ..Self::default()
        })
    }
}

fmc_resource!(UrlObject, "Url", "object/urls", {
    const REQUIRED_FOR_POST: &'static [&'static str] = &["name", "url"];
});

/// Inline URL inside a [`UrlGroup`] (`{"type": "Url", "url": ...}`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UrlLiteral {
    /// Always `Url`.
    #[serde(rename = "type")]
    pub kind: String,
    /// URL or host pattern.
    pub url: String,
}

/// Group of URL objects and literals (`object/urlgroups`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UrlGroup {
    /// Object id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Object name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Always `UrlGroup`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Member objects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<ObjectRef>,
    /// Inline URLs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub literals: Vec<UrlLiteral>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Server metadata.
    #[serde(default, skip_serializing)]
    pub metadata: Option<Metadata>,
}

impl UrlGroup {
    /// Create an empty group with a sanitized name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(sanitize_name(name)),
            kind: Some("UrlGroup".to_string()),
            ..Self::default()
        }
    }

    /// Add an inline URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] for an invalid URL.
    pub fn add_literal(&mut self, url: &str) -> Result<()> {
        let url = checked_url(url)?;
        if !self.literals.iter().any(|literal| literal.url == url) {
            self.literals.push(UrlLiteral {
                kind: "Url".to_string(),
                url,
            });
        }
        Ok(())
    }

    /// Remove the inline URL; returns whether one was removed.
    pub fn remove_literal(&mut self, url: &str) -> bool {
        let before = self.literals.len();
        self.literals.retain(|literal| literal.url != url);
        before != self.literals.len()
    }
}

crate::group_members!(UrlGroup);

fmc_resource!(UrlGroup, "UrlGroup", "object/urlgroups");

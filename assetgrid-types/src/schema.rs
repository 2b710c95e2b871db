//! Schema types: properties (columns) and sections (column groups).
//!
//! The schema is supplied by an external subsystem and is read-only input to
//! the engine. The engine consults it for property kinds (edit/fill/clear
//! rules) and for display-order resolution of clipboard bounds.

use crate::ids::{PropertyId, PropertyKey, SectionId, TableId};
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// The declared type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Text,
    Integer,
    Float,
    Boolean,
    Tag,
    Reference,
    Media,
}

impl PropertyKind {
    /// Kinds edited through the keyboard cell editor.
    ///
    /// Booleans, tags, references and media use single-click controls outside
    /// the editing state machine.
    #[must_use]
    pub fn is_keyboard_editable(&self) -> bool {
        matches!(self, Self::Text | Self::Integer | Self::Float)
    }

    /// Kinds eligible for fill-down.
    #[must_use]
    pub fn is_fillable(&self) -> bool {
        self.is_keyboard_editable()
    }

    /// The value a cell of this kind takes when its contents are cleared.
    #[must_use]
    pub fn cleared_value(&self) -> Value {
        match self {
            Self::Boolean => Value::Bool(false),
            _ => Value::Null,
        }
    }
}

/// A column definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub key: PropertyKey,
    pub label: String,
    pub section_id: SectionId,
    pub kind: PropertyKind,
    /// Display position within the section.
    pub order: u32,
    /// Allowed options. Only meaningful when kind is Tag.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Tables a reference may point into. Only meaningful when kind is Reference.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_targets: Vec<TableId>,
}

impl Property {
    fn simple(key: &str, label: &str, section_id: SectionId, kind: PropertyKind, order: u32) -> Self {
        Self {
            id: PropertyId::new(),
            key: PropertyKey::from(key),
            label: label.to_string(),
            section_id,
            kind,
            order,
            options: Vec::new(),
            reference_targets: Vec::new(),
        }
    }

    /// Shorthand for a text column.
    pub fn text(key: &str, label: &str, section_id: SectionId, order: u32) -> Self {
        Self::simple(key, label, section_id, PropertyKind::Text, order)
    }

    /// Shorthand for an integer column.
    pub fn integer(key: &str, label: &str, section_id: SectionId, order: u32) -> Self {
        Self::simple(key, label, section_id, PropertyKind::Integer, order)
    }

    /// Shorthand for a float column.
    pub fn float(key: &str, label: &str, section_id: SectionId, order: u32) -> Self {
        Self::simple(key, label, section_id, PropertyKind::Float, order)
    }

    /// Shorthand for a checkbox column.
    pub fn boolean(key: &str, label: &str, section_id: SectionId, order: u32) -> Self {
        Self::simple(key, label, section_id, PropertyKind::Boolean, order)
    }

    /// Shorthand for a tag column with fixed options.
    pub fn tag(key: &str, label: &str, section_id: SectionId, order: u32, options: Vec<String>) -> Self {
        Self {
            options,
            ..Self::simple(key, label, section_id, PropertyKind::Tag, order)
        }
    }

    /// Shorthand for a reference column.
    pub fn reference(
        key: &str,
        label: &str,
        section_id: SectionId,
        order: u32,
        targets: Vec<TableId>,
    ) -> Self {
        Self {
            reference_targets: targets,
            ..Self::simple(key, label, section_id, PropertyKind::Reference, order)
        }
    }

    /// Shorthand for a media column.
    pub fn media(key: &str, label: &str, section_id: SectionId, order: u32) -> Self {
        Self::simple(key, label, section_id, PropertyKind::Media, order)
    }

    /// Returns true if `option` is one of this tag property's declared options.
    #[must_use]
    pub fn allows_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

/// A column group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub name: String,
    pub order: u32,
}

impl Section {
    pub fn new(name: impl Into<String>, order: u32) -> Self {
        Self {
            id: SectionId::new(),
            name: name.into(),
            order,
        }
    }
}

/// The full column layout of a table, in display order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    sections: Vec<Section>,
    properties: Vec<Property>,
}

impl Schema {
    /// Builds a schema, sorting sections and properties into display order.
    #[must_use]
    pub fn new(mut sections: Vec<Section>, mut properties: Vec<Property>) -> Self {
        sections.sort_by_key(|s| s.order);
        let section_rank: std::collections::HashMap<SectionId, usize> = sections
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id, i))
            .collect();
        properties.sort_by_key(|p| {
            (
                section_rank.get(&p.section_id).copied().unwrap_or(usize::MAX),
                p.order,
            )
        });
        Self {
            sections,
            properties,
        }
    }

    /// All properties in display order.
    #[must_use]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// All sections in display order.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Looks up a property by key.
    #[must_use]
    pub fn property(&self, key: &PropertyKey) -> Option<&Property> {
        self.properties.iter().find(|p| &p.key == key)
    }

    /// The property at a display index (column position).
    #[must_use]
    pub fn property_at(&self, index: usize) -> Option<&Property> {
        self.properties.get(index)
    }

    /// The display index of a property key.
    #[must_use]
    pub fn index_of(&self, key: &PropertyKey) -> Option<usize> {
        self.properties.iter().position(|p| &p.key == key)
    }
}

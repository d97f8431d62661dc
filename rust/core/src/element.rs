// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BIM elements as handed over by the document collaborator.
//!
//! Elements are read-only for the lifetime of a loaded model. Each one maps
//! 1:1 to a scene object through [`Element::object`].

use serde::{Deserialize, Serialize};

/// Express id of a BIM element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u32);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle of a scene object in the external viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u32);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Loaded document a scene object belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub u32);

/// A single BIM entity (wall, door, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub family_type: String,
    #[serde(rename = "objectId")]
    pub object: ObjectId,
    #[serde(default)]
    pub document: DocumentId,
}

/// Named attribute of an element, used for grouping and searching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Attribute {
    Name,
    Id,
    Category,
    Family,
    FamilyType,
}

impl Attribute {
    pub const ALL: [Attribute; 5] = [
        Attribute::Name,
        Attribute::Id,
        Attribute::Category,
        Attribute::Family,
        Attribute::FamilyType,
    ];

    /// Parses the name returned by [`Attribute::as_str`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Attribute::Name => "name",
            Attribute::Id => "id",
            Attribute::Category => "category",
            Attribute::Family => "family",
            Attribute::FamilyType => "familyType",
        }
    }
}

impl Element {
    /// Leaf title: `"name [id]"`.
    pub fn label(&self) -> String {
        format!("{} [{}]", self.name, self.id)
    }

    /// Returns the value of one attribute as text.
    pub fn attribute(&self, attribute: Attribute) -> std::borrow::Cow<'_, str> {
        match attribute {
            Attribute::Name => self.name.as_str().into(),
            Attribute::Id => self.id.to_string().into(),
            Attribute::Category => self.category.as_str().into(),
            Attribute::Family => self.family.as_str().into(),
            Attribute::FamilyType => self.family_type.as_str().into(),
        }
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixtures shared by the unit tests.

use crate::element::{DocumentId, Element, ElementId, ObjectId};

/// Element whose scene object id equals its element id.
pub fn element(id: u32, name: &str, category: &str, family: &str, family_type: &str) -> Element {
    Element {
        id: ElementId(id),
        name: name.to_string(),
        category: category.to_string(),
        family: family.to_string(),
        family_type: family_type.to_string(),
        object: ObjectId(id),
        document: DocumentId(0),
    }
}

/// Two categories, four families, five types.
pub fn sample_elements() -> Vec<Element> {
    vec![
        element(1, "Basic Wall 1", "Walls", "Basic Wall", "Generic 200"),
        element(2, "Basic Wall 2", "Walls", "Basic Wall", "Generic 200"),
        element(3, "Basic Wall 3", "Walls", "Basic Wall", "Generic 300"),
        element(4, "Curtain Wall 1", "Walls", "Curtain Wall", "Storefront"),
        element(5, "Door 1", "Doors", "Single Flush", "900 x 2100"),
        element(6, "Door 2", "Doors", "Single Flush", "800 x 2100"),
    ]
}

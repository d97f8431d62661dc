// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Text and JSON rendering of a session's tree.

use std::io::{self, Write};

use bim_shell_core::{NodeIndex, ObjectId, ViewerSession, Visibility};
use serde::Serialize;

fn marker(visibility: Option<Visibility>) -> char {
    match visibility {
        Some(Visibility::Visible) => '+',
        Some(Visibility::Hidden) => '-',
        Some(Visibility::Mixed) => '~',
        None => '?',
    }
}

/// Indented outline, one node per line: `[n] + Title (leaves)`.
pub fn write_outline(out: &mut impl Write, session: &ViewerSession) -> io::Result<()> {
    let tree = session.tree();
    for node in tree.nodes() {
        let indent = "  ".repeat(node.depth as usize);
        let mark = marker(session.visibility(node.index));
        if node.is_leaf() {
            writeln!(out, "{indent}{} {mark} {}", node.index, node.title)?;
        } else {
            let leaves = tree.leafs(node.index).len();
            writeln!(out, "{indent}{} {mark} {} ({leaves})", node.index, node.title)?;
        }
    }
    Ok(())
}

/// Last line of the text output.
pub fn write_summary(out: &mut impl Write, session: &ViewerSession) -> io::Result<()> {
    let tree = session.tree();
    write!(out, "{} nodes, {} leaves", tree.len(), tree.leaf_count())?;
    if !session.search_text().is_empty() {
        write!(out, ", filter \"{}\"", session.search_text())?;
    }
    match session.isolation().current() {
        Some(current) => {
            let mut ids: Vec<ObjectId> = current.iter().copied().collect();
            ids.sort_unstable();
            let ids: Vec<String> = ids.iter().map(|o| o.0.to_string()).collect();
            writeln!(out, ", isolated [{}]", ids.join(","))
        }
        None => writeln!(out, ", no isolation"),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonNode<'a> {
    index: u32,
    title: &'a str,
    visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    object_id: Option<ObjectId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<JsonNode<'a>>,
}

fn json_node(session: &ViewerSession, index: NodeIndex) -> Option<JsonNode<'_>> {
    let tree = session.tree();
    let node = tree.node(index)?;
    Some(JsonNode {
        index: index.0,
        title: &node.title,
        visibility: session.visibility(index),
        object_id: node.element().map(|e| e.object),
        children: node
            .children()
            .iter()
            .filter_map(|&c| json_node(session, c))
            .collect(),
    })
}

/// Nested JSON document of the whole tree.
pub fn write_json(out: &mut impl Write, session: &ViewerSession) -> anyhow::Result<()> {
    let roots: Vec<JsonNode<'_>> = session
        .tree()
        .roots()
        .iter()
        .filter_map(|&r| json_node(session, r))
        .collect();
    serde_json::to_writer_pretty(&mut *out, &roots)?;
    writeln!(out)?;
    Ok(())
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loads elements into a session and replays actions against an
//! in-memory scene.

use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use bim_shell_core::{Element, InMemoryScene, NodeIndex, Scene, ShellConfig, ViewerSession};

use crate::cli::{Action, Args};

pub fn load_config(args: &Args) -> Result<ShellConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
            ShellConfig::from_json(&json).with_context(|| format!("parsing {path}"))?
        }
        None => ShellConfig::from_env(),
    };
    if let Some(group_by) = &args.group_by {
        config.group_by = group_by.clone();
    }
    Ok(config.normalized())
}

pub fn load_elements(path: &str) -> Result<Vec<Element>> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    serde_json::from_str(&json).with_context(|| format!("parsing elements in {path}"))
}

/// Scene with one object per element, all visible.
pub fn scene_for(elements: &[Element]) -> InMemoryScene {
    let mut scene = InMemoryScene::new();
    for element in elements {
        scene.insert(element.object, element.document, None);
    }
    scene
}

pub fn open(config: ShellConfig, elements: Vec<Element>) -> Result<(ViewerSession, InMemoryScene)> {
    let scene = scene_for(&elements);
    let mut session = ViewerSession::new(config);
    session.subscribe(|change| {
        tracing::info!(
            source = %change.source,
            active = change.active,
            count = change.count,
            "isolation changed"
        );
    });
    let elements: Arc<[Element]> = elements.into();
    session.set_elements(elements)?;
    session.on_visibility_changed(&scene);
    Ok((session, scene))
}

fn node(session: &ViewerSession, index: u32) -> Result<NodeIndex> {
    let index = NodeIndex(index);
    session.tree().try_node(index)?;
    Ok(index)
}

/// Applies one action. Returns whether it changed anything.
pub fn apply(
    session: &mut ViewerSession,
    scene: &mut InMemoryScene,
    action: &Action,
) -> Result<bool> {
    let changed = match action {
        Action::Isolate(objects, source) => {
            session.isolate(scene, objects.iter().copied(), *source)
        }
        Action::Show(objects, source) => session.show(scene, objects.iter().copied(), *source),
        Action::Hide(objects, source) => session.hide(scene, objects.iter().copied(), *source),
        Action::IsolateNode(index, source) => {
            let index = node(session, *index)?;
            session.isolate_node(scene, index, *source)
        }
        Action::HideNode(index, source) => {
            let index = node(session, *index)?;
            session.hide_node(scene, index, *source)
        }
        Action::ShowNode(index, source) => {
            let index = node(session, *index)?;
            session.show_node(scene, index, *source)
        }
        Action::Select(objects) => {
            scene.select(objects);
            !session.on_selection_changed(scene).is_empty()
        }
        Action::Toggle(source) => session.toggle_isolation(scene, *source),
        Action::Clear(source) => session.clear_isolation(scene, *source),
        Action::Search(text) => {
            session.set_filter(text.clone(), 0.0);
            session.flush_filter(scene)?
        }
        Action::SearchIsolate => session.set_searching(scene, true),
    };
    tracing::debug!(?action, changed, "action applied");
    Ok(changed)
}

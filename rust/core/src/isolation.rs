// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session-wide isolation state.
//!
//! An isolation is the set of scene objects that stay visible while
//! everything else is hidden (and optionally ghosted). One
//! [`IsolationController`] exists per viewer session; every consumer gets it
//! by reference instead of reaching for shared module state.
//!
//! Each operation writes the visible flags it needs to change, clears the
//! viewer selection, optionally reframes the camera and notifies the
//! subscribers with the [`ChangeSource`] that asked for it. Operations return
//! whether anything changed; unchanged requests touch nothing and notify
//! nobody.

use rustc_hash::FxHashSet;

use crate::element::{DocumentId, ObjectId};
use crate::scene::{MaterialOverride, Scene};
use crate::source::ChangeSource;

/// Side effects applied together with visibility changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsolationOptions {
    /// Set the ghost material override while an isolation is active.
    pub ghost_material: bool,
    /// Frame the camera on the visible objects after a change.
    pub reframe: bool,
}

impl Default for IsolationOptions {
    fn default() -> Self {
        Self {
            ghost_material: true,
            reframe: true,
        }
    }
}

/// Notification delivered to subscribers after every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsolationChange {
    pub source: ChangeSource,
    /// Whether an isolation is active after the change.
    pub active: bool,
    /// Number of isolated objects (zero when inactive).
    pub count: usize,
}

/// Handle returned by [`IsolationController::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&IsolationChange)>;

/// Owner of the `{current, previous}` isolation state.
pub struct IsolationController {
    current: Option<FxHashSet<ObjectId>>,
    previous: Option<FxHashSet<ObjectId>>,
    /// Source of the last change that produced `current`.
    origin: Option<ChangeSource>,
    scope: Option<DocumentId>,
    options: IsolationOptions,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl IsolationController {
    pub fn new(options: IsolationOptions) -> Self {
        Self {
            current: None,
            previous: None,
            origin: None,
            scope: None,
            options,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn options(&self) -> IsolationOptions {
        self.options
    }

    pub fn set_options(&mut self, options: IsolationOptions) {
        self.options = options;
    }

    /// Limits "all objects" to one loaded document.
    pub fn set_scope(&mut self, scope: Option<DocumentId>) {
        self.scope = scope;
    }

    /// The isolated objects, `None` when everything is visible.
    pub fn current(&self) -> Option<&FxHashSet<ObjectId>> {
        self.current.as_ref()
    }

    /// Non-empty isolation replaced by the latest change, kept for
    /// restoring. Clearing leaves it untouched.
    pub fn previous(&self) -> Option<&FxHashSet<ObjectId>> {
        self.previous.as_ref()
    }

    /// Where the active isolation came from, `None` when nothing is isolated.
    pub fn origin(&self) -> Option<ChangeSource> {
        self.origin
    }

    /// Whether an isolation is active.
    pub fn any(&self) -> bool {
        self.current.is_some()
    }

    /// Registers a change listener.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&IsolationChange) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Makes exactly `objects` visible.
    pub fn set<I>(&mut self, scene: &mut dyn Scene, objects: I, source: ChangeSource) -> bool
    where
        I: IntoIterator<Item = ObjectId>,
    {
        let target = self.resolve(scene, objects);
        if self.current.as_ref() == Some(&target) {
            return false;
        }
        self.apply(scene, target, source, self.options.reframe);
        true
    }

    /// Adds `objects` to the isolation. Covering every object ends it.
    pub fn show<I>(&mut self, scene: &mut dyn Scene, objects: I, source: ChangeSource) -> bool
    where
        I: IntoIterator<Item = ObjectId>,
    {
        let added = self.resolve(scene, objects);
        if added.is_empty() {
            return false;
        }

        let mut union = self.current.clone().unwrap_or_default();
        let before = union.len();
        union.extend(added);
        if self.current.is_some() && union.len() == before {
            return false;
        }

        let all = scene.all_objects(self.scope);
        if all.iter().all(|o| union.contains(o)) {
            return self.reset(scene, source);
        }
        self.apply(scene, union, source, self.options.reframe);
        true
    }

    /// Removes `objects` from the visible set (everything, if no isolation
    /// is active).
    ///
    /// Hiding from the context menu never reframes: the user is still
    /// working on the surrounding geometry.
    pub fn hide<I>(&mut self, scene: &mut dyn Scene, objects: I, source: ChangeSource) -> bool
    where
        I: IntoIterator<Item = ObjectId>,
    {
        let removed = self.resolve(scene, objects);
        if removed.is_empty() {
            return false;
        }

        let base: FxHashSet<ObjectId> = match &self.current {
            Some(current) => current.clone(),
            None => scene.all_objects(self.scope).into_iter().collect(),
        };
        if !removed.iter().any(|o| base.contains(o)) {
            return false;
        }

        let complement = base.difference(&removed).copied().collect();
        let reframe = self.options.reframe && source != ChangeSource::ContextMenu;
        self.apply(scene, complement, source, reframe);
        true
    }

    /// Isolate, swap or cancel depending on the live viewer selection.
    ///
    /// | isolation | selection            | result                   |
    /// |-----------|----------------------|--------------------------|
    /// | none      | non-empty            | isolate the selection    |
    /// | active    | empty or == current  | cancel                   |
    /// | active    | different            | isolate the selection    |
    /// | none      | empty                | restore previous, if any |
    pub fn toggle_contextual(&mut self, scene: &mut dyn Scene, source: ChangeSource) -> bool {
        let selection = self.resolve(scene, scene.selection());

        if self.current.is_some()
            && (selection.is_empty() || self.current.as_ref() == Some(&selection))
        {
            return self.clear(scene, source);
        }
        if !selection.is_empty() {
            self.apply(scene, selection, source, self.options.reframe);
            return true;
        }
        match self.previous.clone() {
            Some(previous) => self.set(scene, previous, source),
            None => false,
        }
    }

    /// Shows everything and ends the isolation.
    pub fn clear(&mut self, scene: &mut dyn Scene, source: ChangeSource) -> bool {
        self.reset(scene, source)
    }

    /// Forgets all state without touching the scene, e.g. on session teardown.
    pub fn forget(&mut self) {
        self.current = None;
        self.previous = None;
        self.origin = None;
    }

    fn reset(&mut self, scene: &mut dyn Scene, source: ChangeSource) -> bool {
        if self.current.take().is_none() {
            return false;
        }
        self.origin = None;

        let all = scene.all_objects(self.scope);
        for &object in &all {
            if !scene.is_visible(object) {
                scene.set_visible(object, true);
            }
        }
        if self.options.ghost_material {
            scene.set_material_override(None);
        }
        scene.clear_selection();
        if self.options.reframe {
            if let Some(bounds) = scene.bounds_of(&all) {
                scene.frame(bounds);
            }
        }

        tracing::debug!(%source, "isolation cleared");
        self.notify(source);
        true
    }

    fn apply(
        &mut self,
        scene: &mut dyn Scene,
        target: FxHashSet<ObjectId>,
        source: ChangeSource,
        reframe: bool,
    ) {
        if let Some(current) = self.current.take() {
            if !current.is_empty() {
                self.previous = Some(current);
            }
        }

        let mut changed = 0usize;
        for object in scene.all_objects(self.scope) {
            let visible = target.contains(&object);
            if scene.is_visible(object) != visible {
                scene.set_visible(object, visible);
                changed += 1;
            }
        }
        if self.options.ghost_material {
            scene.set_material_override(Some(MaterialOverride::Ghost));
        }
        scene.clear_selection();
        if reframe {
            let visible: Vec<ObjectId> = target.iter().copied().collect();
            if let Some(bounds) = scene.bounds_of(&visible) {
                scene.frame(bounds);
            }
        }

        tracing::debug!(%source, isolated = target.len(), changed, "isolation updated");
        self.current = Some(target);
        self.origin = Some(source);
        self.notify(source);
    }

    /// Drops objects the scene no longer knows about.
    fn resolve<I>(&self, scene: &dyn Scene, objects: I) -> FxHashSet<ObjectId>
    where
        I: IntoIterator<Item = ObjectId>,
    {
        let mut dropped = 0usize;
        let resolved = objects
            .into_iter()
            .filter(|&o| {
                let known = scene.contains(o);
                if !known {
                    dropped += 1;
                }
                known
            })
            .collect();
        if dropped > 0 {
            tracing::warn!(dropped, "skipping objects missing from the scene");
        }
        resolved
    }

    fn notify(&mut self, source: ChangeSource) {
        let change = IsolationChange {
            source,
            active: self.current.is_some(),
            count: self.current.as_ref().map_or(0, FxHashSet::len),
        };
        for (_, listener) in self.listeners.iter_mut() {
            listener(&change);
        }
    }
}

impl Default for IsolationController {
    fn default() -> Self {
        Self::new(IsolationOptions::default())
    }
}

impl std::fmt::Debug for IsolationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IsolationController")
            .field("current", &self.current.as_ref().map(FxHashSet::len))
            .field("previous", &self.previous.as_ref().map(FxHashSet::len))
            .field("origin", &self.origin)
            .field("scope", &self.scope)
            .field("options", &self.options)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::DocumentId;
    use crate::scene::{Bounds, InMemoryScene};
    use nalgebra::Point3;
    use std::cell::RefCell;
    use std::rc::Rc;

    const A: ObjectId = ObjectId(1);
    const B: ObjectId = ObjectId(2);
    const C: ObjectId = ObjectId(3);
    const D: ObjectId = ObjectId(4);

    fn scene(objects: &[ObjectId]) -> InMemoryScene {
        let mut scene = InMemoryScene::new();
        for &o in objects {
            let x = f64::from(o.0);
            let bounds = Bounds::new(Point3::new(x, 0.0, 0.0), Point3::new(x + 1.0, 1.0, 1.0));
            scene.insert(o, DocumentId(0), Some(bounds));
        }
        scene
    }

    fn set_of(objects: &[ObjectId]) -> FxHashSet<ObjectId> {
        objects.iter().copied().collect()
    }

    fn recorder(ctl: &mut IsolationController) -> Rc<RefCell<Vec<IsolationChange>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        ctl.subscribe(move |c| sink.borrow_mut().push(*c));
        log
    }

    #[test]
    fn set_then_clear_restores_everything() {
        let mut scene = scene(&[A, B, C]);
        let mut ctl = IsolationController::default();

        assert!(ctl.set(&mut scene, [A], ChangeSource::Tree));
        assert_eq!(scene.visible_objects(), vec![A]);
        assert_eq!(scene.material(), Some(MaterialOverride::Ghost));
        assert!(ctl.any());

        assert!(ctl.clear(&mut scene, ChangeSource::ControlBar));
        assert_eq!(scene.visible_objects(), vec![A, B, C]);
        assert_eq!(scene.material(), None);
        assert!(ctl.current().is_none());
        assert!(!ctl.any());
    }

    #[test]
    fn set_empty_hides_everything() {
        let mut scene = scene(&[A, B]);
        let mut ctl = IsolationController::default();
        assert!(ctl.set(&mut scene, Vec::<ObjectId>::new(), ChangeSource::Search));
        assert!(scene.visible_objects().is_empty());
        assert!(ctl.clear(&mut scene, ChangeSource::Search));
        assert_eq!(scene.visible_objects(), vec![A, B]);
    }

    #[test]
    fn set_clears_selection_and_reframes() {
        let mut scene = scene(&[A, B, C]);
        scene.select(&[B]);
        let mut ctl = IsolationController::default();
        ctl.set(&mut scene, [A, C], ChangeSource::Tree);
        assert!(scene.selection().is_empty());
        let framed = scene.framed().last().unwrap();
        assert_eq!(framed.min.x, 1.0);
        assert_eq!(framed.max.x, 4.0);
    }

    #[test]
    fn set_saves_previous() {
        let mut scene = scene(&[A, B, C]);
        let mut ctl = IsolationController::default();
        ctl.set(&mut scene, [A], ChangeSource::Tree);
        ctl.set(&mut scene, [B], ChangeSource::Tree);
        assert_eq!(ctl.previous(), Some(&set_of(&[A])));
        assert_eq!(ctl.current(), Some(&set_of(&[B])));
    }

    #[test]
    fn repeated_set_is_a_no_op() {
        let mut scene = scene(&[A, B]);
        let mut ctl = IsolationController::default();
        let log = recorder(&mut ctl);
        assert!(ctl.set(&mut scene, [A], ChangeSource::Tree));
        assert!(!ctl.set(&mut scene, [A], ChangeSource::Tree));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn hide_then_show_is_inverse() {
        let mut scene = scene(&[A, B, C, D]);
        let mut ctl = IsolationController::default();
        ctl.set(&mut scene, [A, B, C], ChangeSource::Tree);

        assert!(ctl.hide(&mut scene, [B], ChangeSource::ContextMenu));
        assert_eq!(ctl.current(), Some(&set_of(&[A, C])));
        assert_eq!(scene.visible_objects(), vec![A, C]);

        assert!(ctl.show(&mut scene, [B], ChangeSource::ContextMenu));
        assert_eq!(ctl.current(), Some(&set_of(&[A, B, C])));
        assert_eq!(scene.visible_objects(), vec![A, B, C]);
    }

    #[test]
    fn hide_without_isolation_uses_all_objects() {
        let mut scene = scene(&[A, B, C]);
        let mut ctl = IsolationController::default();
        assert!(ctl.hide(&mut scene, [C], ChangeSource::Keyboard));
        assert_eq!(ctl.current(), Some(&set_of(&[A, B])));
    }

    #[test]
    fn context_menu_hide_does_not_reframe() {
        let mut scene = scene(&[A, B, C]);
        let mut ctl = IsolationController::default();
        ctl.hide(&mut scene, [C], ChangeSource::ContextMenu);
        assert!(scene.framed().is_empty());
        ctl.hide(&mut scene, [B], ChangeSource::Keyboard);
        assert_eq!(scene.framed().len(), 1);
    }

    #[test]
    fn hide_of_nothing_is_a_no_op() {
        let mut scene = scene(&[A, B]);
        let mut ctl = IsolationController::default();
        let log = recorder(&mut ctl);
        assert!(!ctl.hide(&mut scene, Vec::<ObjectId>::new(), ChangeSource::ContextMenu));
        ctl.set(&mut scene, [A], ChangeSource::Tree);
        assert!(!ctl.hide(&mut scene, [B], ChangeSource::ContextMenu));
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn show_covering_everything_ends_isolation() {
        let mut scene = scene(&[A, B]);
        let mut ctl = IsolationController::default();
        ctl.set(&mut scene, [A], ChangeSource::Tree);
        assert!(ctl.show(&mut scene, [B], ChangeSource::ContextMenu));
        assert!(!ctl.any());
        assert_eq!(scene.visible_objects(), vec![A, B]);
    }

    #[test]
    fn show_without_isolation_starts_one() {
        let mut scene = scene(&[A, B, C]);
        let mut ctl = IsolationController::default();
        assert!(ctl.show(&mut scene, [A], ChangeSource::ContextMenu));
        assert_eq!(ctl.current(), Some(&set_of(&[A])));
    }

    #[test]
    fn toggle_isolates_then_cancels() {
        let mut scene = scene(&[A, B, C]);
        let mut ctl = IsolationController::default();

        scene.select(&[A, B]);
        assert!(ctl.toggle_contextual(&mut scene, ChangeSource::Keyboard));
        assert_eq!(scene.visible_objects(), vec![A, B]);

        scene.select(&[A, B]);
        assert!(ctl.toggle_contextual(&mut scene, ChangeSource::Keyboard));
        assert_eq!(scene.visible_objects(), vec![A, B, C]);
        assert!(!ctl.any());
    }

    #[test]
    fn toggle_with_empty_selection_cancels() {
        let mut scene = scene(&[A, B, C]);
        let mut ctl = IsolationController::default();
        ctl.set(&mut scene, [A], ChangeSource::Tree);
        assert!(ctl.toggle_contextual(&mut scene, ChangeSource::Keyboard));
        assert!(!ctl.any());
    }

    #[test]
    fn toggle_with_other_selection_swaps() {
        let mut scene = scene(&[A, B, C]);
        let mut ctl = IsolationController::default();
        ctl.set(&mut scene, [A], ChangeSource::Tree);
        scene.select(&[C]);
        assert!(ctl.toggle_contextual(&mut scene, ChangeSource::Keyboard));
        assert_eq!(ctl.current(), Some(&set_of(&[C])));
    }

    #[test]
    fn clear_keeps_previous() {
        let mut scene = scene(&[A, B, C]);
        let mut ctl = IsolationController::default();
        ctl.set(&mut scene, [A], ChangeSource::Tree);
        ctl.clear(&mut scene, ChangeSource::ControlBar);
        assert_eq!(ctl.previous(), None);
    }

    #[test]
    fn toggle_restores_isolation_before_the_cleared_one() {
        let mut scene = scene(&[A, B, C]);
        let mut ctl = IsolationController::default();
        ctl.set(&mut scene, [A], ChangeSource::Tree);
        ctl.set(&mut scene, [B], ChangeSource::Tree);
        ctl.clear(&mut scene, ChangeSource::ControlBar);
        assert_eq!(ctl.previous(), Some(&set_of(&[A])));

        assert!(ctl.toggle_contextual(&mut scene, ChangeSource::Keyboard));
        assert_eq!(ctl.current(), Some(&set_of(&[A])));
        assert_eq!(scene.visible_objects(), vec![A]);
    }

    #[test]
    fn origin_follows_the_last_change() {
        let mut scene = scene(&[A, B, C]);
        let mut ctl = IsolationController::default();
        assert_eq!(ctl.origin(), None);
        ctl.set(&mut scene, [A, B], ChangeSource::Search);
        assert_eq!(ctl.origin(), Some(ChangeSource::Search));
        ctl.hide(&mut scene, [B], ChangeSource::ContextMenu);
        assert_eq!(ctl.origin(), Some(ChangeSource::ContextMenu));
        ctl.clear(&mut scene, ChangeSource::Keyboard);
        assert_eq!(ctl.origin(), None);
    }

    #[test]
    fn toggle_with_nothing_to_do() {
        let mut scene = scene(&[A]);
        let mut ctl = IsolationController::default();
        assert!(!ctl.toggle_contextual(&mut scene, ChangeSource::Keyboard));
    }

    #[test]
    fn clear_without_isolation_is_a_no_op() {
        let mut scene = scene(&[A]);
        let mut ctl = IsolationController::default();
        let log = recorder(&mut ctl);
        assert!(!ctl.clear(&mut scene, ChangeSource::ControlBar));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn unknown_objects_are_skipped() {
        let mut scene = scene(&[A, B]);
        let mut ctl = IsolationController::default();
        ctl.set(&mut scene, [A, ObjectId(99)], ChangeSource::Tree);
        assert_eq!(ctl.current(), Some(&set_of(&[A])));

        scene.remove(A);
        assert!(!ctl.hide(&mut scene, [A], ChangeSource::ContextMenu));
    }

    #[test]
    fn listeners_receive_source_tags() {
        let mut scene = scene(&[A, B]);
        let mut ctl = IsolationController::default();
        let log = recorder(&mut ctl);

        ctl.set(&mut scene, [A], ChangeSource::Search);
        ctl.clear(&mut scene, ChangeSource::Keyboard);

        let log = log.borrow();
        assert_eq!(log.len(), 2);
        assert_eq!(
            log[0],
            IsolationChange {
                source: ChangeSource::Search,
                active: true,
                count: 1
            }
        );
        assert_eq!(log[1].source, ChangeSource::Keyboard);
        assert!(!log[1].active);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let mut scene = scene(&[A, B]);
        let mut ctl = IsolationController::default();
        let count = Rc::new(RefCell::new(0));
        let sink = count.clone();
        let id = ctl.subscribe(move |_| *sink.borrow_mut() += 1);
        ctl.set(&mut scene, [A], ChangeSource::Tree);
        assert!(ctl.unsubscribe(id));
        assert!(!ctl.unsubscribe(id));
        ctl.clear(&mut scene, ChangeSource::Tree);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn ghost_material_can_be_disabled() {
        let mut scene = scene(&[A, B]);
        let mut ctl = IsolationController::new(IsolationOptions {
            ghost_material: false,
            reframe: false,
        });
        ctl.set(&mut scene, [A], ChangeSource::Tree);
        assert_eq!(scene.material(), None);
        assert!(scene.framed().is_empty());
    }

    #[test]
    fn scope_limits_affected_objects() {
        let mut scene = scene(&[A, B]);
        scene.insert(C, DocumentId(1), None);
        let mut ctl = IsolationController::default();
        ctl.set_scope(Some(DocumentId(0)));
        ctl.set(&mut scene, [A], ChangeSource::Tree);
        assert_eq!(scene.visible_objects(), vec![A, C]);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One viewer session: the state every panel of the shell shares.
//!
//! [`ViewerSession`] owns the element list, the tree built from it, the
//! visibility cache, the isolation controller, the search box and the click
//! gesture state. Recomputation is explicit and event driven:
//!
//! | event                         | call                                   |
//! |-------------------------------|----------------------------------------|
//! | element list replaced         | [`ViewerSession::set_elements`]        |
//! | viewer visibility changed     | [`ViewerSession::on_visibility_changed`] |
//! | viewer selection changed      | [`ViewerSession::on_selection_changed`]  |
//! | keystroke in the search box   | [`ViewerSession::set_filter`]          |
//! | timer tick / debounce elapsed | [`ViewerSession::tick`]                |
//!
//! A rebuild swaps tree, reverse maps and visibility cache in one
//! assignment, so no reader ever sees a reverse map into a discarded tree.

use std::sync::Arc;

use crate::config::ShellConfig;
use crate::element::{DocumentId, Element, ObjectId};
use crate::error::Result;
use crate::grouping::TreeBuilder;
use crate::isolation::{IsolationChange, IsolationController, SubscriptionId};
use crate::keys::NodeIndex;
use crate::request::{RequestGuard, RequestTicket};
use crate::scene::Scene;
use crate::search::{self, SearchFilter};
use crate::selection::{self, ClickOutcome, ClickTracker, Modifiers};
use crate::source::ChangeSource;
use crate::tree::TreeIndex;
use crate::visibility::{Visibility, VisibilityAggregator};

/// Tree and visibility cache, always replaced together.
#[derive(Debug, Default)]
struct TreeView {
    tree: TreeIndex,
    visibility: VisibilityAggregator,
}

/// Shared state of one loaded document / viewer instance.
#[derive(Debug)]
pub struct ViewerSession {
    config: ShellConfig,
    builder: TreeBuilder,
    elements: Arc<[Element]>,
    view: TreeView,
    isolation: IsolationController,
    search: SearchFilter,
    searching: bool,
    clicks: ClickTracker,
    attributes: RequestGuard<ObjectId>,
}

impl ViewerSession {
    pub fn new(config: ShellConfig) -> Self {
        let builder = config.tree_builder();
        Self::with_builder(config, builder)
    }

    /// Session with a custom grouping (e.g. a property-group panel).
    pub fn with_builder(config: ShellConfig, builder: TreeBuilder) -> Self {
        Self {
            isolation: IsolationController::new(config.isolation_options()),
            search: SearchFilter::new(config.debounce_ms),
            clicks: ClickTracker::new(config.double_click_ms),
            builder,
            elements: Arc::from(Vec::new()),
            view: TreeView::default(),
            searching: false,
            attributes: RequestGuard::new(),
            config,
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    // --- Elements and tree ---

    /// Replaces the element list. Rebuilds only if the list identity changed.
    ///
    /// Returns whether a rebuild happened. On error the previous tree stays.
    pub fn set_elements(&mut self, elements: Arc<[Element]>) -> Result<bool> {
        if Arc::ptr_eq(&self.elements, &elements) {
            return Ok(false);
        }
        let previous = std::mem::replace(&mut self.elements, elements);
        if let Err(err) = self.rebuild() {
            self.elements = previous;
            return Err(err);
        }
        Ok(true)
    }

    /// All loaded elements, before search filtering.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// The current tree (search filter applied).
    pub fn tree(&self) -> &TreeIndex {
        &self.view.tree
    }

    /// Cached visibility of a node of the current tree.
    pub fn visibility(&self, node: NodeIndex) -> Option<Visibility> {
        self.view.visibility.get_for(&self.view.tree, node)
    }

    fn rebuild(&mut self) -> Result<()> {
        let filtered;
        let elements: &[Element] = if self.search.text().trim().is_empty() {
            &self.elements
        } else {
            filtered = search::filter(&self.elements, self.search.text());
            &filtered
        };
        let tree = self.builder.build(elements)?;
        self.view = TreeView {
            tree,
            visibility: VisibilityAggregator::new(),
        };
        self.clicks.reset();
        Ok(())
    }

    // --- Viewer events ---

    /// Recomputes the visibility cache from the scene.
    pub fn on_visibility_changed(&mut self, scene: &dyn Scene) {
        let TreeView { tree, visibility } = &mut self.view;
        visibility.update(tree, |e| scene.is_visible(e.object));
    }

    /// Nodes to expand so the viewer selection is visible in the tree.
    pub fn on_selection_changed(&self, scene: &dyn Scene) -> Vec<NodeIndex> {
        selection::collapse(&self.view.tree, &scene.selection())
    }

    /// Handles a click on a tree node.
    pub fn click(
        &mut self,
        scene: &mut dyn Scene,
        node: NodeIndex,
        modifiers: Modifiers,
        now_ms: f64,
    ) -> ClickOutcome {
        let current = scene.selection();
        let outcome = self
            .clicks
            .click(&self.view.tree, node, modifiers, now_ms, &current);
        match &outcome {
            ClickOutcome::Select(objects) => scene.select(objects),
            ClickOutcome::Add(objects) => scene.add_to_selection(objects),
            ClickOutcome::Remove(objects) => scene.remove_from_selection(objects),
            ClickOutcome::Frame(objects) => {
                if let Some(bounds) = scene.bounds_of(objects) {
                    scene.frame(bounds);
                }
            }
        }
        outcome
    }

    // --- Isolation ---

    pub fn isolation(&self) -> &IsolationController {
        &self.isolation
    }

    /// Limits isolation to one loaded document; `None` covers every document.
    pub fn set_scope(&mut self, scope: Option<DocumentId>) {
        self.isolation.set_scope(scope);
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&IsolationChange) + 'static,
    {
        self.isolation.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.isolation.unsubscribe(id)
    }

    pub fn isolate<I>(&mut self, scene: &mut dyn Scene, objects: I, source: ChangeSource) -> bool
    where
        I: IntoIterator<Item = ObjectId>,
    {
        let changed = self.isolation.set(scene, objects, source);
        self.after_isolation(scene, source, changed)
    }

    pub fn show<I>(&mut self, scene: &mut dyn Scene, objects: I, source: ChangeSource) -> bool
    where
        I: IntoIterator<Item = ObjectId>,
    {
        let changed = self.isolation.show(scene, objects, source);
        self.after_isolation(scene, source, changed)
    }

    pub fn hide<I>(&mut self, scene: &mut dyn Scene, objects: I, source: ChangeSource) -> bool
    where
        I: IntoIterator<Item = ObjectId>,
    {
        let changed = self.isolation.hide(scene, objects, source);
        self.after_isolation(scene, source, changed)
    }

    /// Isolates the objects under a tree node.
    pub fn isolate_node(
        &mut self,
        scene: &mut dyn Scene,
        node: NodeIndex,
        source: ChangeSource,
    ) -> bool {
        let objects = selection::expand_objects(&self.view.tree, node);
        self.isolate(scene, objects, source)
    }

    /// Hides the objects under a tree node.
    pub fn hide_node(
        &mut self,
        scene: &mut dyn Scene,
        node: NodeIndex,
        source: ChangeSource,
    ) -> bool {
        let objects = selection::expand_objects(&self.view.tree, node);
        self.hide(scene, objects, source)
    }

    /// Shows the objects under a tree node.
    pub fn show_node(
        &mut self,
        scene: &mut dyn Scene,
        node: NodeIndex,
        source: ChangeSource,
    ) -> bool {
        let objects = selection::expand_objects(&self.view.tree, node);
        self.show(scene, objects, source)
    }

    pub fn toggle_isolation(&mut self, scene: &mut dyn Scene, source: ChangeSource) -> bool {
        let changed = self.isolation.toggle_contextual(scene, source);
        self.after_isolation(scene, source, changed)
    }

    pub fn clear_isolation(&mut self, scene: &mut dyn Scene, source: ChangeSource) -> bool {
        let changed = self.isolation.clear(scene, source);
        self.after_isolation(scene, source, changed)
    }

    fn after_isolation(&mut self, scene: &dyn Scene, source: ChangeSource, changed: bool) -> bool {
        if changed {
            let filtering = self.search.is_pending() || !self.search.text().is_empty();
            if source.clears_search() && filtering {
                self.search.reset();
                self.searching = false;
                if let Err(err) = self.rebuild() {
                    tracing::warn!(%err, "tree rebuild after search reset failed");
                }
            }
            self.on_visibility_changed(scene);
        }
        changed
    }

    // --- Search ---

    /// The search text currently applied to the tree.
    pub fn search_text(&self) -> &str {
        self.search.text()
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    /// When the next debounced filter application is due.
    pub fn search_due_ms(&self) -> Option<f64> {
        self.search.due_ms()
    }

    /// Records a keystroke; the filter applies once the debounce window passes.
    pub fn set_filter(&mut self, text: impl Into<String>, now_ms: f64) {
        self.search.set_filter(text, now_ms);
    }

    /// Turns isolation-by-search on or off.
    ///
    /// Turning it on isolates the current matches; turning it off ends an
    /// isolation made by the search.
    pub fn set_searching(&mut self, scene: &mut dyn Scene, searching: bool) -> bool {
        if self.searching == searching {
            return false;
        }
        self.searching = searching;
        let changed = if searching {
            self.isolate_matches(scene)
        } else {
            self.clear_search_isolation(scene)
        };
        if changed {
            self.on_visibility_changed(scene);
        }
        changed
    }

    /// Applies the pending filter if its window has elapsed.
    ///
    /// Returns whether a filter was applied.
    pub fn tick(&mut self, scene: &mut dyn Scene, now_ms: f64) -> Result<bool> {
        if self.search.poll(now_ms).is_none() {
            return Ok(false);
        }
        self.apply_search(scene)?;
        Ok(true)
    }

    /// Applies the pending filter now. Used when a real timer already
    /// handled the debounce.
    pub fn flush_filter(&mut self, scene: &mut dyn Scene) -> Result<bool> {
        if self.search.flush().is_none() {
            return Ok(false);
        }
        self.apply_search(scene)?;
        Ok(true)
    }

    fn apply_search(&mut self, scene: &mut dyn Scene) -> Result<()> {
        self.rebuild()?;
        tracing::debug!(
            text = self.search.text(),
            matches = self.view.tree.leaf_count(),
            "search filter applied"
        );
        if self.searching {
            self.isolate_matches(scene);
        }
        self.on_visibility_changed(scene);
        Ok(())
    }

    fn isolate_matches(&mut self, scene: &mut dyn Scene) -> bool {
        if self.search.text().trim().is_empty() {
            return self.clear_search_isolation(scene);
        }
        let matches: Vec<ObjectId> = self
            .view
            .tree
            .nodes()
            .filter_map(|n| n.element().map(|e| e.object))
            .collect();
        self.isolation.set(scene, matches, ChangeSource::Search)
    }

    /// Ends the isolation only if the search made it.
    fn clear_search_isolation(&mut self, scene: &mut dyn Scene) -> bool {
        if self.isolation.origin() != Some(ChangeSource::Search) {
            return false;
        }
        self.isolation.clear(scene, ChangeSource::Search)
    }

    // --- Attribute fetches ---

    /// Starts an attribute request for `object`; older requests become stale.
    pub fn begin_attribute_request(&mut self, object: ObjectId) -> RequestTicket {
        self.attributes.begin(object)
    }

    /// Whether a response may be applied to the UI.
    pub fn accept_attribute_response(&self, ticket: RequestTicket, object: ObjectId) -> bool {
        self.attributes.accept(ticket, &object)
    }

    /// Ends the session: forgets isolation state and outstanding requests.
    pub fn close(&mut self) {
        self.isolation.forget();
        self.attributes.reset();
        self.search.reset();
        self.searching = false;
    }
}

impl Default for ViewerSession {
    fn default() -> Self {
        Self::new(ShellConfig::default())
    }
}

//! 终端分屏树
//!
//! 每个 tab 至多一棵树：叶子持有 pty id，内部节点恰好两个子节点并带方向与比例。
//! 只有一个终端时不建树（"no pane" 状态）。

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_SIZES: [f64; 2] = [50.0, 50.0];
pub const MIN_SPLIT_PERCENT: f64 = 10.0;
pub const MAX_SPLIT_PERCENT: f64 = 90.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitDirection {
    /// Stacked top/bottom; splits the height.
    Horizontal,
    /// Side by side; splits the width.
    Vertical,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaneError {
    #[error("unknown panel: {0}")]
    UnknownPanel(String),
    #[error("panel is not a split: {0}")]
    NotASplit(String),
    #[error("panel is not a leaf: {0}")]
    NotALeaf(String),
    #[error("corrupt pane tree: {0}")]
    Corrupt(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pty_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<SplitDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<[String; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<[f64; 2]>,
}

impl Panel {
    fn leaf(id: String, parent_id: Option<String>, pty_id: String) -> Self {
        Self {
            id,
            parent_id,
            pty_id: Some(pty_id),
            direction: None,
            children: None,
            sizes: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn sizes_or_default(&self) -> [f64; 2] {
        self.sizes.unwrap_or(DEFAULT_SIZES)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pane {
    pub tab_id: String,
    pub root: String,
    pub panels: FxHashMap<String, Panel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focused: Option<String>,
    #[serde(default)]
    next_panel: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The closed panel was the root; the caller tears the whole tab down.
    CloseTab,
    /// The panel was removed and at least two leaves remain.
    Closed { removed: Vec<String> },
    /// One leaf remains; the pane record must be dropped.
    Collapsed {
        removed: Vec<String>,
        remaining: String,
    },
}

impl Pane {
    /// Wraps a lone pty and a freshly created one into a two-leaf tree.
    pub fn from_split(
        tab_id: impl Into<String>,
        existing_pty: impl Into<String>,
        new_pty: impl Into<String>,
        direction: SplitDirection,
    ) -> Self {
        let mut pane = Self {
            tab_id: tab_id.into(),
            root: String::new(),
            panels: FxHashMap::default(),
            focused: None,
            next_panel: 0,
        };
        let root = pane.fresh_id();
        let first = pane.fresh_id();
        let second = pane.fresh_id();

        pane.panels.insert(
            first.clone(),
            Panel::leaf(first.clone(), Some(root.clone()), existing_pty.into()),
        );
        pane.panels.insert(
            second.clone(),
            Panel::leaf(second.clone(), Some(root.clone()), new_pty.into()),
        );
        pane.panels.insert(
            root.clone(),
            Panel {
                id: root.clone(),
                parent_id: None,
                pty_id: None,
                direction: Some(direction),
                children: Some([first, second.clone()]),
                sizes: Some(DEFAULT_SIZES),
            },
        );
        pane.root = root;
        pane.focused = Some(second);
        pane.debug_check();
        pane
    }

    fn fresh_id(&mut self) -> String {
        loop {
            self.next_panel += 1;
            let id = format!("panel-{}", self.next_panel);
            if !self.panels.contains_key(&id) {
                return id;
            }
        }
    }

    pub fn panel(&self, id: &str) -> Option<&Panel> {
        self.panels.get(id)
    }

    fn panel_or_err(&self, id: &str) -> Result<&Panel, PaneError> {
        self.panels
            .get(id)
            .ok_or_else(|| PaneError::UnknownPanel(id.to_string()))
    }

    /// Leaf panel ids in left-to-right depth-first order.
    pub fn leaves(&self) -> Vec<&str> {
        self.leaves_under(&self.root)
    }

    fn leaves_under(&self, start: &str) -> Vec<&str> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let Some(panel) = self.panels.get(id) else {
                continue;
            };
            match &panel.children {
                Some([left, right]) => {
                    stack.push(right);
                    stack.push(left);
                }
                None => out.push(panel.id.as_str()),
            }
        }
        out
    }

    /// Pty ids of every leaf, in layout order.
    pub fn pty_ids(&self) -> Vec<String> {
        self.leaves()
            .into_iter()
            .filter_map(|id| self.panels.get(id).and_then(|p| p.pty_id.clone()))
            .collect()
    }

    pub fn first_leaf(&self, panel_id: &str) -> Option<&str> {
        self.leaves_under(panel_id).into_iter().next()
    }

    pub fn panel_for_pty(&self, pty_id: &str) -> Option<&str> {
        self.panels
            .values()
            .find(|panel| panel.pty_id.as_deref() == Some(pty_id))
            .map(|panel| panel.id.as_str())
    }

    pub fn focused_pty(&self) -> Option<&str> {
        let focused = self.focused.as_deref()?;
        self.panels.get(focused)?.pty_id.as_deref()
    }

    /// Splits the focused leaf (or the first leaf when focus is stale).
    ///
    /// The focused pty moves into a new first child, `new_pty` goes into the
    /// second child, and focus follows the new pty.
    pub fn split_focused(
        &mut self,
        new_pty: impl Into<String>,
        direction: SplitDirection,
    ) -> Result<String, PaneError> {
        let target = match self.focused.as_deref() {
            Some(id) if self.panels.get(id).is_some_and(Panel::is_leaf) => id.to_string(),
            _ => self
                .first_leaf(&self.root)
                .map(str::to_string)
                .ok_or_else(|| PaneError::Corrupt("pane has no leaves".to_string()))?,
        };

        let moved_pty = self
            .panel_or_err(&target)?
            .pty_id
            .clone()
            .ok_or_else(|| PaneError::Corrupt(format!("leaf {target} has no pty")))?;

        let first = self.fresh_id();
        let second = self.fresh_id();
        self.panels.insert(
            first.clone(),
            Panel::leaf(first.clone(), Some(target.clone()), moved_pty),
        );
        self.panels.insert(
            second.clone(),
            Panel::leaf(second.clone(), Some(target.clone()), new_pty.into()),
        );

        let Some(panel) = self.panels.get_mut(&target) else {
            return Err(PaneError::UnknownPanel(target));
        };
        panel.pty_id = None;
        panel.direction = Some(direction);
        panel.children = Some([first, second.clone()]);
        panel.sizes = Some(DEFAULT_SIZES);

        self.focused = Some(second.clone());
        self.debug_check();
        Ok(second)
    }

    pub fn close(&mut self, panel_id: &str) -> Result<CloseOutcome, PaneError> {
        let panel = self.panel_or_err(panel_id)?;
        let Some(parent_id) = panel.parent_id.clone() else {
            return Ok(CloseOutcome::CloseTab);
        };

        let parent = self.panel_or_err(&parent_id)?;
        let Some(children) = parent.children.clone() else {
            return Err(PaneError::NotASplit(parent_id));
        };
        let sibling_id = if children[0] == panel_id {
            children[1].clone()
        } else if children[1] == panel_id {
            children[0].clone()
        } else {
            return Err(PaneError::Corrupt(format!(
                "{panel_id} is not a child of {parent_id}"
            )));
        };

        let removed = self.remove_subtree(panel_id);
        let sibling = self
            .panels
            .remove(&sibling_id)
            .ok_or_else(|| PaneError::UnknownPanel(sibling_id.clone()))?;

        let parent = self
            .panels
            .get_mut(&parent_id)
            .ok_or_else(|| PaneError::UnknownPanel(parent_id.clone()))?;
        parent.pty_id = sibling.pty_id;
        parent.direction = sibling.direction;
        parent.children = sibling.children.clone();
        parent.sizes = sibling.sizes;

        if let Some(grandchildren) = sibling.children {
            for child in &grandchildren {
                if let Some(child) = self.panels.get_mut(child) {
                    child.parent_id = Some(parent_id.clone());
                }
            }
        }

        self.focused = self.first_leaf(&parent_id).map(str::to_string);
        self.debug_check();

        let leaves = self.leaves();
        if leaves.len() == 1 {
            let remaining = self
                .panels
                .get(leaves[0])
                .and_then(|panel| panel.pty_id.clone())
                .ok_or_else(|| PaneError::Corrupt("remaining leaf has no pty".to_string()))?;
            return Ok(CloseOutcome::Collapsed { removed, remaining });
        }
        Ok(CloseOutcome::Closed { removed })
    }

    /// Drops `panel_id` and everything under it, returning the freed pty ids.
    fn remove_subtree(&mut self, panel_id: &str) -> Vec<String> {
        let mut removed = Vec::new();
        let mut stack = vec![panel_id.to_string()];
        while let Some(id) = stack.pop() {
            let Some(panel) = self.panels.remove(&id) else {
                continue;
            };
            if let Some(pty) = panel.pty_id {
                removed.push(pty);
            }
            if let Some(children) = panel.children {
                stack.extend(children);
            }
        }
        removed
    }

    /// Sets split sizes as given; callers clamp.
    pub fn resize(&mut self, panel_id: &str, sizes: [f64; 2]) -> Result<bool, PaneError> {
        let panel = self
            .panels
            .get_mut(panel_id)
            .ok_or_else(|| PaneError::UnknownPanel(panel_id.to_string()))?;
        if panel.children.is_none() {
            return Err(PaneError::NotASplit(panel_id.to_string()));
        }
        if panel.sizes == Some(sizes) {
            return Ok(false);
        }
        panel.sizes = Some(sizes);
        Ok(true)
    }

    pub fn focus(&mut self, panel_id: &str) -> Result<bool, PaneError> {
        if !self.panel_or_err(panel_id)?.is_leaf() {
            return Err(PaneError::NotALeaf(panel_id.to_string()));
        }
        if self.focused.as_deref() == Some(panel_id) {
            return Ok(false);
        }
        self.focused = Some(panel_id.to_string());
        Ok(true)
    }

    /// Verifies parent links, child arity, and that every panel is reachable.
    pub fn check_invariants(&self) -> Result<(), PaneError> {
        let root = self.panel_or_err(&self.root)?;
        if root.parent_id.is_some() {
            return Err(PaneError::Corrupt("root has a parent".to_string()));
        }

        let mut seen = 0usize;
        let mut stack = vec![self.root.as_str()];
        while let Some(id) = stack.pop() {
            let panel = self.panel_or_err(id)?;
            seen += 1;
            match &panel.children {
                Some(children) => {
                    if panel.pty_id.is_some() {
                        return Err(PaneError::Corrupt(format!("split {id} holds a pty")));
                    }
                    for child in children {
                        let child_panel = self.panel_or_err(child)?;
                        if child_panel.parent_id.as_deref() != Some(id) {
                            return Err(PaneError::Corrupt(format!(
                                "{child} does not point back to {id}"
                            )));
                        }
                        stack.push(child);
                    }
                }
                None if panel.pty_id.is_none() => {
                    return Err(PaneError::Corrupt(format!("leaf {id} has no pty")));
                }
                None => {}
            }
        }

        if seen != self.panels.len() {
            return Err(PaneError::Corrupt(format!(
                "{} unreachable panels",
                self.panels.len() - seen
            )));
        }
        if let Some(focused) = &self.focused {
            if !self.panels.get(focused).is_some_and(Panel::is_leaf) {
                return Err(PaneError::Corrupt(format!("focus on non-leaf {focused}")));
            }
        }
        Ok(())
    }

    fn debug_check(&self) {
        #[cfg(debug_assertions)]
        if let Err(err) = self.check_invariants() {
            panic!("pane tree for tab {}: {err}", self.tab_id);
        }
    }
}

/// Rectangle in percent of the container.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const FULL: Rect = Rect {
        top: 0.0,
        left: 0.0,
        width: 100.0,
        height: 100.0,
    };
}

fn split_rect(bounds: Rect, direction: Option<SplitDirection>, sizes: [f64; 2]) -> (Rect, Rect) {
    match direction {
        Some(SplitDirection::Horizontal) => {
            let first = bounds.height * sizes[0] / 100.0;
            (
                Rect {
                    height: first,
                    ..bounds
                },
                Rect {
                    top: bounds.top + first,
                    height: bounds.height - first,
                    ..bounds
                },
            )
        }
        _ => {
            let first = bounds.width * sizes[0] / 100.0;
            (
                Rect {
                    width: first,
                    ..bounds
                },
                Rect {
                    left: bounds.left + first,
                    width: bounds.width - first,
                    ..bounds
                },
            )
        }
    }
}

/// Bounds of every pty in the tree, keyed by pty id.
///
/// Computed fresh on each call; trees hold a handful of panels.
pub fn compute_layout(pane: &Pane, bounds: Rect) -> IndexMap<String, Rect> {
    let mut out = IndexMap::new();
    layout_into(pane, &pane.root, bounds, &mut out);
    out
}

fn layout_into(pane: &Pane, panel_id: &str, bounds: Rect, out: &mut IndexMap<String, Rect>) {
    let Some(panel) = pane.panels.get(panel_id) else {
        return;
    };
    if let Some(pty) = &panel.pty_id {
        out.insert(pty.clone(), bounds);
        return;
    }
    if let Some([first, second]) = &panel.children {
        let (a, b) = split_rect(bounds, panel.direction, panel.sizes_or_default());
        layout_into(pane, first, a, out);
        layout_into(pane, second, b, out);
    }
}

/// Absolute bounds of `target`, walking down from `current`.
pub fn compute_panel_bounds(pane: &Pane, current: &str, target: &str, bounds: Rect) -> Option<Rect> {
    if current == target {
        return Some(bounds);
    }
    let panel = pane.panels.get(current)?;
    let [first, second] = panel.children.as_ref()?;
    let (a, b) = split_rect(bounds, panel.direction, panel.sizes_or_default());
    compute_panel_bounds(pane, first, target, a)
        .or_else(|| compute_panel_bounds(pane, second, target, b))
}

/// Placement of the drag handle between the two children of a split.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SplitHandle {
    pub direction: SplitDirection,
    pub top: f64,
    pub left: f64,
    /// Length along the divider, in percent.
    pub size: f64,
}

pub fn split_handle(pane: &Pane, panel_id: &str) -> Option<SplitHandle> {
    let panel = pane.panels.get(panel_id)?;
    panel.children.as_ref()?;
    let bounds = compute_panel_bounds(pane, &pane.root, panel_id, Rect::FULL)?;
    let sizes = panel.sizes_or_default();

    Some(match panel.direction {
        Some(SplitDirection::Horizontal) => SplitHandle {
            direction: SplitDirection::Horizontal,
            top: bounds.top + bounds.height * sizes[0] / 100.0,
            left: bounds.left,
            size: bounds.width,
        },
        _ => SplitHandle {
            direction: SplitDirection::Vertical,
            top: bounds.top,
            left: bounds.left + bounds.width * sizes[0] / 100.0,
            size: bounds.height,
        },
    })
}

/// Converts a pointer position into split sizes for a drag on `panel_bounds`.
///
/// `container` is the pixel rectangle of the whole split area, `panel_bounds`
/// the panel's percent bounds within it. The first size is clamped to 10..=90.
pub fn split_percent_from_pointer(
    direction: SplitDirection,
    container: Rect,
    panel_bounds: Rect,
    pointer: (f64, f64),
) -> [f64; 2] {
    let (total, offset, pos) = match direction {
        SplitDirection::Horizontal => (
            container.height * panel_bounds.height / 100.0,
            container.height * panel_bounds.top / 100.0,
            pointer.1 - container.top,
        ),
        SplitDirection::Vertical => (
            container.width * panel_bounds.width / 100.0,
            container.width * panel_bounds.left / 100.0,
            pointer.0 - container.left,
        ),
    };
    let raw = if total > 0.0 {
        (pos - offset) / total * 100.0
    } else {
        50.0
    };
    let percent = raw.clamp(MIN_SPLIT_PERCENT, MAX_SPLIT_PERCENT);
    [percent, 100.0 - percent]
}

#[cfg(test)]
#[path = "../../tests/unit/models/pane_tree.rs"]
mod tests;

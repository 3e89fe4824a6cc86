//! 文件视图中的行选区

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffSide {
    Additions,
    Deletions,
}

/// Selected line range in a file or diff view. Lines are 1-based.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedLineRange {
    pub start: u32,
    pub end: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<DiffSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_side: Option<DiffSide>,
}

impl SelectedLineRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            start,
            end,
            side: None,
            end_side: None,
        }
    }

    pub fn with_sides(mut self, side: Option<DiffSide>, end_side: Option<DiffSide>) -> Self {
        self.side = side;
        self.end_side = end_side;
        self
    }

    pub fn is_normalized(&self) -> bool {
        self.start <= self.end
    }

    /// Stores the range in increasing line order.
    ///
    /// A selection dragged upward swaps its endpoints; `side` takes the side of
    /// the old end, and `end_side` keeps the old start side only when the two
    /// differ.
    pub fn normalize(self) -> Self {
        if self.is_normalized() {
            return self;
        }

        let start_side = self.side;
        let end_side = self.end_side.or(start_side);
        Self {
            start: self.end,
            end: self.start,
            side: end_side,
            end_side: if start_side != end_side {
                start_side
            } else {
                None
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/selection.rs"]
mod tests;

use layerwalk_protocol::Vec3;
use serde::{Deserialize, Serialize};

use super::history::Edit;

/// One positioned element of the model (an embedding table, an attention
/// block, the residual stream, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutBlock {
    pub id: String,
    /// World-space position of the block's origin corner.
    pub position: Vec3,
    pub size: Vec3,
}

impl LayoutBlock {
    pub fn new(id: impl Into<String>, position: Vec3, size: Vec3) -> Self {
        Self {
            id: id.into(),
            position,
            size,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.position + self.size * 0.5
    }
}

/// A complete layout of the model as produced by the layout algorithm.
///
/// Values are compared structurally. Editing never mutates a document in
/// place; mutators return a new document wrapped in [`Edit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub blocks: Vec<LayoutBlock>,
    /// Reference point of the residual stream, in model space. Used as the
    /// magnify focus.
    pub residual: Vec3,
}

impl LayoutDocument {
    pub fn new(blocks: Vec<LayoutBlock>, residual: Vec3) -> Self {
        Self { blocks, residual }
    }

    pub fn block(&self, id: &str) -> Option<&LayoutBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn residual_anchor(&self) -> Vec3 {
        self.residual
    }

    /// Translate one block by `delta`.
    ///
    /// Unknown ids, zero deltas and non-finite deltas report
    /// [`Edit::Unchanged`].
    pub fn move_block(&self, id: &str, delta: Vec3) -> Edit<Self> {
        if delta == Vec3::ZERO || !delta.is_finite() {
            return Edit::Unchanged;
        }
        self.with_block(id, |block| block.position += delta)
    }

    /// Give one block a new size. Reports [`Edit::Unchanged`] when the id is
    /// unknown, the size is already `size` or `size` is not finite.
    pub fn resize_block(&self, id: &str, size: Vec3) -> Edit<Self> {
        if !size.is_finite() {
            return Edit::Unchanged;
        }
        match self.block(id) {
            Some(block) if block.size != size => self.with_block(id, |block| block.size = size),
            _ => Edit::Unchanged,
        }
    }

    fn with_block(&self, id: &str, f: impl FnOnce(&mut LayoutBlock)) -> Edit<Self> {
        let Some(index) = self.blocks.iter().position(|b| b.id == id) else {
            return Edit::Unchanged;
        };
        let mut next = self.clone();
        f(&mut next.blocks[index]);
        Edit::Changed(next)
    }

    /// Whether every coordinate in the document is finite.
    pub fn is_finite(&self) -> bool {
        self.residual.is_finite()
            && self
                .blocks
                .iter()
                .all(|b| b.position.is_finite() && b.size.is_finite())
    }
}

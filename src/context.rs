//! Per-compilation transform state.
//!
//! One `TransformContext` lives for exactly one template root. The lazy
//! slot counter is a plain field here: cache-slot identity is part of the
//! compilation state, not an ambient association keyed on node identity.

use serde::{Deserialize, Serialize};

use crate::ast::{NodeId, TemplateArena};
use crate::codegen::RuntimeHelper;

// ═══════════════════════════════════════════════════════════════════════════════
// OPTIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOptions {
    #[serde(default)]
    pub filename: String,
    /// Compiling for server-rendered output.
    #[serde(default)]
    pub ssr: bool,
    /// Inside a server-rendered sub-compile.
    #[serde(default)]
    pub in_ssr: bool,
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRAVERSAL SLOT
// ═══════════════════════════════════════════════════════════════════════════════

/// Where the node currently being visited sits in its parent's child list.
/// Re-entered subtrees run with `Detached`: a replacement there must not
/// reach back into the stale parent slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentSlot {
    Root { index: usize },
    Child { parent: NodeId, index: usize },
    Detached,
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONTEXT
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct TransformContext {
    pub options: CompileOptions,
    helpers: Vec<RuntimeHelper>,
    lazy_slot_counter: u32,
    pub current_node: Option<NodeId>,
    pub current_slot: CurrentSlot,
}

impl TransformContext {
    pub fn new(options: CompileOptions) -> Self {
        TransformContext {
            options,
            helpers: Vec::new(),
            lazy_slot_counter: 0,
            current_node: None,
            current_slot: CurrentSlot::Detached,
        }
    }

    pub fn is_ssr(&self) -> bool {
        self.options.ssr || self.options.in_ssr
    }

    /// Record that generated code references `helper` and hand the symbol
    /// back for embedding. Registration order is preserved, repeats collapse.
    pub fn helper(&mut self, helper: RuntimeHelper) -> RuntimeHelper {
        if !self.helpers.contains(&helper) {
            self.helpers.push(helper);
        }
        helper
    }

    pub fn helpers(&self) -> &[RuntimeHelper] {
        &self.helpers
    }

    /// Next cache-slot index for this root. Starts at 1, never repeats.
    pub fn next_lazy_slot(&mut self) -> u32 {
        self.lazy_slot_counter += 1;
        self.lazy_slot_counter
    }

    pub fn lazy_slot_count(&self) -> u32 {
        self.lazy_slot_counter
    }

    /// Runtime cache-slot name for a slot index.
    pub fn lazy_cache_key(index: u32) -> String {
        format!("_lazyshow{}", index)
    }

    /// Substitute the node being visited in its parent's child list. The
    /// traversal continues from `new_id`.
    pub fn replace_node(&mut self, arena: &mut TemplateArena, new_id: NodeId) {
        match self.current_slot {
            CurrentSlot::Root { index } => {
                arena.replace_child(None, index, new_id);
            }
            CurrentSlot::Child { parent, index } => {
                arena.replace_child(Some(parent), index, new_id);
            }
            CurrentSlot::Detached => {}
        }
        self.current_node = Some(new_id);
    }
}

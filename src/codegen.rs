//! Codegen constructs produced by the structural transforms.
//!
//! These are the compile-output expression shapes a structural rewrite can
//! splice into a template child list: simple/compound expressions, ternary
//! conditionals, sequences, runtime-helper calls, and vnode calls. They
//! mirror the host renderer's node constructors one for one.

use serde::{Deserialize, Serialize};

use crate::ast::{NodeId, SourceLocation};

// ═══════════════════════════════════════════════════════════════════════════════
// PATCH FLAGS
// ═══════════════════════════════════════════════════════════════════════════════

/// Bitmask hints attached to generated vnode calls describing which
/// change-detection shortcut the renderer may take.
pub mod patch_flags {
    /// Fragment whose children are order-fixed: the diff may skip key-based
    /// reconciliation entirely.
    pub const STABLE_FRAGMENT: i32 = 64;
}

// ═══════════════════════════════════════════════════════════════════════════════
// RUNTIME HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Logical runtime-helper identifiers. Every helper referenced by generated
/// code must be registered on the transform context so the compilation driver
/// emits the matching import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuntimeHelper {
    Fragment,
    CreateComment,
    CreateText,
    CreateElementVnode,
}

impl RuntimeHelper {
    /// The runtime symbol this helper compiles to.
    pub fn name(self) -> &'static str {
        match self {
            RuntimeHelper::Fragment => "Fragment",
            RuntimeHelper::CreateComment => "createCommentVNode",
            RuntimeHelper::CreateText => "createTextVNode",
            RuntimeHelper::CreateElementVnode => "createElementVNode",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXPRESSION NODES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum JsExpr {
    Simple(SimpleExpr),
    Compound(CompoundExpr),
    Conditional(Box<ConditionalExpr>),
    Sequence(SequenceExpr),
    Call(CallExpr),
    VNodeCall(VNodeCall),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleExpr {
    pub content: String,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub location: SourceLocation,
}

/// An expression stitched from raw source pieces and nested expressions,
/// e.g. `_cache._lazyshow1 || visible`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundExpr {
    pub children: Vec<CompoundChild>,
    #[serde(default)]
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CompoundChild {
    Text { content: String },
    Expr { expr: Box<JsExpr> },
}

/// Ternary compile output. Test and both branches are plain fields, never
/// options: a conditional with a missing branch cannot be represented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalExpr {
    pub test: JsExpr,
    pub consequent: JsExpr,
    pub alternate: JsExpr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceExpr {
    pub expressions: Vec<JsExpr>,
}

/// Call of a registered runtime helper with raw-source or expression
/// arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallExpr {
    pub callee: RuntimeHelper,
    pub args: Vec<CallArg>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CallArg {
    Raw { content: String },
    Expr { expr: Box<JsExpr> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum VNodeTag {
    Helper { helper: RuntimeHelper },
    Element { tag: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VNodeChildren {
    None,
    /// Template nodes owned by the arena.
    Nodes(Vec<NodeId>),
    /// Nested compile-output expressions (e.g. static text calls).
    Exprs(Vec<JsExpr>),
}

impl Default for VNodeChildren {
    fn default() -> Self {
        VNodeChildren::None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VNodeCall {
    pub tag: VNodeTag,
    pub props: Option<Box<JsExpr>>,
    #[serde(default)]
    pub children: VNodeChildren,
    pub patch_flag: Option<i32>,
    pub dynamic_props: Option<Vec<String>>,
    #[serde(default)]
    pub is_block: bool,
    #[serde(default)]
    pub disable_tracking: bool,
    #[serde(default)]
    pub is_component: bool,
    #[serde(default)]
    pub location: SourceLocation,
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONSTRUCTORS
// ═══════════════════════════════════════════════════════════════════════════════

pub fn create_simple_expression(content: impl Into<String>) -> JsExpr {
    JsExpr::Simple(SimpleExpr {
        content: content.into(),
        is_static: false,
        location: SourceLocation::stub(),
    })
}

pub fn create_compound_expression(children: Vec<CompoundChild>) -> JsExpr {
    JsExpr::Compound(CompoundExpr {
        children,
        location: SourceLocation::stub(),
    })
}

pub fn create_conditional_expression(
    test: JsExpr,
    consequent: JsExpr,
    alternate: JsExpr,
) -> JsExpr {
    JsExpr::Conditional(Box::new(ConditionalExpr {
        test,
        consequent,
        alternate,
    }))
}

pub fn create_sequence_expression(expressions: Vec<JsExpr>) -> JsExpr {
    JsExpr::Sequence(SequenceExpr { expressions })
}

pub fn create_call_expression(callee: RuntimeHelper, args: Vec<CallArg>) -> JsExpr {
    JsExpr::Call(CallExpr { callee, args })
}

impl CompoundChild {
    pub fn text(content: impl Into<String>) -> Self {
        CompoundChild::Text {
            content: content.into(),
        }
    }

    pub fn expr(expr: JsExpr) -> Self {
        CompoundChild::Expr {
            expr: Box::new(expr),
        }
    }
}

impl CallArg {
    pub fn raw(content: impl Into<String>) -> Self {
        CallArg::Raw {
            content: content.into(),
        }
    }
}

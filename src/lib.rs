//! # LazyShow Native Ground Truth
//!
//! Compile-time directive transforms and static props type inference for a
//! component-template toolchain.
//!
//! ## Transform Invariants
//!
//! 1. **Conditional shape**: every produced conditional has exactly one test
//!    and exactly two branches; a missing branch is unrepresentable.
//! 2. **Cache slots**: `_lazyshow<N>` indices are assigned in depth-first
//!    visitation order, start at 1, strictly increase, and are never reused
//!    within one compilation root. The SSR path allocates none.
//! 3. **Sticky visibility**: once `_cache._lazyshow<N>` is set, the compiled
//!    test is true forever, regardless of the original condition.
//! 4. **Re-traversal gate**: a deferred re-traversal never enters a node
//!    whose code generation already completed, so counters and helpers are
//!    never registered twice.
//! 5. **Helper registration**: every runtime helper referenced by generated
//!    code is registered on the transform context, in first-use order.
//!
//! ## Inference Invariants
//!
//! 6. **Single file**: the declaration table and the schema are scoped to
//!    exactly one source file per invocation; no cross-file resolution.
//! 7. **Silent absence**: unresolved references, unsupported type shapes,
//!    missing type arguments and non-identifier keys contribute nothing;
//!    inference never fails over them.
//! 8. **Shadowing**: a duplicate top-level type name overwrites the earlier
//!    table entry without a warning.

#[cfg(feature = "napi")]
use napi_derive::napi;

mod ast;
mod cache;
mod codegen;
mod conditional;
mod context;
mod errors;
mod expression;
mod lazy_show;
mod props_infer;
mod traverse;

#[cfg(test)]
mod transform_tests;

pub use ast::{
    AttributeProp, CommentNode, Directive, ElementNode, NodeId, Prop, SourceLocation,
    TemplateArena, TemplateNode, TextNode,
};
pub use cache::{CacheEntry, SchemaCache};
pub use codegen::{
    create_call_expression, create_compound_expression, create_conditional_expression,
    create_sequence_expression, create_simple_expression, patch_flags, CallArg, CallExpr,
    CompoundChild, CompoundExpr, ConditionalExpr, JsExpr, RuntimeHelper, SequenceExpr, SimpleExpr,
    VNodeCall, VNodeChildren, VNodeTag,
};
pub use conditional::{
    build_conditional_fragment, comment_placeholder, conditional_render_transform,
    stable_fragment, static_text, DIRECTIVE_IF, PLACEHOLDER_COMMENT,
};
pub use context::{CompileOptions, CurrentSlot, TransformContext};
pub use errors::{CompilerError, ERR_LAZY_ON_TEMPLATE, ERR_SOURCE_READ, ERR_SOURCE_SYNTAX};
pub use expression::{freeze_element_props, freeze_expression};
pub use lazy_show::{lazy_show_transform, DIRECTIVE_LAZY_SHOW, DIRECTIVE_SHOW};
#[cfg(feature = "napi")]
pub use props_infer::extract_runtime_props_native;
pub use props_infer::{
    extract_runtime_props, extract_runtime_props_batch, extract_runtime_props_cached,
    extract_runtime_props_from_source, PropSchema, RuntimeProps, PROPS_MACRO,
};
pub use traverse::{
    transform_template, traverse_children, traverse_node, DirectiveMatcher, ExitFn,
    StructuralHandler, StructuralTransform, TransformPipeline,
};

#[cfg(feature = "napi")]
#[napi]
pub fn compile_bridge() -> String {
    "LazyShow Native Bridge Connected".to_string()
}

#[cfg(feature = "napi")]
#[napi]
pub fn transform_template_native(arena_json: String, options_json: String) -> napi::Result<String> {
    let mut arena: TemplateArena = serde_json::from_str(&arena_json)
        .map_err(|e| napi::Error::from_reason(format!("Template parse error: {}", e)))?;
    let options: CompileOptions = serde_json::from_str(&options_json)
        .map_err(|e| napi::Error::from_reason(format!("Options parse error: {}", e)))?;
    let ctx = transform_template(&mut arena, options)
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;
    let result = serde_json::json!({
        "template": arena,
        "helpers": ctx.helpers(),
    });
    serde_json::to_string(&result)
        .map_err(|e| napi::Error::from_reason(format!("Serialize error: {}", e)))
}

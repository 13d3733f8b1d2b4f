//! Conditional fragment construction.
//!
//! A structural rewrite turns a node into a ternary between "stable
//! fragment" constructs: fragment vnode calls with no props whose children
//! are flagged order-fixed, so the renderer skips key-based reconciliation
//! of the branch contents. The base conditional-render transform lives here
//! too; it is pipeline slot 0 and doubles as the SSR delegation target.

use crate::ast::{Directive, NodeId, SourceLocation, TemplateArena, TemplateNode};
use crate::codegen::{
    create_call_expression, create_conditional_expression, create_simple_expression, patch_flags,
    CallArg, JsExpr, RuntimeHelper, VNodeCall, VNodeChildren, VNodeTag,
};
use crate::context::TransformContext;
use crate::errors::CompilerError;
use crate::traverse::{DirectiveMatcher, ExitFn, StructuralTransform, TransformPipeline};

pub const DIRECTIVE_IF: &str = "if";

/// Content of the static comment emitted for a not-yet-rendered branch.
pub const PLACEHOLDER_COMMENT: &str = "v-show-if";

// ═══════════════════════════════════════════════════════════════════════════════
// FRAGMENT BUILDERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Fragment vnode call with no props, the given children, the
/// stable-children patch flag, and the wrapped node's source location for
/// diagnostics.
pub fn stable_fragment(
    children: VNodeChildren,
    location: SourceLocation,
    ctx: &mut TransformContext,
) -> VNodeCall {
    VNodeCall {
        tag: VNodeTag::Helper {
            helper: ctx.helper(RuntimeHelper::Fragment),
        },
        props: None,
        children,
        patch_flag: Some(patch_flags::STABLE_FRAGMENT),
        dynamic_props: None,
        is_block: true,
        disable_tracking: false,
        is_component: false,
        location,
    }
}

/// Static comment standing in for a branch that is not rendered.
pub fn comment_placeholder(ctx: &mut TransformContext) -> JsExpr {
    create_call_expression(
        ctx.helper(RuntimeHelper::CreateComment),
        vec![
            CallArg::raw(format!("\"{}\"", PLACEHOLDER_COMMENT)),
            CallArg::raw("true"),
        ],
    )
}

/// Static text call, usable as fragment content.
pub fn static_text(content: &str, ctx: &mut TransformContext) -> JsExpr {
    create_call_expression(
        ctx.helper(RuntimeHelper::CreateText),
        vec![CallArg::raw(format!("\"{}\"", content)), CallArg::raw("true")],
    )
}

/// Ternary whose branches are both stable fragments wrapping the given
/// contents. Deterministic: same inputs, same output; the test expression is
/// embedded untouched.
pub fn build_conditional_fragment(
    test: JsExpr,
    consequent: VNodeChildren,
    alternate: VNodeChildren,
    location: &SourceLocation,
    ctx: &mut TransformContext,
) -> JsExpr {
    create_conditional_expression(
        test,
        JsExpr::VNodeCall(stable_fragment(consequent, location.clone(), ctx)),
        JsExpr::VNodeCall(stable_fragment(alternate, location.clone(), ctx)),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONDITIONAL RENDER TRANSFORM
// ═══════════════════════════════════════════════════════════════════════════════

pub fn conditional_render_transform() -> StructuralTransform {
    StructuralTransform {
        matcher: DirectiveMatcher::Exact(DIRECTIVE_IF.to_string()),
        handler: transform_conditional_render,
    }
}

/// Replace the node with `test ? <fragment>[node]</> : <!---->`. No cache is
/// involved: the branch re-evaluates every render.
fn transform_conditional_render(
    node: NodeId,
    dir: Directive,
    arena: &mut TemplateArena,
    ctx: &mut TransformContext,
    _pipeline: &TransformPipeline,
) -> Result<Option<ExitFn>, CompilerError> {
    let location = match arena.element(node) {
        Some(el) => el.location.clone(),
        None => return Ok(None),
    };
    let test = dir
        .expression
        .unwrap_or_else(|| create_simple_expression("true"));

    let consequent = JsExpr::VNodeCall(stable_fragment(
        VNodeChildren::Nodes(vec![node]),
        location,
        ctx,
    ));
    let alternate = comment_placeholder(ctx);
    let wrapped = create_conditional_expression(test, consequent, alternate);

    let new_id = arena.alloc(TemplateNode::Codegen { expr: wrapped });
    ctx.replace_node(arena, new_id);

    Ok(Some(Box::new(move |arena, ctx, pipeline| {
        if !arena.has_codegen(node) {
            let saved = ctx.current_slot;
            ctx.current_slot = crate::context::CurrentSlot::Detached;
            crate::traverse::traverse_node(node, arena, ctx, pipeline)?;
            ctx.current_slot = saved;
        }
        Ok(())
    })))
}

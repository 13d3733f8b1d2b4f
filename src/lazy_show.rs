//! The lazy-mount rewrite for the conditional display directive.
//!
//! `show` mounts its node immediately and toggles visibility at runtime. The
//! lazy variant (`lazy-show`, or `show` with the `lazy` modifier) defers the
//! first render instead: the node is compiled into
//!
//! ```text
//! _cache._lazyshowN || <test>
//!     ? (_cache._lazyshowN = true, <fragment>[node]</fragment>)
//!     : <!--v-show-if-->
//! ```
//!
//! so nothing mounts until the condition first turns true, and the cache
//! flag keeps the subtree mounted from then on. After the rewrite the node
//! carries a plain `show` directive again and behaves as ordinary
//! conditional display.

use lazy_static::lazy_static;
use regex::Regex;

use crate::ast::{Directive, NodeId, Prop, TemplateArena, TemplateNode};
use crate::codegen::{
    create_compound_expression, create_conditional_expression, create_sequence_expression,
    create_simple_expression, CompoundChild, JsExpr, VNodeChildren,
};
use crate::conditional::{comment_placeholder, stable_fragment, DIRECTIVE_IF};
use crate::context::{CurrentSlot, TransformContext};
use crate::errors::{CompilerError, ERR_LAZY_ON_TEMPLATE};
use crate::expression::{freeze_element_props, freeze_expression};
use crate::traverse::{DirectiveMatcher, ExitFn, StructuralTransform, TransformPipeline};

pub const DIRECTIVE_SHOW: &str = "show";
pub const DIRECTIVE_LAZY_SHOW: &str = "lazy-show";
const LAZY_MODIFIER: &str = "lazy";

lazy_static! {
    static ref SHOW_OR_LAZY_SHOW: Regex = Regex::new(r"^(lazy-show|show)$").unwrap();
}

pub fn lazy_show_transform() -> StructuralTransform {
    StructuralTransform {
        matcher: DirectiveMatcher::Pattern(SHOW_OR_LAZY_SHOW.clone()),
        handler: transform_lazy_show,
    }
}

fn transform_lazy_show(
    node: NodeId,
    dir: Directive,
    arena: &mut TemplateArena,
    ctx: &mut TransformContext,
    pipeline: &TransformPipeline,
) -> Result<Option<ExitFn>, CompilerError> {
    // Plain conditional display: no restructuring. The directive goes back
    // on the prop list once the subtree's own transforms have run.
    if dir.name == DIRECTIVE_SHOW && !dir.has_modifier(LAZY_MODIFIER) {
        return Ok(Some(Box::new(move |arena, _ctx, _pipeline| {
            if let Some(el) = arena.element_mut(node) {
                el.props.push(Prop::Directive(dir));
            }
            Ok(())
        })));
    }

    // The directive variant as the user wrote it, for the error message.
    let directive_name = if dir.name == DIRECTIVE_SHOW {
        "v-show.lazy"
    } else {
        "v-lazy-show"
    };

    let (tag, location) = match arena.element(node) {
        Some(el) => (el.tag.clone(), el.location.clone()),
        None => return Ok(None),
    };

    // Lazy visibility needs a concrete rendered element to defer; a grouping
    // tag renders nothing of its own.
    if tag == "template" {
        return Err(CompilerError::new(
            ERR_LAZY_ON_TEMPLATE,
            &format!("{} can not be used on <template>", directive_name),
            &ctx.options.filename,
            location.line,
            location.column,
        ));
    }

    // Freeze the node's expressions to their authored source so the cached
    // branch is immune to identifier rewriting in later passes.
    if let Some(el) = arena.element_mut(node) {
        freeze_element_props(el);
    }
    let mut dir = dir;
    if let Some(expr) = dir.expression.take() {
        dir.expression = Some(freeze_expression(expr));
    }

    // Server rendering has no persistent client cache to stick the flag
    // into: degrade to plain conditional render and let the host's
    // conditional transform handle the node. No slot is allocated.
    if ctx.is_ssr() {
        let retagged = dir.renamed(DIRECTIVE_IF).without_modifier(LAZY_MODIFIER);
        if let Some(el) = arena.element_mut(node) {
            el.props.push(Prop::Directive(retagged));
        }
        pipeline.apply_structural(0, node, arena, ctx)?;
        return Ok(None);
    }

    let condition = dir
        .expression
        .clone()
        .unwrap_or_else(|| create_simple_expression("true"));

    let slot = ctx.next_lazy_slot();
    let key = TransformContext::lazy_cache_key(slot);

    // Once the cache flag is set the test short-circuits true forever,
    // whatever the original condition evaluates to afterwards.
    let test = create_compound_expression(vec![
        CompoundChild::text(format!("_cache.{}", key)),
        CompoundChild::text(" || "),
        CompoundChild::expr(condition),
    ]);

    let consequent = create_sequence_expression(vec![
        create_compound_expression(vec![CompoundChild::text(format!(
            "_cache.{} = true",
            key
        ))]),
        JsExpr::VNodeCall(stable_fragment(
            VNodeChildren::Nodes(vec![node]),
            location,
            ctx,
        )),
    ]);
    let alternate = comment_placeholder(ctx);
    let wrapped = create_conditional_expression(test, consequent, alternate);

    // Downstream passes see an ordinary conditional-display node.
    let normalized = dir.renamed(DIRECTIVE_SHOW).without_modifier(LAZY_MODIFIER);
    if let Some(el) = arena.element_mut(node) {
        el.props.push(Prop::Directive(normalized));
    }

    let new_id = arena.alloc(TemplateNode::Codegen { expr: wrapped });
    ctx.replace_node(arena, new_id);

    // The replaced subtree never went through the normal child walk; revisit
    // it once the surrounding transforms are done, unless code generation
    // already covered it.
    Ok(Some(Box::new(move |arena, ctx, pipeline| {
        if !arena.has_codegen(node) {
            let saved = ctx.current_slot;
            ctx.current_slot = CurrentSlot::Detached;
            crate::traverse::traverse_node(node, arena, ctx, pipeline)?;
            ctx.current_slot = saved;
        }
        Ok(())
    })))
}

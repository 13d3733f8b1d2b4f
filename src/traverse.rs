//! Template traversal.
//!
//! The traversal is the single authoritative walk over a template arena.
//! Rules:
//! 1. Depth-first, pre-order; visiting order fixes cache-slot assignment
//!    order.
//! 2. A structural directive transform runs during the pre-order visit of
//!    its node. Matched directives are removed from the prop list before the
//!    handler runs; handlers may push replacements back.
//! 3. A handler may return an exit closure; exit closures run after the
//!    node's children finished, in reverse registration order.
//! 4. Element code generation is stamped at the end of the visit. A stamped
//!    node is never re-entered by a deferred re-traversal.

use regex::Regex;

use crate::ast::{NodeId, Prop, TemplateArena, TemplateNode};
use crate::codegen::{JsExpr, RuntimeHelper, VNodeCall, VNodeChildren, VNodeTag};
use crate::conditional;
use crate::context::{CompileOptions, CurrentSlot, TransformContext};
use crate::errors::CompilerError;
use crate::lazy_show;

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSFORM REGISTRATION
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub enum DirectiveMatcher {
    Exact(String),
    Pattern(Regex),
}

impl DirectiveMatcher {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            DirectiveMatcher::Exact(exact) => exact == name,
            DirectiveMatcher::Pattern(pattern) => pattern.is_match(name),
        }
    }
}

/// Deferred post-order continuation returned by a structural transform.
pub type ExitFn = Box<
    dyn FnOnce(
        &mut TemplateArena,
        &mut TransformContext,
        &TransformPipeline,
    ) -> Result<(), CompilerError>,
>;

pub type StructuralHandler = fn(
    NodeId,
    crate::ast::Directive,
    &mut TemplateArena,
    &mut TransformContext,
    &TransformPipeline,
) -> Result<Option<ExitFn>, CompilerError>;

pub struct StructuralTransform {
    pub matcher: DirectiveMatcher,
    pub handler: StructuralHandler,
}

pub struct TransformPipeline {
    pub transforms: Vec<StructuralTransform>,
}

impl TransformPipeline {
    /// Standard pipeline. Slot 0 is the conditional-render transform; the
    /// SSR delegation path depends on that position.
    pub fn standard() -> Self {
        TransformPipeline {
            transforms: vec![
                conditional::conditional_render_transform(),
                lazy_show::lazy_show_transform(),
            ],
        }
    }

    /// Apply one registered transform to `node`: remove every directive its
    /// matcher selects and invoke the handler for each, collecting exit
    /// closures. Also called directly (slot 0) by the SSR delegation path.
    pub fn apply_structural(
        &self,
        slot: usize,
        node: NodeId,
        arena: &mut TemplateArena,
        ctx: &mut TransformContext,
    ) -> Result<Vec<ExitFn>, CompilerError> {
        let transform = &self.transforms[slot];
        let mut exits = Vec::new();
        loop {
            let matched = match arena.element_mut(node) {
                Some(el) => {
                    let position = el.props.iter().position(|prop| {
                        matches!(prop, Prop::Directive(dir) if transform.matcher.matches(&dir.name))
                    });
                    position.map(|index| el.props.remove(index))
                }
                None => None,
            };
            let dir = match matched {
                Some(Prop::Directive(dir)) => dir,
                _ => break,
            };
            if let Some(exit) = (transform.handler)(node, dir, arena, ctx, self)? {
                exits.push(exit);
            }
        }
        Ok(exits)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DRIVER
// ═══════════════════════════════════════════════════════════════════════════════

pub fn traverse_children(
    arena: &mut TemplateArena,
    ctx: &mut TransformContext,
    pipeline: &TransformPipeline,
    parent: Option<NodeId>,
) -> Result<(), CompilerError> {
    let mut index = 0;
    loop {
        let child = {
            let list = match parent {
                Some(id) => match arena.element(id) {
                    Some(el) => &el.children,
                    None => break,
                },
                None => &arena.root,
            };
            match list.get(index) {
                Some(&child) => child,
                None => break,
            }
        };
        ctx.current_slot = match parent {
            Some(id) => CurrentSlot::Child { parent: id, index },
            None => CurrentSlot::Root { index },
        };
        traverse_node(child, arena, ctx, pipeline)?;
        index += 1;
    }
    Ok(())
}

pub fn traverse_node(
    node: NodeId,
    arena: &mut TemplateArena,
    ctx: &mut TransformContext,
    pipeline: &TransformPipeline,
) -> Result<(), CompilerError> {
    let entry_slot = ctx.current_slot;
    ctx.current_node = Some(node);

    let mut exit_fns = Vec::new();
    let mut current = node;
    for slot in 0..pipeline.transforms.len() {
        if arena.element(current).is_none() {
            break;
        }
        exit_fns.extend(pipeline.apply_structural(slot, current, arena, ctx)?);
        // a transform may have substituted the node under visit
        current = ctx.current_node.unwrap_or(current);
    }

    if matches!(arena.node(current), TemplateNode::Element(_)) {
        traverse_children(arena, ctx, pipeline, Some(current))?;
    }

    ctx.current_node = Some(current);
    ctx.current_slot = entry_slot;
    for exit in exit_fns.into_iter().rev() {
        exit(arena, ctx, pipeline)?;
    }

    stamp_element_codegen(current, arena, ctx);
    Ok(())
}

/// Record generated code for an element once its transforms and children are
/// done. Presence of the entry is what stops a deferred re-traversal from
/// processing the node a second time.
fn stamp_element_codegen(node: NodeId, arena: &mut TemplateArena, ctx: &mut TransformContext) {
    if arena.has_codegen(node) {
        return;
    }
    let vnode = match arena.element(node) {
        Some(el) => VNodeCall {
            tag: VNodeTag::Element {
                tag: el.tag.clone(),
            },
            props: None,
            children: if el.children.is_empty() {
                VNodeChildren::None
            } else {
                VNodeChildren::Nodes(el.children.clone())
            },
            patch_flag: None,
            dynamic_props: None,
            is_block: false,
            disable_tracking: false,
            is_component: false,
            location: el.location.clone(),
        },
        None => return,
    };
    ctx.helper(RuntimeHelper::CreateElementVnode);
    arena.set_codegen(node, JsExpr::VNodeCall(vnode));
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINT
// ═══════════════════════════════════════════════════════════════════════════════

/// Run the standard transform pipeline over one compilation root.
pub fn transform_template(
    arena: &mut TemplateArena,
    options: CompileOptions,
) -> Result<TransformContext, CompilerError> {
    let pipeline = TransformPipeline::standard();
    let mut ctx = TransformContext::new(options);
    traverse_children(arena, &mut ctx, &pipeline, None)?;
    Ok(ctx)
}

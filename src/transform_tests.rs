//! Directive transform tests.
//!
//! Templates are built directly against the arena, the way the host
//! compiler's parser would hand them over, then run through the standard
//! pipeline.

#[cfg(test)]
mod tests {
    use crate::ast::{
        Directive, ElementNode, Prop, SourceLocation, TemplateArena, TemplateNode,
    };
    use crate::codegen::{
        patch_flags, CallArg, CompoundChild, ConditionalExpr, JsExpr, RuntimeHelper, SimpleExpr,
        VNodeChildren, VNodeTag,
    };
    use crate::context::CompileOptions;
    use crate::errors::ERR_LAZY_ON_TEMPLATE;
    use crate::traverse::transform_template;

    fn mock_loc() -> SourceLocation {
        SourceLocation::new(1, 1, "")
    }

    /// An expression as the parser would deliver it: content plus the raw
    /// source slice it was cut from.
    fn authored(source: &str) -> JsExpr {
        JsExpr::Simple(SimpleExpr {
            content: source.to_string(),
            is_static: false,
            location: SourceLocation::new(1, 1, source),
        })
    }

    fn element(arena: &mut TemplateArena, tag: &str, props: Vec<Prop>) -> usize {
        arena.alloc_root(TemplateNode::Element(ElementNode {
            tag: tag.to_string(),
            props,
            children: vec![],
            location: mock_loc(),
        }))
    }

    fn show_dir(source: &str, modifiers: Vec<&str>) -> Prop {
        Prop::Directive(
            Directive::new("show", Some(authored(source)))
                .with_modifiers(modifiers.into_iter().map(String::from).collect()),
        )
    }

    fn lazy_show_dir(source: &str) -> Prop {
        Prop::Directive(Directive::new("lazy-show", Some(authored(source))))
    }

    fn as_conditional(expr: &JsExpr) -> &ConditionalExpr {
        match expr {
            JsExpr::Conditional(cond) => cond,
            other => panic!("expected conditional, got {:?}", other),
        }
    }

    fn root_conditional(arena: &TemplateArena) -> &ConditionalExpr {
        match arena.node(arena.root[0]) {
            TemplateNode::Codegen { expr } => as_conditional(expr),
            other => panic!("expected codegen root, got {:?}", other),
        }
    }

    fn compound_texts(expr: &JsExpr) -> Vec<String> {
        match expr {
            JsExpr::Compound(compound) => compound
                .children
                .iter()
                .map(|child| match child {
                    CompoundChild::Text { content } => content.clone(),
                    CompoundChild::Expr { expr } => match &**expr {
                        JsExpr::Simple(simple) => simple.content.clone(),
                        other => panic!("unexpected compound child {:?}", other),
                    },
                })
                .collect(),
            other => panic!("expected compound, got {:?}", other),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PLAIN SHOW
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn plain_show_is_pushed_back_unchanged() {
        let mut arena = TemplateArena::new();
        let node = element(&mut arena, "div", vec![show_dir("visible", vec![])]);

        let ctx = transform_template(&mut arena, CompileOptions::default()).unwrap();

        // no restructuring: the element is still the root child
        assert_eq!(arena.root, vec![node]);
        let el = arena.element(node).unwrap();
        assert_eq!(el.props.len(), 1);
        match &el.props[0] {
            Prop::Directive(dir) => {
                assert_eq!(dir.name, "show");
                assert!(dir.modifiers.is_empty());
                // the expression kept its authored source: nothing was frozen
                assert_eq!(dir.expression, Some(authored("visible")));
            }
            other => panic!("expected directive, got {:?}", other),
        }
        assert_eq!(ctx.lazy_slot_count(), 0);
        assert_eq!(ctx.helpers(), &[RuntimeHelper::CreateElementVnode]);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // USAGE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn lazy_show_on_template_tag_is_a_usage_error() {
        let mut arena = TemplateArena::new();
        element(&mut arena, "template", vec![lazy_show_dir("cond")]);

        let err = transform_template(&mut arena, CompileOptions::default()).unwrap_err();
        assert_eq!(err.code, ERR_LAZY_ON_TEMPLATE);
        assert_eq!(err.message, "v-lazy-show can not be used on <template>");
    }

    #[test]
    fn show_with_lazy_modifier_on_template_names_the_modifier_form() {
        let mut arena = TemplateArena::new();
        element(&mut arena, "template", vec![show_dir("cond", vec!["lazy"])]);

        let err = transform_template(&mut arena, CompileOptions::default()).unwrap_err();
        assert_eq!(err.message, "v-show.lazy can not be used on <template>");
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // LAZY REWRITE
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn lazy_show_rewrites_into_sticky_conditional() {
        let mut arena = TemplateArena::new();
        let node = element(&mut arena, "div", vec![lazy_show_dir("visible")]);

        let ctx = transform_template(&mut arena, CompileOptions::default()).unwrap();

        assert_ne!(arena.root[0], node);
        let cond = root_conditional(&arena);

        // test: _cache._lazyshow1 || visible
        assert_eq!(
            compound_texts(&cond.test),
            vec!["_cache._lazyshow1", " || ", "visible"]
        );

        // consequent: (_cache._lazyshow1 = true, fragment[node])
        match &cond.consequent {
            JsExpr::Sequence(seq) => {
                assert_eq!(seq.expressions.len(), 2);
                assert_eq!(
                    compound_texts(&seq.expressions[0]),
                    vec!["_cache._lazyshow1 = true"]
                );
                match &seq.expressions[1] {
                    JsExpr::VNodeCall(call) => {
                        assert_eq!(
                            call.tag,
                            VNodeTag::Helper {
                                helper: RuntimeHelper::Fragment
                            }
                        );
                        assert_eq!(call.props, None);
                        assert_eq!(call.children, VNodeChildren::Nodes(vec![node]));
                        assert_eq!(call.patch_flag, Some(patch_flags::STABLE_FRAGMENT));
                        assert!(call.is_block);
                        assert_eq!(call.location, mock_loc());
                    }
                    other => panic!("expected fragment vnode call, got {:?}", other),
                }
            }
            other => panic!("expected sequence, got {:?}", other),
        }

        // alternate: createCommentVNode("v-show-if", true)
        match &cond.alternate {
            JsExpr::Call(call) => {
                assert_eq!(call.callee, RuntimeHelper::CreateComment);
                assert_eq!(
                    call.args,
                    vec![CallArg::raw("\"v-show-if\""), CallArg::raw("true")]
                );
            }
            other => panic!("expected comment call, got {:?}", other),
        }

        // the node went back to being an ordinary conditional-display element
        let el = arena.element(node).unwrap();
        assert_eq!(el.props.len(), 1);
        match &el.props[0] {
            Prop::Directive(dir) => {
                assert_eq!(dir.name, "show");
                assert!(!dir.has_modifier("lazy"));
                match dir.expression.as_ref().unwrap() {
                    JsExpr::Simple(simple) => {
                        assert_eq!(simple.content, "visible");
                        // frozen: no recoverable source left
                        assert!(simple.location.source.is_empty());
                    }
                    other => panic!("expected frozen simple expression, got {:?}", other),
                }
            }
            other => panic!("expected directive, got {:?}", other),
        }

        // deferred re-traversal did run: code was generated for the subtree
        assert!(arena.has_codegen(node));
        assert!(ctx.helpers().contains(&RuntimeHelper::Fragment));
        assert!(ctx.helpers().contains(&RuntimeHelper::CreateComment));
        assert_eq!(ctx.lazy_slot_count(), 1);
    }

    #[test]
    fn show_with_lazy_modifier_is_rewritten_too() {
        let mut arena = TemplateArena::new();
        element(&mut arena, "div", vec![show_dir("ready", vec!["lazy"])]);

        let ctx = transform_template(&mut arena, CompileOptions::default()).unwrap();
        let cond = root_conditional(&arena);
        assert_eq!(
            compound_texts(&cond.test),
            vec!["_cache._lazyshow1", " || ", "ready"]
        );
        assert_eq!(ctx.lazy_slot_count(), 1);
    }

    #[test]
    fn sibling_lazy_directives_get_increasing_slots() {
        let mut arena = TemplateArena::new();
        element(&mut arena, "div", vec![lazy_show_dir("a")]);
        element(&mut arena, "span", vec![lazy_show_dir("b")]);

        let ctx = transform_template(&mut arena, CompileOptions::default()).unwrap();
        assert_eq!(ctx.lazy_slot_count(), 2);

        for (index, expected) in [(0usize, "_cache._lazyshow1"), (1, "_cache._lazyshow2")] {
            match arena.node(arena.root[index]) {
                TemplateNode::Codegen { expr } => {
                    let cond = as_conditional(expr);
                    assert_eq!(compound_texts(&cond.test)[0], expected);
                }
                other => panic!("expected codegen root, got {:?}", other),
            }
        }
    }

    #[test]
    fn nested_lazy_directives_allocate_one_slot_each() {
        let mut arena = TemplateArena::new();
        let inner = arena.alloc(TemplateNode::Element(ElementNode {
            tag: "span".to_string(),
            props: vec![lazy_show_dir("inner")],
            children: vec![],
            location: mock_loc(),
        }));
        arena.alloc_root(TemplateNode::Element(ElementNode {
            tag: "div".to_string(),
            props: vec![lazy_show_dir("outer")],
            children: vec![inner],
            location: mock_loc(),
        }));

        let ctx = transform_template(&mut arena, CompileOptions::default()).unwrap();

        // outer directive was visited first, re-traversal of the replaced
        // subtree picked up the inner one exactly once
        assert_eq!(ctx.lazy_slot_count(), 2);
        let outer_cond = root_conditional(&arena);
        assert_eq!(compound_texts(&outer_cond.test)[0], "_cache._lazyshow1");

        // the inner node's slot in the outer element now holds a conditional
        let outer_node = match &outer_cond.consequent {
            JsExpr::Sequence(seq) => match &seq.expressions[1] {
                JsExpr::VNodeCall(call) => match &call.children {
                    VNodeChildren::Nodes(nodes) => nodes[0],
                    other => panic!("expected node children, got {:?}", other),
                },
                other => panic!("expected vnode call, got {:?}", other),
            },
            other => panic!("expected sequence, got {:?}", other),
        };
        let inner_slot = arena.element(outer_node).unwrap().children[0];
        match arena.node(inner_slot) {
            TemplateNode::Codegen { expr } => {
                let inner_cond = as_conditional(expr);
                assert_eq!(compound_texts(&inner_cond.test)[0], "_cache._lazyshow2");
            }
            other => panic!("expected inner conditional, got {:?}", other),
        }
    }

    #[test]
    fn sibling_props_are_frozen_to_authored_source() {
        let mut arena = TemplateArena::new();
        let bind = Prop::Directive(Directive::new("bind", Some(authored("title"))));
        let handler = Prop::Directive(
            Directive::new("on", Some(authored("onClick")))
                .with_modifiers(vec!["click".to_string()]),
        );
        let node = element(
            &mut arena,
            "div",
            vec![bind, handler, lazy_show_dir("visible")],
        );

        transform_template(&mut arena, CompileOptions::default()).unwrap();

        let el = arena.element(node).unwrap();
        let dir = |name: &str| {
            el.props
                .iter()
                .find_map(|p| match p {
                    Prop::Directive(d) if d.name == name => Some(d),
                    _ => None,
                })
                .unwrap()
        };
        match dir("bind").expression.as_ref().unwrap() {
            JsExpr::Simple(simple) => assert!(simple.location.source.is_empty()),
            other => panic!("expected frozen expression, got {:?}", other),
        }
        // event handlers keep their authored expression untouched
        match dir("on").expression.as_ref().unwrap() {
            JsExpr::Simple(simple) => assert_eq!(simple.location.source, "onClick"),
            other => panic!("expected handler expression, got {:?}", other),
        }
    }

    #[test]
    fn transform_is_stable_over_already_transformed_output() {
        let mut arena = TemplateArena::new();
        element(&mut arena, "div", vec![lazy_show_dir("visible")]);

        transform_template(&mut arena, CompileOptions::default()).unwrap();
        let snapshot = serde_json::to_value(&arena).unwrap();

        let ctx = transform_template(&mut arena, CompileOptions::default()).unwrap();
        assert_eq!(ctx.lazy_slot_count(), 0);
        assert_eq!(serde_json::to_value(&arena).unwrap(), snapshot);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SSR PATH
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn ssr_degrades_to_plain_conditional_render() {
        let mut arena = TemplateArena::new();
        let node = element(&mut arena, "div", vec![lazy_show_dir("visible")]);

        let options = CompileOptions {
            ssr: true,
            ..Default::default()
        };
        let ctx = transform_template(&mut arena, options).unwrap();

        // no cache slot was allocated
        assert_eq!(ctx.lazy_slot_count(), 0);

        let cond = root_conditional(&arena);
        // the test is the frozen original condition, no sticky flag
        match &cond.test {
            JsExpr::Simple(simple) => assert_eq!(simple.content, "visible"),
            other => panic!("expected plain test, got {:?}", other),
        }
        match &cond.consequent {
            JsExpr::VNodeCall(call) => {
                assert_eq!(
                            call.tag,
                            VNodeTag::Helper {
                                helper: RuntimeHelper::Fragment
                            }
                        );
                assert_eq!(call.children, VNodeChildren::Nodes(vec![node]));
            }
            other => panic!("expected fragment consequent, got {:?}", other),
        }
        match &cond.alternate {
            JsExpr::Call(call) => assert_eq!(call.callee, RuntimeHelper::CreateComment),
            other => panic!("expected comment alternate, got {:?}", other),
        }

        // the delegated conditional transform consumed the re-tagged
        // directive; nothing was pushed back
        assert!(arena.element(node).unwrap().props.is_empty());
    }

    #[test]
    fn in_ssr_flag_takes_the_ssr_path_too() {
        let mut arena = TemplateArena::new();
        element(&mut arena, "div", vec![show_dir("visible", vec!["lazy"])]);

        let options = CompileOptions {
            in_ssr: true,
            ..Default::default()
        };
        let ctx = transform_template(&mut arena, options).unwrap();
        assert_eq!(ctx.lazy_slot_count(), 0);
        match &root_conditional(&arena).test {
            JsExpr::Simple(simple) => assert_eq!(simple.content, "visible"),
            other => panic!("expected plain test, got {:?}", other),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CONDITIONAL RENDER
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn if_directive_wraps_node_without_cache() {
        let mut arena = TemplateArena::new();
        let node = element(
            &mut arena,
            "div",
            vec![Prop::Directive(Directive::new(
                "if",
                Some(authored("loggedIn")),
            ))],
        );

        let ctx = transform_template(&mut arena, CompileOptions::default()).unwrap();

        let cond = root_conditional(&arena);
        match &cond.test {
            JsExpr::Simple(simple) => assert_eq!(simple.content, "loggedIn"),
            other => panic!("expected simple test, got {:?}", other),
        }
        // subtree still got its code generated through the deferred revisit
        assert!(arena.has_codegen(node));
        assert_eq!(ctx.lazy_slot_count(), 0);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn transformed_arena_serializes_with_tagged_nodes() {
        let mut arena = TemplateArena::new();
        element(&mut arena, "div", vec![lazy_show_dir("visible")]);
        transform_template(&mut arena, CompileOptions::default()).unwrap();

        let value = serde_json::to_value(&arena).unwrap();
        let root_id = value["root"][0].as_u64().unwrap() as usize;
        let nodes = value["nodes"].as_array().unwrap();
        assert_eq!(nodes[root_id]["type"], "codegen");
        assert_eq!(nodes[0]["type"], "element");
        assert_eq!(nodes[0]["tag"], "div");

        let parsed: TemplateArena = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.root, arena.root);
    }
}

//! Expression freezing.
//!
//! Before a branch of a node is cached behind a sticky conditional, every
//! expression on the node is rewritten to a source-literal form: a simple
//! expression whose content is the text exactly as authored. Later transform
//! passes then see the authored expression, not an identifier-rewritten one.
//! Frozen output carries no location source, so a second pass leaves it
//! untouched.

use crate::ast::{ElementNode, Prop};
use crate::codegen::{create_simple_expression, JsExpr};

/// Source text this expression can be rebuilt from, if any. Synthesized
/// expressions (and anything that is not a plain expression node) have none.
fn recoverable_source(expr: &JsExpr) -> Option<&str> {
    match expr {
        JsExpr::Simple(simple) if !simple.location.source.is_empty() => {
            Some(simple.location.source.as_str())
        }
        _ => None,
    }
}

/// Rewrite `expr` to a literal expression built from its recorded source
/// text. Expressions without recoverable source come back unchanged, which
/// makes the rewrite idempotent.
pub fn freeze_expression(expr: JsExpr) -> JsExpr {
    match recoverable_source(&expr) {
        Some(source) => create_simple_expression(source.to_string()),
        None => expr,
    }
}

/// Freeze every prop expression on `el` except event handlers, whose
/// expressions stay attached to the runtime listener machinery.
pub fn freeze_element_props(el: &mut ElementNode) {
    for prop in &mut el.props {
        let dir = match prop {
            Prop::Directive(dir) => dir,
            Prop::Attribute(_) => continue,
        };
        if dir.name == "on" {
            continue;
        }
        if let Some(expr) = dir.expression.take() {
            dir.expression = Some(freeze_expression(expr));
        }
    }
}

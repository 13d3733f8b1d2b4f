//! Template AST for the directive transforms.
//!
//! Nodes live in an index-addressed arena. Each node owns its ordered prop
//! list and a child list of `NodeId`s; "code generated" state is a side-table
//! on the arena rather than a field threaded through the node graph, so the
//! tree stays acyclic and serializable.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::codegen::JsExpr;

pub type NodeId = usize;

// ═══════════════════════════════════════════════════════════════════════════════
// SOURCE LOCATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Position plus the raw source slice the node was parsed from. Synthesized
/// nodes carry an empty `source`; the expression freezer keys off that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
    #[serde(default)]
    pub source: String,
}

impl SourceLocation {
    pub fn new(line: u32, column: u32, source: impl Into<String>) -> Self {
        SourceLocation {
            line,
            column,
            source: source.into(),
        }
    }

    /// Location of a compiler-synthesized node: no recoverable source text.
    pub fn stub() -> Self {
        SourceLocation::default()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROPS AND DIRECTIVES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Prop {
    Attribute(AttributeProp),
    Directive(Directive),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeProp {
    pub name: String,
    pub value: Option<String>,
    #[serde(default)]
    pub location: SourceLocation,
}

/// A parsed directive. Identity is structural: normalizing a directive means
/// building a new value with a substituted name and a filtered modifier list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Directive {
    pub name: String,
    pub expression: Option<JsExpr>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub location: SourceLocation,
}

impl Directive {
    pub fn new(name: impl Into<String>, expression: Option<JsExpr>) -> Self {
        Directive {
            name: name.into(),
            expression,
            modifiers: Vec::new(),
            location: SourceLocation::stub(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Vec<String>) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }

    /// New directive value with `modifier` filtered out of the modifier list.
    pub fn without_modifier(&self, modifier: &str) -> Directive {
        Directive {
            name: self.name.clone(),
            expression: self.expression.clone(),
            modifiers: self
                .modifiers
                .iter()
                .filter(|m| m.as_str() != modifier)
                .cloned()
                .collect(),
            location: self.location.clone(),
        }
    }

    /// New directive value under a different name, same expression and
    /// modifiers.
    pub fn renamed(&self, name: impl Into<String>) -> Directive {
        Directive {
            name: name.into(),
            expression: self.expression.clone(),
            modifiers: self.modifiers.clone(),
            location: self.location.clone(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TEMPLATE NODES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TemplateNode {
    Element(ElementNode),
    Text(TextNode),
    Comment(CommentNode),
    /// A compile-output construct spliced into a child list in place of a
    /// template node (the result of a structural rewrite).
    Codegen { expr: JsExpr },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementNode {
    pub tag: String,
    #[serde(default)]
    pub props: Vec<Prop>,
    #[serde(default)]
    pub children: Vec<NodeId>,
    #[serde(default)]
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextNode {
    pub value: String,
    #[serde(default)]
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    pub value: String,
    #[serde(default)]
    pub location: SourceLocation,
}

impl TemplateNode {
    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            TemplateNode::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementNode> {
        match self {
            TemplateNode::Element(el) => Some(el),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ARENA
// ═══════════════════════════════════════════════════════════════════════════════

/// One compilation root: every node of the template, addressed by index, plus
/// the root child list and the codegen side-table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateArena {
    nodes: Vec<TemplateNode>,
    #[serde(default)]
    pub root: Vec<NodeId>,
    /// Generated code per node. Presence of an entry is the "codegen done"
    /// flag that gates deferred re-traversal.
    #[serde(default)]
    codegen: HashMap<NodeId, JsExpr>,
}

impl TemplateArena {
    pub fn new() -> Self {
        TemplateArena::default()
    }

    pub fn alloc(&mut self, node: TemplateNode) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        id
    }

    /// Allocate a node and append it to the root child list.
    pub fn alloc_root(&mut self, node: TemplateNode) -> NodeId {
        let id = self.alloc(node);
        self.root.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &TemplateNode {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut TemplateNode {
        &mut self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementNode> {
        self.node(id).as_element()
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementNode> {
        self.node_mut(id).as_element_mut()
    }

    pub fn set_codegen(&mut self, id: NodeId, expr: JsExpr) {
        self.codegen.insert(id, expr);
    }

    pub fn codegen(&self, id: NodeId) -> Option<&JsExpr> {
        self.codegen.get(&id)
    }

    pub fn has_codegen(&self, id: NodeId) -> bool {
        self.codegen.contains_key(&id)
    }

    /// Swap the child-list slot `index` of `parent` (or of the root list) to
    /// point at `new_id`. Returns the displaced id.
    pub fn replace_child(
        &mut self,
        parent: Option<NodeId>,
        index: usize,
        new_id: NodeId,
    ) -> NodeId {
        let slot = match parent {
            Some(pid) => {
                let el = self.nodes[pid]
                    .as_element_mut()
                    .expect("replace_child: parent is not an element");
                &mut el.children[index]
            }
            None => &mut self.root[index],
        };
        std::mem::replace(slot, new_id)
    }
}

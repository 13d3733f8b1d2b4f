//! Static props type inference.
//!
//! Reads a single TypeScript source file and derives the runtime
//! prop-validation schema from the first type argument of the well-known
//! props-declaration call, without executing any code. Only literal object
//! types, locally declared interfaces and aliases, and intersections of
//! those are resolved; anything else silently contributes nothing, so the
//! worst case is a partial or empty schema, never a failure.

use std::collections::HashMap;
use std::fs;

#[cfg(feature = "napi")]
use napi_derive::napi;
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    CallExpression, Declaration, Expression, Program, PropertyKey, Statement,
    TSInterfaceDeclaration, TSSignature, TSType, TSTypeAliasDeclaration, TSTypeName,
    TSTypeReference,
};
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser;
use oxc_span::SourceType;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cache::SchemaCache;
use crate::errors::{CompilerError, ERR_SOURCE_READ, ERR_SOURCE_SYNTAX};

/// Callee name of the props-declaration call site.
pub const PROPS_MACRO: &str = "defineProps";

// ═══════════════════════════════════════════════════════════════════════════════
// SCHEMA TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// One property of the inferred schema. `type_kind` is the raw kind tag of
/// the annotation as written (e.g. `TSStringKeyword`), never a normalized or
/// evaluated type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropSchema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_kind: Option<String>,
    pub required: bool,
}

pub type RuntimeProps = HashMap<String, PropSchema>;

// ═══════════════════════════════════════════════════════════════════════════════
// TYPE DECLARATION TABLE
// ═══════════════════════════════════════════════════════════════════════════════

enum TypeDecl<'a> {
    Interface(&'a TSInterfaceDeclaration<'a>),
    Alias(&'a TSTypeAliasDeclaration<'a>),
}

type TypeTable<'a> = HashMap<String, TypeDecl<'a>>;

/// One pass over the file's top-level statements. A later declaration with
/// the same name silently replaces the earlier entry.
fn collect_type_declarations<'a>(program: &'a Program<'a>) -> TypeTable<'a> {
    let mut table = TypeTable::new();
    for stmt in &program.body {
        let decl = match stmt {
            Statement::TSInterfaceDeclaration(interface) => {
                Some(TypeDecl::Interface(&**interface))
            }
            Statement::TSTypeAliasDeclaration(alias) => Some(TypeDecl::Alias(&**alias)),
            Statement::ExportNamedDeclaration(export) => match &export.declaration {
                Some(Declaration::TSInterfaceDeclaration(interface)) => {
                    Some(TypeDecl::Interface(&**interface))
                }
                Some(Declaration::TSTypeAliasDeclaration(alias)) => {
                    Some(TypeDecl::Alias(&**alias))
                }
                _ => None,
            },
            _ => None,
        };
        if let Some(decl) = decl {
            let name = match &decl {
                TypeDecl::Interface(interface) => interface.id.name.as_str(),
                TypeDecl::Alias(alias) => alias.id.name.as_str(),
            };
            table.insert(name.to_string(), decl);
        }
    }
    table
}

/// Resolve a named type reference against the local declaration table. A
/// qualified name `A.B.C` resolves through its leftmost identifier only;
/// the members of the dotted path are never looked at.
fn resolve_type_reference<'t, 'a>(
    reference: &TSTypeReference<'a>,
    types: &'t TypeTable<'a>,
) -> Option<&'t TypeDecl<'a>> {
    match &reference.type_name {
        TSTypeName::IdentifierReference(ident) => types.get(ident.name.as_str()),
        TSTypeName::QualifiedName(qualified) => {
            let mut left = &qualified.left;
            loop {
                match left {
                    TSTypeName::QualifiedName(inner) => left = &inner.left,
                    TSTypeName::IdentifierReference(ident) => {
                        return types.get(ident.name.as_str())
                    }
                    _ => return None,
                }
            }
        }
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCHEMA EXTRACTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Raw kind tag of a type annotation.
fn type_annotation_kind(ty: &TSType) -> &'static str {
    match ty {
        TSType::TSAnyKeyword(_) => "TSAnyKeyword",
        TSType::TSBigIntKeyword(_) => "TSBigIntKeyword",
        TSType::TSBooleanKeyword(_) => "TSBooleanKeyword",
        TSType::TSNeverKeyword(_) => "TSNeverKeyword",
        TSType::TSNullKeyword(_) => "TSNullKeyword",
        TSType::TSNumberKeyword(_) => "TSNumberKeyword",
        TSType::TSObjectKeyword(_) => "TSObjectKeyword",
        TSType::TSStringKeyword(_) => "TSStringKeyword",
        TSType::TSSymbolKeyword(_) => "TSSymbolKeyword",
        TSType::TSUndefinedKeyword(_) => "TSUndefinedKeyword",
        TSType::TSUnknownKeyword(_) => "TSUnknownKeyword",
        TSType::TSVoidKeyword(_) => "TSVoidKeyword",
        TSType::TSArrayType(_) => "TSArrayType",
        TSType::TSFunctionType(_) => "TSFunctionType",
        TSType::TSIntersectionType(_) => "TSIntersectionType",
        TSType::TSLiteralType(_) => "TSLiteralType",
        TSType::TSTupleType(_) => "TSTupleType",
        TSType::TSTypeLiteral(_) => "TSTypeLiteral",
        TSType::TSTypeReference(_) => "TSTypeReference",
        TSType::TSUnionType(_) => "TSUnionType",
        _ => "TSType",
    }
}

/// A property signature contributes one entry; every other member kind (call
/// signatures, index signatures, computed or literal keys) contributes
/// nothing.
fn collect_property_signature(member: &TSSignature, schema: &mut RuntimeProps) {
    let property = match member {
        TSSignature::TSPropertySignature(property) => property,
        _ => return,
    };
    let key = match &property.key {
        PropertyKey::StaticIdentifier(ident) => ident.name.to_string(),
        _ => return,
    };
    schema.insert(
        key,
        PropSchema {
            type_kind: property
                .type_annotation
                .as_ref()
                .map(|annotation| type_annotation_kind(&annotation.type_annotation).to_string()),
            required: !property.optional,
        },
    );
}

/// Flatten a type into the schema: literal members directly, references via
/// the declaration table (interface bodies, alias targets), intersections in
/// declaration order with later constituents overwriting earlier entries.
fn extract_type<'a>(ty: &TSType<'a>, types: &TypeTable<'a>, schema: &mut RuntimeProps) {
    match ty {
        TSType::TSTypeLiteral(literal) => {
            for member in &literal.members {
                collect_property_signature(member, schema);
            }
        }
        TSType::TSTypeReference(reference) => match resolve_type_reference(reference, types) {
            Some(TypeDecl::Interface(interface)) => {
                for member in &interface.body.body {
                    collect_property_signature(member, schema);
                }
            }
            Some(TypeDecl::Alias(alias)) => extract_type(&alias.type_annotation, types, schema),
            None => {}
        },
        TSType::TSIntersectionType(intersection) => {
            for constituent in &intersection.types {
                extract_type(constituent, types, schema);
            }
        }
        _ => {}
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CALL-SITE FINDER
// ═══════════════════════════════════════════════════════════════════════════════

struct PropsCallFinder<'t, 'a> {
    types: &'t TypeTable<'a>,
    schema: RuntimeProps,
}

impl<'t, 'a> Visit<'a> for PropsCallFinder<'t, 'a> {
    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Expression::Identifier(ident) = &call.callee {
            if ident.name == PROPS_MACRO {
                if let Some(type_args) = &call.type_arguments {
                    // only the first type argument is inspected
                    if let Some(target) = type_args.params.first() {
                        extract_type(target, self.types, &mut self.schema);
                    }
                }
            }
        }
        walk::walk_call_expression(self, call);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINTS
// ═══════════════════════════════════════════════════════════════════════════════

pub fn extract_runtime_props_from_source(
    source: &str,
    filename: &str,
) -> Result<RuntimeProps, CompilerError> {
    let allocator = Allocator::default();
    let source_type = SourceType::default().with_typescript(true).with_module(true);
    let ret = Parser::new(&allocator, source, source_type).parse();
    if ret.panicked {
        return Err(CompilerError::new(
            ERR_SOURCE_SYNTAX,
            &format!("Failed to parse {}", filename),
            filename,
            0,
            0,
        ));
    }
    let program = ret.program;
    let types = collect_type_declarations(&program);
    let mut finder = PropsCallFinder {
        types: &types,
        schema: RuntimeProps::new(),
    };
    finder.visit_program(&program);
    Ok(finder.schema)
}

/// Infer the runtime props schema from one source file.
pub fn extract_runtime_props(path: &str) -> Result<RuntimeProps, CompilerError> {
    let source = fs::read_to_string(path).map_err(|err| {
        CompilerError::new(
            ERR_SOURCE_READ,
            &format!("Failed to read {}: {}", path, err),
            path,
            0,
            0,
        )
    })?;
    extract_runtime_props_from_source(&source, path)
}

/// Same as [`extract_runtime_props`], backed by the content-hash cache.
pub fn extract_runtime_props_cached(
    path: &str,
    cache: &SchemaCache,
) -> Result<RuntimeProps, CompilerError> {
    let source = fs::read_to_string(path).map_err(|err| {
        CompilerError::new(
            ERR_SOURCE_READ,
            &format!("Failed to read {}: {}", path, err),
            path,
            0,
            0,
        )
    })?;
    if let Some(props) = cache.get(path, &source) {
        return Ok(props);
    }
    let props = extract_runtime_props_from_source(&source, path)?;
    cache.set(path, &source, props.clone());
    Ok(props)
}

/// Infer schemas for a set of files. Files are independent compilation
/// units; inference within each file stays sequential.
pub fn extract_runtime_props_batch(
    paths: &[String],
) -> Vec<(String, Result<RuntimeProps, CompilerError>)> {
    paths
        .par_iter()
        .map(|path| (path.clone(), extract_runtime_props(path)))
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// NAPI WRAPPER
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "napi")]
#[napi]
pub fn extract_runtime_props_native(path: String) -> napi::Result<String> {
    let props = extract_runtime_props(&path).map_err(|e| napi::Error::from_reason(e.to_string()))?;
    serde_json::to_string(&serde_json::json!({ "props": props }))
        .map_err(|e| napi::Error::from_reason(format!("Serialize error: {}", e)))
}

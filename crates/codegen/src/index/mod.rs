//! Read-only model of the declared types of a crate.
//!
//! Built once from Rust sources by [`IndexBuilder`], then only queried. Type
//! paths inside signatures, supertraits and annotation values are already
//! resolved to absolute paths, so anything read from the index can be emitted
//! from any module of the same crate.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use syn::{Attribute, Signature, Type};

pub use {
    annotation::{Annotation, AnnotationValue, VALUE, path_text},
    parse::IndexBuilder,
    resolve::{Resolver, ident, type_text},
};

mod annotation;
mod parse;
mod resolve;

/// Kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Trait,
    Struct,
    Enum,
}

/// A trait, struct or enum.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    /// Qualified name, `crate::a::Assistant`.
    pub name: String,
    /// Declaring module.
    pub module: String,
    /// Unqualified name.
    pub ident: String,
    pub kind: TypeKind,
    pub annotations: Vec<Annotation>,
    /// Direct supertraits, resolved, without generic arguments.
    pub supertraits: Vec<String>,
    /// Declares generic parameters.
    pub generic: bool,
    /// Trait methods in declaration order.
    pub methods: Vec<MethodDecl>,
    /// Struct fields.
    pub fields: Vec<FieldDecl>,
    /// Enum variant names.
    pub variants: Vec<String>,
    /// Can be constructed without arguments.
    pub no_arg_constructor: bool,
    /// Source file the type was read from.
    pub file: String,
}

impl TypeDecl {
    /// Whether the type is a trait.
    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Trait
    }

    /// First annotation named `name`.
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.is(name))
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotation(name).is_some()
    }

    /// Whether any parameter of any method carries `name`.
    pub fn has_param_annotation(&self, name: &str) -> bool {
        self.methods
            .iter()
            .flat_map(|m| &m.params)
            .any(|p| p.annotation(name).is_some())
    }
}

/// A trait method.
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    /// Qualified name of the declaring trait.
    pub declaring: String,
    /// Takes a `self` receiver.
    pub receiver: bool,
    pub params: Vec<ParamDecl>,
    /// Resolved return type, `None` for unit.
    pub output: Option<Type>,
    /// Has a default body.
    pub has_default: bool,
    pub annotations: Vec<Annotation>,
    /// Method attributes as written.
    pub attrs: Vec<Attribute>,
    /// Resolved signature without parameter attributes.
    pub sig: Signature,
}

impl MethodDecl {
    /// Lookup key of the method, `name(T1,T2)`.
    pub fn id(&self) -> String {
        let params = self
            .params
            .iter()
            .map(|p| type_text(&p.ty))
            .collect::<Vec<_>>()
            .join(",");
        format!("{}({params})", self.name)
    }

    /// Qualified signature used in diagnostics.
    pub fn qualified(&self) -> String {
        format!("{}::{}", self.declaring, self.id())
    }

    /// First annotation named `name`.
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.is(name))
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotation(name).is_some()
    }

    /// First parameter carrying `name`.
    pub fn param_with(&self, name: &str) -> Option<&ParamDecl> {
        self.params.iter().find(|p| p.annotation(name).is_some())
    }
}

/// A method parameter.
#[derive(Debug, Clone)]
pub struct ParamDecl {
    /// Position, receiver excluded.
    pub position: usize,
    /// Binding name, `argN` for patterns.
    pub name: String,
    /// Resolved type.
    pub ty: Type,
    pub annotations: Vec<Annotation>,
}

impl ParamDecl {
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.is(name))
    }
}

/// A struct field.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    pub ty: Type,
    pub annotations: Vec<Annotation>,
}

impl FieldDecl {
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.is(name))
    }
}

/// One indexed source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Module path of the file.
    pub module: String,
    /// File path, or a label for in-memory sources.
    pub path: String,
    pub text: String,
}

/// The indexed crate.
#[derive(Debug, Default)]
pub struct TypeIndex {
    types: BTreeMap<String, TypeDecl>,
    sources: Vec<SourceFile>,
}

impl TypeIndex {
    /// Start indexing.
    pub fn builder() -> IndexBuilder {
        IndexBuilder::default()
    }

    /// A type by qualified name.
    pub fn get(&self, name: &str) -> Option<&TypeDecl> {
        self.types.get(name)
    }

    /// All types, ordered by name.
    pub fn types(&self) -> impl Iterator<Item = &TypeDecl> {
        self.types.values()
    }

    /// All indexed files.
    pub fn sources(&self) -> &[SourceFile] {
        &self.sources
    }

    /// Types carrying `annotation`.
    pub fn annotated_types<'a>(&'a self, annotation: &'a str) -> impl Iterator<Item = &'a TypeDecl> {
        self.types().filter(move |t| t.has_annotation(annotation))
    }

    /// Methods carrying `annotation`, with their declaring type.
    pub fn annotated_methods<'a>(
        &'a self,
        annotation: &'a str,
    ) -> impl Iterator<Item = (&'a TypeDecl, &'a MethodDecl)> {
        self.types().flat_map(move |t| {
            t.methods
                .iter()
                .filter(move |m| m.has_annotation(annotation))
                .map(move |m| (t, m))
        })
    }

    /// Fields carrying `annotation`, with their declaring type.
    pub fn annotated_fields<'a>(
        &'a self,
        annotation: &'a str,
    ) -> impl Iterator<Item = (&'a TypeDecl, &'a FieldDecl)> {
        self.types().flat_map(move |t| {
            t.fields
                .iter()
                .filter(move |f| f.annotation(annotation).is_some())
                .map(move |f| (t, f))
        })
    }

    /// Transitive supertraits of `name` present in the index, nearest first.
    pub fn all_supertraits(&self, name: &str) -> Vec<&TypeDecl> {
        let mut seen = BTreeSet::from([name.to_owned()]);
        let mut queue = VecDeque::from([name.to_owned()]);
        let mut found = Vec::new();
        while let Some(next) = queue.pop_front() {
            let Some(decl) = self.get(&next) else {
                continue;
            };
            for parent in &decl.supertraits {
                if !seen.insert(parent.clone()) {
                    continue;
                }
                if let Some(parent_decl) = self.get(parent) {
                    found.push(parent_decl);
                    queue.push_back(parent.clone());
                }
            }
        }
        found
    }

    /// Files referring to `ident`.
    pub fn known_users<'a>(&'a self, ident: &'a str) -> impl Iterator<Item = &'a SourceFile> {
        self.sources.iter().filter(move |s| s.text.contains(ident))
    }
}

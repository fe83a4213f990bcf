//! Name resolution of type paths against a module's items and imports.

use proc_macro2::Span;
use quote::ToTokens;
use std::collections::BTreeMap;
use syn::{
    Ident, Path, PathArguments, PathSegment, Signature, TraitBound, Type, TypePath, UseTree,
    punctuated::Punctuated,
    visit_mut::{self, VisitMut},
};

/// Names visible in one module, mapped to absolute paths.
#[derive(Debug, Clone)]
pub struct Resolver {
    module: Vec<String>,
    names: BTreeMap<String, Vec<String>>,
}

impl Resolver {
    /// An empty scope for `module`, e.g. `crate::a::b`.
    pub fn new(module: &str) -> Self {
        Self {
            module: module.split("::").map(str::to_owned).collect(),
            names: BTreeMap::new(),
        }
    }

    /// The module path.
    pub fn module(&self) -> String {
        self.module.join("::")
    }

    /// A scope for the inline child module `name`, inheriting nothing.
    pub fn child(&self, name: &str) -> Self {
        Self::new(&format!("{}::{name}", self.module()))
    }

    /// Declare an item of this module.
    pub fn declare(&mut self, ident: &str) {
        let mut path = self.module.clone();
        path.push(ident.to_owned());
        self.names.insert(ident.to_owned(), path);
    }

    /// Bring the names of a `use` tree into scope. Globs are ignored.
    pub fn import(&mut self, tree: &UseTree) {
        self.import_with(Vec::new(), tree);
    }

    fn import_with(&mut self, mut prefix: Vec<String>, tree: &UseTree) {
        match tree {
            UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.import_with(prefix, &path.tree);
            }
            UseTree::Name(name) => {
                let ident = name.ident.to_string();
                if ident == "self" {
                    if let Some(last) = prefix.last().cloned() {
                        let path = self.absolute(prefix);
                        self.names.insert(last, path);
                    }
                } else {
                    prefix.push(ident.clone());
                    let path = self.absolute(prefix);
                    self.names.insert(ident, path);
                }
            }
            UseTree::Rename(rename) => {
                let ident = rename.ident.to_string();
                if ident != "self" {
                    prefix.push(ident);
                }
                let path = self.absolute(prefix);
                self.names.insert(rename.rename.to_string(), path);
            }
            UseTree::Glob(_) => {}
            UseTree::Group(group) => {
                for item in &group.items {
                    self.import_with(prefix.clone(), item);
                }
            }
        }
    }

    /// Anchor a relative path at the crate root or an extern crate.
    fn absolute(&self, segments: Vec<String>) -> Vec<String> {
        let Some(first) = segments.first() else {
            return segments;
        };
        match first.as_str() {
            "crate" => segments,
            "self" => {
                let mut path = self.module.clone();
                path.extend(segments.into_iter().skip(1));
                path
            }
            "super" => {
                let mut path = self.module.clone();
                let mut rest = segments.into_iter().peekable();
                while rest.peek().is_some_and(|s| s == "super") {
                    rest.next();
                    if path.len() > 1 {
                        path.pop();
                    }
                }
                path.extend(rest);
                path
            }
            local => match self.names.get(local) {
                Some(base) if base.len() > 1 || segments.len() > 1 => {
                    let mut path = base.clone();
                    path.extend(segments.into_iter().skip(1));
                    path
                }
                _ => segments,
            },
        }
    }

    /// Rewrite `path` so it names the same item from any module of the crate.
    pub fn resolve_path(&self, path: &Path) -> Path {
        if path.leading_colon.is_some() {
            return path.clone();
        }
        let Some(first) = path.segments.first() else {
            return path.clone();
        };
        let head = first.ident.to_string();
        let base = match head.as_str() {
            "crate" | "Self" => return path.clone(),
            "self" | "super" => {
                let mut leading = Vec::new();
                for segment in &path.segments {
                    let ident = segment.ident.to_string();
                    if ident != "self" && ident != "super" {
                        break;
                    }
                    leading.push(ident);
                }
                let consumed = leading.len();
                let anchored = self.absolute(leading);
                return rebuild(anchored, None, path.segments.iter().skip(consumed));
            }
            _ => match self.names.get(&head) {
                Some(base) => base.clone(),
                None => return path.clone(),
            },
        };
        rebuild(base, Some(first.arguments.clone()), path.segments.iter().skip(1))
    }

    /// Resolve every type path inside `ty`.
    pub fn resolve_type(&self, ty: &Type) -> Type {
        let mut ty = ty.clone();
        PathRewriter(self).visit_type_mut(&mut ty);
        ty
    }

    /// Resolve every type path inside a signature.
    pub fn resolve_signature(&self, sig: &Signature) -> Signature {
        let mut sig = sig.clone();
        PathRewriter(self).visit_signature_mut(&mut sig);
        sig
    }
}

fn rebuild<'a>(
    base: Vec<String>,
    arguments: Option<PathArguments>,
    rest: impl Iterator<Item = &'a PathSegment>,
) -> Path {
    let mut segments: Punctuated<PathSegment, syn::Token![::]> = base
        .iter()
        .map(|s| PathSegment::from(ident(s)))
        .collect();
    if let (Some(arguments), Some(last)) = (arguments, segments.last_mut()) {
        last.arguments = arguments;
    }
    segments.extend(rest.cloned());
    Path {
        leading_colon: None,
        segments,
    }
}

/// An identifier from its source text, raw identifiers included.
pub fn ident(text: &str) -> Ident {
    match text.strip_prefix("r#") {
        Some(raw) => Ident::new_raw(raw, Span::call_site()),
        None => Ident::new(text, Span::call_site()),
    }
}

struct PathRewriter<'a>(&'a Resolver);

impl VisitMut for PathRewriter<'_> {
    fn visit_type_path_mut(&mut self, node: &mut TypePath) {
        if node.qself.is_none() {
            node.path = self.0.resolve_path(&node.path);
        }
        visit_mut::visit_type_path_mut(self, node);
    }

    fn visit_trait_bound_mut(&mut self, node: &mut TraitBound) {
        node.path = self.0.resolve_path(&node.path);
        visit_mut::visit_trait_bound_mut(self, node);
    }
}

/// Compact source text of a type or path: `Vec<String>`, `&'a mut str`.
pub fn type_text(tokens: &impl ToTokens) -> String {
    let raw = tokens.to_token_stream().to_string();
    let chars = raw.chars().collect::<Vec<_>>();
    let mut out = String::with_capacity(raw.len());
    for (i, c) in chars.iter().enumerate() {
        if *c == ' ' {
            let before = out.chars().last();
            let after = chars.get(i + 1);
            if before.is_some_and(is_word) && after.is_some_and(|c| is_word(*c)) {
                out.push(' ');
            }
            continue;
        }
        out.push(*c);
    }
    out
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

//! Building the index from Rust sources.

use super::{
    Annotation, FieldDecl, MethodDecl, ParamDecl, Resolver, SourceFile, TypeDecl, TypeIndex,
    TypeKind, path_text,
};
use crate::{Error, Result};
use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};
use syn::{
    Attribute, Fields, FnArg, ImplItem, Item, ItemEnum, ItemImpl, ItemStruct, ItemTrait, Pat,
    ReturnType, Token, TraitItem, TraitItemFn, Type, TypeParamBound, punctuated::Punctuated,
};
use walkdir::WalkDir;

/// Collects sources, then parses them into a [`TypeIndex`].
#[derive(Debug, Default)]
pub struct IndexBuilder {
    files: Vec<SourceFile>,
}

impl IndexBuilder {
    /// Add an in-memory source for `module`.
    pub fn source(mut self, module: &str, text: impl Into<String>) -> Self {
        self.files.push(SourceFile {
            module: module.to_owned(),
            path: format!("<{module}>"),
            text: text.into(),
        });
        self
    }

    /// Add every `.rs` file under a crate's `src` directory.
    pub fn dir(mut self, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                Error::io(path, e.into())
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "rs") {
                continue;
            }
            let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
            let Some(module) = module_of(root, path) else {
                tracing::debug!("no module path for '{}'", path.display());
                continue;
            };
            self.files.push(SourceFile {
                module,
                path: path.display().to_string(),
                text,
            });
        }
        Ok(self)
    }

    /// Parse all sources. Files that do not parse are skipped with a warning.
    pub fn build(self) -> TypeIndex {
        let mut collector = Collector::default();
        for file in &self.files {
            match syn::parse_file(&file.text) {
                Ok(ast) => collector.items(&file.path, Resolver::new(&file.module), &ast.items),
                Err(e) => tracing::warn!("skipping '{}' while indexing: {e}", file.path),
            }
        }

        let mut types = BTreeMap::new();
        for mut decl in collector.types {
            if collector.no_arg.contains(&decl.name) {
                decl.no_arg_constructor = true;
            }
            if types.contains_key(&decl.name) {
                tracing::warn!("'{}' declared more than once, keeping the first", decl.name);
                continue;
            }
            types.insert(decl.name.clone(), decl);
        }
        tracing::debug!("indexed {} types from {} files", types.len(), self.files.len());
        TypeIndex {
            types,
            sources: self.files,
        }
    }
}

/// Module path of a file below a `src` root.
fn module_of(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?.with_extension("");
    let mut segments = relative
        .components()
        .map(|c| c.as_os_str().to_str().map(str::to_owned))
        .collect::<Option<Vec<_>>>()?;
    if segments.first().is_some_and(|s| s == "bin") {
        // each binary is its own crate root
        segments.drain(..segments.len().min(2));
    }
    if segments.last().is_some_and(|s| s == "mod") {
        segments.pop();
    }
    if segments.len() == 1 && (segments[0] == "lib" || segments[0] == "main") {
        segments.clear();
    }
    let mut module = String::from("crate");
    for segment in segments {
        module.push_str("::");
        module.push_str(&segment);
    }
    Some(module)
}

#[derive(Default)]
struct Collector {
    types: Vec<TypeDecl>,
    no_arg: BTreeSet<String>,
}

impl Collector {
    fn items(&mut self, file: &str, mut resolver: Resolver, items: &[Item]) {
        for item in items {
            let ident = match item {
                Item::Struct(s) => &s.ident,
                Item::Enum(e) => &e.ident,
                Item::Trait(t) => &t.ident,
                Item::Type(t) => &t.ident,
                Item::Union(u) => &u.ident,
                Item::Mod(m) => &m.ident,
                Item::TraitAlias(t) => &t.ident,
                _ => continue,
            };
            resolver.declare(&ident.to_string());
        }
        for item in items {
            if let Item::Use(use_item) = item {
                resolver.import(&use_item.tree);
            }
        }

        for item in items {
            match item {
                Item::Trait(item) => self.types.push(trait_decl(file, &resolver, item)),
                Item::Struct(item) => self.types.push(struct_decl(file, &resolver, item)),
                Item::Enum(item) => self.types.push(enum_decl(file, &resolver, item)),
                Item::Impl(item) => self.constructor(&resolver, item),
                Item::Mod(item) => {
                    if let Some((_, content)) = &item.content {
                        let child = resolver.child(&item.ident.to_string());
                        self.items(file, child, content);
                    }
                }
                _ => {}
            }
        }
    }

    /// Record `impl Default for T` and inherent `fn new() -> Self`.
    fn constructor(&mut self, resolver: &Resolver, item: &ItemImpl) {
        let Type::Path(self_ty) = &*item.self_ty else {
            return;
        };
        let name = path_text(&resolver.resolve_path(&self_ty.path));
        let no_arg = match &item.trait_ {
            Some((_, path, _)) => path.segments.last().is_some_and(|s| s.ident == "Default"),
            None => item.items.iter().any(|item| {
                let ImplItem::Fn(f) = item else {
                    return false;
                };
                f.sig.ident == "new"
                    && f.sig.inputs.is_empty()
                    && f.sig.generics.params.is_empty()
                    && returns_self(&f.sig.output, &self_ty.path)
            }),
        };
        if no_arg {
            self.no_arg.insert(name);
        }
    }
}

fn returns_self(output: &ReturnType, self_path: &syn::Path) -> bool {
    let ReturnType::Type(_, ty) = output else {
        return false;
    };
    let Type::Path(ty) = &**ty else {
        return false;
    };
    ty.path.is_ident("Self") || path_text(&ty.path) == path_text(self_path)
}

fn annotations(attrs: &[Attribute], resolver: &Resolver) -> Vec<Annotation> {
    attrs
        .iter()
        .filter(|a| !a.path().is_ident("doc"))
        .map(|a| Annotation::parse(a, resolver))
        .collect()
}

fn derives_default(attrs: &[Attribute]) -> bool {
    attrs.iter().filter(|a| a.path().is_ident("derive")).any(|a| {
        a.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated)
            .is_ok_and(|paths| {
                paths
                    .iter()
                    .any(|p| p.segments.last().is_some_and(|s| s.ident == "Default"))
            })
    })
}

fn decl(file: &str, resolver: &Resolver, ident: &syn::Ident, kind: TypeKind) -> TypeDecl {
    let module = resolver.module();
    TypeDecl {
        name: format!("{module}::{ident}"),
        module,
        ident: ident.to_string(),
        kind,
        annotations: Vec::new(),
        supertraits: Vec::new(),
        generic: false,
        methods: Vec::new(),
        fields: Vec::new(),
        variants: Vec::new(),
        no_arg_constructor: false,
        file: file.to_owned(),
    }
}

fn trait_decl(file: &str, resolver: &Resolver, item: &ItemTrait) -> TypeDecl {
    let mut decl = decl(file, resolver, &item.ident, TypeKind::Trait);
    decl.annotations = annotations(&item.attrs, resolver);
    decl.generic = !item.generics.params.is_empty();
    decl.supertraits = item
        .supertraits
        .iter()
        .filter_map(|bound| match bound {
            TypeParamBound::Trait(bound) => Some(path_text(&resolver.resolve_path(&bound.path))),
            _ => None,
        })
        .collect();
    decl.methods = item
        .items
        .iter()
        .filter_map(|item| match item {
            TraitItem::Fn(method) => Some(method_decl(&decl.name, resolver, method)),
            _ => None,
        })
        .collect();
    decl
}

fn method_decl(declaring: &str, resolver: &Resolver, item: &TraitItemFn) -> MethodDecl {
    let mut sig = resolver.resolve_signature(&item.sig);
    let params = item
        .sig
        .inputs
        .iter()
        .zip(sig.inputs.iter())
        .filter_map(|pair| match pair {
            (FnArg::Typed(declared), FnArg::Typed(resolved)) => Some((declared, resolved)),
            _ => None,
        })
        .enumerate()
        .map(|(position, (declared, resolved))| ParamDecl {
            position,
            name: match &*declared.pat {
                Pat::Ident(pat) => pat.ident.to_string(),
                _ => format!("arg{position}"),
            },
            ty: (*resolved.ty).clone(),
            annotations: annotations(&declared.attrs, resolver),
        })
        .collect();
    for input in sig.inputs.iter_mut() {
        match input {
            FnArg::Receiver(receiver) => receiver.attrs.clear(),
            FnArg::Typed(typed) => typed.attrs.clear(),
        }
    }
    let output = match &sig.output {
        ReturnType::Type(_, ty) if !matches!(&**ty, Type::Tuple(t) if t.elems.is_empty()) => {
            Some((**ty).clone())
        }
        _ => None,
    };

    MethodDecl {
        name: item.sig.ident.to_string(),
        declaring: declaring.to_owned(),
        receiver: item.sig.receiver().is_some(),
        params,
        output,
        has_default: item.default.is_some(),
        annotations: annotations(&item.attrs, resolver),
        attrs: item.attrs.clone(),
        sig,
    }
}

fn struct_decl(file: &str, resolver: &Resolver, item: &ItemStruct) -> TypeDecl {
    let mut decl = decl(file, resolver, &item.ident, TypeKind::Struct);
    decl.annotations = annotations(&item.attrs, resolver);
    decl.generic = !item.generics.params.is_empty();
    decl.no_arg_constructor = matches!(item.fields, Fields::Unit) || derives_default(&item.attrs);
    decl.fields = item
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| FieldDecl {
            name: field
                .ident
                .as_ref()
                .map_or_else(|| i.to_string(), ToString::to_string),
            ty: resolver.resolve_type(&field.ty),
            annotations: annotations(&field.attrs, resolver),
        })
        .collect();
    decl
}

fn enum_decl(file: &str, resolver: &Resolver, item: &ItemEnum) -> TypeDecl {
    let mut decl = decl(file, resolver, &item.ident, TypeKind::Enum);
    decl.annotations = annotations(&item.attrs, resolver);
    decl.generic = !item.generics.params.is_empty();
    decl.no_arg_constructor = derives_default(&item.attrs);
    decl.variants = item.variants.iter().map(|v| v.ident.to_string()).collect();
    decl
}

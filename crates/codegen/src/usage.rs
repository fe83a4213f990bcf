//! Discovery of services by their creation sites.
//!
//! Every function body of every file referring to the service factory is
//! walked. A creation site is `AiServices::builder::<dyn T>()`,
//! `AiServices::<dyn T>::builder()` or `AiServices::create::<dyn T>(..)`. The
//! builder is followed through method chains and `let` bindings of the same
//! body to learn whether a chat memory provider was configured.

use crate::{
    CodegenConfig,
    index::{Resolver, SourceFile, TypeIndex, path_text},
    names,
};
use std::collections::{BTreeMap, HashMap};
use syn::{
    Expr, ExprCall, GenericArgument, ImplItemFn, Item, ItemFn, Local, Pat, PathArguments,
    TraitItemFn, Type, TypeParamBound,
    visit::{self, Visit},
};

/// One analyzed creation site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageEntry {
    /// Qualified name of the created service.
    pub service: String,
    /// Whether a chat memory provider was configured at the site.
    pub chat_memory_provider_used: bool,
    /// `file:function` of the site.
    pub site: String,
}

/// All creation sites of a crate.
#[derive(Debug, Clone, Default)]
pub struct UsageReport {
    pub entries: Vec<UsageEntry>,
}

impl UsageReport {
    /// Service name to whether any of its sites configured a memory provider.
    pub fn services(&self) -> BTreeMap<String, bool> {
        let mut services = BTreeMap::new();
        for entry in &self.entries {
            let used = services.entry(entry.service.clone()).or_insert(false);
            *used |= entry.chat_memory_provider_used;
        }
        services
    }
}

/// Analyze every known user of the service factory.
pub fn analyze(index: &TypeIndex, config: &CodegenConfig) -> UsageReport {
    let mut report = UsageReport::default();
    for file in index.known_users(names::AI_SERVICES) {
        if config.is_framework(&file.module) {
            continue;
        }
        report.entries.extend(analyze_file(file));
    }
    report
}

/// Analyze one file. A file that does not parse yields no sites.
pub fn analyze_file(file: &SourceFile) -> Vec<UsageEntry> {
    let ast = match syn::parse_file(&file.text) {
        Ok(ast) => ast,
        Err(e) => {
            tracing::debug!("unable to analyze '{}': {e}", file.path);
            return Vec::new();
        }
    };
    let mut walker = FileWalker {
        file: &file.path,
        resolver: Resolver::new(&file.module),
        entries: Vec::new(),
    };
    walker.items(&ast.items);
    walker.entries
}

struct FileWalker<'a> {
    file: &'a str,
    resolver: Resolver,
    entries: Vec<UsageEntry>,
}

impl FileWalker<'_> {
    fn items(&mut self, items: &[Item]) {
        for item in items {
            match item {
                Item::Struct(s) => self.resolver.declare(&s.ident.to_string()),
                Item::Enum(e) => self.resolver.declare(&e.ident.to_string()),
                Item::Trait(t) => self.resolver.declare(&t.ident.to_string()),
                Item::Type(t) => self.resolver.declare(&t.ident.to_string()),
                Item::Mod(m) => self.resolver.declare(&m.ident.to_string()),
                Item::Use(u) => self.resolver.import(&u.tree),
                _ => {}
            }
        }
        for item in items {
            match item {
                Item::Fn(f) => self.function(&f.sig.ident.to_string(), f),
                Item::Impl(i) => {
                    for item in &i.items {
                        if let syn::ImplItem::Fn(f) = item {
                            self.method(f);
                        }
                    }
                }
                Item::Trait(t) => {
                    for item in &t.items {
                        if let syn::TraitItem::Fn(f) = item {
                            self.trait_method(f);
                        }
                    }
                }
                Item::Mod(m) => {
                    if let Some((_, content)) = &m.content {
                        let child = self.resolver.child(&m.ident.to_string());
                        let parent = std::mem::replace(&mut self.resolver, child);
                        self.items(content);
                        self.resolver = parent;
                    }
                }
                _ => {}
            }
        }
    }

    fn function(&mut self, name: &str, item: &ItemFn) {
        let mut body = BodyAnalyzer::new(&self.resolver);
        body.visit_block(&item.block);
        let BodyAnalyzer { sites, failures, .. } = body;
        self.collect(name, sites, failures);
    }

    fn method(&mut self, item: &ImplItemFn) {
        let mut body = BodyAnalyzer::new(&self.resolver);
        body.visit_block(&item.block);
        let BodyAnalyzer { sites, failures, .. } = body;
        self.collect(&item.sig.ident.to_string(), sites, failures);
    }

    fn trait_method(&mut self, item: &TraitItemFn) {
        let Some(block) = &item.default else {
            return;
        };
        let mut body = BodyAnalyzer::new(&self.resolver);
        body.visit_block(block);
        let BodyAnalyzer { sites, failures, .. } = body;
        self.collect(&item.sig.ident.to_string(), sites, failures);
    }

    fn collect(&mut self, function: &str, sites: Vec<Site>, failures: usize) {
        let site = format!("{}:{function}", self.file);
        if failures > 0 {
            tracing::debug!(
                "unable to analyze {} creation site(s) in '{site}': service type not given as generic argument",
                failures
            );
        }
        for found in sites {
            self.entries.push(UsageEntry {
                service: found.service,
                chat_memory_provider_used: found.chat_memory_provider_used,
                site: site.clone(),
            });
        }
    }
}

struct Site {
    service: String,
    chat_memory_provider_used: bool,
}

/// Data flow over one function body.
struct BodyAnalyzer<'a> {
    resolver: &'a Resolver,
    sites: Vec<Site>,
    calls: HashMap<*const ExprCall, usize>,
    bindings: HashMap<String, usize>,
    failures: usize,
}

impl<'a> BodyAnalyzer<'a> {
    fn new(resolver: &'a Resolver) -> Self {
        Self {
            resolver,
            sites: Vec::new(),
            calls: HashMap::new(),
            bindings: HashMap::new(),
            failures: 0,
        }
    }

    /// The creation site a builder expression evaluates to.
    fn origin(&self, expr: &Expr) -> Option<usize> {
        match expr {
            Expr::Call(call) => self.calls.get(&std::ptr::from_ref(call)).copied(),
            Expr::MethodCall(call) => self.origin(&call.receiver),
            Expr::Path(path) => path
                .path
                .get_ident()
                .and_then(|ident| self.bindings.get(&ident.to_string()))
                .copied(),
            Expr::Paren(inner) => self.origin(&inner.expr),
            Expr::Group(inner) => self.origin(&inner.expr),
            Expr::Reference(inner) => self.origin(&inner.expr),
            Expr::Try(inner) => self.origin(&inner.expr),
            Expr::Await(inner) => self.origin(&inner.base),
            _ => None,
        }
    }

    /// The service type of a factory call, if `call` is one.
    ///
    /// `Some(None)` means a factory call whose service type is unknown.
    fn factory_call(&self, call: &ExprCall) -> Option<Option<String>> {
        let Expr::Path(func) = &*call.func else {
            return None;
        };
        let segments = func.path.segments.iter().collect::<Vec<_>>();
        let [.., factory, method] = segments.as_slice() else {
            return None;
        };
        if factory.ident != names::AI_SERVICES
            || !names::FACTORY_METHODS.iter().any(|m| method.ident == *m)
        {
            return None;
        }
        let service = generic_type(&method.arguments)
            .or_else(|| generic_type(&factory.arguments))
            .and_then(|ty| self.service_name(ty));
        Some(service)
    }

    fn service_name(&self, ty: &Type) -> Option<String> {
        match ty {
            Type::TraitObject(object) => object.bounds.iter().find_map(|bound| match bound {
                TypeParamBound::Trait(bound) => {
                    Some(path_text(&self.resolver.resolve_path(&bound.path)))
                }
                _ => None,
            }),
            Type::Path(path) if path.qself.is_none() => {
                Some(path_text(&self.resolver.resolve_path(&path.path)))
            }
            Type::Paren(inner) => self.service_name(&inner.elem),
            Type::Group(inner) => self.service_name(&inner.elem),
            _ => None,
        }
    }
}

fn generic_type(arguments: &PathArguments) -> Option<&Type> {
    let PathArguments::AngleBracketed(args) = arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}

impl<'ast> Visit<'ast> for BodyAnalyzer<'_> {
    fn visit_expr_call(&mut self, node: &'ast ExprCall) {
        visit::visit_expr_call(self, node);
        match self.factory_call(node) {
            Some(Some(service)) => {
                self.calls.insert(std::ptr::from_ref(node), self.sites.len());
                self.sites.push(Site {
                    service,
                    chat_memory_provider_used: false,
                });
            }
            Some(None) => self.failures += 1,
            None => {}
        }
    }

    fn visit_expr_method_call(&mut self, node: &'ast syn::ExprMethodCall) {
        visit::visit_expr_method_call(self, node);
        if node.method != names::CHAT_MEMORY_PROVIDER_METHOD {
            return;
        }
        if let Some(site) = self.origin(&node.receiver) {
            self.sites[site].chat_memory_provider_used = true;
        }
    }

    fn visit_local(&mut self, node: &'ast Local) {
        visit::visit_local(self, node);
        let Some(init) = &node.init else {
            return;
        };
        let pat = match &node.pat {
            Pat::Type(typed) => &*typed.pat,
            other => other,
        };
        let Pat::Ident(binding) = pat else {
            return;
        };
        match self.origin(&init.expr) {
            Some(site) => {
                self.bindings.insert(binding.ident.to_string(), site);
            }
            None => {
                self.bindings.remove(&binding.ident.to_string());
            }
        }
    }

    fn visit_expr_assign(&mut self, node: &'ast syn::ExprAssign) {
        visit::visit_expr_assign(self, node);
        let Expr::Path(left) = &*node.left else {
            return;
        };
        let Some(ident) = left.path.get_ident() else {
            return;
        };
        if let Some(site) = self.origin(&node.right) {
            self.bindings.insert(ident.to_string(), site);
        }
    }

    // nested items are analyzed on their own
    fn visit_item(&mut self, _: &'ast Item) {}
}

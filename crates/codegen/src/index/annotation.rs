//! Literal values of attributes.

use super::resolve::Resolver;
use quote::ToTokens;
use std::collections::BTreeMap;
use syn::{Attribute, Expr, ExprLit, Lit, Meta, Token, UnOp, punctuated::Punctuated};

/// Key positional arguments are stored under.
pub const VALUE: &str = "value";

/// An attribute read as a set of literal values.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Attribute path, `::` separated.
    pub name: String,
    /// Named arguments, positional ones under [`VALUE`].
    pub values: BTreeMap<String, AnnotationValue>,
}

/// One attribute argument.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    /// A type path, resolved against the declaring module.
    Class(String),
    Array(Vec<AnnotationValue>),
    Nested(Annotation),
    /// Anything else, as token text.
    Other(String),
}

impl Annotation {
    /// Read an attribute. Arguments that are not literals are kept as token text.
    pub fn parse(attr: &Attribute, resolver: &Resolver) -> Self {
        let name = path_text(attr.path());
        let mut values = BTreeMap::new();
        match &attr.meta {
            Meta::Path(_) => {}
            Meta::NameValue(nv) => {
                values.insert(VALUE.to_owned(), AnnotationValue::from_expr(&nv.value, resolver));
            }
            Meta::List(list) => {
                let parsed =
                    list.parse_args_with(Punctuated::<Expr, Token![,]>::parse_terminated);
                match parsed {
                    Ok(args) => {
                        let mut positional = Vec::new();
                        for arg in args {
                            match arg {
                                Expr::Assign(assign) => {
                                    let key = assign.left.to_token_stream().to_string();
                                    values.insert(
                                        key,
                                        AnnotationValue::from_expr(&assign.right, resolver),
                                    );
                                }
                                other => positional.push(AnnotationValue::from_expr(&other, resolver)),
                            }
                        }
                        match positional.len() {
                            0 => {}
                            1 => {
                                values.insert(VALUE.to_owned(), positional.remove(0));
                            }
                            _ => {
                                values.insert(VALUE.to_owned(), AnnotationValue::Array(positional));
                            }
                        }
                    }
                    Err(e) => {
                        tracing::debug!("attribute '{name}' has non-literal arguments: {e}");
                        values.insert(
                            VALUE.to_owned(),
                            AnnotationValue::Other(list.tokens.to_string()),
                        );
                    }
                }
            }
        }
        Self { name, values }
    }

    /// Whether this annotation is `name`, qualified or not.
    pub fn is(&self, name: &str) -> bool {
        self.name == name || crate::names::simple_name(&self.name) == name
    }

    /// A named argument.
    pub fn value(&self, key: &str) -> Option<&AnnotationValue> {
        self.values.get(key)
    }

    /// The positional argument.
    pub fn positional(&self) -> Option<&AnnotationValue> {
        self.values.get(VALUE)
    }

    /// A named string argument.
    pub fn string(&self, key: &str) -> Option<&str> {
        self.value(key)?.as_str()
    }

    /// Whether a flag is set, either as `flag = true` or as a bare `flag`.
    pub fn flag(&self, key: &str) -> bool {
        if let Some(value) = self.value(key) {
            return value.as_bool().unwrap_or(false);
        }
        self.positional().is_some_and(|value| {
            value
                .elements()
                .iter()
                .any(|v| matches!(v, AnnotationValue::Class(path) if crate::names::simple_name(path) == key))
        })
    }
}

impl AnnotationValue {
    fn from_expr(expr: &Expr, resolver: &Resolver) -> Self {
        match expr {
            Expr::Lit(ExprLit { lit, .. }) => match lit {
                Lit::Str(s) => Self::Str(s.value()),
                Lit::Bool(b) => Self::Bool(b.value),
                Lit::Int(i) => i
                    .base10_parse()
                    .map(Self::Int)
                    .unwrap_or_else(|_| Self::Other(i.to_string())),
                Lit::Float(f) => f
                    .base10_parse()
                    .map(Self::Float)
                    .unwrap_or_else(|_| Self::Other(f.to_string())),
                other => Self::Other(other.to_token_stream().to_string()),
            },
            Expr::Unary(unary) if matches!(unary.op, UnOp::Neg(_)) => {
                match Self::from_expr(&unary.expr, resolver) {
                    Self::Int(i) => Self::Int(-i),
                    Self::Float(f) => Self::Float(-f),
                    _ => Self::Other(expr.to_token_stream().to_string()),
                }
            }
            Expr::Array(array) => Self::Array(
                array
                    .elems
                    .iter()
                    .map(|e| Self::from_expr(e, resolver))
                    .collect(),
            ),
            Expr::Path(path) if path.qself.is_none() => {
                Self::Class(path_text(&resolver.resolve_path(&path.path)))
            }
            Expr::Call(call) => {
                let Expr::Path(func) = &*call.func else {
                    return Self::Other(expr.to_token_stream().to_string());
                };
                let mut values = BTreeMap::new();
                let mut positional = Vec::new();
                for arg in &call.args {
                    match arg {
                        Expr::Assign(assign) => {
                            values.insert(
                                assign.left.to_token_stream().to_string(),
                                Self::from_expr(&assign.right, resolver),
                            );
                        }
                        other => positional.push(Self::from_expr(other, resolver)),
                    }
                }
                if !positional.is_empty() {
                    values.insert(VALUE.to_owned(), Self::Array(positional));
                }
                Self::Nested(Annotation {
                    name: path_text(&func.path),
                    values,
                })
            }
            Expr::Paren(paren) => Self::from_expr(&paren.expr, resolver),
            Expr::Group(group) => Self::from_expr(&group.expr, resolver),
            other => Self::Other(other.to_token_stream().to_string()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The type path of a class value.
    pub fn as_class(&self) -> Option<&str> {
        match self {
            Self::Class(path) => Some(path),
            _ => None,
        }
    }

    /// The value as a list; scalars are one-element lists.
    pub fn elements(&self) -> Vec<&AnnotationValue> {
        match self {
            Self::Array(items) => items.iter().collect(),
            other => vec![other],
        }
    }

    /// All string elements, in order.
    pub fn as_string_array(&self) -> Vec<String> {
        self.elements()
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_owned))
            .collect()
    }

    /// All class elements, in order.
    pub fn as_class_array(&self) -> Vec<String> {
        self.elements()
            .into_iter()
            .filter_map(|v| v.as_class().map(str::to_owned))
            .collect()
    }

    /// All numeric elements as floats, in order.
    pub fn as_f64_array(&self) -> Vec<f64> {
        self.elements()
            .into_iter()
            .filter_map(|v| match v {
                Self::Float(f) => Some(*f),
                Self::Int(i) => Some(*i as f64),
                _ => None,
            })
            .collect()
    }
}

/// `a::b::C` for a path, without generic arguments.
pub fn path_text(path: &syn::Path) -> String {
    let segments = path
        .segments
        .iter()
        .map(|s| s.ident.to_string())
        .collect::<Vec<_>>()
        .join("::");
    if path.leading_colon.is_some() {
        format!("::{segments}")
    } else {
        segments
    }
}

//! Structured output hints derived from return types.

use crate::index::{TypeDecl, TypeIndex, TypeKind, path_text, type_text};
use syn::{GenericArgument, PathArguments, Type};

const ANSWER_FORMAT: &str = "\nYou must answer strictly in the following format: ";
const JSON_FORMAT: &str = "\nYou must answer strictly in the following JSON format: ";
const ITEM_PER_LINE: &str = "\nYou must put every item on a separate line.";

const INTEGERS: &[&str] = &[
    "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize",
];

/// Instructions appended to the user message for a method returning `ty`.
///
/// Types that need no hint, or that cannot be interpreted, yield an empty
/// string.
pub fn format_instructions(ty: &Type, index: &TypeIndex) -> String {
    match format_of(ty, index) {
        Format::None => String::new(),
        Format::Lines => ITEM_PER_LINE.to_owned(),
        Format::Plain(format) => format!("{ANSWER_FORMAT}{format}"),
        Format::Json(structure) => format!("{JSON_FORMAT}{structure}"),
    }
}

enum Format {
    None,
    Lines,
    Plain(String),
    Json(String),
}

fn format_of(ty: &Type, index: &TypeIndex) -> Format {
    match ty {
        Type::Reference(reference) => format_of(&reference.elem, index),
        Type::Paren(inner) => format_of(&inner.elem, index),
        Type::Group(inner) => format_of(&inner.elem, index),
        Type::Slice(_) | Type::Array(_) => Format::Lines,
        Type::Tuple(tuple) if tuple.elems.is_empty() => Format::None,
        Type::Path(path) if path.qself.is_none() => {
            let Some(last) = path.path.segments.last() else {
                return Format::None;
            };
            let ident = last.ident.to_string();
            match ident.as_str() {
                "String" | "str" | "Cow" | "char" => Format::None,
                "bool" => Format::Plain("one of [true, false]".into()),
                "f32" | "f64" => Format::Plain("floating point number".into()),
                name if INTEGERS.contains(&name) || name.starts_with("NonZero") => {
                    Format::Plain("integer number".into())
                }
                "NaiveDate" => Format::Plain("yyyy-MM-dd".into()),
                "NaiveTime" => Format::Plain("HH:mm:ss".into()),
                "NaiveDateTime" | "DateTime" => Format::Plain("yyyy-MM-ddTHH:mm:ss".into()),
                "Vec" | "VecDeque" | "HashSet" | "BTreeSet" | "IndexSet" => Format::Lines,
                "Option" | "Result" | "Box" | "Arc" | "Rc" => match first_type(&last.arguments) {
                    Some(inner) => format_of(inner, index),
                    None => Format::None,
                },
                _ => match index.get(&path_text(&path.path)) {
                    Some(decl) if decl.kind == TypeKind::Enum => {
                        Format::Plain(format!("one of [{}]", decl.variants.join(", ")))
                    }
                    Some(decl) if decl.kind == TypeKind::Struct => {
                        Format::Json(json_structure(decl, index))
                    }
                    _ => {
                        tracing::debug!(
                            "no output format instructions for '{}'",
                            type_text(ty)
                        );
                        Format::None
                    }
                },
            }
        }
        other => {
            tracing::debug!("no output format instructions for '{}'", type_text(other));
            Format::None
        }
    }
}

fn first_type(arguments: &PathArguments) -> Option<&Type> {
    let PathArguments::AngleBracketed(args) = arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}

fn json_structure(decl: &TypeDecl, index: &TypeIndex) -> String {
    let fields = decl
        .fields
        .iter()
        .map(|field| {
            let json_type = json_type(&field.ty, index);
            match field
                .annotation(crate::names::DESCRIPTION)
                .and_then(|a| a.positional())
                .map(|v| v.as_string_array().join(" "))
            {
                Some(description) if !description.is_empty() => {
                    format!("\"{}\": ({description}; type: {json_type})", field.name)
                }
                _ => format!("\"{}\": (type: {json_type})", field.name),
            }
        })
        .collect::<Vec<_>>();
    format!("{{\n{}\n}}", fields.join(",\n"))
}

fn json_type(ty: &Type, index: &TypeIndex) -> String {
    match ty {
        Type::Reference(reference) => json_type(&reference.elem, index),
        Type::Slice(slice) => format!("array of {}", json_type(&slice.elem, index)),
        Type::Array(array) => format!("array of {}", json_type(&array.elem, index)),
        Type::Path(path) if path.qself.is_none() => {
            let Some(last) = path.path.segments.last() else {
                return "object".into();
            };
            let ident = last.ident.to_string();
            match ident.as_str() {
                "String" | "str" | "char" | "Cow" => "string".into(),
                "bool" => "boolean".into(),
                "f32" | "f64" => "number".into(),
                name if INTEGERS.contains(&name) => "integer".into(),
                "NaiveDate" => "date string (2023-12-31)".into(),
                "NaiveTime" => "time string (23:59:59)".into(),
                "NaiveDateTime" | "DateTime" => "date-time string (2023-12-31T23:59:59)".into(),
                "Vec" | "VecDeque" | "HashSet" | "BTreeSet" => match first_type(&last.arguments) {
                    Some(inner) => format!("array of {}", json_type(inner, index)),
                    None => "array".into(),
                },
                "Option" | "Box" | "Arc" | "Rc" => match first_type(&last.arguments) {
                    Some(inner) => json_type(inner, index),
                    None => "object".into(),
                },
                _ => match index.get(&path_text(&path.path)) {
                    Some(decl) if decl.kind == TypeKind::Enum => {
                        format!("enum, must be one of [{}]", decl.variants.join(", "))
                    }
                    _ => "object".into(),
                },
            }
        }
        _ => "object".into(),
    }
}

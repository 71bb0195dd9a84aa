//! Type helper utilities for syn type analysis.

/// Storage kind inferred from a field's declared type.
///
/// Mirrors `sqlext::FieldKind`; [`TypeKind::Uuid`] is emitted as
/// `Unsupported` but still gets a value accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Primitive,
    String,
    DateTime,
    Decimal,
    Uuid,
    Unsupported,
}

impl TypeKind {
    /// Variant name of `sqlext::FieldKind`.
    pub fn field_kind(self) -> &'static str {
        match self {
            Self::Primitive => "Primitive",
            Self::String => "String",
            Self::DateTime => "DateTime",
            Self::Decimal => "Decimal",
            Self::Uuid | Self::Unsupported => "Unsupported",
        }
    }

    /// Whether the type is known to implement `sqlext::ToValue`.
    pub fn has_value(self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

/// Extract the inner type T from Option<T>, or return None if not an Option type.
///
/// Recognizes `Option<T>`, `std::option::Option<T>`, and `core::option::Option<T>`.
pub fn option_inner(ty: &syn::Type) -> Option<&syn::Type> {
    let syn::Type::Path(type_path) = ty else {
        return None;
    };
    let seg = type_path.path.segments.last()?;
    if seg.ident != "Option" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &seg.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    let syn::GenericArgument::Type(inner) = args.args.first()? else {
        return None;
    };
    Some(inner)
}

/// Classify a field type, looking through `Option`, references and parentheses.
pub fn detect_kind(ty: &syn::Type) -> TypeKind {
    if let Some(inner) = option_inner(ty) {
        return detect_kind(inner);
    }

    let type_path = match ty {
        syn::Type::Reference(r) => return detect_kind(&r.elem),
        syn::Type::Paren(p) => return detect_kind(&p.elem),
        syn::Type::Group(g) => return detect_kind(&g.elem),
        syn::Type::Path(p) if p.qself.is_none() => p,
        _ => return TypeKind::Unsupported,
    };

    let Some(seg) = type_path.path.segments.last() else {
        return TypeKind::Unsupported;
    };

    match seg.ident.to_string().as_str() {
        "bool" | "i8" | "i16" | "i32" | "i64" | "isize" | "u8" | "u16" | "u32" | "u64"
        | "usize" | "f32" | "f64" | "char" => TypeKind::Primitive,
        "String" | "str" => TypeKind::String,
        "NaiveDateTime" | "NaiveDate" | "DateTime" => TypeKind::DateTime,
        "Decimal" => TypeKind::Decimal,
        "Uuid" => TypeKind::Uuid,
        _ => TypeKind::Unsupported,
    }
}

//! Build an [`InterfaceDescription`] from a Rust trait declaration.
//!
//! Doc comments become the comment block of a method; a method without doc
//! comments has no block and is therefore not exposed.

use quote::ToTokens;
use syn::{FnArg, Item, ItemTrait, Lit, Meta, Pat, TraitItem, Type};

use crate::Result;
use crate::error::CompileError;
use crate::interface::{CommentBlocks, InterfaceDescription, Method};

/// Reflect the trait named `trait_name` out of a Rust source file.
pub fn reflect_source(source: &str, trait_name: &str) -> Result<(InterfaceDescription, CommentBlocks)> {
    let file = syn::parse_file(source)?;

    for item in &file.items {
        if let Item::Trait(item_trait) = item
            && item_trait.ident == trait_name
        {
            return reflect_trait(item_trait);
        }
    }

    Err(CompileError::Reflect {
        message: format!("could not find trait {trait_name:?}"),
    })
}

/// Reflect the methods and doc comments of a trait.
pub fn reflect_trait(item: &ItemTrait) -> Result<(InterfaceDescription, CommentBlocks)> {
    let mut iface = InterfaceDescription::new(item.ident.to_string());
    let mut docs = CommentBlocks::new();

    for trait_item in &item.items {
        let TraitItem::Fn(func) = trait_item else {
            continue;
        };

        let mut method = Method::new(func.sig.ident.to_string());
        for arg in &func.sig.inputs {
            match arg {
                FnArg::Receiver(_) => continue, // skip self
                FnArg::Typed(pat_type) => {
                    let name = match pat_type.pat.as_ref() {
                        Pat::Ident(pat_ident) => pat_ident.ident.to_string(),
                        other => {
                            return Err(syn::Error::new_spanned(
                                other,
                                "unsupported parameter pattern\n\
                                 \n\
                                 kok requires simple parameter names.\n\
                                 Use: name: String\n\
                                 Not: (name, _): (String, i32) or &name: &String",
                            )
                            .into());
                        }
                    };
                    method = method.with_param(name, type_string(&pat_type.ty));
                }
            }
        }

        if let Some(lines) = extract_doc_lines(&func.attrs) {
            docs.insert(method.name.clone(), lines);
        }
        iface.methods.push(method);
    }

    Ok((iface, docs))
}

/// Doc comment lines of an item, `None` when it has none.
pub fn extract_doc_lines(attrs: &[syn::Attribute]) -> Option<Vec<String>> {
    let lines: Vec<String> = attrs
        .iter()
        .filter_map(|attr| {
            if attr.path().is_ident("doc")
                && let Meta::NameValue(meta) = &attr.meta
                && let syn::Expr::Lit(syn::ExprLit {
                    lit: Lit::Str(s), ..
                }) = &meta.value
            {
                return Some(s.value());
            }
            None
        })
        .flat_map(|doc| doc.lines().map(str::to_string).collect::<Vec<_>>())
        .collect();

    if lines.is_empty() { None } else { Some(lines) }
}

/// Render a type the way it is written in source, e.g. `Option<Vec<u8>>`.
pub fn type_string(ty: &Type) -> String {
    let raw = ty.to_token_stream().to_string();
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c == ' ' {
            let prev = out.chars().last();
            let next = chars.peek().copied();
            let glue_prev = matches!(prev, Some('<' | '&' | ':' | '(' | '['));
            let glue_next = matches!(next, Some('<' | '>' | ',' | ':' | ')' | ']'));
            // Spaces survive only after `,` and between words (`dyn Trait`).
            if (glue_prev || glue_next) && prev != Some(',') {
                continue;
            }
        }
        out.push(c);
    }
    out
}

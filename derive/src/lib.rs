// SPDX-License-Identifier: MIT

//! `#[derive(BinStruct)]` is the ambient convenience layer over
//! [`cstruct::StructBuilder`]: it lets a user declare a struct's compiled
//! layout through attributes and get typed, name-based accessor methods
//! bridging to a dynamically-typed [`cstruct::Instance`], without writing
//! the `StructBuilder` invocation by hand.
//!
//! Because field values are dynamically typed (see `cstruct::Value`), the
//! annotated item is a single-field tuple struct wrapping `cstruct::Instance`
//! — the wrapper's Rust fields don't themselves carry the data, the
//! compiled layout and the `Instance` inside it do:
//!
//! ```ignore
//! #[derive(BinStruct)]
//! #[layout(flags = "ALIGN_AUTO")]
//! #[field(name = "name", ty = "cstruct::Type::VarString")]
//! #[field(name = "age", ty = "cstruct::Type::I8")]
//! struct Person(cstruct::Instance);
//! ```
//!
//! generates `Person::new`, `Person::from_bytes`, `Person::to_bytes`, and
//! `Person::name`/`Person::set_name` (and so on for every declared field),
//! plus a lazily-built, process-wide `Person::layout()`.

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr};

#[proc_macro_derive(BinStruct, attributes(layout, field))]
pub fn derive_bin_struct(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    expand(ast)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

struct LayoutAttr {
    flags: Option<syn::Expr>,
    base: Option<syn::Path>,
}

fn parse_layout_attr(ast: &DeriveInput) -> syn::Result<LayoutAttr> {
    let mut flags = None;
    let mut base = None;
    for attr in &ast.attrs {
        if !attr.path().is_ident("layout") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("flags") {
                let lit: LitStr = meta.value()?.parse()?;
                let expr = lit
                    .value()
                    .split('|')
                    .map(|word| format!("cstruct::LayoutFlags::{}", word.trim()))
                    .collect::<Vec<_>>()
                    .join(" | ");
                flags = Some(syn::parse_str::<syn::Expr>(&expr)?);
                Ok(())
            } else if meta.path.is_ident("base") {
                let lit: LitStr = meta.value()?.parse()?;
                base = Some(syn::parse_str::<syn::Path>(&lit.value())?);
                Ok(())
            } else {
                Err(meta.error("unsupported `layout` key, expected `flags` or `base`"))
            }
        })?;
    }
    Ok(LayoutAttr { flags, base })
}

struct DeclaredField {
    name: String,
    ty: syn::Expr,
}

fn parse_field_attrs(ast: &DeriveInput) -> syn::Result<Vec<DeclaredField>> {
    let mut out = Vec::new();
    for attr in &ast.attrs {
        if !attr.path().is_ident("field") {
            continue;
        }
        let mut name = None;
        let mut ty = None;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                name = Some(lit.value());
                Ok(())
            } else if meta.path.is_ident("ty") {
                let lit: LitStr = meta.value()?.parse()?;
                ty = Some(syn::parse_str::<syn::Expr>(&lit.value())?);
                Ok(())
            } else {
                Err(meta.error("unsupported `field` key, expected `name` or `ty`"))
            }
        })?;
        let name = name.ok_or_else(|| syn::Error::new_spanned(attr, "`field` requires `name`"))?;
        let ty = ty.ok_or_else(|| syn::Error::new_spanned(attr, "`field` requires `ty`"))?;
        out.push(DeclaredField { name, ty });
    }
    Ok(out)
}

fn expand(ast: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = ast.ident.clone();

    match &ast.data {
        Data::Struct(data) => match &data.fields {
            Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {}
            _ => {
                return Err(syn::Error::new_spanned(
                    &ast,
                    "BinStruct requires a single-field tuple struct wrapping cstruct::Instance, \
                     e.g. `struct Person(cstruct::Instance);`",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &ast,
                "BinStruct can only be derived for structs",
            ))
        }
    }

    let layout_attr = parse_layout_attr(&ast)?;
    let declared = parse_field_attrs(&ast)?;

    let mut field_registrations = Vec::new();
    let mut accessors = Vec::new();
    for field in &declared {
        let field_name = &field.name;
        let ty_expr = &field.ty;
        field_registrations.push(quote! { .field(#field_name, #ty_expr) });

        let getter = format_ident!("{}", field_name);
        let setter = format_ident!("set_{}", field_name);
        accessors.push(quote! {
            pub fn #getter(&self) -> Option<&cstruct::Value> {
                self.0.get(#field_name)
            }

            pub fn #setter(&mut self, value: impl Into<cstruct::Value>) -> Result<(), cstruct::AssignError> {
                self.0.set(#field_name, value)
            }
        });
    }

    let flags_expr = layout_attr
        .flags
        .unwrap_or_else(|| syn::parse_str("cstruct::LayoutFlags::default()").unwrap());
    let name_str = name.to_string();
    let base_call = layout_attr
        .base
        .as_ref()
        .map(|base| quote! { .base(std::sync::Arc::clone(#base::layout())) });

    Ok(quote! {
        impl #name {
            /// Builds (once, lazily, process-wide) and returns the compiled layout backing this type.
            pub fn layout() -> &'static std::sync::Arc<cstruct::CompiledStruct> {
                static LAYOUT: std::sync::OnceLock<std::sync::Arc<cstruct::CompiledStruct>> =
                    std::sync::OnceLock::new();
                LAYOUT.get_or_init(|| {
                    cstruct::StructBuilder::new(#name_str)
                        .flags(#flags_expr)
                        #base_call
                        #(#field_registrations)*
                        .build()
                        .expect("invalid #[derive(BinStruct)] layout")
                })
            }

            pub fn new() -> Self {
                Self(cstruct::Instance::new(std::sync::Arc::clone(Self::layout())))
            }

            pub fn from_bytes(buf: &[u8]) -> Result<Self, cstruct::DecodeError> {
                cstruct::Instance::from_bytes(std::sync::Arc::clone(Self::layout()), buf).map(Self)
            }

            pub fn to_bytes(&self) -> Result<Vec<u8>, cstruct::EncodeError> {
                self.0.to_bytes()
            }

            #(#accessors)*
        }

        impl Default for #name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<cstruct::Instance> for #name {
            fn from(instance: cstruct::Instance) -> Self {
                Self(instance)
            }
        }

        impl From<#name> for cstruct::Instance {
            fn from(wrapper: #name) -> Self {
                wrapper.0
            }
        }
    })
}

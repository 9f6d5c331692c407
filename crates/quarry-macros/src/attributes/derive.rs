//! Implementation of the `#[derive(Attributes)]` macro.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, Ident, Result};

use super::attrs::parse_attribute_options;

/// Expands `#[derive(Attributes)]`.
pub fn attributes_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Attributes can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Attributes can only be derived for structs",
            ))
        }
    };

    let mut match_arms: Vec<TokenStream> = Vec::new();
    let mut constants: Vec<TokenStream> = Vec::new();
    let mut names: Vec<String> = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;

        let options = parse_attribute_options(&field.attrs)?;
        if options.skip {
            continue;
        }

        let attribute_name = options.rename.unwrap_or_else(|| field_name.to_string());
        if names.contains(&attribute_name) {
            return Err(Error::new(
                field.span(),
                format!("attribute name `{}` is used twice", attribute_name),
            ));
        }

        let const_name = constant_ident(&attribute_name, field)?;
        constants.push(quote! {
            /// Attribute name constant.
            pub const #const_name: &'static str = #attribute_name;
        });

        match_arms.push(quote! {
            #attribute_name => ::core::option::Option::Some(
                ::quarry::Value::from(::core::clone::Clone::clone(&self.#field_name))
            ),
        });

        names.push(attribute_name);
    }

    let source_name = struct_name.to_string();

    Ok(quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            #(#constants)*
        }

        impl #impl_generics ::quarry::AttributeSource for #struct_name #ty_generics #where_clause {
            fn attribute(&self, name: &str) -> ::core::option::Option<::quarry::Value> {
                match name {
                    #(#match_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn attribute_names(&self) -> &'static [&'static str] {
                &[#(#names),*]
            }

            fn source_name(&self) -> &'static str {
                #source_name
            }
        }
    })
}

/// The constant name for an attribute, or an error on the field when the
/// name does not form a valid identifier.
fn constant_ident(attribute_name: &str, field: &syn::Field) -> Result<Ident> {
    let screaming = to_screaming_snake_case(attribute_name);
    let mut ident = syn::parse_str::<Ident>(&screaming).map_err(|_| {
        Error::new(
            field.span(),
            format!(
                "attribute name `{}` does not form a valid constant name `{}`",
                attribute_name, screaming
            ),
        )
    })?;
    ident.set_span(field.span());
    Ok(ident)
}

/// Convert a string to SCREAMING_SNAKE_CASE.
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c == '_' || c == '-' || c == '.' || c == ' ' {
            result.push('_');
            prev_was_lower = false;
        } else {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = c.is_alphanumeric();
        }
    }

    result
}

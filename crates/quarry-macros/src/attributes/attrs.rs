//! Parsing of the `#[attribute(...)]` field options.

use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Lit, Meta, Result, Token,
};

/// Field-level options from `#[attribute(...)]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeOptions {
    /// Leave the field out of the accessor.
    pub skip: bool,
    /// Attribute name to expose instead of the field name.
    pub rename: Option<String>,
}

impl Parse for AttributeOptions {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut options = AttributeOptions::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("skip") => {
                    if options.skip {
                        return Err(Error::new(p.span(), "duplicate `skip`"));
                    }
                    options.skip = true;
                }

                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    let syn::Expr::Lit(syn::ExprLit {
                        lit: Lit::Str(s), ..
                    }) = &nv.value
                    else {
                        return Err(Error::new(
                            nv.value.span(),
                            "rename must be a string literal",
                        ));
                    };
                    if options.rename.is_some() {
                        return Err(Error::new(nv.path.span(), "duplicate `rename`"));
                    }
                    let name = s.value();
                    if name.is_empty() {
                        return Err(Error::new(s.span(), "rename must not be empty"));
                    }
                    options.rename = Some(name);
                }

                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown attribute option. Expected: skip or rename = \"...\"",
                    ));
                }
            }
        }

        Ok(options)
    }
}

/// Collects the `#[attribute(...)]` options of a field.
pub fn parse_attribute_options(attrs: &[Attribute]) -> Result<AttributeOptions> {
    let mut found: Option<AttributeOptions> = None;
    for attr in attrs {
        if attr.path().is_ident("attribute") {
            if found.is_some() {
                return Err(Error::new(
                    attr.span(),
                    "only one #[attribute(...)] is allowed per field",
                ));
            }
            found = Some(attr.parse_args::<AttributeOptions>()?);
        }
    }
    Ok(found.unwrap_or_default())
}

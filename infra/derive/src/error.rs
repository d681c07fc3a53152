use fxhash::FxHashSet;
use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Field, Fields, Ident, Type, Variant};

/// What the expansion needs to know about one enum variant.
struct ErrorVariant<'a> {
    ident: &'a Ident,
    source: Option<(&'a Ident, &'a Type)>,
    has_context: bool,
    cfg: Vec<Attribute>,
}

impl ErrorVariant<'_> {
    fn is_internal(&self) -> bool {
        self.ident == "Internal"
    }
}

pub fn expand(input: DeriveInput) -> TokenStream {
    match try_expand(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn try_expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let ext = format_ident!("{}Ext", name);

    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(name, "vtl_error can only be applied to enums"));
    };

    let variants = data.variants.iter().map(inspect_variant).collect::<syn::Result<Vec<_>>>()?;
    check_sources(&variants)?;

    let derives = missing_derives(input);
    let context_trait = context_trait(name, &ext, &variants);
    let conversions = variants.iter().filter_map(|v| source_conversion(name, &ext, v));
    let internal = internal_conversions(name, &variants);

    Ok(quote! {
        #[allow(non_shorthand_field_patterns)]
        #derives
        #input

        #context_trait
        #(#conversions)*
        #internal

        #[allow(dead_code)]
        fn format_context(context: &Option<std::borrow::Cow<'static, str>>) -> std::borrow::Cow<'static, str> {
            match context {
                Some(c) => std::borrow::Cow::Owned(format!(" ({c})")),
                None => std::borrow::Cow::Borrowed(""),
            }
        }
    })
}

fn inspect_variant(variant: &Variant) -> syn::Result<ErrorVariant<'_>> {
    let Fields::Named(fields) = &variant.fields else {
        return Err(syn::Error::new_spanned(
            variant,
            "vtl_error variants must use named fields",
        ));
    };

    let mut has_context = false;
    let mut source = None;
    for field in &fields.named {
        let Some(ident) = field.ident.as_ref() else { continue };
        if ident == "context" {
            if !is_context_type(&field.ty) {
                return Err(syn::Error::new_spanned(
                    &field.ty,
                    "context field must be Option<Cow<'static, str>>",
                ));
            }
            has_context = true;
        } else if source.is_none() && is_source_field(ident, field) {
            source = Some((ident, &field.ty));
        }
    }

    Ok(ErrorVariant {
        ident: &variant.ident,
        source,
        has_context,
        cfg: variant.attrs.iter().filter(|a| a.path().is_ident("cfg")).cloned().collect(),
    })
}

fn is_source_field(ident: &Ident, field: &Field) -> bool {
    ident == "source"
        || field.attrs.iter().any(|a| a.path().is_ident("source") || a.path().is_ident("from"))
}

/// Every wrapped source needs a context slot, and a source type may back only one variant.
fn check_sources(variants: &[ErrorVariant<'_>]) -> syn::Result<()> {
    let mut seen = FxHashSet::default();
    for v in variants {
        let Some((_, ty)) = v.source else { continue };
        if !v.has_context {
            return Err(syn::Error::new_spanned(
                v.ident,
                "vtl_error variants with a source need `context: Option<Cow<'static, str>>`",
            ));
        }
        if !v.is_internal() && !seen.insert(compact_tokens(ty)) {
            return Err(syn::Error::new_spanned(
                ty,
                "vtl_error: this source type is already wrapped by another variant",
            ));
        }
    }
    Ok(())
}

fn missing_derives(input: &DeriveInput) -> TokenStream {
    let mut present = FxHashSet::default();
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("derive")) {
        let _ = attr.parse_nested_meta(|meta| {
            if let Some(seg) = meta.path.segments.last() {
                present.insert(seg.ident.to_string());
            }
            Ok(())
        });
    }

    let mut wanted = Vec::new();
    if !present.contains("Debug") {
        wanted.push(quote! { Debug });
    }
    if !present.contains("Error") {
        wanted.push(quote! { ::thiserror::Error });
    }
    if wanted.is_empty() { quote! {} } else { quote! { #[derive(#(#wanted),*)] } }
}

fn context_trait(name: &Ident, ext: &Ident, variants: &[ErrorVariant<'_>]) -> TokenStream {
    let arms = variants.iter().filter(|v| v.has_context).map(|v| {
        let cfg = &v.cfg;
        let ident = v.ident;
        quote! { #(#cfg)* #name::#ident { context: slot, .. } => *slot = Some(context.into()), }
    });

    quote! {
        /// Attaches human-readable context to a failing result.
        pub trait #ext<T> {
            /// Wraps the error (if any) and records `context` on it.
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> Result<T, #name>;
        }

        #[automatically_derived]
        impl<T> #ext<T> for Result<T, #name> {
            #[inline]
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> Self {
                self.map_err(|mut err| {
                    match &mut err {
                        #( #arms )*
                        _ => {}
                    }
                    err
                })
            }
        }
    }
}

fn source_conversion(name: &Ident, ext: &Ident, v: &ErrorVariant<'_>) -> Option<TokenStream> {
    if v.is_internal() {
        return None;
    }
    let (field, ty) = v.source?;
    let ident = v.ident;
    let cfg = &v.cfg;

    Some(quote! {
        #(#cfg)*
        #[automatically_derived]
        impl From<#ty> for #name {
            #[inline]
            fn from(#field: #ty) -> Self {
                Self::#ident { #field, context: None }
            }
        }

        #(#cfg)*
        impl<T> #ext<T> for std::result::Result<T, #ty> {
            #[inline]
            fn context(self, context: impl Into<std::borrow::Cow<'static, str>>) -> std::result::Result<T, #name> {
                self.map_err(|#field| #name::#ident { #field, context: Some(context.into()) })
            }
        }
    })
}

fn internal_conversions(name: &Ident, variants: &[ErrorVariant<'_>]) -> TokenStream {
    let Some(internal) = variants.iter().find(|v| v.is_internal()) else {
        return quote! {};
    };
    let cfg = &internal.cfg;

    quote! {
        #(#cfg)*
        impl From<&'static str> for #name {
            #[inline]
            fn from(message: &'static str) -> Self {
                Self::Internal { message: std::borrow::Cow::Borrowed(message), context: None }
            }
        }

        #(#cfg)*
        impl From<String> for #name {
            #[inline]
            fn from(message: String) -> Self {
                Self::Internal { message: std::borrow::Cow::Owned(message), context: None }
            }
        }
    }
}

fn compact_tokens(ty: &Type) -> String {
    ty.to_token_stream().to_string().chars().filter(|c| !c.is_whitespace()).collect()
}

/// Accepts `Option<Cow<'static, str>>` with or without `std::` path prefixes.
fn is_context_type(ty: &Type) -> bool {
    let compact = compact_tokens(ty);
    let inner = compact
        .strip_prefix("std::option::Option<")
        .or_else(|| compact.strip_prefix("Option<"))
        .and_then(|rest| rest.strip_suffix('>'));

    inner.is_some_and(|cow| {
        matches!(
            cow,
            "Cow<'static,str>" | "std::borrow::Cow<'static,str>" | "::std::borrow::Cow<'static,str>"
        )
    })
}

//! Implementation of #[derive(Projectable)]

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2, TokenTree};
use quote::quote;
use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{
    parse_macro_input, parse_quote, Attribute, Data, DeriveInput, Field, Fields, GenericParam,
    Ident, LitStr, Token, Visibility,
};

pub fn derive_projectable_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(mut input: DeriveInput) -> syn::Result<TokenStream2> {
    let container = ContainerOptions::from_attrs(&input.attrs)?;
    let name = input.ident.clone();

    let body = if container.display {
        quote! {
            ::scope_sieve::Shape::Scalar(::scope_sieve::Scalar::Text(
                ::std::string::ToString::to_string(self),
            ))
        }
    } else {
        let fields = match &input.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(fields) => fields.named.iter().collect::<Vec<_>>(),
                Fields::Unit => Vec::new(),
                Fields::Unnamed(_) => {
                    return Err(syn::Error::new_spanned(
                        &input,
                        "Projectable requires named fields; use #[sieve(display)] for tuple structs",
                    ));
                }
            },
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Projectable only works on structs; use #[sieve(display)] for enums",
                ));
            }
        };

        let views = fields
            .into_iter()
            .map(field_view)
            .collect::<syn::Result<Vec<_>>>()?;

        quote! {
            ::scope_sieve::Shape::Record(::scope_sieve::RecordView::new(
                ::std::any::type_name::<Self>(),
                ::std::vec![#(#views),*],
            ))
        }
    };

    // Field values are viewed as `&dyn Projectable`, so every type
    // parameter must be projectable. Display-only types never look inside.
    if !container.display {
        for param in input.generics.params.iter_mut() {
            if let GenericParam::Type(param) = param {
                param.bounds.push(parse_quote!(::scope_sieve::Projectable));
            }
        }
    }

    let self_ty = {
        let (_, ty_generics, _) = input.generics.split_for_impl();
        quote!(#name #ty_generics)
    };
    let predicates = &mut input.generics.make_where_clause().predicates;
    if container.display {
        predicates.push(parse_quote!(#self_ty: ::std::fmt::Display));
    }
    if container.custom {
        predicates.push(parse_quote!(#self_ty: ::scope_sieve::CustomProjection));
    }
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();

    let custom_fn = if container.custom {
        quote! {
            fn custom(&self) -> ::std::option::Option<&dyn ::scope_sieve::CustomProjection> {
                ::std::option::Option::Some(self)
            }
        }
    } else {
        quote! {}
    };

    Ok(quote! {
        impl #impl_generics ::scope_sieve::Projectable for #self_ty #where_clause {
            fn shape(&self) -> ::scope_sieve::Shape<'_> {
                #body
            }

            #custom_fn
        }
    })
}

fn field_view(field: &Field) -> syn::Result<TokenStream2> {
    let Some(ident) = &field.ident else {
        return Err(syn::Error::new_spanned(field, "expected a named field"));
    };
    let options = FieldOptions::from_attrs(&field.attrs)?;
    let ident_str = ident.unraw().to_string();

    // Embedded records are promoted even when the field itself is private.
    let accessible = options.embed || matches!(field.vis, Visibility::Public(_));
    let mut view = if accessible {
        quote!(::scope_sieve::FieldView::new(#ident_str, &self.#ident))
    } else {
        quote!(::scope_sieve::FieldView::private(#ident_str))
    };

    if let Some(tag) = options.tag() {
        view = quote!(#view.with_tag(#tag));
    }
    if let Some(directive) = &options.directive {
        view = quote!(#view.with_directive(#directive));
    }
    if options.embed {
        view = quote!(#view.as_embedded());
    }
    Ok(view)
}

/// One argument inside `#[sieve(...)]`: a bare directive string, a flag or
/// a `key = "value"` pair.
enum SieveArg {
    Directive(LitStr),
    Flag(Ident),
    Value(Ident, LitStr),
}

impl SieveArg {
    fn span(&self) -> Span {
        match self {
            SieveArg::Directive(lit) => lit.span(),
            SieveArg::Flag(key) | SieveArg::Value(key, _) => key.span(),
        }
    }
}

impl Parse for SieveArg {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(LitStr) {
            return Ok(SieveArg::Directive(input.parse()?));
        }
        let key = Ident::parse_any(input)?;
        if input.peek(Token![=]) {
            input.parse::<Token![=]>()?;
            Ok(SieveArg::Value(key, input.parse()?))
        } else {
            Ok(SieveArg::Flag(key))
        }
    }
}

fn sieve_args(attrs: &[Attribute]) -> syn::Result<Vec<SieveArg>> {
    let mut args = Vec::new();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("sieve")) {
        let parsed = attr.parse_args_with(Punctuated::<SieveArg, Token![,]>::parse_terminated)?;
        args.extend(parsed);
    }
    Ok(args)
}

#[derive(Default)]
struct ContainerOptions {
    custom: bool,
    display: bool,
}

impl ContainerOptions {
    fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut options = Self::default();
        for arg in sieve_args(attrs)? {
            match &arg {
                SieveArg::Flag(key) if key == "custom" => options.custom = true,
                SieveArg::Flag(key) if key == "display" => options.display = true,
                _ => {
                    return Err(syn::Error::new(
                        arg.span(),
                        "unknown sieve container attribute; expected `custom` or `display`",
                    ));
                }
            }
        }
        Ok(options)
    }
}

#[derive(Default)]
struct FieldOptions {
    directive: Option<String>,
    name: Option<String>,
    omit_empty: bool,
    skip: bool,
    embed: bool,
    serde_rename: Option<String>,
    serde_skip: bool,
}

impl FieldOptions {
    fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut options = Self::default();

        for arg in sieve_args(attrs)? {
            match &arg {
                SieveArg::Directive(lit) => options.directive = Some(lit.value()),
                SieveArg::Value(key, lit) if key == "tag" => options.directive = Some(lit.value()),
                SieveArg::Value(key, lit) if key == "name" => options.name = Some(lit.value()),
                SieveArg::Flag(key) if key == "omitempty" => options.omit_empty = true,
                SieveArg::Flag(key) if key == "skip" => options.skip = true,
                SieveArg::Flag(key) if key == "embed" => options.embed = true,
                _ => {
                    return Err(syn::Error::new(
                        arg.span(),
                        "unknown sieve field attribute; expected a directive string, \
                         `tag`, `name`, `omitempty`, `skip` or `embed`",
                    ));
                }
            }
        }

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    if meta.input.peek(Token![=]) {
                        let value: LitStr = meta.value()?.parse()?;
                        options.serde_rename = Some(value.value());
                    } else {
                        meta.parse_nested_meta(|inner| {
                            if inner.path.is_ident("serialize") {
                                let value: LitStr = inner.value()?.parse()?;
                                options.serde_rename = Some(value.value());
                            } else {
                                skip_meta_value(&inner)?;
                            }
                            Ok(())
                        })?;
                    }
                } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                    options.serde_skip = true;
                } else if meta.path.is_ident("flatten") {
                    options.embed = true;
                } else {
                    skip_meta_value(&meta)?;
                }
                Ok(())
            })?;
        }

        Ok(options)
    }

    /// Naming tag in `<name>[,omitempty]` form, or `"-"`.
    fn tag(&self) -> Option<String> {
        let base = if self.skip || (self.name.is_none() && self.serde_skip) {
            Some("-".to_string())
        } else if self.name.is_some() {
            self.name.clone()
        } else {
            self.serde_rename.clone()
        };

        if self.omit_empty {
            Some(format!("{},omitempty", base.unwrap_or_default()))
        } else {
            base
        }
    }
}

/// Consumes the value of a serde option this derive does not read: `= ...`
/// up to the next top-level comma, or a parenthesized list.
fn skip_meta_value(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        meta.input.parse::<Token![=]>()?;
        while !meta.input.is_empty() && !meta.input.peek(Token![,]) {
            meta.input.parse::<TokenTree>()?;
        }
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        content.parse::<TokenStream2>()?;
    }
    Ok(())
}

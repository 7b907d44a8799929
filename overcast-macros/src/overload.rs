//! Implementation of `#[overload]`.

use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    FnArg, Ident, ItemFn, LitInt, LitStr, Pat, ReturnType, Token, Type,
    parse::{Parse, ParseStream},
};

pub(crate) struct OverloadArgs {
    name: Option<LitStr>,
    member: Option<LitStr>,
    collect: bool,
    order: Option<i32>,
}

impl Parse for OverloadArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut name = None;
        let mut member = None;
        let mut collect = false;
        let mut order = None;

        while !input.is_empty() {
            let ident: Ident = input.parse()?;

            match ident.to_string().as_str() {
                "collect" => {
                    collect = true;
                }
                "name" => {
                    input.parse::<Token![=]>()?;
                    name = Some(input.parse::<LitStr>()?);
                }
                "member" => {
                    input.parse::<Token![=]>()?;
                    member = Some(input.parse::<LitStr>()?);
                }
                "order" => {
                    input.parse::<Token![=]>()?;
                    let lit: LitInt = input.parse()?;
                    order = Some(lit.base10_parse()?);
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        if order.is_some() && !collect {
            return Err(syn::Error::new(
                input.span(),
                "`order` only applies together with `collect`",
            ));
        }

        Ok(OverloadArgs {
            name,
            member,
            collect,
            order,
        })
    }
}

/// How one function parameter is declared and read back from `Bound`.
enum ParamShape<'a> {
    /// `&T`: typed, borrowed from the bound value.
    Borrowed(&'a Type),
    /// `T`: typed, cloned out of the bound value.
    Owned(&'a Type),
    /// `Value`: untyped, cloned.
    Value,
    /// `&Value`: untyped, borrowed.
    ValueRef,
    /// `&[Value]`: collects surplus positional arguments.
    Rest,
}

fn last_segment_is(ty: &Type, name: &str) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == name),
        _ => false,
    }
}

fn shape_of(ty: &Type) -> syn::Result<ParamShape<'_>> {
    match ty {
        Type::Reference(reference) => {
            if let Some(mutability) = &reference.mutability {
                return Err(syn::Error::new_spanned(
                    mutability,
                    "overload parameters cannot be mutable references",
                ));
            }
            match &*reference.elem {
                Type::Slice(slice) if last_segment_is(&slice.elem, "Value") => Ok(ParamShape::Rest),
                elem if last_segment_is(elem, "Value") => Ok(ParamShape::ValueRef),
                elem => Ok(ParamShape::Borrowed(elem)),
            }
        }
        ty if last_segment_is(ty, "Value") => Ok(ParamShape::Value),
        ty => Ok(ParamShape::Owned(ty)),
    }
}

/// Returns `true` if the function returns a `Result`.
fn returns_result(output: &ReturnType) -> bool {
    match output {
        ReturnType::Type(_, ty) => last_segment_is(ty, "Result"),
        ReturnType::Default => false,
    }
}

pub(crate) fn expand(args: OverloadArgs, input: ItemFn) -> syn::Result<TokenStream2> {
    if !input.sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.sig.generics,
            "overloads cannot be generic",
        ));
    }

    let fn_name = &input.sig.ident;
    let fn_vis = &input.vis;
    let fn_attrs = &input.attrs;
    let is_async = input.sig.asyncness.is_some();
    let returns_result = returns_result(&input.sig.output);

    let op_name = args
        .name
        .clone()
        .unwrap_or_else(|| LitStr::new(&fn_name.to_string(), fn_name.span()));

    let mut params = Vec::new();
    let mut reads = Vec::new();
    let mut call_args = Vec::new();

    for (index, arg) in input.sig.inputs.iter().enumerate() {
        let pat_type = match arg {
            FnArg::Typed(pat_type) => pat_type,
            FnArg::Receiver(receiver) => {
                return Err(syn::Error::new_spanned(
                    receiver,
                    "overloads take no `self`; declare the receiver as a typed first parameter and use `member = \"Type\"`",
                ));
            }
        };
        let param_name = match &*pat_type.pat {
            Pat::Ident(pat) => pat.ident.to_string(),
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "overload parameters must be plain identifiers",
                ));
            }
        };
        let param_name = param_name.trim_start_matches('_').to_string();
        let local = format_ident!("__arg{}", index);

        let (param, access) = match shape_of(&pat_type.ty)? {
            ParamShape::Borrowed(ty) => (
                quote! { ::overcast::Param::positional(#param_name).of::<#ty>() },
                quote! { bound.get::<#ty>(#param_name) },
            ),
            ParamShape::Owned(ty) => (
                quote! { ::overcast::Param::positional(#param_name).of::<#ty>() },
                quote! { bound.get::<#ty>(#param_name).cloned() },
            ),
            ParamShape::Value => (
                quote! { ::overcast::Param::positional(#param_name) },
                quote! { bound.require(#param_name).cloned() },
            ),
            ParamShape::ValueRef => (
                quote! { ::overcast::Param::positional(#param_name) },
                quote! { bound.require(#param_name) },
            ),
            ParamShape::Rest => (
                quote! { ::overcast::Param::var_positional(#param_name) },
                quote! {
                    ::core::result::Result::<_, ::overcast::ArgError>::Ok(bound.rest(#param_name))
                },
            ),
        };
        let read = if is_async {
            // `?` cannot name the error type of an async block.
            quote! {
                let #local = match #access {
                    ::core::result::Result::Ok(value) => value,
                    ::core::result::Result::Err(err) => {
                        return ::core::result::Result::Err(::overcast::BoxError::from(err));
                    }
                };
            }
        } else {
            quote! { let #local = #access?; }
        };
        params.push(param);
        reads.push(read);
        call_args.push(local);
    }

    let inner_name = format_ident!("__overcast_{}", fn_name);
    let mut inner = input.clone();
    inner.sig.ident = inner_name.clone();
    inner.attrs.clear();
    inner.vis = syn::Visibility::Inherited;

    let member = args.member.as_ref().map(|owner| {
        quote! { .member_of(#owner) }
    });

    let body = if is_async {
        let output = if returns_result {
            quote! {
                match #inner_name(#(#call_args),*).await {
                    ::core::result::Result::Ok(value) => value,
                    ::core::result::Result::Err(err) => {
                        return ::core::result::Result::Err(::overcast::BoxError::from(err));
                    }
                }
            }
        } else {
            quote! { #inner_name(#(#call_args),*).await }
        };
        quote! {
            .async_body(|bound: ::overcast::Bound| async move {
                #(#reads)*
                let output = #output;
                ::core::result::Result::Ok::<::overcast::Value, ::overcast::BoxError>(
                    ::overcast::Value::new(output),
                )
            })
        }
    } else {
        let output = if returns_result {
            quote! { #inner_name(#(#call_args),*)? }
        } else {
            quote! { #inner_name(#(#call_args),*) }
        };
        quote! {
            .body(|bound: ::overcast::Bound| -> ::core::result::Result<::overcast::Value, ::overcast::BoxError> {
                #(#reads)*
                let output = #output;
                ::core::result::Result::Ok(::overcast::Value::new(output))
            })
        }
    };

    let submit = args.collect.then(|| {
        let order = args.order.unwrap_or(0);
        quote! {
            ::overcast::inventory::submit! {
                ::overcast::CollectedOverload::new(#order, #fn_name)
            }
        }
    });

    Ok(quote! {
        #(#fn_attrs)*
        #[doc = concat!("Builds the `", #op_name, "` candidate declared by `", stringify!(#fn_name), "`.")]
        #fn_vis fn #fn_name() -> ::overcast::Candidate {
            #inner

            ::overcast::Candidate::builder(#op_name)
                .scope(::core::module_path!())
                #member
                #(.param(#params))*
                #body
        }

        #submit
    })
}

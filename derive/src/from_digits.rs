use std::collections::HashSet;

use proc_macro::TokenStream;
use quote::{ToTokens, quote};
use syn::{
    Data, DeriveInput, Error, ExprClosure, Field, Fields, Ident, LitInt, Meta, Result, Token,
    Type,
    parse::{Parse, ParseStream},
};

pub(crate) fn expand_from_digits(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new_spanned(
            input,
            "`FromDigits` may only be derived on structs.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new_spanned(
            input,
            "`FromDigits` may only be derived on structs with named fields.",
        ))?
    };

    let fields = fields
        .named
        .iter()
        .map(FieldMetadata::parse)
        .map(Result::transpose)
        .flatten() // Skip fields without an attribute.
        .collect::<Result<Vec<_>>>()?;

    let mut modules = HashSet::new();
    let mut module_cases = Vec::new();
    let mut all_cases = Vec::new();
    let mut completed_cases = Vec::new();

    for field in &fields {
        match field.target {
            Target::Module(number) => {
                if !modules.insert(number) {
                    Err(Error::new_spanned(
                        &field.name,
                        "Module numbers must be unique.",
                    ))?
                }

                let assignment = field.assignment(quote! { digit })?;
                module_cases.push(quote! { #number => { #assignment; } });
            }
            Target::All => all_cases.push(field.assignment(quote! { digit })?),
            Target::Completed => completed_cases.push(field.assignment(quote! { module })?),
        }
    }

    let add_digit = (!module_cases.is_empty() || !all_cases.is_empty()).then(|| {
        quote! {
            fn add_digit(&mut self, digit: ::anodyne::sans::Digit) {
                match digit.module {
                    #(#module_cases)*
                    _ => {}
                };
                #(#all_cases;)*
            }
        }
    });

    let complete_module = (!completed_cases.is_empty()).then(|| {
        quote! {
            fn complete_module(&mut self, module: ::anodyne::sans::ModuleId) {
                #(#completed_cases;)*
            }
        }
    });

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::anodyne::avec::FromDigits for #name #ty_generics #where_clause {
            #add_digit
            #complete_module
        }
    };

    Ok(expanded.into())
}

#[derive(Debug)]
struct FieldMetadata {
    name: Ident,
    ty: Type,
    target: Target,
    handler: Option<ExprClosure>,
}

#[derive(Debug, Clone, Copy)]
enum Target {
    Module(u16),
    All,
    Completed,
}

#[derive(Debug)]
enum Container {
    Vec,
    Option,
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Option<Self>> {
        let name = field.ident.clone().unwrap();

        let mut attrs = field
            .attrs
            .iter()
            .filter(|a| a.path().is_ident("digits") || a.path().is_ident("completed"));

        let Some(attr) = attrs.next() else {
            return Ok(None);
        };

        if let Some(extra) = attrs.next() {
            Err(Error::new_spanned(
                extra,
                "A field may carry only one `digits` or `completed` attribute.",
            ))?
        }

        let (target, handler) = if attr.path().is_ident("digits") {
            let DigitsAttribute { target, handler } = attr.meta.require_list()?.parse_args()?;
            (target, handler)
        } else {
            match &attr.meta {
                Meta::Path(_) => (Target::Completed, None),
                Meta::List(list) => (Target::Completed, Some(list.parse_args::<ExprClosure>()?)),
                Meta::NameValue(meta) => Err(Error::new_spanned(
                    meta,
                    "Expected `completed` or `completed(|acc, m: ModuleId| ...)`.",
                ))?,
            }
        };

        if let Some(handler) = &handler {
            if handler.inputs.len() != 2 {
                Err(Error::new_spanned(
                    handler,
                    "Handler closure must have two parameters.",
                ))?
            }
        } else {
            Container::of(&field.ty)?;
        }

        Ok(Some(Self {
            name,
            ty: field.ty.clone(),
            target,
            handler,
        }))
    }

    /// Statement publishing `value` to this field.
    fn assignment(&self, value: impl ToTokens) -> Result<impl ToTokens> {
        let name = &self.name;

        let Some(handler) = &self.handler else {
            return Ok(match Container::of(&self.ty)? {
                Container::Vec => quote! { self.#name.push(#value) },
                Container::Option => quote! { self.#name = ::core::option::Option::Some(#value) },
            });
        };

        let field_type = &self.ty;
        let body = &handler.body;
        let acc = handler.inputs.iter().nth(0).unwrap();
        let val = handler.inputs.iter().nth(1).unwrap();

        Ok(quote! {
            (|#acc: &mut #field_type, #val| { #body })(&mut self.#name, #value)
        })
    }
}

impl Container {
    fn of(ty: &Type) -> Result<Self> {
        const MESSAGE: &str = "Field without a handler must have type `Vec<T>` or `Option<T>`.";

        let Type::Path(path) = ty else {
            Err(Error::new_spanned(ty, MESSAGE))?
        };

        let Some(segment) = path.path.segments.last() else {
            Err(Error::new_spanned(&path.path.segments, MESSAGE))?
        };

        if segment.ident == "Vec" {
            Ok(Self::Vec)
        } else if segment.ident == "Option" {
            Ok(Self::Option)
        } else {
            Err(Error::new_spanned(&segment.ident, MESSAGE))
        }
    }
}

#[derive(Debug)]
struct DigitsAttribute {
    target: Target,
    handler: Option<ExprClosure>,
}

impl Parse for DigitsAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let target = if let Ok(ident) = input.parse::<Ident>() {
            if ident == "all" {
                Target::All
            } else {
                Err(Error::new_spanned(
                    ident,
                    "Digit target must be an integer literal or `all`.",
                ))?
            }
        } else {
            Target::Module(input.parse::<LitInt>()?.base10_parse()?)
        };

        let handler = if !input.is_empty() {
            input.parse::<Token![,]>()?;
            Some(input.parse::<ExprClosure>()?)
        } else {
            None
        };

        Ok(Self { target, handler })
    }
}

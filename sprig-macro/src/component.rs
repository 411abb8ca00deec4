use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse::Parse, parse::ParseStream, parse_macro_input, punctuated::Punctuated, Data, DeriveInput,
    Field, Fields, GenericArgument, Ident, LitStr, Path, PathArguments, Token, Type,
};

#[derive(Default)]
struct ComponentArgs {
    configuration: bool,
    scope: Option<TokenStream2>,
    lazy: bool,
    primary: bool,
    qualifier: Option<LitStr>,
    constructor: Option<Ident>,
    provides: Vec<Type>,
    post_initialize: Vec<Ident>,
    pre_destroy: Vec<Ident>,
    customize: Option<Path>,
}

impl ComponentArgs {
    fn merge(&mut self, input: ParseStream) -> syn::Result<()> {
        while !input.is_empty() {
            let name: Ident = input.parse()?;
            match name.to_string().as_str() {
                "configuration" => self.configuration = true,
                "lazy" => self.lazy = true,
                "primary" => self.primary = true,
                "scope" => {
                    let value = parse_value(input)?;
                    self.scope = Some(scope_tokens(&value)?);
                }
                "qualifier" => self.qualifier = Some(parse_value(input)?),
                "constructor" => self.constructor = Some(parse_value(input)?.parse()?),
                "post_initialize" => self.post_initialize.push(parse_value(input)?.parse()?),
                "pre_destroy" => self.pre_destroy.push(parse_value(input)?.parse()?),
                "customize" => self.customize = Some(parse_value(input)?.parse()?),
                "provides" => {
                    let content;
                    syn::parenthesized!(content in input);
                    let types = Punctuated::<Type, Token![,]>::parse_terminated(&content)?;
                    self.provides.extend(types);
                }
                _ => {
                    return Err(syn::Error::new(
                        name.span(),
                        format!("unknown component option `{}`", name),
                    ))
                }
            }

            if input.is_empty() {
                break;
            }
            input.parse::<Token![,]>()?;
        }
        Ok(())
    }
}

/// Parses `= "literal"`
fn parse_value(input: ParseStream) -> syn::Result<LitStr> {
    input.parse::<Token![=]>()?;
    input.parse()
}

fn scope_tokens(value: &LitStr) -> syn::Result<TokenStream2> {
    match value.value().to_ascii_lowercase().as_str() {
        "shared" => Ok(quote!(::sprig::Scope::Shared)),
        "per_request" => Ok(quote!(::sprig::Scope::PerRequest)),
        other => Err(syn::Error::new(
            value.span(),
            format!(
                "unknown scope `{}`, expected \"shared\" or \"per_request\"",
                other
            ),
        )),
    }
}

struct InjectField<'a> {
    field: &'a Field,
    dependency: Type,
    optional: bool,
}

struct InjectOptions {
    optional: bool,
}

impl Parse for InjectOptions {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut optional = false;
        while !input.is_empty() {
            let name: Ident = input.parse()?;
            if name != "optional" {
                return Err(syn::Error::new(
                    name.span(),
                    format!("unknown inject option `{}`", name),
                ));
            }
            optional = true;
            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }
        Ok(InjectOptions { optional })
    }
}

pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    generate_component_impl(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn generate_component_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut args = ComponentArgs::default();
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("component")) {
        attr.parse_args_with(|stream: ParseStream| args.merge(stream))?;
    }

    let fields = injected_fields(input)?;

    let kind = if args.configuration {
        quote!(::sprig::Tag::Configuration)
    } else {
        quote!(::sprig::Tag::Manageable)
    };

    let mut tags = Vec::new();
    if let Some(scope) = &args.scope {
        tags.push(quote!(::sprig::Tag::Scope(#scope)));
    }
    if args.lazy {
        tags.push(quote!(::sprig::Tag::Lazy));
    }
    if args.primary {
        tags.push(quote!(::sprig::Tag::Primary));
    }
    if let Some(qualifier) = &args.qualifier {
        tags.push(quote!(::sprig::Tag::Qualifier(::std::string::String::from(#qualifier))));
    }

    let constructor = match &args.constructor {
        Some(function) => quote! {
            .constructor([::sprig::Tag::Inject], || ::std::result::Result::Ok(Self::#function()))
        },
        None => quote!(.default_constructor()),
    };

    let injections = fields.iter().map(|inject| {
        let name = inject.field.ident.as_ref();
        let label = name.map(|n| n.to_string()).unwrap_or_default();
        let dependency = &inject.dependency;
        let method = if inject.optional {
            quote!(inject_optional)
        } else {
            quote!(inject)
        };
        quote! {
            .#method::<#dependency, _>(
                #label,
                |this: &mut Self, value: ::std::sync::Arc<#dependency>| {
                    this.#name = ::std::option::Option::Some(value);
                },
            )
        }
    });

    let provisions = args.provides.iter().map(|interface| {
        quote! {
            .provides::<#interface, _>(
                |bean: ::std::sync::Arc<Self>| bean as ::std::sync::Arc<#interface>,
            )
        }
    });

    let post_initialize = args.post_initialize.iter().map(|method| {
        let label = method.to_string();
        quote!(.post_initialize(#label, |this: &mut Self| Self::#method(this)))
    });

    let pre_destroy = args.pre_destroy.iter().map(|method| {
        let label = method.to_string();
        quote!(.pre_destroy(#label, |this: &Self| Self::#method(this)))
    });

    let customize = args
        .customize
        .as_ref()
        .map(|function| quote!(let builder = #function(builder);));

    Ok(quote! {
        impl #impl_generics ::sprig::Component for #struct_name #ty_generics #where_clause {
            fn descriptor() -> ::sprig::TypeDescriptor {
                let builder = ::sprig::TypeDescriptor::builder::<Self>()
                    .tag(#kind)
                    .tags([#(#tags),*])
                    #constructor
                    #(#injections)*
                    #(#provisions)*
                    #(#post_initialize)*
                    #(#pre_destroy)*;
                #customize
                builder.build()
            }
        }
    })
}

fn injected_fields(input: &DeriveInput) -> syn::Result<Vec<InjectField<'_>>> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            Fields::Unit => return Ok(Vec::new()),
            Fields::Unnamed(fields) => {
                return Err(syn::Error::new_spanned(
                    fields,
                    "#[derive(Component)] only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "#[derive(Component)] can only be applied to structs",
            ))
        }
    };

    let mut injected = Vec::new();
    for field in fields {
        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("inject")) else {
            continue;
        };
        let optional = match &attr.meta {
            syn::Meta::Path(_) => false,
            _ => attr.parse_args::<InjectOptions>()?.optional,
        };
        let dependency = extract_dependency_type(&field.ty).ok_or_else(|| {
            syn::Error::new_spanned(&field.ty, "injected fields must be declared as Option<Arc<T>>")
        })?;
        injected.push(InjectField {
            field,
            dependency,
            optional,
        });
    }
    Ok(injected)
}

/// Extract `T` from `Option<Arc<T>>`
fn extract_dependency_type(ty: &Type) -> Option<Type> {
    let option = single_generic_argument(ty, "Option")?;
    single_generic_argument(option, "Arc").cloned()
}

fn single_generic_argument<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) if args.args.len() == 1 => match args.args.first() {
            Some(GenericArgument::Type(inner)) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

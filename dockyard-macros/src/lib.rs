use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse::Parse;
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, Data, DeriveInput, Expr, Fields, LitStr, Token};

/// Derive `dockyard::reflect::Reflect` for a struct with named fields.
///
/// Every field becomes a property unless marked `#[reflect(skip)]`. Field
/// types must implement `dockyard::reflect::PropertyValue`.
///
/// # Attributes on fields
/// - `#[reflect(description = "...")]` - Text shown as the property's help
/// - `#[reflect(range(min, max))]` - Numeric range; edits are clamped into it
/// - `#[reflect(slider)]` - Edit with a slider (pair with `range`)
/// - `#[reflect(color)]` - Edit as a color swatch
/// - `#[reflect(read_only)]` - Shown but never written
/// - `#[reflect(hidden)]` - Kept in the table but not shown
/// - `#[reflect(skip)]` - Not a property at all
///
/// # Example
/// ```ignore
/// #[derive(Reflect)]
/// struct Light {
///     #[reflect(description = "Light output", slider, range(0.0, 10.0))]
///     intensity: f32,
///     #[reflect(read_only)]
///     id: u32,
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[derive(Default)]
struct FieldOptions {
    description: Option<LitStr>,
    range: Option<(Expr, Expr)>,
    slider: bool,
    color: bool,
    read_only: bool,
    hidden: bool,
    skip: bool,
}

fn field_options(field: &syn::Field) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("reflect")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("description") {
                options.description = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("range") {
                let content;
                syn::parenthesized!(content in meta.input);
                let bounds: Punctuated<Expr, Token![,]> =
                    content.parse_terminated(Expr::parse, Token![,])?;
                let mut bounds = bounds.into_iter();
                match (bounds.next(), bounds.next(), bounds.next()) {
                    (Some(min), Some(max), None) => options.range = Some((min, max)),
                    _ => return Err(meta.error("expected `range(min, max)`")),
                }
            } else if meta.path.is_ident("slider") {
                options.slider = true;
            } else if meta.path.is_ident("color") {
                options.color = true;
            } else if meta.path.is_ident("read_only") {
                options.read_only = true;
            } else if meta.path.is_ident("hidden") {
                options.hidden = true;
            } else if meta.path.is_ident("skip") {
                options.skip = true;
            } else {
                return Err(meta.error("unknown reflect option"));
            }
            Ok(())
        })?;
    }
    Ok(options)
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Reflect cannot be derived for generic types",
        ));
    }
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Reflect can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Reflect can only be derived for structs",
            ))
        }
    };

    let reflect = quote!(::dockyard::reflect);
    let mut properties = Vec::new();
    for field in fields {
        let options = field_options(field)?;
        if options.skip {
            continue;
        }
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let ty = &field.ty;
        let prop_name = ident.to_string();

        let mut flags = Vec::new();
        if options.read_only {
            flags.push(quote!(#reflect::PropFlags::READ_ONLY));
        }
        if options.hidden {
            flags.push(quote!(#reflect::PropFlags::HIDDEN));
        }
        if options.slider {
            flags.push(quote!(#reflect::PropFlags::SLIDER));
        }
        if options.color {
            flags.push(quote!(#reflect::PropFlags::COLOR));
        }

        let description = options
            .description
            .map(|d| quote!(.description(#d)));
        let range = options
            .range
            .map(|(min, max)| quote!(.range((#min) as f32, (#max) as f32)));
        let flags = (!flags.is_empty()).then(|| quote!(.flags(#(#flags)|*)));

        properties.push(quote! {
            #reflect::Property::new(
                #prop_name,
                <#ty as #reflect::PropertyValue>::KIND,
                |target: &#name| #reflect::PropertyValue::to_value(&target.#ident),
                |target: &mut #name, value: #reflect::PropValue| {
                    match <#ty as #reflect::PropertyValue>::from_value(value) {
                        ::std::option::Option::Some(v) => {
                            target.#ident = v;
                            true
                        }
                        ::std::option::Option::None => false,
                    }
                },
            )
            #description
            #range
            #flags
        });
    }

    let type_name = name.to_string();
    Ok(quote! {
        impl #reflect::Reflect for #name {
            fn descriptor() -> &'static #reflect::TypeDescriptor<Self> {
                static DESCRIPTOR: ::std::sync::OnceLock<#reflect::TypeDescriptor<#name>> =
                    ::std::sync::OnceLock::new();
                DESCRIPTOR.get_or_init(|| {
                    #reflect::TypeDescriptor::new(#type_name, ::std::vec![#(#properties),*])
                })
            }
        }
    })
}

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::spanned::Spanned;
use syn::visit_mut::{self, VisitMut};
use syn::{
    Attribute, Error as SynError, Fields, GenericArgument, Ident, ItemStruct, LitStr, Member,
    PathArguments, Result as SynResult, Type,
};

use crate::attrs::{self, AttributeData, InjectData, ReferenceData};

#[derive(Debug)]
struct FieldData {
    member: Member,
    name: Option<String>,
    ty: Type,
    wrapper: Option<WrapperData>,
    kind: FieldKind,
}

#[derive(Debug)]
enum FieldKind {
    Positional { position: usize },
    Injected { inject: InjectData, inner: Type },
}

/// `Arc<T>` or `Inject<T>`, with `T` extracted.
#[derive(Debug)]
struct WrapperData {
    inner: Type,
}

struct AttributeRemovalVisitor;

impl VisitMut for AttributeRemovalVisitor {
    fn visit_attributes_mut(&mut self, attrs: &mut Vec<Attribute>) {
        attrs.retain(|attr| !attrs::is_inject_attribute(attr));
        attrs
            .iter_mut()
            .for_each(|attr| visit_mut::visit_attribute_mut(self, attr));
    }
}

pub fn expand_service(item: TokenStream, attr_data: AttributeData) -> SynResult<TokenStream2> {
    let mut item = match syn::parse::<ItemStruct>(item) {
        Ok(item) => item,
        Err(err) => {
            return Err(SynError::new(
                err.span(),
                "`#[service]` should be annotated on a struct",
            ))
        }
    };

    if !item.generics.params.is_empty() {
        return Err(SynError::new(
            item.generics.span(),
            "`#[service]` does not support generic structs",
        ));
    }

    let fields = parse_fields(&item.fields)?;
    let expanded = expand_service_implementation(&item.ident, &fields, &attr_data);

    let mut visitor = AttributeRemovalVisitor;
    visitor.visit_item_struct_mut(&mut item);

    Ok(quote! {
        #item
        #expanded
    })
}

fn parse_fields(fields: &Fields) -> SynResult<Vec<FieldData>> {
    let mut res = Vec::new();
    let mut position = 0;

    for (index, field) in fields.iter().enumerate() {
        let member = match &field.ident {
            Some(ident) => Member::Named(ident.clone()),
            None => Member::Unnamed(index.into()),
        };
        let name = field.ident.as_ref().map(Ident::to_string);
        let wrapper = parse_wrapper(&field.ty);

        let mut inject = None;
        for attr in field.attrs.iter().filter(|attr| attrs::is_inject_attribute(attr)) {
            if inject.is_some() {
                return Err(SynError::new(
                    attr.span(),
                    "only one `#[inject]` is allowed on a field",
                ));
            }
            inject = Some(attrs::parse_inject_attribute(attr)?);
        }

        let kind = match inject {
            Some(inject) => {
                let Some(WrapperData { inner }) = &wrapper else {
                    return Err(SynError::new(
                        field.ty.span(),
                        "an injected field should be of type `Arc<T>` or `Inject<T>`",
                    ));
                };
                if name.is_none() && matches!(inject, InjectData::Bare) {
                    return Err(SynError::new(
                        field.span(),
                        "a bare `#[inject]` needs a named field, use `#[inject(\"id\")]` instead",
                    ));
                }
                FieldKind::Injected {
                    inject,
                    inner: inner.clone(),
                }
            }
            None => {
                position += 1;
                FieldKind::Positional {
                    position: position - 1,
                }
            }
        };

        res.push(FieldData {
            member,
            name,
            ty: field.ty.clone(),
            wrapper,
            kind,
        });
    }

    Ok(res)
}

fn parse_wrapper(ty: &Type) -> Option<WrapperData> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Arc" && segment.ident != "Inject" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    match args.args.first() {
        Some(GenericArgument::Type(inner)) => Some(WrapperData {
            inner: inner.clone(),
        }),
        _ => None,
    }
}

fn expand_reference(reference: &ReferenceData) -> TokenStream2 {
    match reference {
        ReferenceData::Id(id) => quote! { #id },
        ReferenceData::Class(path) => quote! { ::injecta::id::ServiceRef::class::<#path>() },
    }
}

fn expand_service_implementation(
    self_type: &Ident,
    fields: &[FieldData],
    attr_data: &AttributeData,
) -> TokenStream2 {
    let name = LitStr::new(&self_type.to_string(), self_type.span());

    let with_id = attr_data.id.as_ref().map(|id| quote! { .with_id(#id) });
    let depends_on = attr_data.dependencies.iter().map(|dep| {
        let dep = expand_reference(dep);
        quote! { .depends_on(#dep) }
    });
    let with_decorator = attr_data
        .decorator
        .as_ref()
        .map(|decorator| quote! { .with_decorator(#decorator) });
    let with_factory = attr_data
        .factory
        .as_ref()
        .map(|factory| quote! { .with_factory(#factory) });

    let initializers = fields.iter().map(expand_field_initializer);
    let assignments = fields.iter().filter_map(expand_field_assignment);

    quote! {
        impl ::injecta::injectable::Service for #self_type {
            const NAME: &'static str = #name;
        }

        impl ::injecta::injectable::Injectable for #self_type {
            fn declaration() -> ::injecta::injectable::Declaration<Self> {
                ::injecta::injectable::Declaration::new()
                    #with_id
                    #(#depends_on)*
                    #with_decorator
                    #with_factory
            }

            #[allow(unused_variables)]
            fn construct(
                args: &mut ::injecta::injectable::Arguments,
                injector: &dyn ::injecta::container::injector::Injector,
            ) -> ::std::result::Result<Self, ::injecta::container::injector::InjectorError> {
                ::std::result::Result::Ok(Self {
                    #(#initializers,)*
                })
            }
        }

        impl ::injecta::binder::FieldHost for #self_type {
            fn host_name(&self) -> &'static str {
                <Self as ::injecta::injectable::Service>::NAME
            }

            #[allow(unused_variables)]
            fn assign(
                &mut self,
                field: &str,
                value: ::injecta::container::Instance,
            ) -> ::std::result::Result<(), ::injecta::binder::BindError> {
                let host = <Self as ::injecta::injectable::Service>::NAME;
                match field {
                    #(#assignments)*
                    _ => ::std::result::Result::Err(
                        ::injecta::binder::BindError::unknown_field(host, field),
                    ),
                }
            }
        }

        ::injecta::inventory::submit! {
            ::injecta::catalog::Declared::new::<#self_type>()
        }
    }
}

fn expand_field_initializer(field: &FieldData) -> TokenStream2 {
    let member = &field.member;
    let ty = &field.ty;

    let value = match (&field.kind, &field.wrapper) {
        (FieldKind::Positional { position }, Some(wrapper)) => {
            let inner = &wrapper.inner;
            quote! {
                ::std::convert::Into::into(
                    args.take::<#inner>(<Self as ::injecta::injectable::Service>::NAME, #position)?
                )
            }
        }
        (FieldKind::Positional { position }, _) => quote! {
            args.take_cloned::<#ty>(<Self as ::injecta::injectable::Service>::NAME, #position)?
        },
        (FieldKind::Injected { inject, inner }, _) => {
            let key = match &field.name {
                Some(name) => name.clone(),
                None => quote!(#member).to_string(),
            };
            let resolving = match inject {
                InjectData::Bare => None,
                InjectData::Reference(reference) => {
                    let reference = expand_reference(reference);
                    Some(quote! { .resolving(#reference) })
                }
            };
            quote! {
                ::std::convert::Into::into(
                    ::injecta::annotation::FieldDescriptor::<#inner>::new(#key)
                        #resolving
                        .initialize(injector)?
                )
            }
        }
    };

    quote! { #member: #value }
}

fn expand_field_assignment(field: &FieldData) -> Option<TokenStream2> {
    let name = field.name.as_ref()?;
    let inner = &field.wrapper.as_ref()?.inner;
    let member = &field.member;

    Some(quote! {
        #name => {
            self.#member = ::std::convert::Into::into(
                ::injecta::binder::downcast_field::<#inner>(host, field, value)?
            );
            ::std::result::Result::Ok(())
        }
    })
}

use proc_macro::TokenStream;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::token::Comma;
use syn::{bracketed, Attribute, Error as SynError, Ident, LitStr, Meta, Path, Result as SynResult, Token};

/// The arguments of `#[service(...)]`.
#[derive(Debug, Default)]
pub struct AttributeData {
    pub id: Option<LitStr>,
    pub dependencies: Vec<ReferenceData>,
    pub decorator: Option<Path>,
    pub factory: Option<Path>,
}

/// A service reference written in an attribute: a string identifier or a
/// service type.
#[derive(Debug)]
pub enum ReferenceData {
    Id(LitStr),
    Class(Path),
}

/// The arguments of `#[inject]` on a field.
#[derive(Debug)]
pub enum InjectData {
    Bare,
    Reference(ReferenceData),
}

impl Parse for ReferenceData {
    fn parse(input: ParseStream) -> SynResult<Self> {
        if input.peek(LitStr) {
            Ok(Self::Id(input.parse()?))
        } else {
            Ok(Self::Class(input.parse()?))
        }
    }
}

impl Parse for AttributeData {
    fn parse(input: ParseStream) -> SynResult<Self> {
        let mut data = AttributeData::default();
        let mut first = true;
        let mut has_deps = false;

        while !input.is_empty() {
            if input.peek(LitStr) {
                let id: LitStr = input.parse()?;
                if !first {
                    return Err(SynError::new(
                        id.span(),
                        "the service identifier should come first",
                    ));
                }
                data.id = Some(id);
            } else {
                let option: Ident = input.parse()?;
                input.parse::<Token![=]>()?;

                if option == "deps" {
                    if has_deps {
                        return Err(duplicated(&option));
                    }
                    let content;
                    bracketed!(content in input);
                    let deps = Punctuated::<ReferenceData, Comma>::parse_terminated(&content)?;
                    data.dependencies = deps.into_iter().collect();
                    has_deps = true;
                } else if option == "decorator" {
                    if data.decorator.is_some() {
                        return Err(duplicated(&option));
                    }
                    data.decorator = Some(input.parse()?);
                } else if option == "factory" {
                    if data.factory.is_some() {
                        return Err(duplicated(&option));
                    }
                    data.factory = Some(input.parse()?);
                } else {
                    return Err(SynError::new(
                        option.span(),
                        "expects `deps = [...]`, `decorator = path` or `factory = path`",
                    ));
                }
            }

            first = false;
            if !input.is_empty() {
                input.parse::<Comma>()?;
            }
        }

        Ok(data)
    }
}

fn duplicated(option: &Ident) -> SynError {
    SynError::new(option.span(), format!("`{option}` is given more than once"))
}

pub fn parse_attributes(attr: TokenStream) -> SynResult<AttributeData> {
    syn::parse::<AttributeData>(attr)
}

pub fn is_inject_attribute(attr: &Attribute) -> bool {
    attr.path().is_ident("inject")
}

pub fn parse_inject_attribute(attr: &Attribute) -> SynResult<InjectData> {
    match &attr.meta {
        Meta::Path(_) => Ok(InjectData::Bare),
        Meta::List(list) => list.parse_args::<ReferenceData>().map(InjectData::Reference),
        Meta::NameValue(nv) => Err(SynError::new_spanned(
            nv,
            "expects `#[inject]`, `#[inject(\"id\")]` or `#[inject(Type)]`",
        )),
    }
}

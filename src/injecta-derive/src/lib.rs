mod attrs;
mod impls;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use syn::Result as SynResult;

/// Declares a struct as a container service.
///
/// Accepted forms:
///
/// - `#[service]`
/// - `#[service("id")]`
/// - `#[service("id", deps = ["other", OtherType], decorator = path, factory = path)]`
/// - `#[service(deps = [...])]`
///
/// Fields marked with `#[inject]`, `#[inject("id")]` or `#[inject(Type)]`
/// are resolved from the container whenever the struct is constructed. The
/// remaining fields are positional constructor arguments, filled in order by
/// the declared dependencies or by the caller of `Container::instantiate`.
#[proc_macro_attribute]
pub fn service(attr: TokenStream, item: TokenStream) -> TokenStream {
    match service_impl(attr, item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

fn service_impl(attr: TokenStream, item: TokenStream) -> SynResult<TokenStream2> {
    let attr_data = attrs::parse_attributes(attr)?;
    let expanded = impls::expand_service(item, attr_data)?;
    Ok(expanded)
}

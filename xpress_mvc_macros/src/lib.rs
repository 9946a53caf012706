use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, FnArg, ImplItem, ItemImpl, Visibility};

/// Generates the `Controller` action table for an inherent impl block.
///
/// Every `pub fn` that takes a receiver plus exactly one request argument
/// becomes an action reachable as `"Type->method"`. Its return value must
/// implement `IntoResponse`.
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct PostsController;
///
/// #[controller]
/// impl PostsController {
///     pub fn index(&mut self, req: &mut Request) -> Response {
///         Response::ok(json!({ "page": req.param_str("page") }))
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn controller(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        let attr = proc_macro2::TokenStream::from(attr);
        return syn::Error::new_spanned(attr, "#[controller] takes no arguments")
            .to_compile_error()
            .into();
    }
    let input = parse_macro_input!(item as ItemImpl);

    if let Some((_, path, _)) = &input.trait_ {
        return syn::Error::new_spanned(path, "#[controller] must be placed on an inherent impl")
            .to_compile_error()
            .into();
    }

    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();

    let actions: Vec<_> = input
        .items
        .iter()
        .filter_map(|item| match item {
            ImplItem::Fn(f) => Some(f),
            _ => None,
        })
        .filter(|f| matches!(f.vis, Visibility::Public(_)))
        .filter(|f| {
            let inputs = &f.sig.inputs;
            inputs.len() == 2 && matches!(inputs.first(), Some(FnArg::Receiver(_)))
        })
        .map(|f| f.sig.ident.clone())
        .collect();

    let names: Vec<String> = actions.iter().map(|ident| ident.to_string()).collect();

    let arms = actions.iter().zip(names.iter()).map(|(ident, name)| {
        quote! {
            #name => {
                let action: ::xpress_mvc::controller::Action<Self> =
                    |this: &mut Self, req: &mut ::xpress_mvc::Request| {
                        ::xpress_mvc::IntoResponse::into_response(this.#ident(req))
                    };
                ::std::option::Option::Some(action)
            }
        }
    });

    let expanded = quote! {
        #input

        impl #impl_generics ::xpress_mvc::controller::Controller for #self_ty #where_clause {
            fn action(name: &str) -> ::std::option::Option<::xpress_mvc::controller::Action<Self>> {
                match name {
                    #(#arms)*
                    _ => ::std::option::Option::None,
                }
            }

            fn actions() -> &'static [&'static str] {
                &[#(#names),*]
            }
        }
    };
    TokenStream::from(expanded)
}

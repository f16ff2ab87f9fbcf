use darling::{FromDeriveInput, FromField, FromMeta, ast::Data, util::Ignored};
use proc_macro2::{Ident, TokenStream};
use quote::{ToTokens, quote};
use syn::{DeriveInput, Generics, Index, Member, Path, WherePredicate, parse_quote};

#[derive(FromMeta)]
struct PathOverrides {
    #[darling(default = "PathOverrides::default_merge")]
    merge: Path,
}

impl Default for PathOverrides {
    fn default() -> Self {
        Self {
            merge: Self::default_merge(),
        }
    }
}

impl PathOverrides {
    fn default_merge() -> Path {
        parse_quote!(::loki_operator::config::merge)
    }
}

#[derive(FromDeriveInput)]
#[darling(attributes(merge), supports(struct_any))]
struct MergeInput {
    ident: Ident,
    generics: Generics,
    data: Data<Ignored, MergeField>,
    #[darling(default)]
    path_overrides: PathOverrides,
    #[darling(default)]
    bound: Option<Vec<WherePredicate>>,
}

#[derive(FromField)]
struct MergeField {
    ident: Option<Ident>,
}

pub fn derive(input: DeriveInput) -> TokenStream {
    let MergeInput {
        ident,
        mut generics,
        data,
        path_overrides: PathOverrides { merge: merge_mod },
        bound,
    } = match MergeInput::from_derive_input(&input) {
        Ok(input) => input,
        Err(err) => return err.write_errors(),
    };

    // `supports(struct_any)` already rejected enums
    let fields = data.take_struct().map(|f| f.fields).unwrap_or_default();

    let body = if fields.is_empty() {
        quote! { let _ = defaults; }
    } else {
        fields
            .into_iter()
            .enumerate()
            .map(|(index, field)| {
                let member = match field.ident {
                    Some(ident) => Member::Named(ident),
                    None => Member::Unnamed(Index::from(index)),
                }
                .into_token_stream();
                quote! {
                    #merge_mod::Merge::merge(&mut self.#member, &defaults.#member);
                }
            })
            .collect::<TokenStream>()
    };

    if let Some(bound) = bound {
        generics.make_where_clause().predicates.extend(bound);
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    quote! {
        impl #impl_generics #merge_mod::Merge for #ident #ty_generics #where_clause {
            fn merge(&mut self, defaults: &Self) {
                #body
            }
        }
    }
}

use darling::{FromDeriveInput, FromField, FromMeta, ast::Data, util::Ignored};
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::{DeriveInput, Generics, Path, WherePredicate, parse_quote};

#[derive(FromMeta)]
struct PathOverrides {
    #[darling(default = "PathOverrides::default_diff")]
    diff: Path,
}

impl Default for PathOverrides {
    fn default() -> Self {
        Self {
            diff: Self::default_diff(),
        }
    }
}

impl PathOverrides {
    fn default_diff() -> Path {
        parse_quote!(::loki_operator::config::diff)
    }
}

#[derive(FromDeriveInput)]
#[darling(attributes(diff), supports(struct_named, struct_unit))]
struct DiffInput {
    ident: Ident,
    generics: Generics,
    data: Data<Ignored, DiffField>,
    #[darling(default)]
    path_overrides: PathOverrides,
    #[darling(default)]
    bound: Option<Vec<WherePredicate>>,
}

#[derive(FromField)]
#[darling(attributes(diff))]
struct DiffField {
    ident: Option<Ident>,
    #[darling(default)]
    rename: Option<String>,
    #[darling(default)]
    skip: bool,
}

pub fn derive(input: DeriveInput) -> TokenStream {
    let DiffInput {
        ident,
        mut generics,
        data,
        path_overrides: PathOverrides { diff: diff_mod },
        bound,
    } = match DiffInput::from_derive_input(&input) {
        Ok(input) => input,
        Err(err) => return err.write_errors(),
    };

    let fields = data.take_struct().map(|f| f.fields).unwrap_or_default();

    let steps = fields
        .into_iter()
        .filter(|field| !field.skip)
        .filter_map(|field| {
            let ident = field.ident?;
            let segment = field.rename.unwrap_or_else(|| ident.to_string());
            Some(quote! {
                path.push(#segment);
                #diff_mod::Diff::diff(&self.#ident, &other.#ident, path, reporter);
                path.pop();
            })
        })
        .collect::<Vec<_>>();

    let body = if steps.is_empty() {
        quote! { let _ = (other, path, reporter); }
    } else {
        steps.into_iter().collect::<TokenStream>()
    };

    if let Some(bound) = bound {
        generics.make_where_clause().predicates.extend(bound);
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    quote! {
        impl #impl_generics #diff_mod::Diff for #ident #ty_generics #where_clause {
            fn diff(
                &self,
                other: &Self,
                path: &mut #diff_mod::FieldPath,
                reporter: &mut #diff_mod::DiffReporter,
            ) {
                #body
            }
        }
    }
}

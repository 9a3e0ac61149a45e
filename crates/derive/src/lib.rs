// Copyright (c) 2025 absorb contributors
// This file is licensed under the MIT, see license.md file

//! `#[derive(Element)]`: registration-time field descriptors for record
//! types absorbed by the `absorb` binding engine.
//!
//! Field attributes, mirroring source-tag conventions:
//! - `#[absorb(ns = "key")]` declares the binding key used when a session
//!   opens with tag namespace `ns`; the declared key is exclusive of the
//!   field's own name for that namespace.
//! - `#[absorb(ns = "")]` excludes the field for namespace `ns`.
//! - `#[absorb(skip)]` excludes the field from binding entirely.

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, parse_macro_input};

#[proc_macro_derive(Element, attributes(absorb))]
pub fn derive_element(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);
	expand(input).unwrap_or_else(|err| err.to_compile_error()).into()
}

fn expand(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
	let ident = &input.ident;

	if !input.generics.params.is_empty() {
		return Err(syn::Error::new_spanned(
			&input.generics,
			"#[derive(Element)] does not support generic records",
		));
	}

	let fields = match &input.data {
		Data::Struct(data) => match &data.fields {
			Fields::Named(named) => &named.named,
			_ => {
				return Err(syn::Error::new_spanned(
					ident,
					"#[derive(Element)] requires named fields",
				));
			}
		},
		_ => {
			return Err(syn::Error::new_spanned(
				ident,
				"#[derive(Element)] only supports structs",
			));
		}
	};

	let mut specs = Vec::new();
	for field in fields {
		let field_ident = field.ident.as_ref().expect("named field");
		// Raw identifiers register under their bare name (r#type -> "type").
		let name = field_ident.to_string().trim_start_matches("r#").to_string();

		let mut skip = false;
		let mut tags: Vec<(String, String)> = Vec::new();
		for attr in &field.attrs {
			if !attr.path().is_ident("absorb") {
				continue;
			}
			attr.parse_nested_meta(|meta| {
				if meta.path.is_ident("skip") {
					skip = true;
					return Ok(());
				}
				let namespace = meta
					.path
					.get_ident()
					.ok_or_else(|| meta.error("expected `namespace = \"key\"` or `skip`"))?
					.to_string();
				let key: LitStr = meta.value()?.parse()?;
				tags.push((namespace, key.value()));
				Ok(())
			})?;
		}
		if skip {
			continue;
		}

		let tag_entries = tags.iter().map(|(namespace, key)| quote! { (#namespace, #key) });
		specs.push(quote! {
			::absorb::FieldSpec {
				name: #name,
				tags: &[#(#tag_entries),*],
				set: |element, value| {
					element.#field_ident = ::absorb::FromValue::from_value(value)?;
					::std::result::Result::Ok(())
				},
			}
		});
	}

	let count = specs.len();
	Ok(quote! {
		impl ::absorb::Element for #ident {
			fn kind() -> ::absorb::ElementKind {
				::absorb::ElementKind::Record
			}

			fn fields() -> &'static [::absorb::FieldSpec<Self>] {
				static FIELDS: [::absorb::FieldSpec<#ident>; #count] = [#(#specs),*];
				&FIELDS
			}

			fn build(
				plan: &::absorb::Plan,
				row: ::std::vec::Vec<::absorb::Value>,
			) -> ::std::result::Result<Self, ::absorb::Fault> {
				::absorb::bind_record(plan, row)
			}
		}

		impl<'a> ::absorb::Destination<'a> for &'a mut #ident {
			type Elem = #ident;

			fn into_dest(self) -> ::absorb::Dest<'a, #ident> {
				::absorb::Dest::single(self)
			}
		}
	})
}

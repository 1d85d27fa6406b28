//! Derive macro for the Reflectable trait
//!
//! Generates the static descriptor table and by-name member access for a
//! struct with named fields, plus its inline record conversion and link-time
//! registration.

use crate::crate_paths::get_stowage_core_crate;
use proc_macro2::TokenStream;
use quote::quote;
use std::collections::HashSet;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, LitStr, parse_macro_input};

/// Where a member's value comes from
enum MemberSource {
	/// Stored struct field
	Field { ident: syn::Ident, readonly: bool },
	/// `&self` method declared with `#[reflect(computed = "...")]`
	Computed { method: syn::Ident },
}

struct Member {
	wire_name: String,
	source: MemberSource,
}

impl Member {
	fn is_writable(&self) -> bool {
		matches!(self.source, MemberSource::Field { readonly: false, .. })
	}
}

#[derive(Default)]
struct StructOptions {
	type_name: Option<LitStr>,
	computed: Vec<LitStr>,
}

#[derive(Default)]
struct FieldOptions {
	readonly: bool,
	skip: bool,
	rename: Option<LitStr>,
}

/// Implementation of the Reflectable derive macro
pub(crate) fn reflectable_derive_impl(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
	let input = parse_macro_input!(input as DeriveInput);
	expand(&input)
		.unwrap_or_else(syn::Error::into_compile_error)
		.into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
	let struct_name = &input.ident;

	if !input.generics.params.is_empty() {
		return Err(syn::Error::new_spanned(
			&input.generics,
			"Reflectable cannot be derived for generic types",
		));
	}

	let fields = match &input.data {
		Data::Struct(data_struct) => match &data_struct.fields {
			Fields::Named(fields) => &fields.named,
			_ => {
				return Err(syn::Error::new_spanned(
					struct_name,
					"Reflectable can only be derived for structs with named fields",
				));
			}
		},
		_ => {
			return Err(syn::Error::new_spanned(
				struct_name,
				"Reflectable can only be derived for structs",
			));
		}
	};

	let options = parse_struct_options(&input.attrs)?;
	let members = collect_members(fields, &options)?;
	let core = get_stowage_core_crate();

	let type_name = match &options.type_name {
		Some(lit) => quote!(#lit),
		None => {
			let name = struct_name.to_string();
			quote!(::core::concat!(::core::module_path!(), "::", #name))
		}
	};

	let descriptors = members.iter().map(|member| {
		let name = &member.wire_name;
		if member.is_writable() {
			quote!(#core::FieldDescriptor::read_write(#name))
		} else {
			quote!(#core::FieldDescriptor::read_only(#name))
		}
	});

	let get_field_value_impl = generate_get_field_value(&members, &core);
	let set_field_value_impl = generate_set_field_value(&members, &core);

	Ok(quote! {
		const _: () = {
			impl #core::ReflectableType for #struct_name {
				const TYPE_NAME: &'static str = #type_name;
				const FIELDS: &'static [#core::FieldDescriptor] = &[#(#descriptors),*];
			}

			impl #core::Reflectable for #struct_name {
				fn type_name(&self) -> &'static str {
					<Self as #core::ReflectableType>::TYPE_NAME
				}

				fn field_descriptors(&self) -> &'static [#core::FieldDescriptor] {
					<Self as #core::ReflectableType>::FIELDS
				}

				fn get_field_value(&self, name: &str) -> #core::ReflectResult<#core::FieldValue> {
					#get_field_value_impl
				}

				#[allow(unused_variables)]
				fn set_field_value(
					&mut self,
					name: &str,
					value: #core::FieldValue,
				) -> #core::ReflectResult<()> {
					#set_field_value_impl
				}
			}

			impl #core::ReflectValue for #struct_name {
				fn to_field_value(&self) -> #core::ReflectResult<#core::FieldValue> {
					#core::capture_record(self).map(#core::FieldValue::Record)
				}

				fn from_field_value(value: #core::FieldValue) -> #core::ReflectResult<Self> {
					#core::restore_record(value)
				}
			}

			#core::__private::inventory::submit! {
				#core::TypeRegistration::of::<#struct_name>()
			}
		};
	})
}

fn parse_struct_options(attrs: &[syn::Attribute]) -> syn::Result<StructOptions> {
	let mut options = StructOptions::default();
	for attr in attrs {
		if !attr.path().is_ident("reflect") {
			continue;
		}
		attr.parse_nested_meta(|meta| {
			if meta.path.is_ident("type_name") {
				if options.type_name.is_some() {
					return Err(meta.error("duplicate `type_name`"));
				}
				let lit: LitStr = meta.value()?.parse()?;
				if lit.value().is_empty() {
					return Err(syn::Error::new_spanned(lit, "`type_name` must not be empty"));
				}
				options.type_name = Some(lit);
				Ok(())
			} else if meta.path.is_ident("computed") {
				options.computed.push(meta.value()?.parse()?);
				Ok(())
			} else {
				Err(meta.error("expected `type_name` or `computed`"))
			}
		})?;
	}
	Ok(options)
}

fn parse_field_options(attrs: &[syn::Attribute]) -> syn::Result<FieldOptions> {
	let mut options = FieldOptions::default();
	for attr in attrs {
		if !attr.path().is_ident("reflect") {
			continue;
		}
		attr.parse_nested_meta(|meta| {
			if meta.path.is_ident("readonly") {
				options.readonly = true;
				Ok(())
			} else if meta.path.is_ident("skip") {
				options.skip = true;
				Ok(())
			} else if meta.path.is_ident("rename") {
				options.rename = Some(meta.value()?.parse()?);
				Ok(())
			} else {
				Err(meta.error("expected `readonly`, `skip` or `rename`"))
			}
		})?;
	}
	Ok(options)
}

/// Members in declaration order, computed members last
fn collect_members(
	fields: &syn::punctuated::Punctuated<syn::Field, syn::Token![,]>,
	options: &StructOptions,
) -> syn::Result<Vec<Member>> {
	let mut members = Vec::new();
	let mut seen = HashSet::new();

	for field in fields {
		let Some(ident) = field.ident.clone() else {
			continue;
		};
		let field_options = parse_field_options(&field.attrs)?;
		if field_options.skip {
			if field_options.readonly || field_options.rename.is_some() {
				return Err(syn::Error::new_spanned(
					&ident,
					"`skip` cannot be combined with other reflect options",
				));
			}
			continue;
		}
		let wire_name = match &field_options.rename {
			Some(lit) => lit.value(),
			None => ident.unraw().to_string(),
		};
		if !seen.insert(wire_name.clone()) {
			return Err(syn::Error::new_spanned(
				&ident,
				format!("duplicate member name `{}`", wire_name),
			));
		}
		members.push(Member {
			wire_name,
			source: MemberSource::Field {
				ident,
				readonly: field_options.readonly,
			},
		});
	}

	for lit in &options.computed {
		let wire_name = lit.value();
		let method: syn::Ident = lit.parse().map_err(|_| {
			syn::Error::new_spanned(lit, "`computed` must name a method of this type")
		})?;
		if !seen.insert(wire_name.clone()) {
			return Err(syn::Error::new_spanned(
				lit,
				format!("duplicate member name `{}`", wire_name),
			));
		}
		members.push(Member {
			wire_name,
			source: MemberSource::Computed { method },
		});
	}

	Ok(members)
}

fn unknown_field(core: &TokenStream) -> TokenStream {
	quote! {
		Err(#core::ReflectError::UnknownField {
			type_name: <Self as #core::ReflectableType>::TYPE_NAME.to_string(),
			field: name.to_string(),
		})
	}
}

/// Generate get_field_value method implementation
fn generate_get_field_value(members: &[Member], core: &TokenStream) -> TokenStream {
	let arms = members.iter().map(|member| {
		let name = &member.wire_name;
		let read = match &member.source {
			MemberSource::Field { ident, .. } => quote!(&self.#ident),
			MemberSource::Computed { method } => quote!(&self.#method()),
		};
		quote! {
			#name => #core::ReflectValue::to_field_value(#read),
		}
	});
	let fallback = unknown_field(core);

	quote! {
		match name {
			#(#arms)*
			_ => #fallback,
		}
	}
}

/// Generate set_field_value method implementation
fn generate_set_field_value(members: &[Member], core: &TokenStream) -> TokenStream {
	let writable_arms = members.iter().filter_map(|member| match &member.source {
		MemberSource::Field {
			ident,
			readonly: false,
		} => {
			let name = &member.wire_name;
			Some(quote! {
				#name => {
					self.#ident = #core::ReflectValue::from_field_value(value)?;
					Ok(())
				}
			})
		}
		_ => None,
	});

	let read_only: Vec<_> = members
		.iter()
		.filter(|member| !member.is_writable())
		.map(|member| member.wire_name.as_str())
		.collect();
	let read_only_arm = if read_only.is_empty() {
		quote!()
	} else {
		quote! {
			#(#read_only)|* => Err(#core::ReflectError::ReadOnlyField {
				type_name: <Self as #core::ReflectableType>::TYPE_NAME.to_string(),
				field: name.to_string(),
			}),
		}
	};
	let fallback = unknown_field(core);

	quote! {
		match name {
			#(#writable_arms)*
			#read_only_arm
			_ => #fallback,
		}
	}
}

//! Crate path resolution for generated code
//!
//! Generated impls must name `stowage-core` whether the user depends on it
//! directly or only through the `stowage` facade.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

/// Resolves the path to the stowage core object model.
///
/// # Strategy
///
/// 1. `stowage-core` itself or as a direct dependency (possibly renamed)
/// 2. `stowage` facade, which re-exports the core items at its root
/// 3. Fallback: `::stowage_core`
pub(crate) fn get_stowage_core_crate() -> TokenStream {
	use proc_macro_crate::{FoundCrate, crate_name};

	match crate_name("stowage-core") {
		Ok(FoundCrate::Itself) => return quote!(::stowage_core),
		Ok(FoundCrate::Name(name)) => {
			let ident = format_ident!("{}", name);
			return quote!(::#ident);
		}
		Err(_) => {}
	}

	match crate_name("stowage") {
		Ok(FoundCrate::Itself) => quote!(::stowage),
		Ok(FoundCrate::Name(name)) => {
			let ident = format_ident!("{}", name);
			quote!(::#ident)
		}
		Err(_) => quote!(::stowage_core),
	}
}

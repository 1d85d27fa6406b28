//! Procedural macros for stowage
//!
//! Provides `#[derive(Reflectable)]`, which generates the field-descriptor
//! table and by-name member access used by the stowage codecs.

use proc_macro::TokenStream;

mod crate_paths;
mod reflectable_derive;

/// Derive `Reflectable`, `ReflectableType` and `ReflectValue` for a struct
///
/// The struct must have named fields, no generic parameters and a `Default`
/// implementation. Every field type must implement `ReflectValue`. The type is
/// also submitted for discovery through `TypeRegistry::discovered()`.
///
/// # Attributes
///
/// Struct level:
/// - `#[reflect(type_name = "jobs.Email")]`: override the type descriptor
///   (defaults to `module_path!()::StructName`)
/// - `#[reflect(computed = "method")]`: expose `fn method(&self) -> impl ReflectValue`
///   as a read-only member; may be repeated
///
/// Field level:
/// - `#[reflect(readonly)]`: member is read but never assigned on load
/// - `#[reflect(skip)]`: not a member; keeps its `Default` value on load
/// - `#[reflect(rename = "name")]`: member name used on the wire
///
/// # Examples
///
/// ```ignore
/// use stowage::Reflectable;
///
/// #[derive(Default, Reflectable)]
/// #[reflect(type_name = "jobs.Window", computed = "length")]
/// struct Window {
///     start: u32,
///     end: u32,
///     #[reflect(skip)]
///     cache: Option<String>,
/// }
///
/// impl Window {
///     fn length(&self) -> u32 {
///         self.end - self.start
///     }
/// }
/// ```
#[proc_macro_derive(Reflectable, attributes(reflect))]
pub fn derive_reflectable(input: TokenStream) -> TokenStream {
	reflectable_derive::reflectable_derive_impl(input)
}

use darling::Error;
use darling::ast::NestedMeta;
use quote::quote;
use syn::{Data, DeriveInput, Fields, ItemStruct, parse_macro_input};

use proc_macro::TokenStream;

/// Derives `WriteBytesLe` by writing every field in declaration order.
///
/// The generated impl has no padding, so the struct's field order is its
/// on-disk layout.
#[proc_macro_derive(ToBytes)]
pub fn derive_to_bytes(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident;

    let fields: Vec<syn::Member> = match input.data {
        Data::Struct(ref s) => match s.fields {
            Fields::Named(ref nf) => nf
                .named
                .iter()
                .filter_map(|f| f.ident.clone())
                .map(Into::into)
                .collect(),
            Fields::Unnamed(ref uf) => uf
                .unnamed
                .iter()
                .enumerate()
                .map(|(i, _)| syn::Index::from(i).into())
                .collect(),
            Fields::Unit => Vec::new(),
        },
        _ => {
            return TokenStream::from(
                syn::Error::new_spanned(&name, "ToBytes can only be derived for structs")
                    .to_compile_error(),
            );
        }
    };

    let expanded = quote! {
        impl crate::utils::byteorder::WriteBytesLe for #name {
            fn write_le(&self, dst: &mut Vec<u8>) {
                #( crate::utils::byteorder::WriteBytesLe::write_le(&self.#fields, dst); )*
            }
        }
    };

    TokenStream::from(expanded)
}

/// Tags a header struct with its four-byte block type.
///
/// ```ignore
/// #[block_type(b"VIDF")]
/// #[derive(ToBytes)]
/// pub struct VideoFrameHeader { .. }
/// ```
///
/// Adds an inherent `BLOCK_TYPE` constant and a `MetadataBlock` impl whose
/// `block_bytes` is the little-endian encoding of the struct.
#[proc_macro_attribute]
pub fn block_type(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = match NestedMeta::parse_meta_list(attr.into()) {
        Ok(v) => v,
        Err(e) => {
            return TokenStream::from(Error::from(e).write_errors());
        }
    };

    let Some(first) = args.first() else {
        return TokenStream::from(
            Error::custom("block_type expects a byte string, e.g. b\"VIDF\"").write_errors(),
        );
    };

    let type_bytes = match first {
        NestedMeta::Lit(syn::Lit::ByteStr(bs)) => bs.value(),
        other => {
            return TokenStream::from(
                syn::Error::new_spanned(other, "block_type expects a byte string, e.g. b\"VIDF\"")
                    .to_compile_error(),
            );
        }
    };

    if type_bytes.len() != 4 {
        return TokenStream::from(
            syn::Error::new_spanned(first, "block_type expects 4 bytes").to_compile_error(),
        );
    }
    let type_bytes_tokens = {
        let b = type_bytes;
        quote! {[#(#b),*]}
    };

    let input = parse_macro_input!(item as ItemStruct);
    let name = &input.ident;

    let expanded = quote! {
        #input

        impl #name {
            pub const BLOCK_TYPE: [u8; 4] = #type_bytes_tokens;
        }

        impl crate::structs::headers::MetadataBlock for #name {
            fn block_type(&self) -> &[u8; 4] {
                &Self::BLOCK_TYPE
            }

            fn block_bytes(&self) -> Vec<u8> {
                let mut vec = Vec::new();
                crate::utils::byteorder::WriteBytesLe::write_le(self, &mut vec);
                vec
            }
        }
    };
    TokenStream::from(expanded)
}

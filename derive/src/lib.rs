use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod from_digits;

#[proc_macro_derive(FromDigits, attributes(digits, completed))]
pub fn derive_from_digits(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match from_digits::expand_from_digits(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error().into(),
    }
}

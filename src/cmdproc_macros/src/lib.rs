extern crate proc_macro;

mod commandsgen;

use proc_macro::TokenStream;
use commandsgen::define_commands_impl;

/// Generate a static command table module.
///
/// ```ignore
/// define_commands! {
///     mod commands;
///     "INP:b?, OUT:b?, OUT:b=b, IDN?, BID=s, DFU"
/// }
///
/// define_commands! {
///     mod commands;
///     path = "src/commands.cfg"
/// }
/// ```
///
/// See the `commandsgen` module docs for the descriptor table.
#[proc_macro]
pub fn define_commands(input: TokenStream) -> TokenStream {
    define_commands_impl(input)
}

//! # Command Table Macro
//!
//! Generates a no_std, zero-heap command table for `cmdproc_core` from a
//! compact descriptor DSL that mirrors the wire grammar itself.
//!
//! ## Entry syntax
//! One entry per mnemonic+shape pair, separated by commas or newlines:
//!
//! ```text
//! MNEMONIC[:LEFT]          Do form, e.g.    DFU
//! MNEMONIC[:LEFT]?[RIGHT]  Query form, e.g. DIR:b?
//! MNEMONIC[:LEFT]=[RIGHT]  Set form, e.g.   OUT:b=b
//! ```
//!
//! `LEFT` and `RIGHT` are descriptor strings, one character per argument.
//! Text after `#` on a line is a comment.
//!
//! ## Descriptor Table
//!
//! +------+-------+   +------+------+   +------+------+
//! | Char | Type  |   | Char | Type |   | Char | Type |
//! +------+-------+   +------+------+   +------+------+
//! | b    | u8    |   | w    | u16  |   | s    | str  |
//! | B    | i8    |   | W    | i16  |   |      |      |
//! +------+-------+   +------+------+   +------+------+
//!
//! Examples:
//! - "OUT:b=b" => one u8 before `=`, one u8 after
//! - "BID=s"   => no left arguments, one string after `=`
//!
//! ## Macro input forms
//! - DSL: `define_commands!(mod m; "IDN?, OUT:b=b");`
//! - File: `define_commands!(mod m; path = "src/commands.cfg");`, resolved
//!   relative to the invoking crate's manifest directory.
//!
//! ## Generated items
//! `COMMAND_SPECS`, `NUM_COMMANDS`, `MAX_MNEMONIC_LEN`, `MAX_LEFT_ARGS`,
//! `MAX_RIGHT_ARGS`, `COMMAND_DESCRIPTORS`, `DESCRIPTOR_HELP`, `registry()`,
//! `get_commands()` and `get_datatypes()`.
//!
//! Malformed entries, duplicates and limits exceeded against
//! `cmdproc_config` are compile errors.

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{
    Ident, LitStr, Result, Token,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

use cmdproc_config::{
    ARG_DELIMITER, LEFTARGS_START_CH, MAX_N_LEFTARGS, MAX_N_RIGHTARGS, MNEM_MAX_LEN, QUERY_OP_CH,
    SET_OP_CH,
};

/// A std-like alias used locally during DSL parsing.
type StdResult<T, E> = std::result::Result<T, E>;

/// Descriptor character to type mapping, emitted into the generated module.
const DESCRIPTOR_HELP: &str = "b:u8 | w:u16 | B:i8 | W:i16 | s:str\n";

/// Characters a mnemonic may never contain.
const RESERVED_CHARS: [u8; 5] = [LEFTARGS_START_CH, QUERY_OP_CH, SET_OP_CH, ARG_DELIMITER, b'#'];

/// Parsed macro input: `mod <ident>;` followed by a DSL literal or `path = "<file>"`.
struct CommandMacroInput {
    mod_ident: Ident,
    body: Body,
}

enum Body {
    Dsl(LitStr),
    File(LitStr),
}

impl Parse for CommandMacroInput {
    fn parse(input: ParseStream) -> Result<Self> {
        // Expect: `mod <ident>;`
        input.parse::<Token![mod]>()?;
        let mod_ident: Ident = input.parse()?;
        input.parse::<Token![;]>()?;

        let body = if input.peek(LitStr) {
            Body::Dsl(input.parse()?)
        } else {
            let key: Ident = input.parse()?;
            if key != "path" {
                return Err(syn::Error::new(
                    key.span(),
                    "expected a descriptor string or `path = \"...\"`",
                ));
            }
            input.parse::<Token![=]>()?;
            Body::File(input.parse()?)
        };
        let _ = input.parse::<Option<Token![;]>>()?;
        Ok(CommandMacroInput { mod_ident, body })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Do,
    Query,
    Set,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arg {
    Str,
    U8,
    U16,
    I8,
    I16,
}

impl Arg {
    fn from_descriptor(ch: char) -> Option<Self> {
        match ch {
            'b' => Some(Arg::U8),
            'w' => Some(Arg::U16),
            'B' => Some(Arg::I8),
            'W' => Some(Arg::I16),
            's' => Some(Arg::Str),
            _ => None,
        }
    }

    fn descriptor(self) -> char {
        match self {
            Arg::U8 => 'b',
            Arg::U16 => 'w',
            Arg::I8 => 'B',
            Arg::I16 => 'W',
            Arg::Str => 's',
        }
    }
}

/// One table entry before code generation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct EntryDef {
    mnemonic: String,
    shape: Shape,
    left: Vec<Arg>,
    right: Vec<Arg>,
}

impl EntryDef {
    /// Canonical descriptor, e.g. `OUT:b=b`.
    fn descriptor(&self) -> String {
        let mut s = self.mnemonic.clone();
        if !self.left.is_empty() {
            s.push(LEFTARGS_START_CH as char);
            s.extend(self.left.iter().map(|a| a.descriptor()));
        }
        match self.shape {
            Shape::Do => {}
            Shape::Query => s.push(QUERY_OP_CH as char),
            Shape::Set => s.push(SET_OP_CH as char),
        }
        s.extend(self.right.iter().map(|a| a.descriptor()));
        s
    }
}

/// Parses the whole DSL text into table entries.
fn parse_dsl(src: &str) -> StdResult<Vec<EntryDef>, String> {
    let mut entries: Vec<EntryDef> = Vec::new();
    for line in src.lines() {
        let line = line.split_once('#').map_or(line, |(code, _)| code);
        for item in line.split(ARG_DELIMITER as char) {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            let entry = parse_entry(item)?;
            if entries.iter().any(|e| e.mnemonic == entry.mnemonic && e.shape == entry.shape) {
                return Err(format!("duplicate command `{}`", item));
            }
            entries.push(entry);
        }
    }
    if entries.is_empty() {
        return Err("no commands defined".into());
    }
    Ok(entries)
}

/// Parses one entry with the same structural decisions the runtime parser makes.
fn parse_entry(item: &str) -> StdResult<EntryDef, String> {
    let (shape, left, right) = if let Some((l, r)) = item.split_once(QUERY_OP_CH as char) {
        (Shape::Query, l, r)
    } else if let Some((l, r)) = item.split_once(SET_OP_CH as char) {
        (Shape::Set, l, r)
    } else {
        (Shape::Do, item, "")
    };
    let (mnemonic, left_desc) = match left.split_once(LEFTARGS_START_CH as char) {
        Some((m, d)) => (m.trim(), d.trim()),
        None => (left.trim(), ""),
    };

    validate_mnemonic(mnemonic, item)?;
    let left = parse_descriptor(left_desc, item)?;
    let right = parse_descriptor(right.trim(), item)?;

    if left.len() > MAX_N_LEFTARGS {
        return Err(format!(
            "`{}` declares {} left arguments, at most {} are supported",
            item,
            left.len(),
            MAX_N_LEFTARGS
        ));
    }
    if right.len() > MAX_N_RIGHTARGS {
        return Err(format!(
            "`{}` declares {} right arguments, at most {} are supported",
            item,
            right.len(),
            MAX_N_RIGHTARGS
        ));
    }

    Ok(EntryDef { mnemonic: mnemonic.to_string(), shape, left, right })
}

fn validate_mnemonic(mnemonic: &str, item: &str) -> StdResult<(), String> {
    if mnemonic.is_empty() {
        return Err(format!("`{}` has an empty mnemonic", item));
    }
    if mnemonic.len() > MNEM_MAX_LEN {
        return Err(format!(
            "mnemonic `{}` is longer than {} characters",
            mnemonic, MNEM_MAX_LEN
        ));
    }
    if let Some(bad) = mnemonic
        .bytes()
        .find(|b| !b.is_ascii_graphic() || RESERVED_CHARS.contains(b))
    {
        return Err(format!(
            "mnemonic `{}` contains invalid character {:?}",
            mnemonic, bad as char
        ));
    }
    Ok(())
}

fn parse_descriptor(desc: &str, item: &str) -> StdResult<Vec<Arg>, String> {
    desc.chars()
        .map(|ch| {
            Arg::from_descriptor(ch)
                .ok_or_else(|| format!("unknown descriptor character {:?} in `{}`", ch, item))
        })
        .collect()
}

fn shape_tokens(shape: Shape) -> TokenStream2 {
    match shape {
        Shape::Do => quote! { ::cmdproc_core::registry::CommandShape::Do },
        Shape::Query => quote! { ::cmdproc_core::registry::CommandShape::Query },
        Shape::Set => quote! { ::cmdproc_core::registry::CommandShape::Set },
    }
}

fn arg_tokens(arg: Arg) -> TokenStream2 {
    match arg {
        Arg::Str => quote! { ::cmdproc_core::args::ArgType::String },
        Arg::U8 => quote! { ::cmdproc_core::args::ArgType::UInt8 },
        Arg::U16 => quote! { ::cmdproc_core::args::ArgType::UInt16 },
        Arg::I8 => quote! { ::cmdproc_core::args::ArgType::Int8 },
        Arg::I16 => quote! { ::cmdproc_core::args::ArgType::Int16 },
    }
}

/// Emits the table module for already validated entries.
///
/// `track` is an optional file path; it is pulled in with `include_str!` so
/// edits to a descriptor file trigger a rebuild.
fn expand(mod_ident: &Ident, entries: &[EntryDef], track: Option<&str>) -> TokenStream2 {
    let spec_inits: Vec<TokenStream2> = entries
        .iter()
        .map(|e| {
            let mnemonic = LitStr::new(&e.mnemonic, Span::call_site());
            let shape = shape_tokens(e.shape);
            let left = e.left.iter().copied().map(arg_tokens);
            let right = e.right.iter().copied().map(arg_tokens);
            quote! {
                ::cmdproc_core::registry::CommandSpec {
                    mnemonic: #mnemonic,
                    shape: #shape,
                    left: &[ #( #left ),* ],
                    right: &[ #( #right ),* ],
                }
            }
        })
        .collect();

    // Pairs of (mnemonic, descriptor) for listings and help output
    let descriptor_pairs: Vec<TokenStream2> = entries
        .iter()
        .map(|e| {
            let mnemonic = LitStr::new(&e.mnemonic, Span::call_site());
            let descriptor = LitStr::new(&e.descriptor(), Span::call_site());
            quote! { (#mnemonic, #descriptor) }
        })
        .collect();

    let num_commands = entries.len();
    let max_mnemonic_len = entries.iter().map(|e| e.mnemonic.len()).max().unwrap_or(0);
    let max_left_args = entries.iter().map(|e| e.left.len()).max().unwrap_or(0);
    let max_right_args = entries.iter().map(|e| e.right.len()).max().unwrap_or(0);

    let tracking = track.map(|path| {
        let path = LitStr::new(path, Span::call_site());
        quote! { const _: &str = include_str!(#path); }
    });

    quote! {
        #[allow(dead_code)]
        pub mod #mod_ident {

            //! Generated by `define_commands!`. See the macro docs for the descriptor table.

            #tracking

            /// Static command table, in declaration order.
            pub static COMMAND_SPECS: &[::cmdproc_core::registry::CommandSpec] = &[
                #( #spec_inits ),*
            ];

            /// Number of mnemonic+shape entries.
            pub const NUM_COMMANDS: usize = #num_commands;

            /// Longest declared mnemonic.
            pub const MAX_MNEMONIC_LEN: usize = #max_mnemonic_len;

            /// Largest left argument count across all entries.
            pub const MAX_LEFT_ARGS: usize = #max_left_args;

            /// Largest right argument count across all entries.
            pub const MAX_RIGHT_ARGS: usize = #max_right_args;

            /// Static pairs of (mnemonic, canonical descriptor).
            pub static COMMAND_DESCRIPTORS: &[(&str, &str)] = &[
                #( #descriptor_pairs ),*
            ];

            /// Descriptor character to type mapping (for help/diagnostics).
            pub static DESCRIPTOR_HELP: &str = #DESCRIPTOR_HELP;

            /// Registry view over `COMMAND_SPECS`.
            #[inline(always)]
            pub fn registry() -> ::cmdproc_core::registry::Registry {
                ::cmdproc_core::registry::Registry::new(COMMAND_SPECS)
            }

            /// Return (mnemonic, descriptor) pairs. No allocations.
            #[inline(always)]
            pub fn get_commands() -> &'static [(&'static str, &'static str)] {
                COMMAND_DESCRIPTORS
            }

            /// Return descriptor help string (character to type mapping).
            #[inline(always)]
            pub fn get_datatypes() -> &'static str {
                DESCRIPTOR_HELP
            }
        }
    }
}

/// Generate a static command table module from the DSL or a descriptor file.
pub fn define_commands_impl(input: TokenStream) -> TokenStream {
    let CommandMacroInput { mod_ident, body } = parse_macro_input!(input as CommandMacroInput);

    let (lit, src, track) = match body {
        Body::Dsl(lit) => {
            let src = lit.value();
            (lit, src, None)
        }
        Body::File(lit) => {
            // Resolve path relative to the crate invoking the macro
            let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_default();
            let full_path = std::path::Path::new(&manifest_dir).join(lit.value());
            match std::fs::read_to_string(&full_path) {
                Ok(src) => (lit, src, Some(full_path.to_string_lossy().into_owned())),
                Err(e) => {
                    let msg = format!("failed to read command descriptor file {:?}: {}", full_path, e);
                    return syn::Error::new(lit.span(), msg).to_compile_error().into();
                }
            }
        }
    };

    match parse_dsl(&src) {
        Ok(entries) => expand(&mod_ident, &entries, track.as_deref()).into(),
        Err(msg) => syn::Error::new(lit.span(), msg).to_compile_error().into(),
    }
}

//! Command table of the board, generated from `commands.cfg`.

use cmdproc_core::define_commands;

define_commands! {
    mod table;
    path = "src/commands.cfg"
}

pub use table::*;

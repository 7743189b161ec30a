//! LSP capability implementations

pub mod code_lens;
pub mod completion;
pub mod diagnostics;
pub mod folding;
pub mod rename;
pub mod symbols;

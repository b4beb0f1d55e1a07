// SPDX-License-Identifier: Apache-2.0

//! Declaration indexing for SystemVerilog/Verilog source trees.
//!
//! Files are scanned for `module`, `class`, `interface`, `package` and
//! `program` declarations; module headers are kept so that their parameter
//! and port lists can be turned into instantiation templates.

pub mod cancellation;
pub mod comment_scanner;
pub mod decl_matcher;
pub mod header;
pub mod instantiation;
pub mod port_list;
pub mod source_tree;
pub mod span;
pub mod svindex_error;
pub mod symbol_index;

pub use cancellation::CancellationToken;
pub use decl_matcher::{DeclKind, DeclarationMatch, DeclarationMatcher, find_declarations};
pub use instantiation::{TemplateOptions, synthesize};
pub use port_list::{PortList, parse_port_list};
pub use source_tree::{FsSourceTree, SourceTree};
pub use span::{Pos, Span};
pub use svindex_error::SvIndexError;
pub use symbol_index::{
    BuildOutcome, DeclarationSymbol, EMPTY_QUERY_LIMIT, IndexOptions, IndexState, ModuleHeader,
    SymbolIndex,
};

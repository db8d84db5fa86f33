//! CDL (Common Data form Language) front end.
//!
//! CDL is the text notation for classic netCDF datasets written by
//! `ncdump` and read by `ncgen`. A document declares dimensions, typed
//! variables over those dimensions, attributes and literal data.
//!
//! # Grammar Overview
//!
//! ```text
//! dataset     = netcdf name '{' { section } '}'
//! netcdf      = "netcdf" | "NETCDF" | "netCDF"
//! section     = "dimensions:" { dim_list ';' }
//!             | "variables:" { (var_list | attribute) ';' }
//!             | "data:" { name '=' constants ';' }
//!
//! dim_list    = dim { ',' dim }
//! dim         = name '=' (number | "unlimited")
//! var_list    = type var { ',' var }
//! var         = name [ '(' [ name { ',' name } ] ')' ]
//! attribute   = [ name ] ':' attr_name '=' constants
//! constants   = constant { ',' constant }
//! constant    = number | string | char | '_'
//!
//! type        = "byte" | "char" | "short" | "int" | "integer" | "long"
//!             | "float" | "real" | "double"
//! number      = ['+'|'-'] (decimal | octal | hex | "NaN" | "Inf" | "Infinity") [suffix]
//! decimal     = digit* ['.' digit*] [('e'|'E') ['+'|'-'] digit+]
//! octal       = '0' octal_digit+
//! hex         = '0' ('x'|'X') hex_digit+
//! suffix      = 'b' | 's' | 'l' | 'f' | 'd'     (either case)
//! string      = '"' { char | escape } '"'
//! char        = "'" (char | escape) "'"
//! escape      = '\' (n|t|r|a|b|f|v|'\'|'"'|"'" | octal_digit{1,3} | 'x' hex_digit{1,2})
//! ```
//!
//! Comments run from `//` to the end of the line. Sections may appear in
//! any order and more than once.
//!
//! # Example
//!
//! ```text
//! netcdf sample {
//! dimensions:
//!     lev = 1, lat = 2, lon = 3 ;
//! variables:
//!     int tas(lev, lat, lon) ;
//!         tas:units = "K" ;
//!     float height(lev) ;
//!
//!     // global attributes:
//!     :comment = "example" ;
//! data:
//!     tas = 0, 1, 2, 3, 4, 5 ;
//!     height = 10.0f ;
//! }
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::CdlAst;
pub use lexer::{Checkpoint, Keyword, Lexer, LiteralValue, Suffix, Token, TokenKind, TokenValue};
pub use parser::Parser;

use crate::config::ParseOptions;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::session::{ParseOutput, ParseSession};

/// Parse a CDL document with default options.
pub fn parse(input: &str) -> Result<ParseOutput> {
    parse_with_options(input, ParseOptions::default())
}

/// Parse a CDL document.
pub fn parse_with_options(input: &str, options: ParseOptions) -> Result<ParseOutput> {
    ParseSession::new(input, options)?.run()
}

/// Parse a CDL document from a file.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path, options: ParseOptions) -> Result<ParseOutput> {
    let content =
        std::fs::read_to_string(path).map_err(|e| crate::error::CdlError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
    parse_with_options(&content, options)
}

/// Build the raw parse tree only, reporting into `diagnostics`.
pub fn parse_tree(input: &str, diagnostics: &mut Diagnostics) -> CdlAst {
    Parser::new(Lexer::new(input), diagnostics).parse()
}

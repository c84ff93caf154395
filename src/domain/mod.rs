mod claude_index;
mod export;
mod merge;
mod parse;
mod preamble;
mod summary;
mod timestamps;
mod types;

pub use claude_index::*;
pub use export::*;
pub use merge::*;
pub use parse::*;
pub use preamble::*;
pub use summary::*;
pub use timestamps::*;
pub use types::*;

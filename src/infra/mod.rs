mod claude_index;
mod delete;
mod head;
mod locate;
mod roots;
mod scan;
mod scan_all;
mod session_detail;
mod summary;

pub use claude_index::*;
pub use delete::*;
pub use head::*;
pub use locate::*;
pub use roots::*;
pub use scan::*;
pub use scan_all::*;
pub use session_detail::*;
pub use summary::*;

//! Domain query tools for the front-desk agent
//!
//! Each tool wraps one read operation on the rental store so the model can
//! ground its answers in real catalog data instead of inventing it.

pub mod films;
pub mod rentals;

pub use films::{GetFilmByIdTool, GetStreamingFilmsTool, ListFilmsTool, SearchFilmsByTitleTool};
pub use rentals::{GetActiveRentalsTool, GetCustomerRentalsTool, GetRentalByIdTool};

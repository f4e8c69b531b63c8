pub mod image;

mod router;
pub use router::get_router;

mod rejections;
mod routes;
mod ws;


pub use rejections::*;
pub use routes::*;

mod book_file;


pub use book_file::*;

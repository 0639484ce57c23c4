pub mod xss;

pub use xss::XssStager;

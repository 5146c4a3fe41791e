pub mod board;
pub mod canvas;
pub mod config;
pub mod dashboards;
pub mod registry;
pub mod research;
pub mod server;
pub mod studio;
#[doc(hidden)]
pub mod test_support;

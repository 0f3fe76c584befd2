pub mod domain_routes;

pub use domain_routes::router;

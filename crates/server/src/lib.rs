pub mod routes;
pub mod seed;

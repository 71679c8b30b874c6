pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod reconcile;
pub mod remote;
pub mod shapes;
pub mod sheet;

pub mod util {
    pub mod env;
}

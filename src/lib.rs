pub mod api;
pub mod catalog;
pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod store;

pub use catalog::{Catalog, CatalogError};
pub use config::{Config, RateMode};
pub use datasource::{LlamaRateSource, MockRateSource, RateSource, RateSourceError};
pub use domain::{
    Layer, LayerSelection, LeverageLoops, LiveRate, Protocol, ProtocolId, RateBook,
    StackSelection, Strategy,
};
pub use engine::{is_compatible, leveraged_apy, total_apy, total_risk, Formula};
pub use error::AppError;
pub use store::{Action, SelectionState, SelectionStore, SessionRegistry};

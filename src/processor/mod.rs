pub mod evaluator;
pub mod job;
pub mod service;

pub use self::evaluator::{evaluate, resolve_config, IndicatorRecord};
pub use self::job::TechnicalRequest;
pub use self::service::TechnicalsService;

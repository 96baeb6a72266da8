//! I/O layer: the Earth Engine adapter (`earthengine`) with its service-account
//! session, and `writers` for the rendered HTML map artifact.
pub mod earthengine;
pub use earthengine::{
    CredentialError, EarthEngine, EarthEngineError, ImageHandle, RestEarthEngine, Session,
};

pub mod writers;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Malformed body description: {0}")]
    Configuration(String),
    #[error("Orbital element out of domain: {0}")]
    Domain(String),
}

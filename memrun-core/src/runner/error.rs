pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("`iterations` must be a positive integer")]
    InvalidIterations,

    #[error("`targets` must be a non-empty list")]
    NoTargets,
}

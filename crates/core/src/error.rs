#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("schema catalog error: {0}")]
    Catalog(#[from] rm_schema::CatalogError),
    #[error("decode error: {0}")]
    Decode(#[from] openehr::DecodeError),
    #[error("encode error: {0}")]
    Encode(#[from] openehr::EncodeError),
    #[error("openEHR error: {0}")]
    Openehr(#[from] openehr::OpenEhrError),

    #[error("unknown RM model '{0}'")]
    UnknownModel(String),
    #[error("unknown schema '{0}'")]
    UnknownSchema(String),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("server error: {0}")]
    Server(String),
}

impl From<holdgate_store_lmdb::LmdbError> for NodeError {
    fn from(e: holdgate_store_lmdb::LmdbError) -> Self {
        NodeError::Store(e.to_string())
    }
}

impl From<holdgate_rpc::ServerError> for NodeError {
    fn from(e: holdgate_rpc::ServerError) -> Self {
        NodeError::Server(e.to_string())
    }
}

/// Why a JSON value could not be decoded into its target type.
///
/// The two classes behave differently for polymorphic results: only
/// [`TypeMismatch`](DecodeError::TypeMismatch) moves decoding on to the next
/// candidate shape; [`Missing`](DecodeError::Missing) is always a hard
/// failure.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The value is present but of the wrong JSON kind for the target type.
    #[error("{context}: expected {expected}, found {found}")]
    TypeMismatch {
        context: String,
        expected: &'static str,
        found: String,
    },

    /// A required field is absent.
    #[error("{context}: missing field `{field}`")]
    Missing {
        context: String,
        field: &'static str,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// Network or connection failure at the HTTP layer.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The endpoint URL is malformed or uses an unsupported scheme.
    #[error("invalid RPC endpoint: {0}")]
    Endpoint(String),

    /// The response body is not a well-formed JSON-RPC envelope.
    #[error("invalid JSON-RPC response: {0}")]
    InvalidResponse(String),

    /// The node answered with a JSON-RPC error object.
    #[error("server error {code}: {message}")]
    Server { code: i64, message: String },

    /// The `result` value did not match the expected schema.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A polymorphic result matched none of its candidate shapes.
    #[error("{context}: result matches no known schema")]
    Protocol { context: &'static str },

    /// The reply channel of a blocking or callback call was dropped before
    /// completion, e.g. because the runtime shut down mid-call.
    #[error("call dropped before completion")]
    Dropped,
}

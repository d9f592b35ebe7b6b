use crate::error::BoardflowError;

pub type BoardflowResult<T> = Result<T, BoardflowError>;

use crate::error::EngineError;
use uuid::Uuid;

pub fn parse_poll_id(id: &str) -> Result<Uuid, EngineError> {
    Uuid::parse_str(id).map_err(|_| EngineError::InvalidId)
}

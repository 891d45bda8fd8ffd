use hickory_server::proto::rr::{Name, RecordType};
use std::time::Instant;

/// The question being answered, as seen by the handler.
#[derive(Clone, Debug)]
pub struct QueryContext {
    pub name: Name,
    pub qtype: RecordType,
    pub start: Instant,
}

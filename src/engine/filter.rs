//! Query relevance rules for the blocklist.
//!
//! Only plain lookups are candidates for blocking: a standard query opcode, exactly one
//! question, and an A or AAAA record type. Everything else passes through untouched.

use hickory_server::proto::op::{Message, OpCode};
use hickory_server::proto::rr::RecordType;
use hickory_server::server::Request;

/// One question of a parsed DNS message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub name: String,
    pub record_type: RecordType,
}

/// Read-only view over a parsed DNS query, as produced by the DNS protocol library.
pub trait QueryView {
    fn op_code(&self) -> OpCode;
    fn question_count(&self) -> usize;
    fn question(&self, index: usize) -> Option<Question>;
}

impl QueryView for Message {
    fn op_code(&self) -> OpCode {
        self.header().op_code()
    }

    fn question_count(&self) -> usize {
        self.queries().len()
    }

    fn question(&self, index: usize) -> Option<Question> {
        self.queries().get(index).map(|q| Question {
            name: q.name().to_string(),
            record_type: q.query_type(),
        })
    }
}

impl QueryView for Request {
    fn op_code(&self) -> OpCode {
        self.header().op_code()
    }

    fn question_count(&self) -> usize {
        self.queries().len()
    }

    fn question(&self, index: usize) -> Option<Question> {
        self.queries().get(index).map(|q| Question {
            name: q.name().to_string(),
            record_type: q.query_type(),
        })
    }
}

/// Returns the question to check against the blocklist, if the query is eligible.
pub fn blockable_question<Q: QueryView + ?Sized>(query: &Q) -> Option<Question> {
    if query.op_code() != OpCode::Query || query.question_count() != 1 {
        return None;
    }

    let question = query.question(0)?;
    match question.record_type {
        RecordType::A | RecordType::AAAA => Some(question),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_server::proto::op::Query;
    use hickory_server::proto::rr::Name;

    fn message(questions: &[(&str, RecordType)]) -> Message {
        let mut msg = Message::new();
        for (name, qtype) in questions {
            msg.add_query(Query::query(Name::from_ascii(name).unwrap(), *qtype));
        }
        msg
    }

    #[test]
    fn test_single_a_and_aaaa_are_eligible() {
        let q = blockable_question(&message(&[("ads.example.com.", RecordType::A)])).unwrap();
        assert_eq!(q.name, "ads.example.com.");
        assert_eq!(q.record_type, RecordType::A);

        assert!(blockable_question(&message(&[("ads.example.com.", RecordType::AAAA)])).is_some());
    }

    #[test]
    fn test_other_record_types_are_ignored() {
        for qtype in [RecordType::MX, RecordType::TXT, RecordType::CNAME, RecordType::HTTPS] {
            assert!(blockable_question(&message(&[("ads.example.com.", qtype)])).is_none());
        }
    }

    #[test]
    fn test_question_count_must_be_one() {
        assert!(blockable_question(&message(&[])).is_none());
        assert!(blockable_question(&message(&[
            ("ads.example.com.", RecordType::A),
            ("other.example.com.", RecordType::A),
        ]))
        .is_none());
    }

    #[test]
    fn test_non_query_opcode_is_ignored() {
        let mut msg = message(&[("ads.example.com.", RecordType::A)]);
        msg.set_op_code(OpCode::Update);
        assert!(blockable_question(&msg).is_none());

        msg.set_op_code(OpCode::Notify);
        assert!(blockable_question(&msg).is_none());
    }
}

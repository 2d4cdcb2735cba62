/// Memo Program Instruction Parser
///
/// Parses instructions from the SPL Memo Program (MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr).
use crate::models::{Instruction, ParsedPayload};

pub const MEMO_PROGRAM: &str = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr";

/// Extract the memo text attached to a transaction
///
/// Only the first memo instruction is considered. The text is returned as-is:
/// no trimming and no prefix stripping. Returns None when the transaction has no
/// memo instruction or the memo decodes to an empty string.
pub fn parse_memo(instructions: &[Instruction]) -> Option<String> {
    let instruction = instructions.iter().find(|ix| ix.program_id() == MEMO_PROGRAM)?;

    let memo = match instruction {
        Instruction::Parsed { payload: ParsedPayload::Text(text), .. } => text.clone(),
        // Non-string payloads report their `info` field verbatim
        Instruction::Parsed { payload: ParsedPayload::Typed { info, .. }, .. } => {
            if info.is_empty() {
                tracing::warn!("Memo instruction has neither text nor info payload");
                return None;
            }
            match serde_json::to_string(info) {
                Ok(rendered) => rendered,
                Err(e) => {
                    tracing::warn!("Failed to render memo info payload: {}", e);
                    return None;
                }
            }
        }
        Instruction::Raw { data, .. } => String::from_utf8_lossy(data).into_owned(),
    };

    if memo.is_empty() {
        None
    } else {
        Some(memo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldMap, FieldValue};

    fn transfer_instruction() -> Instruction {
        Instruction::Parsed {
            program_id: "11111111111111111111111111111111".into(),
            payload: ParsedPayload::Typed { kind: "transfer".into(), info: FieldMap::new() },
        }
    }

    #[test]
    fn test_parse_memo_none_without_memo_instruction() {
        assert_eq!(parse_memo(&[]), None);
        assert_eq!(parse_memo(&[transfer_instruction()]), None);
    }

    #[test]
    fn test_parse_memo_raw_bytes() {
        let instructions = vec![
            transfer_instruction(),
            Instruction::Raw { program_id: MEMO_PROGRAM.into(), data: b"order-123".to_vec() },
        ];

        assert_eq!(parse_memo(&instructions).as_deref(), Some("order-123"));
    }

    #[test]
    fn test_parse_memo_parsed_text_is_verbatim() {
        let instructions = vec![Instruction::Parsed {
            program_id: MEMO_PROGRAM.into(),
            payload: ParsedPayload::Text("  v2ex:order-456 ".into()),
        }];

        assert_eq!(parse_memo(&instructions).as_deref(), Some("  v2ex:order-456 "));
    }

    #[test]
    fn test_parse_memo_first_instruction_wins() {
        let instructions = vec![
            Instruction::Raw { program_id: MEMO_PROGRAM.into(), data: b"first".to_vec() },
            Instruction::Raw { program_id: MEMO_PROGRAM.into(), data: b"second".to_vec() },
        ];

        assert_eq!(parse_memo(&instructions).as_deref(), Some("first"));
    }

    #[test]
    fn test_parse_memo_empty_payload() {
        let instructions = vec![Instruction::Raw { program_id: MEMO_PROGRAM.into(), data: Vec::new() }];
        assert_eq!(parse_memo(&instructions), None);
    }

    #[test]
    fn test_parse_memo_info_payload() {
        let mut info = FieldMap::new();
        info.insert("text".into(), FieldValue::Text("hi".into()));
        let instructions = vec![Instruction::Parsed {
            program_id: MEMO_PROGRAM.into(),
            payload: ParsedPayload::Typed { kind: "memo".into(), info },
        }];

        assert_eq!(parse_memo(&instructions).as_deref(), Some(r#"{"text":"hi"}"#));
    }
}

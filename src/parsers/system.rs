//! System Program thin decoder (spec §4.E.v). Discriminator is a leading
//! u32 LE tag, matching `bincode`'s encoding of `SystemInstruction`.

use crate::codec::decode_payload;
use crate::error::InstructionDecodeError;
use crate::event::{Event, ProgramVariant};
use crate::model::Transaction;

pub const PROGRAM_ID: &str = "11111111111111111111111111111111";
pub const PROGRAM_NAME: &str = "SystemProgram";

const TAG_CREATE_ACCOUNT: u32 = 0;
const TAG_ASSIGN: u32 = 1;
const TAG_TRANSFER: u32 = 2;

fn read_u64_le(data: &[u8], offset: usize) -> Option<u64> {
    data.get(offset..offset + 8)
        .and_then(|s| s.try_into().ok())
        .map(u64::from_le_bytes)
}

pub fn decode(
    _tx: &Transaction,
    signature: &str,
    _instruction_index: usize,
    _accounts: &[u8],
    raw_data: &str,
) -> Result<Event, InstructionDecodeError> {
    let data = decode_payload(raw_data)?;
    let tag_bytes: [u8; 4] = data
        .get(0..4)
        .ok_or(InstructionDecodeError::TruncatedPayload)?
        .try_into()
        .map_err(|_| InstructionDecodeError::TruncatedPayload)?;
    let tag = u32::from_le_bytes(tag_bytes);

    let (instruction_name, value) = match tag {
        TAG_CREATE_ACCOUNT => ("CreateAccount", read_u64_le(&data, 4)),
        TAG_ASSIGN => ("Assign", None),
        TAG_TRANSFER => ("Transfer", read_u64_le(&data, 4)),
        _ => return Err(InstructionDecodeError::UnknownDiscriminator),
    };

    Ok(Event::ProgramVariant(ProgramVariant {
        signature: signature.to_string(),
        program_id: PROGRAM_ID.to_string(),
        program_name: PROGRAM_NAME.to_string(),
        instruction_name: instruction_name.to_string(),
        value,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LoadedAddresses, Message, Meta};

    fn empty_tx() -> Transaction {
        Transaction {
            slot: 1,
            block_time: None,
            signatures: vec!["sig1".into()],
            message: Message {
                account_keys: vec![],
                recent_blockhash: "bh".into(),
                instructions: vec![],
                address_table_lookups: vec![],
            },
            meta: Meta {
                fee: 0,
                pre_balances: vec![],
                post_balances: vec![],
                pre_token_balances: vec![],
                post_token_balances: vec![],
                inner_instructions: vec![],
                log_messages: vec![],
                err: None,
                status: serde_json::json!({"Ok": null}),
                compute_units_consumed: None,
            },
            loaded_addresses: LoadedAddresses::default(),
        }
    }

    #[test]
    fn decodes_transfer_lamports() {
        let tx = empty_tx();
        let mut payload = TAG_TRANSFER.to_le_bytes().to_vec();
        payload.extend_from_slice(&10_000u64.to_le_bytes());
        let raw = bs58::encode(&payload).into_string();
        let event = decode(&tx, "sig1", 0, &[], &raw).unwrap();
        match event {
            Event::ProgramVariant(p) => {
                assert_eq!(p.instruction_name, "Transfer");
                assert_eq!(p.value, Some(10_000));
            }
            _ => panic!("expected ProgramVariant"),
        }
    }
}

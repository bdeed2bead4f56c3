//! ComputeBudget thin decoder (spec §4.E.v). Discriminator is a single
//! leading byte.

use crate::codec::decode_payload;
use crate::error::InstructionDecodeError;
use crate::event::{Event, ProgramVariant};
use crate::model::Transaction;

pub const PROGRAM_ID: &str = "ComputeBudget111111111111111111111111111111";
pub const PROGRAM_NAME: &str = "ComputeBudget";

const TAG_REQUEST_HEAP_FRAME: u8 = 1;
const TAG_SET_COMPUTE_UNIT_LIMIT: u8 = 2;
const TAG_SET_COMPUTE_UNIT_PRICE: u8 = 3;

fn read_u32_le(data: &[u8], offset: usize) -> Option<u64> {
    data.get(offset..offset + 4)
        .and_then(|s| s.try_into().ok())
        .map(|b| u32::from_le_bytes(b) as u64)
}

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
    let tag = *data.first().ok_or(InstructionDecodeError::TruncatedPayload)?;

    let (instruction_name, value) = match tag {
        TAG_REQUEST_HEAP_FRAME => ("RequestHeapFrame", read_u32_le(&data, 1)),
        TAG_SET_COMPUTE_UNIT_LIMIT => ("SetComputeUnitLimit", read_u32_le(&data, 1)),
        TAG_SET_COMPUTE_UNIT_PRICE => ("SetComputeUnitPrice", read_u64_le(&data, 1)),
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
    fn decodes_set_compute_unit_price() {
        let tx = empty_tx();
        let mut payload = vec![TAG_SET_COMPUTE_UNIT_PRICE];
        payload.extend_from_slice(&1_500u64.to_le_bytes());
        let raw = bs58::encode(&payload).into_string();
        let event = decode(&tx, "sig1", 0, &[], &raw).unwrap();
        match event {
            Event::ProgramVariant(p) => {
                assert_eq!(p.instruction_name, "SetComputeUnitPrice");
                assert_eq!(p.value, Some(1_500));
            }
            _ => panic!("expected ProgramVariant"),
        }
    }
}

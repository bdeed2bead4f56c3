//! SPL Token Program decoder (spec §4.E.i). Discriminator is the leading
//! byte of the payload; tag values match the upstream `TokenInstruction`
//! enum ordering (`Transfer = 3`, `TransferChecked = 12`, ...).

use crate::codec::decode_payload;
use crate::error::InstructionDecodeError;
use crate::event::{Event, ProgramVariant, Transfer};
use crate::model::{FullAccountList, Transaction};

pub const PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
pub const PROGRAM_NAME: &str = "TokenProgram";

const TAG_INITIALIZE_ACCOUNT: u8 = 1;
const TAG_TRANSFER: u8 = 3;
const TAG_MINT_TO: u8 = 7;
const TAG_BURN: u8 = 8;
const TAG_CLOSE_ACCOUNT: u8 = 9;
const TAG_TRANSFER_CHECKED: u8 = 12;

fn read_u64_le(data: &[u8], offset: usize) -> Result<u64, InstructionDecodeError> {
    let bytes: [u8; 8] = data
        .get(offset..offset + 8)
        .ok_or(InstructionDecodeError::TruncatedPayload)?
        .try_into()
        .map_err(|_| InstructionDecodeError::TruncatedPayload)?;
    Ok(u64::from_le_bytes(bytes))
}

fn resolve(full: &FullAccountList, index: u8) -> String {
    full.get(index as usize).unwrap_or_default().to_string()
}

/// Decodes one SPL Token instruction. Returns `Ok(None)` for recognized tags
/// that don't (yet) carry richer semantics than their bare name.
pub fn decode(
    tx: &Transaction,
    signature: &str,
    _instruction_index: usize,
    accounts: &[u8],
    raw_data: &str,
) -> Result<Event, InstructionDecodeError> {
    let data = decode_payload(raw_data)?;
    let tag = *data.first().ok_or(InstructionDecodeError::TruncatedPayload)?;
    let full = tx.full_account_list();

    match tag {
        TAG_TRANSFER => {
            let amount = read_u64_le(&data, 1)?;
            let from = accounts.first().map(|a| resolve(&full, *a)).unwrap_or_default();
            let to = accounts.get(1).map(|a| resolve(&full, *a)).unwrap_or_default();
            let authority = accounts.get(2).map(|a| resolve(&full, *a)).unwrap_or_default();
            Ok(Event::Transfer(Transfer {
                signature: signature.to_string(),
                program_id: PROGRAM_ID.to_string(),
                program_name: PROGRAM_NAME.to_string(),
                instruction_name: "Transfer".to_string(),
                from,
                to,
                amount,
                authority,
            }))
        }
        TAG_TRANSFER_CHECKED => {
            let amount = read_u64_le(&data, 1)?;
            let from = accounts.first().map(|a| resolve(&full, *a)).unwrap_or_default();
            // Position 1 is the mint for the Checked variant; `to` is accounts[2].
            let to = accounts.get(2).map(|a| resolve(&full, *a)).unwrap_or_default();
            let authority = accounts.get(3).map(|a| resolve(&full, *a)).unwrap_or_default();
            Ok(Event::Transfer(Transfer {
                signature: signature.to_string(),
                program_id: PROGRAM_ID.to_string(),
                program_name: PROGRAM_NAME.to_string(),
                instruction_name: "TransferChecked".to_string(),
                from,
                to,
                amount,
                authority,
            }))
        }
        TAG_MINT_TO | TAG_BURN => {
            let amount = read_u64_le(&data, 1).ok();
            Ok(Event::ProgramVariant(ProgramVariant {
                signature: signature.to_string(),
                program_id: PROGRAM_ID.to_string(),
                program_name: PROGRAM_NAME.to_string(),
                instruction_name: if tag == TAG_MINT_TO { "MintTo" } else { "Burn" }.to_string(),
                value: amount,
            }))
        }
        TAG_INITIALIZE_ACCOUNT | TAG_CLOSE_ACCOUNT => Ok(Event::ProgramVariant(ProgramVariant {
            signature: signature.to_string(),
            program_id: PROGRAM_ID.to_string(),
            program_name: PROGRAM_NAME.to_string(),
            instruction_name: if tag == TAG_INITIALIZE_ACCOUNT {
                "InitializeAccount"
            } else {
                "CloseAccount"
            }
            .to_string(),
            value: None,
        })),
        _ => Err(InstructionDecodeError::UnknownDiscriminator),
    }
}

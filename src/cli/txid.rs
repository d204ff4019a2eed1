use timelock::vault::{Address, Call, TxId};

/// Print the transaction id of a call
///
/// Owners use this to derive the handle for `confirm`/`execute` ahead of
/// time, or to check a `Queue` event against the call they expect.
pub fn execute(
    target: Address,
    selector: String,
    payload: String,
    payload_hex: Option<String>,
    value: u128,
    eta: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let id = compute(target, selector, payload, payload_hex, value, eta)?;
    println!("{}", id);
    Ok(())
}

fn compute(
    target: Address,
    selector: String,
    payload: String,
    payload_hex: Option<String>,
    value: u128,
    eta: u64,
) -> Result<TxId, Box<dyn std::error::Error>> {
    let payload = match payload_hex {
        Some(hex_str) => hex::decode(hex_str.trim_start_matches("0x"))
            .map_err(|e| format!("Invalid --payload-hex: {}", e))?,
        None => payload.into_bytes(),
    };

    Ok(Call::new(target, selector, payload, value, eta).id()?)
}

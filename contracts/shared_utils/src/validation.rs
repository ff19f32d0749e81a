use soroban_sdk::{xdr::ToXdr, Address, Env};

/// XDR discriminant of `ScAddress::Contract`.
const SC_ADDRESS_TYPE_CONTRACT: u8 = 1;

pub struct Validation;

impl Validation {
    pub fn is_positive(amount: i128) -> bool {
        amount > 0
    }

    /// Whether `address` names a deployed contract rather than an account.
    ///
    /// The XDR form of an address value is the `ScVal` tag (4 bytes) followed
    /// by the `ScAddress` tag (4 bytes, big endian).
    pub fn is_contract_address(e: &Env, address: &Address) -> bool {
        let encoded = address.clone().to_xdr(e);
        encoded.get(7) == Some(SC_ADDRESS_TYPE_CONTRACT)
    }
}
